//! Core error types for casino-core.
//!
//! This module defines the error hierarchy using thiserror. Every error is
//! recoverable by the caller; [`CoreError::kind`] sorts them into the three
//! families the front end reacts to differently.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for casino-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// The partner's available pool is too small for a reveal.
    #[error("Your partner needs at least {required} available tasks. They currently have {available}.")]
    InsufficientTasks { available: usize, required: usize },

    /// The monthly veto has already been spent.
    #[error("You have already used your veto this month ({month})")]
    VetoUnavailable { month: String },

    /// The user already has an assignment for this week.
    #[error("You have already spun for the week of {week_start}")]
    AlreadySpun { week_start: chrono::NaiveDate },

    /// Both sides of a spin must be assigned before tasks can be swapped.
    #[error("Both partners must spin before a veto can swap tasks")]
    SpinIncomplete,

    /// The action needs a linked partner.
    #[error("Partner not linked yet")]
    PartnerNotLinked,

    /// The acting user is not one of the spin's participants.
    #[error("User {user_id} is not a participant of spin {spin_id}")]
    NotParticipant { user_id: String, spin_id: String },

    /// The task is someone's assignment this week.
    #[error("Task {task_id} is assigned this week and cannot be deleted")]
    TaskAssigned { task_id: String },

    /// No weekly spin record exists for the requested week.
    #[error("No spin recorded for the week of {week_start}")]
    NoSpinForWeek { week_start: chrono::NaiveDate },

    /// A referenced record does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Error families, used by front ends to decide how to react.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Not enough data for the action (block it and tell the user).
    InsufficientData,
    /// The persistence collaborator failed; surfaced verbatim, user may retry.
    Persistence,
    /// The action is not allowed right now; rejected before any mutation.
    Precondition,
}

impl CoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CoreError::InsufficientTasks { .. } => ErrorKind::InsufficientData,
            CoreError::Database(_)
            | CoreError::Io(_)
            | CoreError::Json(_)
            | CoreError::NotFound { .. } => ErrorKind::Persistence,
            CoreError::Config(_)
            | CoreError::Validation(_)
            | CoreError::VetoUnavailable { .. }
            | CoreError::AlreadySpun { .. }
            | CoreError::SpinIncomplete
            | CoreError::PartnerNotLinked
            | CoreError::NotParticipant { .. }
            | CoreError::TaskAssigned { .. }
            | CoreError::NoSpinForWeek { .. } => ErrorKind::Precondition,
        }
    }

    pub(crate) fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        CoreError::NotFound {
            entity,
            id: id.into(),
        }
    }
}

/// Database-specific errors.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Failed to open database connection
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Migration failed
    #[error("Database migration failed: {0}")]
    MigrationFailed(String),

    /// A stored value could not be decoded
    #[error("Corrupt value in column '{column}': {value}")]
    CorruptValue { column: &'static str, value: String },

    /// Database is locked
    #[error("Database is locked")]
    Locked,
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Unknown configuration key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Data directory could not be determined or created
    #[error("Data directory unavailable: {0}")]
    DataDir(String),
}

/// Validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// Required text was empty
    #[error("'{field}' must not be empty")]
    Empty { field: &'static str },

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },

    /// Task cannot be used for this action
    #[error("Task {task_id} cannot be chosen: {reason}")]
    TaskNotEligible { task_id: String, reason: String },
}

impl From<rusqlite::Error> for DatabaseError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(e, _msg) => {
                if e.code == rusqlite::ErrorCode::DatabaseLocked
                    || e.code == rusqlite::ErrorCode::DatabaseBusy
                {
                    DatabaseError::Locked
                } else {
                    DatabaseError::QueryFailed(err.to_string())
                }
            }
            _ => DatabaseError::QueryFailed(err.to_string()),
        }
    }
}

impl From<rusqlite::Error> for CoreError {
    fn from(err: rusqlite::Error) -> Self {
        CoreError::Database(DatabaseError::from(err))
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
