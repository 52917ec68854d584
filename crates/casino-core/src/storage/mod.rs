mod config;
pub mod database;
pub mod migrations;

pub use config::{Config, ScheduleConfig, SessionConfig};
pub use database::CasinoDb;

use std::path::PathBuf;

use chrono::NaiveDate;

use crate::error::{ConfigError, Result};
use crate::spin::{Side, SpinClaim, VetoRequest, VetoUsage, WeeklySpin};
use crate::task::{Task, TaskStatus};
use crate::user::User;

/// Returns `~/.config/couples-casino[-dev]/` based on CASINO_ENV.
///
/// Set CASINO_ENV=dev to use development data directory, or CASINO_DATA_DIR
/// to use an explicit directory.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let dir = match std::env::var_os("CASINO_DATA_DIR") {
        Some(dir) => PathBuf::from(dir),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");

            let env = std::env::var("CASINO_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("couples-casino-dev")
            } else {
                base_dir.join("couples-casino")
            }
        }
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| ConfigError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}

/// Everything the weekly workflow reads from and writes to persistence.
///
/// Row-level rules that need more than one statement (claiming a spin slot,
/// applying a veto) are single operations here so an implementation can make
/// them atomic.
pub trait CasinoStore {
    fn insert_user(&self, user: &User) -> Result<()>;
    fn get_user(&self, id: &str) -> Result<Option<User>>;
    fn find_user_by_email(&self, email: &str) -> Result<Option<User>>;
    /// Link two users to each other.
    fn link_partners(&self, user_id: &str, partner_id: &str) -> Result<()>;

    fn insert_task(&self, task: &Task) -> Result<()>;
    fn get_task(&self, id: &str) -> Result<Option<Task>>;
    fn update_task(&self, task: &Task) -> Result<()>;
    /// Returns false when no task had that id. A task that is currently
    /// assigned (`in_progress`) is kept and `TaskAssigned` is returned.
    fn delete_task(&self, id: &str) -> Result<bool>;
    /// Tasks owned by `owner_id`, newest first, optionally by status.
    fn list_tasks(&self, owner_id: &str, status: Option<TaskStatus>) -> Result<Vec<Task>>;
    fn tasks_by_ids(&self, ids: &[String]) -> Result<Vec<Task>>;

    /// The spin `user_id` participates in for the week starting `week_start`.
    fn find_spin(&self, user_id: &str, week_start: NaiveDate) -> Result<Option<WeeklySpin>>;
    fn get_spin(&self, id: &str) -> Result<Option<WeeklySpin>>;
    /// Write the claimed task into the claimant's slot and take the task off
    /// the available pool. Creates the week's record for the first claimant;
    /// fails with `AlreadySpun` when the slot is already filled.
    fn claim_spin(&self, claim: &SpinClaim) -> Result<WeeklySpin>;
    fn set_verification(&self, spin_id: &str, side: Side, verified: bool) -> Result<WeeklySpin>;
    fn set_completion(&self, spin_id: &str, side: Side, completed: bool) -> Result<WeeklySpin>;

    fn veto_usages(&self, user_id: &str, month: &str) -> Result<Vec<VetoUsage>>;
    /// Check the month is unspent, swap both task ids, flag the vetoing side
    /// and record the usage, all or nothing.
    fn apply_veto(&self, request: &VetoRequest) -> Result<WeeklySpin>;
}
