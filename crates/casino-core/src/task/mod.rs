//! Challenge tasks.
//!
//! Each user keeps a pool of tasks written for their partner. A task is
//! `available` until it is spun, `in_progress` while assigned, and
//! `completed` once its assignee marks it done.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Result, ValidationError};

/// Categories offered as suggestions when creating a task.
pub const SUGGESTED_CATEGORIES: [&str; 6] = [
    "Date Night",
    "Adventure",
    "Creative",
    "Home",
    "Surprise",
    "Romantic",
];

/// Pool size below which users are nudged to write more tasks.
pub const RECOMMENDED_POOL_SIZE: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Available,
    InProgress,
    Completed,
}

impl TaskStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Available => "available",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Completed => "completed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "available" => Some(TaskStatus::Available),
            "in_progress" => Some(TaskStatus::InProgress),
            "completed" => Some(TaskStatus::Completed),
            _ => None,
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub user_id: String,
    pub text: String,
    #[serde(default)]
    pub category: Option<String>,
    pub status: TaskStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Task {
    /// Build a new available task owned by `user_id`.
    ///
    /// Text is trimmed and must not be empty; a blank category is dropped.
    pub fn new(user_id: &str, text: &str, category: Option<&str>) -> Result<Self> {
        Ok(Self {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            text: normalize_text(text)?,
            category: normalize_category(category),
            status: TaskStatus::Available,
            created_at: Utc::now(),
            completed_at: None,
        })
    }

    pub fn is_available(&self) -> bool {
        self.status == TaskStatus::Available
    }

    /// Apply an edit made by the owner.
    pub fn apply(&mut self, update: &TaskUpdate) -> Result<()> {
        if let Some(text) = update.text.as_deref() {
            self.text = normalize_text(text)?;
        }
        match &update.category {
            CategoryUpdate::Keep => {}
            CategoryUpdate::Clear => self.category = None,
            CategoryUpdate::Set(category) => self.category = normalize_category(Some(category)),
        }
        Ok(())
    }

    pub fn mark_completed(&mut self, at: DateTime<Utc>) {
        self.status = TaskStatus::Completed;
        self.completed_at = Some(at);
    }
}

/// Owner edit of a task. `None`/`Keep` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct TaskUpdate {
    pub text: Option<String>,
    pub category: CategoryUpdate,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CategoryUpdate {
    #[default]
    Keep,
    Clear,
    Set(String),
}

/// Counts shown above a user's task pool.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolSummary {
    pub total: usize,
    pub available: usize,
    pub in_progress: usize,
    pub completed: usize,
    /// Set when the available pool is below [`RECOMMENDED_POOL_SIZE`].
    pub needs_more: bool,
}

impl PoolSummary {
    pub fn from_tasks(tasks: &[Task]) -> Self {
        let mut summary = PoolSummary {
            total: tasks.len(),
            ..PoolSummary::default()
        };
        for task in tasks {
            match task.status {
                TaskStatus::Available => summary.available += 1,
                TaskStatus::InProgress => summary.in_progress += 1,
                TaskStatus::Completed => summary.completed += 1,
            }
        }
        summary.needs_more = summary.available < RECOMMENDED_POOL_SIZE;
        summary
    }
}

fn normalize_text(text: &str) -> Result<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Empty { field: "text" }.into());
    }
    Ok(trimmed.to_string())
}

fn normalize_category(category: Option<&str>) -> Option<String> {
    category
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
}
