use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A persisted to-do record. `id` is assigned by storage on insert and
/// `created_at` never changes afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: u64,
    pub title: String,
    pub completed: bool,
    pub created_at: NaiveDate,
}

/// A task that has not been stored yet, so it has no id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub title: String,
    pub completed: bool,
    pub created_at: NaiveDate,
}

impl NewTask {
    pub fn with_id(self, id: u64) -> Task {
        Task {
            id,
            title: self.title,
            completed: self.completed,
            created_at: self.created_at,
        }
    }
}

/// Which slice of the task list to return, ordered by `created_at`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskFilter {
    pub offset: u64,
    pub limit: u64,
    /// `None` returns tasks regardless of completion.
    pub status: Option<bool>,
}

impl TaskFilter {
    pub fn matches(&self, task: &Task) -> bool {
        self.status.map_or(true, |status| task.completed == status)
    }
}

/// Titles are required and must contain something other than whitespace.
pub fn validate_title(title: &str) -> Result<(), String> {
    if title.trim().is_empty() {
        return Err("title must not be empty".to_string());
    }
    Ok(())
}
