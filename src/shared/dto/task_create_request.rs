use chrono::NaiveDate;
use serde::Deserialize;

use crate::task::{validate_title, NewTask};

#[derive(Debug, Clone, Deserialize)]
pub struct TaskCreateRequest {
    pub title: String,
    #[serde(default)]
    pub completed: Option<bool>,
    #[serde(default)]
    pub created_at: Option<NaiveDate>,
}

impl TaskCreateRequest {
    pub fn validate(&self) -> Result<(), String> {
        validate_title(&self.title)
    }

    /// Fills in the defaults: not completed, created `today`.
    pub fn into_new_task(self, today: NaiveDate) -> NewTask {
        NewTask {
            title: self.title,
            completed: self.completed.unwrap_or(false),
            created_at: self.created_at.unwrap_or(today),
        }
    }
}
