use serde::Deserialize;

use crate::task::{validate_title, Task};

/// Body of a full update. Both fields are required.
#[derive(Debug, Clone, Deserialize)]
pub struct TaskUpdateRequest {
    pub title: String,
    pub completed: bool,
}

impl TaskUpdateRequest {
    pub fn validate(&self) -> Result<(), String> {
        validate_title(&self.title)
    }

    pub fn apply(self, task: &mut Task) {
        task.title = self.title;
        task.completed = self.completed;
    }
}
