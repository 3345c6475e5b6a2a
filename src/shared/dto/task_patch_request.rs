use serde::Deserialize;

use crate::{patch::Patch, task::{validate_title, Task}};

/// Body of a partial update. Keys left out of the payload keep their stored value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskPatchRequest {
    #[serde(default)]
    pub title: Patch<String>,
    #[serde(default)]
    pub completed: Patch<bool>,
}

impl TaskPatchRequest {
    /// Parses a raw PATCH body. No body, or a JSON `null`, changes nothing.
    pub fn from_body(body: &[u8]) -> Result<Self, serde_json::Error> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(TaskPatchRequest::default());
        }
        serde_json::from_slice::<Option<TaskPatchRequest>>(body).map(Option::unwrap_or_default)
    }

    pub fn validate(&self) -> Result<(), String> {
        match self.title.as_value() {
            Some(title) => validate_title(title),
            None => Ok(()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.title.as_value().is_none() && self.completed.as_value().is_none()
    }

    pub fn apply(self, task: &mut Task) {
        self.title.apply_to(&mut task.title);
        self.completed.apply_to(&mut task.completed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn task() -> Task {
        Task {
            id: 7,
            title: "water plants".to_string(),
            completed: false,
            created_at: NaiveDate::from_ymd_opt(2026, 1, 5).unwrap(),
        }
    }

    #[test]
    fn empty_and_null_bodies_change_nothing() {
        for body in [&b""[..], b"  \n", b"null", b"{}"] {
            let patch = TaskPatchRequest::from_body(body).unwrap();
            assert!(patch.is_empty());

            let mut target = task();
            patch.apply(&mut target);
            assert_eq!(target, task());
        }
    }

    #[test]
    fn completed_only_leaves_title() {
        let patch = TaskPatchRequest::from_body(br#"{"completed": true}"#).unwrap();
        let mut target = task();
        patch.apply(&mut target);

        assert!(target.completed);
        assert_eq!(target.title, "water plants");
    }

    #[test]
    fn null_title_is_ignored() {
        let patch = TaskPatchRequest::from_body(br#"{"title": null, "completed": true}"#).unwrap();
        assert_eq!(patch.title, Patch::Null);
        assert!(patch.validate().is_ok());

        let mut target = task();
        patch.apply(&mut target);
        assert_eq!(target.title, "water plants");
    }

    #[test]
    fn wrong_shapes_are_rejected() {
        assert!(TaskPatchRequest::from_body(br#"{"completed": "yes"}"#).is_err());
        assert!(TaskPatchRequest::from_body(b"[1, 2]").is_err());
        assert!(TaskPatchRequest::from_body(b"{").is_err());
    }
}
