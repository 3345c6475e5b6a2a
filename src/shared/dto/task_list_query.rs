use serde::{de::Error as _, Deserialize, Deserializer};

use crate::task::TaskFilter;

pub const MAX_PAGE_SIZE: u64 = 20;

#[derive(Debug, Clone, Deserialize)]
pub struct TaskListQuery {
    #[serde(default)]
    pub offset: u64,
    #[serde(default = "default_limit")]
    pub limit: u64,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub status: Option<bool>,
}

fn default_limit() -> u64 {
    MAX_PAGE_SIZE
}

/// Query-string booleans: true/false, 1/0, yes/no, on/off, any case.
fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" | "t" | "y" => Some(true),
        "false" | "0" | "no" | "off" | "f" | "n" => Some(false),
        _ => None,
    }
}

fn lenient_bool<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer)?
        .map(|raw| {
            parse_bool(&raw).ok_or_else(|| D::Error::custom(format!("status: `{raw}` is not a valid boolean")))
        })
        .transpose()
}

impl TaskListQuery {
    /// A `limit` above the page size is refused rather than clamped.
    pub fn into_filter(self) -> Result<TaskFilter, String> {
        if self.limit > MAX_PAGE_SIZE {
            return Err(format!("limit must be less than or equal to {MAX_PAGE_SIZE}"));
        }
        Ok(TaskFilter {
            offset: self.offset,
            limit: self.limit,
            status: self.status,
        })
    }
}
