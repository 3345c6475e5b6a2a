use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct TaskDeletedResponse {
    pub task_deleted: bool,
    pub id: u64,
}
