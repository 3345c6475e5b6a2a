use axum::{
    body::Bytes,
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query,
    },
    Json,
};
use chrono::Local;

use crate::{
    api_error::ApiError,
    data_access::session::Session,
    task::Task,
    task_create_request::TaskCreateRequest,
    task_deleted_response::TaskDeletedResponse,
    task_list_query::TaskListQuery,
    task_patch_request::TaskPatchRequest,
    task_update_request::TaskUpdateRequest,
};

const TASK_NOT_FOUND: &str = "Task not found";
const TASK_MISSING: &str = "Not Found: Requested task doesn't exist";

/// Ids are handed out from 1 upwards, so a zero or negative id is a miss.
fn stored_id(task_id: Result<Path<i64>, PathRejection>, missing: &'static str) -> Result<u64, ApiError> {
    let Path(task_id) = task_id?;
    u64::try_from(task_id)
        .ok()
        .filter(|id| *id > 0)
        .ok_or(ApiError::NotFound(missing))
}

pub struct TaskController {}

impl TaskController {
    pub async fn create(
        session: Session,
        payload: Result<Json<TaskCreateRequest>, JsonRejection>,
    ) -> Result<Json<Task>, ApiError> {
        let Json(payload) = payload?;
        payload.validate().map_err(ApiError::Validation)?;

        let task = session.insert_task(payload.into_new_task(Local::now().date_naive()))?;
        tracing::info!(task_id = task.id, title = %task.title, "task created");
        Ok(Json(task))
    }

    pub async fn list(
        session: Session,
        query: Result<Query<TaskListQuery>, QueryRejection>,
    ) -> Result<Json<Vec<Task>>, ApiError> {
        let Query(query) = query?;
        let filter = query.into_filter().map_err(ApiError::Validation)?;

        let tasks = session.list_tasks(&filter)?;
        tracing::debug!(
            offset = filter.offset,
            limit = filter.limit,
            status = ?filter.status,
            returned = tasks.len(),
            "tasks listed"
        );
        Ok(Json(tasks))
    }

    pub async fn get(
        session: Session,
        task_id: Result<Path<i64>, PathRejection>,
    ) -> Result<Json<Task>, ApiError> {
        let task_id = stored_id(task_id, TASK_NOT_FOUND)?;
        session
            .get_task(task_id)?
            .map(Json)
            .ok_or(ApiError::NotFound(TASK_NOT_FOUND))
    }

    pub async fn update(
        session: Session,
        task_id: Result<Path<i64>, PathRejection>,
        payload: Result<Json<TaskUpdateRequest>, JsonRejection>,
    ) -> Result<Json<Task>, ApiError> {
        let task_id = stored_id(task_id, TASK_MISSING)?;
        let Json(payload) = payload?;
        payload.validate().map_err(ApiError::Validation)?;

        let task = session
            .modify_task(task_id, |task| payload.apply(task))?
            .ok_or(ApiError::NotFound(TASK_MISSING))?;
        tracing::info!(task_id, completed = task.completed, "task updated");
        Ok(Json(task))
    }

    /// PATCH reads the raw body so that a missing body can mean "change nothing".
    pub async fn patch(
        session: Session,
        task_id: Result<Path<i64>, PathRejection>,
        body: Bytes,
    ) -> Result<Json<Task>, ApiError> {
        let task_id = stored_id(task_id, TASK_MISSING)?;
        let payload = TaskPatchRequest::from_body(&body)
            .map_err(|e| ApiError::Validation(format!("Failed to deserialize the JSON body: {e}")))?;
        payload.validate().map_err(ApiError::Validation)?;

        if payload.is_empty() {
            tracing::debug!(task_id, "patch without fields");
            return session
                .get_task(task_id)?
                .map(Json)
                .ok_or(ApiError::NotFound(TASK_MISSING));
        }

        let task = session
            .modify_task(task_id, |task| payload.apply(task))?
            .ok_or(ApiError::NotFound(TASK_MISSING))?;
        tracing::info!(task_id, completed = task.completed, "task patched");
        Ok(Json(task))
    }

    pub async fn delete(
        session: Session,
        task_id: Result<Path<i64>, PathRejection>,
    ) -> Result<Json<TaskDeletedResponse>, ApiError> {
        let task_id = stored_id(task_id, TASK_MISSING)?;
        if !session.delete_task(task_id)? {
            return Err(ApiError::NotFound(TASK_MISSING));
        }

        tracing::info!(task_id, "task deleted");
        Ok(Json(TaskDeletedResponse {
            task_deleted: true,
            id: task_id,
        }))
    }
}
