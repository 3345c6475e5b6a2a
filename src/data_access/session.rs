use std::{convert::Infallible, time::Instant};

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

use crate::{
    app_state::SharedState,
    data_access::{data_context::DataContext, store_error::StoreError},
    task::{NewTask, Task, TaskFilter},
};

/// Request-scoped storage handle, handed to controllers as an extractor.
///
/// A session never keeps a transaction open between calls. Every call below
/// opens its own redb transaction and either commits it or drops it before
/// returning, so an early `?` or a rejected request leaves nothing behind.
pub struct Session {
    data_context: DataContext,
    opened_at: Instant,
}

impl Session {
    pub fn open(data_context: DataContext) -> Self {
        tracing::trace!("session opened");
        Session {
            data_context,
            opened_at: Instant::now(),
        }
    }

    pub fn insert_task(&self, new_task: NewTask) -> Result<Task, StoreError> {
        self.data_context.insert_task(new_task)
    }

    pub fn get_task(&self, id: u64) -> Result<Option<Task>, StoreError> {
        self.data_context.get_task(id)
    }

    pub fn list_tasks(&self, filter: &TaskFilter) -> Result<Vec<Task>, StoreError> {
        self.data_context.list_tasks(filter)
    }

    pub fn modify_task<F>(&self, id: u64, apply: F) -> Result<Option<Task>, StoreError>
    where
        F: FnOnce(&mut Task),
    {
        self.data_context.modify_task(id, apply)
    }

    pub fn delete_task(&self, id: u64) -> Result<bool, StoreError> {
        self.data_context.delete_task(id)
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        tracing::trace!(
            elapsed_us = self.opened_at.elapsed().as_micros() as u64,
            "session closed"
        );
    }
}

#[async_trait]
impl FromRequestParts<SharedState> for Session {
    type Rejection = Infallible;

    async fn from_request_parts(_parts: &mut Parts, state: &SharedState) -> Result<Self, Self::Rejection> {
        Ok(Session::open(state.data_context.clone()))
    }
}
