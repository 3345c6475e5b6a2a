use axum::{Router, routing::get};
use crate::{app_state::SharedState, task_controller::TaskController};

pub const ROUTER_PATH: &str = "/tasks";

pub fn get_router(app_state: SharedState) -> Router {
    Router::new()
        .route(ROUTER_PATH, get(TaskController::list).post(TaskController::create))
        .route(format!("{}/", ROUTER_PATH).as_str(), get(TaskController::list).post(TaskController::create))
        .route(
            format!("{}/:task_id", ROUTER_PATH).as_str(),
            get(TaskController::get)
                .put(TaskController::update)
                .patch(TaskController::patch)
                .delete(TaskController::delete),
        )
        .with_state(app_state)
}
