pub mod api_error;
pub mod health_controller;
pub mod task_controller;
