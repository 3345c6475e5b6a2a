pub mod app_state;
pub mod patch;
pub mod settings;
pub mod task;
