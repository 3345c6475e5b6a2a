// Requests
pub mod task_create_request;
pub mod task_update_request;
pub mod task_patch_request;
pub mod task_list_query;


// Responses
pub mod task_deleted_response;
