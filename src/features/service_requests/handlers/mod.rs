pub mod service_request_handler;

pub use service_request_handler::{
    __path_create_service_request, __path_delete_service_request, __path_get_service_request,
    __path_get_service_request_stats, __path_list_service_requests,
    __path_update_service_request_status, create_service_request, delete_service_request,
    get_service_request, get_service_request_stats, list_service_requests,
    update_service_request_status,
};
