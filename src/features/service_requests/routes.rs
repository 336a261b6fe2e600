use crate::features::service_requests::handlers;
use crate::features::service_requests::services::ServiceRequestService;
use axum::{
    routing::{delete, get},
    Router,
};
use std::sync::Arc;

/// Service request routes (all require JWT authentication; admin checks happen per handler)
pub fn routes(service: Arc<ServiceRequestService>) -> Router {
    Router::new()
        .route(
            "/api/services",
            get(handlers::list_service_requests)
                .post(handlers::create_service_request)
                .put(handlers::update_service_request_status),
        )
        .route("/api/services/stats", get(handlers::get_service_request_stats))
        .route(
            "/api/services/{id}",
            get(handlers::get_service_request).delete(handlers::delete_service_request),
        )
        .with_state(service)
}
