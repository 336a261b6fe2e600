use crate::features::profile::handlers;
use crate::features::profile::services::ProfileService;
use axum::{routing::get, Router};
use std::sync::Arc;

/// Profile routes (require JWT authentication)
pub fn routes(service: Arc<ProfileService>) -> Router {
    Router::new()
        .route(
            "/api/profile",
            get(handlers::get_profile).post(handlers::update_profile),
        )
        .with_state(service)
}
