use crate::features::tasks::handlers;
use crate::features::tasks::services::TaskService;
use axum::{routing::post, Router};
use std::sync::Arc;

/// Task assignment routes (admin only)
pub fn routes(service: Arc<TaskService>) -> Router {
    Router::new()
        .route("/api/tasks/assign", post(handlers::assign_task))
        .with_state(service)
}
