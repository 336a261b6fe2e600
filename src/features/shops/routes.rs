use crate::features::shops::handlers;
use crate::features::shops::services::ShopService;
use axum::{
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;

/// Public shop routes (listing and detail)
pub fn public_routes(service: Arc<ShopService>) -> Router {
    Router::new()
        .route("/api/shops", get(handlers::list_shops))
        .route("/api/shops/{id}", get(handlers::get_shop))
        .with_state(service)
}

/// Protected shop routes (admin management)
pub fn protected_routes(service: Arc<ShopService>) -> Router {
    Router::new()
        .route("/api/shops", post(handlers::create_shop))
        .route(
            "/api/shops/{id}",
            put(handlers::update_shop).delete(handlers::delete_shop),
        )
        .route("/api/shops/{id}/mechanics", get(handlers::list_shop_mechanics))
        .with_state(service)
}
