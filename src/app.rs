use axum::{
    extract::DefaultBodyLimit,
    middleware::{from_fn, from_fn_with_state},
    routing::get,
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::core::config::Config;
use crate::core::middleware;
use crate::core::openapi::{ApiDoc, SwaggerInfoModifier};
use crate::features::auth::{routes as auth_routes, AuthService, JwtService};
use crate::features::profile::{routes as profile_routes, ProfileService};
use crate::features::service_requests::{routes as service_requests_routes, ServiceRequestService};
use crate::features::shops::{routes as shops_routes, ShopService};
use crate::features::tasks::{routes as tasks_routes, TaskService};

/// Simple health check endpoint (no auth required)
async fn health_check() -> axum::http::StatusCode {
    axum::http::StatusCode::OK
}

fn swagger_router(config: &Config) -> Router {
    let swagger_modifier = SwaggerInfoModifier {
        title: config.swagger.title.clone(),
        version: config.swagger.version.clone(),
        description: config.swagger.description.clone(),
    };

    let mut openapi = ApiDoc::openapi();
    swagger_modifier.modify(&mut openapi);

    if let Some(credentials) = config.swagger.credentials() {
        tracing::info!("Swagger UI basic auth enabled");
        Router::new()
            .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
            .layer(from_fn(middleware::basic_auth_middleware(Arc::new(
                credentials,
            ))))
    } else {
        tracing::info!("Swagger UI basic auth disabled (no credentials configured)");
        Router::new().merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
    }
}

/// Wire services, routes and HTTP layers into the application router
pub fn build_router(config: &Config, pool: PgPool) -> Router {
    let jwt = Arc::new(JwtService::new(config.jwt.clone()));

    let auth_service = Arc::new(AuthService::new(pool.clone(), Arc::clone(&jwt)));
    let service_request_service = Arc::new(ServiceRequestService::new(pool.clone()));
    let shop_service = Arc::new(ShopService::new(pool.clone()));
    let task_service = Arc::new(TaskService::new(pool.clone()));
    let profile_service = Arc::new(ProfileService::new(pool));
    tracing::info!("Services initialized");

    // Protected routes (require JWT authentication)
    let protected_routes = Router::new()
        .merge(auth_routes::protected_routes(Arc::clone(&auth_service)))
        .merge(service_requests_routes::routes(service_request_service))
        .merge(shops_routes::protected_routes(Arc::clone(&shop_service)))
        .merge(tasks_routes::routes(task_service))
        .merge(profile_routes::routes(profile_service))
        .route_layer(from_fn_with_state(jwt, middleware::auth_middleware));

    let health_route = Router::new().route("/health", get(health_check));

    // Public routes (no auth required)
    let public_routes = Router::new()
        .merge(auth_routes::public_routes(auth_service))
        .merge(shops_routes::public_routes(shop_service));

    Router::new()
        .merge(swagger_router(config))
        .merge(protected_routes)
        .merge(public_routes)
        .merge(health_route)
        // Multipart uploads are bounded by the request body limit below
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(config.app.max_request_body_size))
        .layer(middleware::cors_layer(
            config.app.cors_allowed_origins.clone(),
        ))
        // Propagate X-Request-Id to response headers
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(middleware::MakeSpanWithRequestId)
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        // Generate X-Request-Id using UUID v7 (or use client-provided one)
        .layer(SetRequestIdLayer::x_request_id(middleware::MakeRequestUuid))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::{
        create_admin_user, create_regular_user, create_worker_user, lazy_pool,
        test_config, token_for,
    };
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use serde_json::{json, Value};
    use uuid::Uuid;

    fn server() -> TestServer {
        let config = test_config();
        TestServer::new(build_router(&config, lazy_pool())).unwrap()
    }

    #[tokio::test]
    async fn test_health_check() {
        let response = server().get("/health").await;
        response.assert_status_ok();
        assert!(response.headers().contains_key("x-request-id"));
    }

    #[tokio::test]
    async fn test_openapi_document_is_served() {
        let response = server().get("/api-docs/openapi.json").await;
        response.assert_status_ok();
        let doc: Value = response.json();
        assert_eq!(doc["info"]["title"], "OnRoadCare API");
    }

    #[tokio::test]
    async fn test_protected_routes_require_token() {
        let server = server();
        for path in ["/api/services", "/api/services/stats", "/api/profile", "/api/auth/me"] {
            let response = server.get(path).await;
            response.assert_status(StatusCode::UNAUTHORIZED);
            let body: Value = response.json();
            assert_eq!(body["success"], false);
            assert_eq!(body["message"], "No token");
        }
    }

    #[tokio::test]
    async fn test_malformed_authorization_header() {
        let response = server()
            .get("/api/services")
            .authorization("Token abc")
            .await;
        response.assert_status(StatusCode::UNAUTHORIZED);
        let body: Value = response.json();
        assert_eq!(body["message"], "Invalid authorization header format");
    }

    #[tokio::test]
    async fn test_invalid_token_rejected() {
        let response = server()
            .get("/api/services")
            .authorization_bearer("not.a.jwt")
            .await;
        response.assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_admin_routes_forbid_regular_users() {
        let server = server();
        let token = token_for(&create_regular_user());

        let response = server
            .get("/api/services/stats")
            .authorization_bearer(&token)
            .await;
        response.assert_status(StatusCode::FORBIDDEN);

        let response = server
            .put("/api/services")
            .authorization_bearer(&token)
            .json(&json!({ "id": Uuid::now_v7(), "status": "CLOSED" }))
            .await;
        response.assert_status(StatusCode::FORBIDDEN);

        let response = server
            .delete(&format!("/api/shops/{}", Uuid::now_v7()))
            .authorization_bearer(&token)
            .await;
        response.assert_status(StatusCode::FORBIDDEN);

        let response = server
            .post("/api/tasks/assign")
            .authorization_bearer(&token)
            .json(&json!({
                "adminId": Uuid::now_v7(),
                "serviceRequestId": Uuid::now_v7(),
                "mechanicId": Uuid::now_v7(),
            }))
            .await;
        response.assert_status(StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_worker_is_not_admin() {
        let response = server()
            .get(&format!("/api/shops/{}/mechanics", Uuid::now_v7()))
            .authorization_bearer(token_for(&create_worker_user()))
            .await;
        response.assert_status(StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_profile_update_requires_worker() {
        let response = server()
            .post("/api/profile")
            .authorization_bearer(token_for(&create_admin_user()))
            .json(&json!({ "name": "Admin" }))
            .await;
        response.assert_status(StatusCode::FORBIDDEN);
        let body: Value = response.json();
        assert_eq!(body["message"], "Worker access required");
    }

    #[tokio::test]
    async fn test_assign_rejects_mismatched_admin_id() {
        let response = server()
            .post("/api/tasks/assign")
            .authorization_bearer(token_for(&create_admin_user()))
            .json(&json!({
                "adminId": Uuid::now_v7(),
                "serviceRequestId": Uuid::now_v7(),
                "mechanicId": Uuid::now_v7(),
            }))
            .await;
        response.assert_status(StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_invalid_status_is_bad_request() {
        let response = server()
            .put("/api/services")
            .authorization_bearer(token_for(&create_admin_user()))
            .json(&json!({ "id": Uuid::now_v7(), "status": "DONE" }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_status_update_requires_id() {
        let response = server()
            .put("/api/services")
            .authorization_bearer(token_for(&create_admin_user()))
            .json(&json!({ "status": "OPEN" }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_list_rejects_unknown_filters_before_querying() {
        let server = server();
        let token = token_for(&create_regular_user());

        let response = server
            .get("/api/services")
            .add_query_param("status", "DONE")
            .authorization_bearer(&token)
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);

        let response = server
            .get("/api/services")
            .add_query_param("duration", "Last 14 days")
            .authorization_bearer(&token)
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);

        let response = server
            .get("/api/services")
            .add_query_param("sortBy", "mileage")
            .authorization_bearer(&token)
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_create_shop_validates_body() {
        let server = server();
        let token = token_for(&create_admin_user());

        let response = server
            .post("/api/shops")
            .authorization_bearer(&token)
            .text("{not json")
            .content_type("application/json")
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);

        let response = server
            .post("/api/shops")
            .authorization_bearer(&token)
            .json(&json!({
                "name": "Quick Fix",
                "description": "Garage",
                "services": ["Oil Change"],
                "location": { "lat": 120.0, "lng": 10.0 },
                "address": "Main St 1",
                "owner": "Budi",
                "phone": "+62 812-3456-7890",
                "email": "garage@example.com"
            }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_register_rejects_invalid_email() {
        let response = server()
            .post("/api/auth/register")
            .json(&json!({
                "email": "nope",
                "password": "secret",
                "role": "user"
            }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_login_requires_both_fields() {
        let response = server()
            .post("/api/auth/login")
            .json(&json!({ "email": "driver@example.com", "password": "" }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }
}
