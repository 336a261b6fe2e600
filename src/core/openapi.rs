use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::features::auth::{self, dtos as auth_dtos, model as auth_model};
use crate::features::profile::{dtos as profile_dtos, handlers as profile_handlers};
use crate::features::service_requests::{
    dtos as service_requests_dtos, filter as service_requests_filter,
    handlers as service_requests_handlers, models as service_requests_models,
};
use crate::features::shops::{dtos as shops_dtos, handlers as shops_handlers};
use crate::features::tasks::{dtos as tasks_dtos, handlers as tasks_handlers};
use crate::shared::types::{ApiResponse, DeletedDto, Meta, PaginationMeta};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Auth
        auth::handlers::register,
        auth::handlers::login,
        auth::handlers::get_me,
        // Service requests
        service_requests_handlers::list_service_requests,
        service_requests_handlers::get_service_request_stats,
        service_requests_handlers::get_service_request,
        service_requests_handlers::create_service_request,
        service_requests_handlers::update_service_request_status,
        service_requests_handlers::delete_service_request,
        // Shops
        shops_handlers::list_shops,
        shops_handlers::get_shop,
        shops_handlers::create_shop,
        shops_handlers::update_shop,
        shops_handlers::delete_shop,
        shops_handlers::list_shop_mechanics,
        // Tasks
        tasks_handlers::assign_task,
        // Profile
        profile_handlers::get_profile,
        profile_handlers::update_profile,
    ),
    components(
        schemas(
            Meta,
            PaginationMeta,
            DeletedDto,
            ApiResponse<DeletedDto>,
            // Auth
            auth_model::UserRole,
            auth_dtos::RegisterRequestDto,
            auth_dtos::LoginRequestDto,
            auth_dtos::UserResponseDto,
            auth_dtos::RegisterResponseDto,
            auth_dtos::LoginResponseDto,
            auth_dtos::MeResponseDto,
            ApiResponse<auth_dtos::RegisterResponseDto>,
            ApiResponse<auth_dtos::LoginResponseDto>,
            ApiResponse<auth_dtos::MeResponseDto>,
            // Service requests
            service_requests_models::ServiceRequestStatus,
            service_requests_filter::ServiceRequestSortBy,
            service_requests_filter::SortDirection,
            service_requests_dtos::CreateServiceRequestForm,
            service_requests_dtos::UpdateServiceRequestStatusDto,
            service_requests_dtos::ServiceRequestResponseDto,
            service_requests_dtos::ServiceRequestListDto,
            service_requests_dtos::CategoryCountDto,
            service_requests_dtos::ServiceRequestStatsDto,
            ApiResponse<service_requests_dtos::ServiceRequestResponseDto>,
            ApiResponse<service_requests_dtos::ServiceRequestListDto>,
            ApiResponse<service_requests_dtos::ServiceRequestStatsDto>,
            // Shops
            shops_dtos::LocationDto,
            shops_dtos::CreateShopDto,
            shops_dtos::UpdateShopDto,
            shops_dtos::ShopOfferingDto,
            shops_dtos::ShopResponseDto,
            shops_dtos::ShopListDto,
            shops_dtos::ShopMechanicDto,
            ApiResponse<shops_dtos::ShopResponseDto>,
            ApiResponse<shops_dtos::ShopListDto>,
            ApiResponse<Vec<shops_dtos::ShopMechanicDto>>,
            // Tasks
            tasks_dtos::AssignTaskDto,
            tasks_dtos::AssignTaskResponseDto,
            ApiResponse<tasks_dtos::AssignTaskResponseDto>,
            // Profile
            profile_dtos::WorkHistoryDto,
            profile_dtos::ShopOptionDto,
            profile_dtos::ProfileResponseDto,
            profile_dtos::UpdateProfileDto,
            ApiResponse<profile_dtos::ProfileResponseDto>,
        )
    ),
    tags(
        (name = "auth", description = "Registration, login and current user"),
        (name = "service-requests", description = "Service request submission, filtering and status workflow"),
        (name = "shops", description = "Repair shops and their services"),
        (name = "tasks", description = "Mechanic assignment (admin only)"),
        (name = "profile", description = "User profile and mechanic work history"),
    ),
    modifiers(&SecurityAddon),
    info(
        title = "OnRoadCare API",
        version = "0.1.0",
        description = "API documentation for OnRoadCare",
    )
)]
pub struct ApiDoc;

/// Adds Bearer JWT security scheme to OpenAPI spec
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_every_route() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&str> = doc.paths.paths.keys().map(String::as_str).collect();

        for expected in [
            "/api/auth/register",
            "/api/auth/login",
            "/api/auth/me",
            "/api/services",
            "/api/services/stats",
            "/api/services/{id}",
            "/api/shops",
            "/api/shops/{id}",
            "/api/shops/{id}/mechanics",
            "/api/tasks/assign",
            "/api/profile",
        ] {
            assert!(paths.contains(&expected), "missing path {}", expected);
        }
    }

    #[test]
    fn test_bearer_scheme_registered() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("bearer_auth"));
    }
}
