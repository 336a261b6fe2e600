use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::{AppJson, AppQuery};
use crate::features::auth::guards::RequireAdmin;
use crate::features::shops::dtos::{
    CreateShopDto, ShopListDto, ShopMechanicDto, ShopQueryParams, ShopResponseDto,
    UpdateShopDto,
};
use crate::features::shops::services::ShopService;
use crate::shared::types::{ApiResponse, DeletedDto, Meta};

/// List shops
#[utoipa::path(
    get,
    path = "/api/shops",
    params(ShopQueryParams),
    responses(
        (status = 200, description = "Page of shops with their services", body = ApiResponse<ShopListDto>),
        (status = 400, description = "Invalid query parameters")
    ),
    tag = "shops"
)]
pub async fn list_shops(
    State(service): State<Arc<ShopService>>,
    AppQuery(params): AppQuery<ShopQueryParams>,
) -> Result<Json<ApiResponse<ShopListDto>>> {
    let list = service.list(&params).await?;
    let total = list.pagination.total;
    Ok(Json(ApiResponse::success(
        Some(list),
        None,
        Some(Meta { total }),
    )))
}

/// Get a shop by ID
#[utoipa::path(
    get,
    path = "/api/shops/{id}",
    params(
        ("id" = Uuid, Path, description = "Shop ID")
    ),
    responses(
        (status = 200, description = "Shop with services", body = ApiResponse<ShopResponseDto>),
        (status = 404, description = "Shop not found")
    ),
    tag = "shops"
)]
pub async fn get_shop(
    State(service): State<Arc<ShopService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<ShopResponseDto>>> {
    let shop = service.get_by_id(id).await?;
    Ok(Json(ApiResponse::success(Some(shop), None, None)))
}

/// Create a shop
#[utoipa::path(
    post,
    path = "/api/shops",
    request_body = CreateShopDto,
    responses(
        (status = 201, description = "Shop created", body = ApiResponse<ShopResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Admin access required"),
        (status = 409, description = "Shop with this email already exists")
    ),
    tag = "shops",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_shop(
    RequireAdmin(admin): RequireAdmin,
    State(service): State<Arc<ShopService>>,
    AppJson(dto): AppJson<CreateShopDto>,
) -> Result<(StatusCode, Json<ApiResponse<ShopResponseDto>>)> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let shop = service.create(admin.id, dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(shop),
            Some("Shop created successfully".to_string()),
            None,
        )),
    ))
}

/// Update a shop
#[utoipa::path(
    put,
    path = "/api/shops/{id}",
    params(
        ("id" = Uuid, Path, description = "Shop ID")
    ),
    request_body = UpdateShopDto,
    responses(
        (status = 200, description = "Shop updated", body = ApiResponse<ShopResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Admin access required"),
        (status = 404, description = "Shop not found"),
        (status = 409, description = "Shop with this email already exists")
    ),
    tag = "shops",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_shop(
    RequireAdmin(_admin): RequireAdmin,
    State(service): State<Arc<ShopService>>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<UpdateShopDto>,
) -> Result<Json<ApiResponse<ShopResponseDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let shop = service.update(id, dto).await?;
    Ok(Json(ApiResponse::success(
        Some(shop),
        Some("Shop updated successfully".to_string()),
        None,
    )))
}

/// Delete a shop
#[utoipa::path(
    delete,
    path = "/api/shops/{id}",
    params(
        ("id" = Uuid, Path, description = "Shop ID")
    ),
    responses(
        (status = 200, description = "Shop deleted", body = ApiResponse<DeletedDto>),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Admin access required"),
        (status = 404, description = "Shop not found")
    ),
    tag = "shops",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_shop(
    RequireAdmin(_admin): RequireAdmin,
    State(service): State<Arc<ShopService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<DeletedDto>>> {
    service.delete(id).await?;
    Ok(Json(ApiResponse::success(
        Some(DeletedDto { id, deleted: true }),
        Some("Shop deleted successfully".to_string()),
        None,
    )))
}

/// List mechanics currently working at a shop
#[utoipa::path(
    get,
    path = "/api/shops/{id}/mechanics",
    params(
        ("id" = Uuid, Path, description = "Shop ID")
    ),
    responses(
        (status = 200, description = "Current mechanics", body = ApiResponse<Vec<ShopMechanicDto>>),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Admin access required"),
        (status = 404, description = "Shop not found")
    ),
    tag = "shops",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_shop_mechanics(
    RequireAdmin(_admin): RequireAdmin,
    State(service): State<Arc<ShopService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<ShopMechanicDto>>>> {
    let mechanics = service.mechanics(id).await?;
    let total = mechanics.len() as i64;
    Ok(Json(ApiResponse::success(
        Some(mechanics),
        None,
        Some(Meta { total }),
    )))
}
