use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::core::extractor::{AppJson, AppQuery};
use crate::features::auth::guards::RequireAdmin;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::service_requests::dtos::{
    image_reference, parse_coordinate, parse_service_time, CoordinateAxis,
    CreateServiceRequestForm, ServiceRequestListDto, ServiceRequestQueryParams,
    ServiceRequestResponseDto, ServiceRequestStatsDto, UpdateServiceRequestStatusDto,
};
use crate::features::service_requests::models::{NewServiceRequest, ServiceRequestStatus};
use crate::features::service_requests::services::ServiceRequestService;
use crate::shared::constants::MAX_IMAGE_SIZE;
use crate::shared::types::{ApiResponse, DeletedDto, Meta};

/// List service requests
///
/// Filters combine with AND. Dropdown placeholders (`Status`, `Category`, `Duration`)
/// are treated as "no filter".
#[utoipa::path(
    get,
    path = "/api/services",
    params(ServiceRequestQueryParams),
    responses(
        (status = 200, description = "Filtered page of service requests", body = ApiResponse<ServiceRequestListDto>),
        (status = 400, description = "Invalid status, duration or query parameter"),
        (status = 401, description = "Authentication required")
    ),
    tag = "service-requests",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_service_requests(
    _user: AuthenticatedUser,
    State(service): State<Arc<ServiceRequestService>>,
    AppQuery(params): AppQuery<ServiceRequestQueryParams>,
) -> Result<Json<ApiResponse<ServiceRequestListDto>>> {
    let list = service.list(&params).await?;
    let total = list.pagination.total;
    Ok(Json(ApiResponse::success(
        Some(list),
        None,
        Some(Meta { total }),
    )))
}

/// Service request counters for the admin dashboard
#[utoipa::path(
    get,
    path = "/api/services/stats",
    responses(
        (status = 200, description = "Counts by status and category", body = ApiResponse<ServiceRequestStatsDto>),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Admin access required")
    ),
    tag = "service-requests",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_service_request_stats(
    RequireAdmin(_admin): RequireAdmin,
    State(service): State<Arc<ServiceRequestService>>,
) -> Result<Json<ApiResponse<ServiceRequestStatsDto>>> {
    let stats = service.stats().await?;
    Ok(Json(ApiResponse::success(Some(stats), None, None)))
}

/// Get a service request by ID
#[utoipa::path(
    get,
    path = "/api/services/{id}",
    params(
        ("id" = Uuid, Path, description = "Service request ID")
    ),
    responses(
        (status = 200, description = "Service request", body = ApiResponse<ServiceRequestResponseDto>),
        (status = 401, description = "Authentication required"),
        (status = 404, description = "Service request not found")
    ),
    tag = "service-requests",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_service_request(
    _user: AuthenticatedUser,
    State(service): State<Arc<ServiceRequestService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<ServiceRequestResponseDto>>> {
    let request = service.get_by_id(id).await?;
    Ok(Json(ApiResponse::success(Some(request), None, None)))
}

/// Submit a service request
///
/// Accepts multipart/form-data. The image is not stored; only a reference of the form
/// `uploads/{unix_millis}_{file name}` is recorded.
#[utoipa::path(
    post,
    path = "/api/services",
    request_body(
        content = CreateServiceRequestForm,
        content_type = "multipart/form-data",
    ),
    responses(
        (status = 201, description = "Service request created", body = ApiResponse<ServiceRequestResponseDto>),
        (status = 400, description = "Missing required fields or invalid values"),
        (status = 401, description = "Authentication required")
    ),
    tag = "service-requests",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_service_request(
    user: AuthenticatedUser,
    State(service): State<Arc<ServiceRequestService>>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<ServiceRequestResponseDto>>)> {
    let mut name: Option<String> = None;
    let mut description: Option<String> = None;
    let mut service_type: Option<String> = None;
    let mut service_time: Option<String> = None;
    let mut detailed_issue: Option<String> = None;
    let mut latitude: Option<f64> = None;
    let mut longitude: Option<f64> = None;
    let mut image: Option<String> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        debug!("Failed to read multipart field: {}", e);
        AppError::BadRequest(format!("Failed to read multipart data: {}", e))
    })? {
        let field_name = field.name().unwrap_or("").to_string();

        if field_name == "image" {
            let file_name = field.file_name().map(|s| s.to_string());
            let data = field.bytes().await.map_err(|e| {
                AppError::BadRequest(format!("Failed to read image data: {}", e))
            })?;

            if data.len() > MAX_IMAGE_SIZE {
                return Err(AppError::BadRequest(format!(
                    "Image too large. Maximum size is {} MB",
                    MAX_IMAGE_SIZE / 1024 / 1024
                )));
            }

            // An empty file input still sends a part with no file name
            if let Some(file_name) = file_name.filter(|n| !n.is_empty()) {
                image = Some(image_reference(&file_name, Utc::now()));
            }
            continue;
        }

        let text = field.text().await.map_err(|e| {
            AppError::BadRequest(format!("Failed to read field '{}': {}", field_name, e))
        })?;
        let value = Some(text.trim().to_string()).filter(|v| !v.is_empty());

        match field_name.as_str() {
            "name" => name = value,
            "description" => description = value,
            "serviceType" => service_type = value,
            "serviceTime" => service_time = value,
            "detailedIssue" => detailed_issue = value,
            "latitude" => latitude = parse_coordinate(CoordinateAxis::Latitude, &text)?,
            "longitude" => longitude = parse_coordinate(CoordinateAxis::Longitude, &text)?,
            _ => debug!("Ignoring unknown field: {}", field_name),
        }
    }

    let (Some(name), Some(service_type), Some(service_time), Some(detailed_issue)) =
        (name, service_type, service_time, detailed_issue)
    else {
        return Err(AppError::BadRequest("Missing required fields".to_string()));
    };

    let new = NewServiceRequest {
        name,
        description,
        service_type,
        detailed_issue,
        service_time: parse_service_time(&service_time)?,
        image,
        latitude,
        longitude,
    };

    debug!("Service request submitted by user {}", user.id);
    let request = service.create(new).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(request),
            Some("Service request created".to_string()),
            None,
        )),
    ))
}

/// Change the status of a service request
#[utoipa::path(
    put,
    path = "/api/services",
    request_body = UpdateServiceRequestStatusDto,
    responses(
        (status = 200, description = "Status updated", body = ApiResponse<ServiceRequestResponseDto>),
        (status = 400, description = "Missing id or invalid status"),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Admin access required"),
        (status = 404, description = "Service request not found")
    ),
    tag = "service-requests",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_service_request_status(
    RequireAdmin(admin): RequireAdmin,
    State(service): State<Arc<ServiceRequestService>>,
    AppJson(dto): AppJson<UpdateServiceRequestStatusDto>,
) -> Result<Json<ApiResponse<ServiceRequestResponseDto>>> {
    let id = dto
        .id
        .ok_or_else(|| AppError::BadRequest("Service request id is required".to_string()))?;
    let status: ServiceRequestStatus = dto.status.parse().map_err(AppError::Validation)?;

    debug!("Admin {} sets service request {} to {}", admin.id, id, status);
    let request = service.update_status(id, status).await?;
    Ok(Json(ApiResponse::success(Some(request), None, None)))
}

/// Delete a service request
#[utoipa::path(
    delete,
    path = "/api/services/{id}",
    params(
        ("id" = Uuid, Path, description = "Service request ID")
    ),
    responses(
        (status = 200, description = "Service request deleted", body = ApiResponse<DeletedDto>),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Admin access required"),
        (status = 404, description = "Service request not found")
    ),
    tag = "service-requests",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_service_request(
    RequireAdmin(_admin): RequireAdmin,
    State(service): State<Arc<ServiceRequestService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<DeletedDto>>> {
    service.delete(id).await?;
    Ok(Json(ApiResponse::success(
        Some(DeletedDto { id, deleted: true }),
        None,
        None,
    )))
}
