use axum::{extract::State, Json};
use std::sync::Arc;

use crate::core::error::Result;
use crate::core::extractor::AppJson;
use crate::features::auth::guards::RequireAdmin;
use crate::features::tasks::dtos::{AssignTaskDto, AssignTaskResponseDto};
use crate::features::tasks::services::TaskService;
use crate::shared::types::ApiResponse;

/// Assign a mechanic to a service request
#[utoipa::path(
    post,
    path = "/api/tasks/assign",
    request_body = AssignTaskDto,
    responses(
        (status = 200, description = "Mechanic assigned", body = ApiResponse<AssignTaskResponseDto>),
        (status = 400, description = "Malformed body or user is not a mechanic"),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Admin access required or adminId mismatch"),
        (status = 404, description = "Mechanic or service request not found")
    ),
    tag = "tasks",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn assign_task(
    RequireAdmin(admin): RequireAdmin,
    State(service): State<Arc<TaskService>>,
    AppJson(dto): AppJson<AssignTaskDto>,
) -> Result<Json<ApiResponse<AssignTaskResponseDto>>> {
    let result = service.assign(&admin, dto).await?;
    Ok(Json(ApiResponse::success(
        Some(result),
        Some("Mechanic assigned".to_string()),
        None,
    )))
}
