use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::service_requests::filter::{
    ServiceRequestFilter, ServiceRequestOrder, ServiceRequestSortBy, SortDirection,
};
use crate::features::service_requests::models::{ServiceRequest, ServiceRequestStatus};
use crate::shared::constants::UPLOADS_PREFIX;
use crate::shared::types::{default_page, default_page_size, PaginationMeta, PaginationQuery};

// =============================================================================
// QUERY DTOs
// =============================================================================

/// Query params for listing service requests
#[derive(Debug, Clone, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ServiceRequestQueryParams {
    /// Exact status (case-insensitive). `Status` or empty means any.
    #[param(example = "OPEN")]
    pub status: Option<String>,
    /// Substring of the service type. `Category` or empty means any.
    pub category: Option<String>,
    /// Recency window: `Last 7 days`, `Last 30 days` or `Last 90 days`
    #[param(example = "Last 7 days")]
    pub duration: Option<String>,
    /// Only OPEN, PENDING and IN_PROGRESS requests
    #[serde(default)]
    pub show_open_only: bool,
    /// Page number (1-indexed)
    #[serde(default = "default_page")]
    #[param(minimum = 1)]
    pub page: i64,
    /// Items per page
    #[serde(default = "default_page_size")]
    #[param(minimum = 1, maximum = 100)]
    pub limit: i64,
    /// Sort by field (default: createdAt)
    #[serde(default)]
    pub sort_by: ServiceRequestSortBy,
    /// Sort direction (default: desc)
    #[serde(default)]
    pub sort: SortDirection,
}

impl ServiceRequestQueryParams {
    pub fn filter(&self, now: DateTime<Utc>) -> Result<ServiceRequestFilter> {
        ServiceRequestFilter::from_inputs(
            self.status.as_deref(),
            self.category.as_deref(),
            self.duration.as_deref(),
            self.show_open_only,
            now,
        )
    }

    pub fn order(&self) -> ServiceRequestOrder {
        ServiceRequestOrder {
            sort_by: self.sort_by,
            direction: self.sort,
        }
    }

    pub fn pagination(&self) -> PaginationQuery {
        PaginationQuery::new(self.page, self.limit)
    }
}

// =============================================================================
// REQUEST DTOs
// =============================================================================

/// Multipart form for creating a service request.
/// Note: This struct is for Swagger UI documentation only.
/// The actual handler uses axum's Multipart extractor directly.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[allow(dead_code)]
pub struct CreateServiceRequestForm {
    #[schema(example = "Jane Driver")]
    pub name: String,
    pub description: Option<String>,
    #[schema(example = "Engine Repair")]
    pub service_type: String,
    /// RFC 3339, `YYYY-MM-DDTHH:MM` or `YYYY-MM-DD`
    #[schema(example = "2025-09-30T14:30")]
    pub service_time: String,
    pub detailed_issue: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// Optional photo of the problem (only its name is recorded)
    #[schema(format = Binary, content_media_type = "application/octet-stream")]
    pub image: Option<String>,
}

/// Request DTO for changing a request's status
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UpdateServiceRequestStatusDto {
    pub id: Option<Uuid>,
    #[schema(example = "IN_PROGRESS")]
    pub status: String,
}

// =============================================================================
// RESPONSE DTOs
// =============================================================================

/// Response DTO for a service request
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ServiceRequestResponseDto {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub service_type: String,
    pub detailed_issue: String,
    pub service_time: DateTime<Utc>,
    pub image: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub status: ServiceRequestStatus,
    pub assigned_mechanic_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ServiceRequest> for ServiceRequestResponseDto {
    fn from(r: ServiceRequest) -> Self {
        Self {
            id: r.id,
            name: r.name,
            description: r.description,
            service_type: r.service_type,
            detailed_issue: r.detailed_issue,
            service_time: r.service_time,
            image: r.image,
            latitude: r.latitude,
            longitude: r.longitude,
            status: r.status,
            assigned_mechanic_id: r.assigned_mechanic_id,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

/// Paginated list of service requests
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ServiceRequestListDto {
    pub requests: Vec<ServiceRequestResponseDto>,
    pub pagination: PaginationMeta,
}

/// Number of requests per service type
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryCountDto {
    pub service_type: String,
    pub count: i64,
}

/// Dashboard counters
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ServiceRequestStatsDto {
    pub total: i64,
    /// OPEN plus IN_PROGRESS
    pub open: i64,
    pub pending: i64,
    pub completed: i64,
    pub categories: Vec<CategoryCountDto>,
}

// =============================================================================
// FORM HELPERS
// =============================================================================

/// Parse the requested service time.
///
/// Accepts RFC 3339, the `datetime-local` form (`YYYY-MM-DDTHH:MM[:SS]`, read as UTC)
/// and a bare date (midnight UTC).
pub fn parse_service_time(raw: &str) -> Result<DateTime<Utc>> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| AppError::Validation(format!("Invalid serviceTime '{}'", raw)))
}

/// Axis of a submitted coordinate, with the same bounds shops use
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinateAxis {
    Latitude,
    Longitude,
}

impl CoordinateAxis {
    pub fn field(&self) -> &'static str {
        match self {
            CoordinateAxis::Latitude => "latitude",
            CoordinateAxis::Longitude => "longitude",
        }
    }

    fn limit(&self) -> f64 {
        match self {
            CoordinateAxis::Latitude => 90.0,
            CoordinateAxis::Longitude => 180.0,
        }
    }
}

/// Parse an optional coordinate field, treating blank as absent
pub fn parse_coordinate(axis: CoordinateAxis, raw: &str) -> Result<Option<f64>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    let limit = axis.limit();
    raw.parse::<f64>()
        .ok()
        .filter(|v| (-limit..=limit).contains(v))
        .map(Some)
        .ok_or_else(|| {
            AppError::Validation(format!(
                "Invalid {} '{}'. Must be between {} and {}",
                axis.field(),
                raw,
                -limit,
                limit
            ))
        })
}

/// Keep only characters that are safe in a stored file reference
pub fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();

    let trimmed = cleaned.trim_start_matches('.');
    if trimmed.is_empty() {
        "image".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Reference recorded for an uploaded image: `uploads/{unix_millis}_{name}`
pub fn image_reference(file_name: &str, now: DateTime<Utc>) -> String {
    format!(
        "{}/{}_{}",
        UPLOADS_PREFIX,
        now.timestamp_millis(),
        sanitize_file_name(file_name)
    )
}
