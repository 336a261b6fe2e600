use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use utoipa::ToSchema;
use uuid::Uuid;

/// Service request status enum matching the `service_request_status` database enum.
///
/// Variant order matches the database enum so in-process ordering agrees with
/// `ORDER BY status`. Any status may be overwritten with any other.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Type, ToSchema,
)]
#[sqlx(type_name = "service_request_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServiceRequestStatus {
    Open,
    Pending,
    InProgress,
    Completed,
    Closed,
}

impl ServiceRequestStatus {
    pub const ALL: [ServiceRequestStatus; 5] = [
        ServiceRequestStatus::Open,
        ServiceRequestStatus::Pending,
        ServiceRequestStatus::InProgress,
        ServiceRequestStatus::Completed,
        ServiceRequestStatus::Closed,
    ];

    /// Statuses kept by the "open only" toggle
    pub const OPEN_SET: [ServiceRequestStatus; 3] = [
        ServiceRequestStatus::Open,
        ServiceRequestStatus::Pending,
        ServiceRequestStatus::InProgress,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceRequestStatus::Open => "OPEN",
            ServiceRequestStatus::Pending => "PENDING",
            ServiceRequestStatus::InProgress => "IN_PROGRESS",
            ServiceRequestStatus::Completed => "COMPLETED",
            ServiceRequestStatus::Closed => "CLOSED",
        }
    }

    pub fn is_open(&self) -> bool {
        Self::OPEN_SET.contains(self)
    }
}

impl std::fmt::Display for ServiceRequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ServiceRequestStatus {
    type Err = String;

    /// Case-insensitive; spaces and hyphens count as underscores ("in progress")
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_uppercase().replace([' ', '-'], "_");
        ServiceRequestStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == normalized)
            .ok_or_else(|| {
                format!(
                    "Invalid status '{}'. Expected one of: OPEN, PENDING, IN_PROGRESS, COMPLETED, CLOSED",
                    s
                )
            })
    }
}

/// Database model for service request
#[derive(Debug, Clone, FromRow)]
pub struct ServiceRequest {
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

/// Column list shared by every query returning a full [`ServiceRequest`]
pub const SERVICE_REQUEST_COLUMNS: &str = "id, name, description, service_type, detailed_issue, \
     service_time, image, latitude, longitude, status, assigned_mechanic_id, created_at, updated_at";

/// Insert payload for a new service request (status always starts as OPEN)
#[derive(Debug, Clone)]
pub struct NewServiceRequest {
    pub name: String,
    pub description: Option<String>,
    pub service_type: String,
    pub detailed_issue: String,
    pub service_time: DateTime<Utc>,
    pub image: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parse_is_case_insensitive() {
        assert_eq!("open".parse::<ServiceRequestStatus>(), Ok(ServiceRequestStatus::Open));
        assert_eq!("Pending".parse::<ServiceRequestStatus>(), Ok(ServiceRequestStatus::Pending));
        assert_eq!("in_progress".parse::<ServiceRequestStatus>(), Ok(ServiceRequestStatus::InProgress));
        assert_eq!("In Progress".parse::<ServiceRequestStatus>(), Ok(ServiceRequestStatus::InProgress));
        assert_eq!("in-progress".parse::<ServiceRequestStatus>(), Ok(ServiceRequestStatus::InProgress));
        assert_eq!(" CLOSED ".parse::<ServiceRequestStatus>(), Ok(ServiceRequestStatus::Closed));
    }

    #[test]
    fn test_status_parse_rejects_unknown_values() {
        assert!("DONE".parse::<ServiceRequestStatus>().is_err());
        assert!("".parse::<ServiceRequestStatus>().is_err());
        assert!("__NO_MATCH__".parse::<ServiceRequestStatus>().is_err());
    }

    #[test]
    fn test_open_set() {
        let open: Vec<_> = ServiceRequestStatus::ALL
            .into_iter()
            .filter(|s| s.is_open())
            .collect();
        assert_eq!(open, ServiceRequestStatus::OPEN_SET.to_vec());
        assert!(!ServiceRequestStatus::Completed.is_open());
        assert!(!ServiceRequestStatus::Closed.is_open());
    }

    #[test]
    fn test_status_serializes_screaming_snake_case() {
        assert_eq!(
            serde_json::to_value(ServiceRequestStatus::InProgress).unwrap(),
            "IN_PROGRESS"
        );
        assert_eq!(ServiceRequestStatus::InProgress.to_string(), "IN_PROGRESS");
    }
}
