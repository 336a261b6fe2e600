use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::features::service_requests::dtos::ServiceRequestResponseDto;

/// Request DTO for assigning a mechanic to a service request
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssignTaskDto {
    /// Must match the id of the calling admin
    pub admin_id: Uuid,
    pub service_request_id: Uuid,
    /// User with role `worker`
    pub mechanic_id: Uuid,
}

/// Result of an assignment
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssignTaskResponseDto {
    pub service_request: ServiceRequestResponseDto,
    pub mechanic_id: Uuid,
    pub assigned_by: Uuid,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assign_task_dto_camel_case() {
        let admin = Uuid::now_v7();
        let request = Uuid::now_v7();
        let mechanic = Uuid::now_v7();
        let dto: AssignTaskDto = serde_json::from_value(serde_json::json!({
            "adminId": admin,
            "serviceRequestId": request,
            "mechanicId": mechanic,
        }))
        .unwrap();

        assert_eq!(dto.admin_id, admin);
        assert_eq!(dto.service_request_id, request);
        assert_eq!(dto.mechanic_id, mechanic);
    }

    #[test]
    fn test_assign_task_dto_rejects_missing_ids() {
        let result: Result<AssignTaskDto, _> = serde_json::from_value(serde_json::json!({
            "adminId": Uuid::now_v7(),
            "serviceRequestId": Uuid::now_v7(),
        }));
        assert!(result.is_err());
    }
}
