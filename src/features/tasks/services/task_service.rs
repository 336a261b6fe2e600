use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::auth::model::{AuthenticatedUser, UserRole};
use crate::features::service_requests::models::{ServiceRequest, SERVICE_REQUEST_COLUMNS};
use crate::features::tasks::dtos::{AssignTaskDto, AssignTaskResponseDto};

/// Service for assigning mechanics to service requests
pub struct TaskService {
    pool: PgPool,
}

impl TaskService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Check that the body's `adminId` names the caller
    pub fn ensure_caller(admin: &AuthenticatedUser, dto: &AssignTaskDto) -> Result<()> {
        if admin.id != dto.admin_id {
            return Err(AppError::Forbidden(
                "adminId does not match the authenticated admin".to_string(),
            ));
        }
        Ok(())
    }

    /// Assign a mechanic to a service request.
    ///
    /// The mechanic must exist and have role `worker`. Membership of the mechanic in any
    /// particular shop is not checked.
    pub async fn assign(
        &self,
        admin: &AuthenticatedUser,
        dto: AssignTaskDto,
    ) -> Result<AssignTaskResponseDto> {
        Self::ensure_caller(admin, &dto)?;

        let mut tx = self.pool.begin().await.map_err(|e| {
            tracing::error!("Failed to begin transaction: {:?}", e);
            AppError::Database(e)
        })?;

        let role: Option<UserRole> =
            sqlx::query_scalar("SELECT role FROM users WHERE id = $1 FOR SHARE")
                .bind(dto.mechanic_id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(|e| {
                    tracing::error!("Failed to load mechanic {}: {:?}", dto.mechanic_id, e);
                    AppError::Database(e)
                })?;

        match role {
            None => return Err(AppError::NotFound("Mechanic not found".to_string())),
            Some(UserRole::Worker) => {}
            Some(other) => {
                return Err(AppError::BadRequest(format!(
                    "User {} is not a mechanic (role: {})",
                    dto.mechanic_id, other
                )))
            }
        }

        let request = sqlx::query_as::<_, ServiceRequest>(&format!(
            r#"
            UPDATE service_requests
            SET assigned_mechanic_id = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            SERVICE_REQUEST_COLUMNS
        ))
        .bind(dto.service_request_id)
        .bind(dto.mechanic_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to assign mechanic: {:?}", e);
            AppError::Database(e)
        })?
        .ok_or_else(|| AppError::NotFound("Service request not found".to_string()))?;

        tx.commit().await.map_err(|e| {
            tracing::error!("Failed to commit assignment: {:?}", e);
            AppError::Database(e)
        })?;

        tracing::info!(
            "Mechanic {} assigned to service request {} by admin {}",
            dto.mechanic_id,
            request.id,
            admin.id
        );

        Ok(AssignTaskResponseDto {
            service_request: request.into(),
            mechanic_id: dto.mechanic_id,
            assigned_by: admin.id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::service_requests::models::ServiceRequestStatus;
    use crate::shared::test_helpers::{insert_service_request, insert_user};
    use chrono::Utc;

    fn admin(id: Uuid) -> AuthenticatedUser {
        AuthenticatedUser {
            id,
            email: "admin@example.com".to_string(),
            role: UserRole::Admin,
        }
    }

    #[test]
    fn test_ensure_caller_requires_matching_admin_id() {
        let id = Uuid::now_v7();
        let dto = AssignTaskDto {
            admin_id: id,
            service_request_id: Uuid::now_v7(),
            mechanic_id: Uuid::now_v7(),
        };
        assert!(TaskService::ensure_caller(&admin(id), &dto).is_ok());

        let err = TaskService::ensure_caller(&admin(Uuid::now_v7()), &dto).unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    async fn assignment(
        pool: &PgPool,
        mechanic_role: UserRole,
    ) -> (AuthenticatedUser, AssignTaskDto) {
        let admin = insert_user(pool, UserRole::Admin).await;
        let mechanic = insert_user(pool, mechanic_role).await;
        let request =
            insert_service_request(pool, ServiceRequestStatus::Open, "Towing", Utc::now(), 0)
                .await;
        let dto = AssignTaskDto {
            admin_id: admin.id,
            service_request_id: request.id,
            mechanic_id: mechanic.id,
        };
        (admin, dto)
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_assign_sets_mechanic(pool: PgPool) -> anyhow::Result<()> {
        let (admin, dto) = assignment(&pool, UserRole::Worker).await;
        let mechanic_id = dto.mechanic_id;
        let request_id = dto.service_request_id;

        let assigned = TaskService::new(pool.clone()).assign(&admin, dto).await?;
        assert_eq!(assigned.mechanic_id, mechanic_id);
        assert_eq!(assigned.assigned_by, admin.id);
        assert_eq!(assigned.service_request.id, request_id);
        assert_eq!(assigned.service_request.assigned_mechanic_id, Some(mechanic_id));

        let stored: Option<Uuid> =
            sqlx::query_scalar("SELECT assigned_mechanic_id FROM service_requests WHERE id = $1")
                .bind(request_id)
                .fetch_one(&pool)
                .await?;
        assert_eq!(stored, Some(mechanic_id));
        Ok(())
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_assign_missing_mechanic(pool: PgPool) -> anyhow::Result<()> {
        let (admin, mut dto) = assignment(&pool, UserRole::Worker).await;
        dto.mechanic_id = Uuid::now_v7();

        let result = TaskService::new(pool).assign(&admin, dto).await;
        assert!(matches!(result, Err(AppError::NotFound(ref m)) if m == "Mechanic not found"));
        Ok(())
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_assign_non_worker(pool: PgPool) -> anyhow::Result<()> {
        let (admin, dto) = assignment(&pool, UserRole::User).await;
        let request_id = dto.service_request_id;

        let result = TaskService::new(pool.clone()).assign(&admin, dto).await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));

        let stored: Option<Uuid> =
            sqlx::query_scalar("SELECT assigned_mechanic_id FROM service_requests WHERE id = $1")
                .bind(request_id)
                .fetch_one(&pool)
                .await?;
        assert_eq!(stored, None);
        Ok(())
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_assign_missing_request(pool: PgPool) -> anyhow::Result<()> {
        let (admin, mut dto) = assignment(&pool, UserRole::Worker).await;
        dto.service_request_id = Uuid::now_v7();

        let result = TaskService::new(pool).assign(&admin, dto).await;
        assert!(
            matches!(result, Err(AppError::NotFound(ref m)) if m == "Service request not found")
        );
        Ok(())
    }
}
