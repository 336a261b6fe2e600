use chrono::Utc;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::service_requests::dtos::{
    CategoryCountDto, ServiceRequestListDto, ServiceRequestQueryParams,
    ServiceRequestResponseDto, ServiceRequestStatsDto,
};
use crate::features::service_requests::models::{
    NewServiceRequest, ServiceRequest, ServiceRequestStatus, SERVICE_REQUEST_COLUMNS,
};

/// Counter row for the stats endpoint
#[derive(sqlx::FromRow)]
struct StatusCounts {
    total: i64,
    open: i64,
    pending: i64,
    completed: i64,
}

#[derive(sqlx::FromRow)]
struct CategoryCount {
    service_type: String,
    count: i64,
}

/// Service for the service request lifecycle
pub struct ServiceRequestService {
    pool: PgPool,
}

impl ServiceRequestService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// List service requests with filters, sorting and pagination
    pub async fn list(&self, params: &ServiceRequestQueryParams) -> Result<ServiceRequestListDto> {
        let filter = params.filter(Utc::now())?;
        let order = params.order();
        let pagination = params.pagination();

        let mut count_builder: QueryBuilder<Postgres> =
            QueryBuilder::new("SELECT COUNT(*) FROM service_requests");
        filter.push_where(&mut count_builder);

        let total: i64 = count_builder
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to count service requests: {:?}", e);
                AppError::Database(e)
            })?;

        let mut query_builder: QueryBuilder<Postgres> = QueryBuilder::new(format!(
            "SELECT {} FROM service_requests",
            SERVICE_REQUEST_COLUMNS
        ));
        filter.push_where(&mut query_builder);
        order.push_order_by(&mut query_builder);
        query_builder
            .push(" LIMIT ")
            .push_bind(pagination.limit())
            .push(" OFFSET ")
            .push_bind(pagination.offset());

        let requests: Vec<ServiceRequest> = query_builder
            .build_query_as::<ServiceRequest>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list service requests: {:?}", e);
                AppError::Database(e)
            })?;

        Ok(ServiceRequestListDto {
            requests: requests.into_iter().map(Into::into).collect(),
            pagination: pagination.meta(total),
        })
    }

    /// Dashboard counters and per-category totals
    pub async fn stats(&self) -> Result<ServiceRequestStatsDto> {
        let counts = sqlx::query_as::<_, StatusCounts>(
            r#"
            SELECT
                COUNT(*) AS total,
                COUNT(*) FILTER (WHERE status IN ('OPEN', 'IN_PROGRESS')) AS open,
                COUNT(*) FILTER (WHERE status = 'PENDING') AS pending,
                COUNT(*) FILTER (WHERE status = 'COMPLETED') AS completed
            FROM service_requests
            "#,
        )
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to count service requests by status: {:?}", e);
            AppError::Database(e)
        })?;

        let categories = sqlx::query_as::<_, CategoryCount>(
            r#"
            SELECT service_type, COUNT(*) AS count
            FROM service_requests
            GROUP BY service_type
            ORDER BY count DESC, service_type ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to count service requests by category: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(ServiceRequestStatsDto {
            total: counts.total,
            open: counts.open,
            pending: counts.pending,
            completed: counts.completed,
            categories: categories
                .into_iter()
                .map(|c| CategoryCountDto {
                    service_type: c.service_type,
                    count: c.count,
                })
                .collect(),
        })
    }

    /// Get a single service request
    pub async fn get_by_id(&self, id: Uuid) -> Result<ServiceRequestResponseDto> {
        self.find(id)
            .await?
            .map(Into::into)
            .ok_or_else(|| AppError::NotFound("Service request not found".to_string()))
    }

    async fn find(&self, id: Uuid) -> Result<Option<ServiceRequest>> {
        sqlx::query_as::<_, ServiceRequest>(&format!(
            "SELECT {} FROM service_requests WHERE id = $1",
            SERVICE_REQUEST_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get service request {}: {:?}", id, e);
            AppError::Database(e)
        })
    }

    /// Create a new service request (status starts as OPEN)
    pub async fn create(&self, new: NewServiceRequest) -> Result<ServiceRequestResponseDto> {
        let request = sqlx::query_as::<_, ServiceRequest>(&format!(
            r#"
            INSERT INTO service_requests (
                id, name, description, service_type, detailed_issue, service_time,
                image, latitude, longitude, status
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {}
            "#,
            SERVICE_REQUEST_COLUMNS
        ))
        .bind(Uuid::now_v7())
        .bind(&new.name)
        .bind(&new.description)
        .bind(&new.service_type)
        .bind(&new.detailed_issue)
        .bind(new.service_time)
        .bind(&new.image)
        .bind(new.latitude)
        .bind(new.longitude)
        .bind(ServiceRequestStatus::Open)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create service request: {:?}", e);
            AppError::Database(e)
        })?;

        tracing::info!(
            "Service request created: id={}, service_type={}",
            request.id,
            request.service_type
        );

        Ok(request.into())
    }

    /// Overwrite a request's status. Any status may replace any other.
    pub async fn update_status(
        &self,
        id: Uuid,
        status: ServiceRequestStatus,
    ) -> Result<ServiceRequestResponseDto> {
        let request = sqlx::query_as::<_, ServiceRequest>(&format!(
            r#"
            UPDATE service_requests
            SET status = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            SERVICE_REQUEST_COLUMNS
        ))
        .bind(id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to update service request status: {:?}", e);
            AppError::Database(e)
        })?
        .ok_or_else(|| AppError::NotFound("Service request not found".to_string()))?;

        tracing::info!("Service request {} status set to {}", id, status);

        Ok(request.into())
    }

    /// Delete a service request
    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM service_requests WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to delete service request: {:?}", e);
                AppError::Database(e)
            })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Service request not found".to_string()));
        }

        tracing::info!("Service request deleted: id={}", id);
        Ok(())
    }
}
