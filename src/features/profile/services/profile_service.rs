use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::auth::model::{AuthenticatedUser, User, USER_COLUMNS};
use crate::features::profile::dtos::{ProfileResponseDto, UpdateProfileDto};
use crate::features::profile::models::{ShopOption, WorkHistoryEntry};

/// Service for user profiles and mechanic work history
pub struct ProfileService {
    pool: PgPool,
}

impl ProfileService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Profile of the caller with work history and joinable shops
    pub async fn get_profile(&self, caller: &AuthenticatedUser) -> Result<ProfileResponseDto> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE id = $1",
            USER_COLUMNS
        ))
        .bind(caller.id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to load profile user: {:?}", e);
            AppError::Database(e)
        })?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        let work_history = sqlx::query_as::<_, WorkHistoryEntry>(
            r#"
            SELECT h.id, h.shop_id, s.name AS shop_name, h.start_date, h.end_date
            FROM mechanic_work_history h
            JOIN shops s ON s.id = h.shop_id
            WHERE h.mechanic_id = $1
            ORDER BY h.start_date DESC, h.id DESC
            "#,
        )
        .bind(caller.id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to load work history: {:?}", e);
            AppError::Database(e)
        })?;

        let shops = sqlx::query_as::<_, ShopOption>(
            "SELECT id, name, address FROM shops ORDER BY name ASC, id ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to load shop options: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(ProfileResponseDto {
            user: user.into(),
            work_history: work_history.into_iter().map(Into::into).collect(),
            shops: shops.into_iter().map(Into::into).collect(),
        })
    }

    /// Update the caller's name and optionally move them to another shop.
    ///
    /// Moving closes every open work history entry and opens one at the new shop.
    pub async fn update_profile(
        &self,
        caller: &AuthenticatedUser,
        dto: UpdateProfileDto,
    ) -> Result<ProfileResponseDto> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            tracing::error!("Failed to begin transaction: {:?}", e);
            AppError::Database(e)
        })?;

        // Tokens can outlive their account
        let locked: Option<Uuid> =
            sqlx::query_scalar("SELECT id FROM users WHERE id = $1 FOR UPDATE")
                .bind(caller.id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(|e| {
                    tracing::error!("Failed to lock profile user: {:?}", e);
                    AppError::Database(e)
                })?;

        if locked.is_none() {
            return Err(AppError::NotFound("User not found".to_string()));
        }

        if let Some(name) = dto.name.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
            sqlx::query("UPDATE users SET name = $2, updated_at = NOW() WHERE id = $1")
                .bind(caller.id)
                .bind(name)
                .execute(&mut *tx)
                .await
                .map_err(|e| {
                    tracing::error!("Failed to update user name: {:?}", e);
                    AppError::Database(e)
                })?;
        }

        if let Some(shop_id) = dto.selected_shop {
            let exists: bool =
                sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM shops WHERE id = $1)")
                    .bind(shop_id)
                    .fetch_one(&mut *tx)
                    .await
                    .map_err(|e| {
                        tracing::error!("Failed to check shop {}: {:?}", shop_id, e);
                        AppError::Database(e)
                    })?;

            if !exists {
                return Err(AppError::NotFound("Shop not found".to_string()));
            }

            sqlx::query(
                r#"
                UPDATE mechanic_work_history
                SET end_date = NOW()
                WHERE mechanic_id = $1 AND end_date IS NULL
                "#,
            )
            .bind(caller.id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                tracing::error!("Failed to close work history: {:?}", e);
                AppError::Database(e)
            })?;

            sqlx::query(
                r#"
                INSERT INTO mechanic_work_history (id, mechanic_id, shop_id, start_date)
                VALUES ($1, $2, $3, NOW())
                "#,
            )
            .bind(Uuid::now_v7())
            .bind(caller.id)
            .bind(shop_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                tracing::error!("Failed to open work history: {:?}", e);
                AppError::Database(e)
            })?;

            tracing::info!("Mechanic {} now works at shop {}", caller.id, shop_id);
        }

        tx.commit().await.map_err(|e| {
            tracing::error!("Failed to commit profile update: {:?}", e);
            AppError::Database(e)
        })?;

        self.get_profile(caller).await
    }
}
