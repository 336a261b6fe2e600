use sqlx::{PgPool, Postgres, QueryBuilder, Transaction};
use std::collections::HashMap;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::shops::dtos::{
    normalize_services, CreateShopDto, ShopListDto, ShopMechanicDto, ShopQueryParams,
    ShopResponseDto, UpdateShopDto,
};
use crate::features::shops::models::{Shop, ShopMechanic, ShopOffering, SHOP_COLUMNS};
use crate::shared::query::contains_pattern;

const DUPLICATE_EMAIL: &str = "Shop with this email already exists";

/// Service for shop management
pub struct ShopService {
    pool: PgPool,
}

impl ShopService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn push_search(builder: &mut QueryBuilder<'_, Postgres>, search: Option<&str>) {
        if let Some(search) = search {
            let pattern = contains_pattern(search);
            builder
                .push(" WHERE (name ILIKE ")
                .push_bind(pattern.clone())
                .push(" ESCAPE '\\' OR owner ILIKE ")
                .push_bind(pattern.clone())
                .push(" ESCAPE '\\' OR address ILIKE ")
                .push_bind(pattern)
                .push(" ESCAPE '\\')");
        }
    }

    /// List shops, newest first, each with its services
    pub async fn list(&self, params: &ShopQueryParams) -> Result<ShopListDto> {
        let pagination = params.pagination();
        let search = params.search_term();

        let mut count_builder: QueryBuilder<Postgres> =
            QueryBuilder::new("SELECT COUNT(*) FROM shops");
        Self::push_search(&mut count_builder, search);

        let total = count_builder
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to count shops: {:?}", e);
                AppError::Database(e)
            })?;

        let mut query_builder: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {} FROM shops", SHOP_COLUMNS));
        Self::push_search(&mut query_builder, search);
        query_builder
            .push(" ORDER BY created_at DESC, id DESC LIMIT ")
            .push_bind(pagination.limit())
            .push(" OFFSET ")
            .push_bind(pagination.offset());

        let shops = query_builder
            .build_query_as::<Shop>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list shops: {:?}", e);
                AppError::Database(e)
            })?;

        let ids: Vec<Uuid> = shops.iter().map(|s| s.id).collect();
        let mut offerings = self.offerings_for(&ids).await?;

        let shops = shops
            .into_iter()
            .map(|shop| {
                let services = offerings.remove(&shop.id).unwrap_or_default();
                ShopResponseDto::from_parts(shop, services)
            })
            .collect();

        Ok(ShopListDto {
            shops,
            pagination: pagination.meta(total),
        })
    }

    /// Services for several shops at once, grouped by shop
    async fn offerings_for(&self, shop_ids: &[Uuid]) -> Result<HashMap<Uuid, Vec<ShopOffering>>> {
        if shop_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query_as::<_, ShopOffering>(
            "SELECT id, shop_id, name FROM shop_services WHERE shop_id = ANY($1) ORDER BY name",
        )
        .bind(shop_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to load shop services: {:?}", e);
            AppError::Database(e)
        })?;

        let mut grouped: HashMap<Uuid, Vec<ShopOffering>> = HashMap::new();
        for row in rows {
            grouped.entry(row.shop_id).or_default().push(row);
        }
        Ok(grouped)
    }

    /// Get a shop with its services
    pub async fn get_by_id(&self, id: Uuid) -> Result<ShopResponseDto> {
        let shop = sqlx::query_as::<_, Shop>(&format!(
            "SELECT {} FROM shops WHERE id = $1",
            SHOP_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get shop {}: {:?}", id, e);
            AppError::Database(e)
        })?
        .ok_or_else(|| AppError::NotFound("Shop not found".to_string()))?;

        let services = self.offerings_for(&[id]).await?.remove(&id).unwrap_or_default();
        Ok(ShopResponseDto::from_parts(shop, services))
    }

    /// Create a shop and its services in one transaction
    pub async fn create(&self, admin_id: Uuid, dto: CreateShopDto) -> Result<ShopResponseDto> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM shops WHERE email = $1)")
                .bind(&dto.email)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| {
                    tracing::error!("Failed to check shop email: {:?}", e);
                    AppError::Database(e)
                })?;

        if exists {
            return Err(AppError::Conflict(DUPLICATE_EMAIL.to_string()));
        }

        let mut tx = self.pool.begin().await.map_err(|e| {
            tracing::error!("Failed to begin transaction: {:?}", e);
            AppError::Database(e)
        })?;

        let shop = sqlx::query_as::<_, Shop>(&format!(
            r#"
            INSERT INTO shops (
                id, name, description, address, owner, phone, email,
                latitude, longitude, admin_id
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {}
            "#,
            SHOP_COLUMNS
        ))
        .bind(Uuid::now_v7())
        .bind(&dto.name)
        .bind(&dto.description)
        .bind(&dto.address)
        .bind(&dto.owner)
        .bind(&dto.phone)
        .bind(&dto.email)
        .bind(dto.location.lat)
        .bind(dto.location.lng)
        .bind(admin_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(Self::map_write_error)?;

        let services =
            Self::insert_offerings(&mut tx, shop.id, &normalize_services(&dto.services)).await?;

        tx.commit().await.map_err(|e| {
            tracing::error!("Failed to commit shop creation: {:?}", e);
            AppError::Database(e)
        })?;

        tracing::info!(
            "Shop created: id={}, name={}, services={}",
            shop.id,
            shop.name,
            services.len()
        );

        Ok(ShopResponseDto::from_parts(shop, services))
    }

    /// Partially update a shop; a present `services` list replaces the existing one
    pub async fn update(&self, id: Uuid, dto: UpdateShopDto) -> Result<ShopResponseDto> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            tracing::error!("Failed to begin transaction: {:?}", e);
            AppError::Database(e)
        })?;

        let shop = sqlx::query_as::<_, Shop>(&format!(
            r#"
            UPDATE shops SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                address = COALESCE($4, address),
                owner = COALESCE($5, owner),
                phone = COALESCE($6, phone),
                email = COALESCE($7, email),
                latitude = COALESCE($8, latitude),
                longitude = COALESCE($9, longitude),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            SHOP_COLUMNS
        ))
        .bind(id)
        .bind(&dto.name)
        .bind(&dto.description)
        .bind(&dto.address)
        .bind(&dto.owner)
        .bind(&dto.phone)
        .bind(&dto.email)
        .bind(dto.location.as_ref().map(|l| l.lat))
        .bind(dto.location.as_ref().map(|l| l.lng))
        .fetch_optional(&mut *tx)
        .await
        .map_err(Self::map_write_error)?
        .ok_or_else(|| AppError::NotFound("Shop not found".to_string()))?;

        let services = match &dto.services {
            Some(services) => {
                sqlx::query("DELETE FROM shop_services WHERE shop_id = $1")
                    .bind(id)
                    .execute(&mut *tx)
                    .await
                    .map_err(|e| {
                        tracing::error!("Failed to clear shop services: {:?}", e);
                        AppError::Database(e)
                    })?;
                Some(Self::insert_offerings(&mut tx, id, &normalize_services(services)).await?)
            }
            None => None,
        };

        tx.commit().await.map_err(|e| {
            tracing::error!("Failed to commit shop update: {:?}", e);
            AppError::Database(e)
        })?;

        tracing::info!("Shop updated: id={}", id);

        let services = match services {
            Some(services) => services,
            None => self.offerings_for(&[id]).await?.remove(&id).unwrap_or_default(),
        };
        Ok(ShopResponseDto::from_parts(shop, services))
    }

    async fn insert_offerings(
        tx: &mut Transaction<'_, Postgres>,
        shop_id: Uuid,
        names: &[String],
    ) -> Result<Vec<ShopOffering>> {
        if names.is_empty() {
            return Ok(Vec::new());
        }

        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new("INSERT INTO shop_services (id, shop_id, name) ");
        builder.push_values(names, |mut row, name| {
            row.push_bind(Uuid::now_v7())
                .push_bind(shop_id)
                .push_bind(name.clone());
        });
        builder.push(" RETURNING id, shop_id, name");

        builder
            .build_query_as::<ShopOffering>()
            .fetch_all(&mut **tx)
            .await
            .map_err(|e| {
                tracing::error!("Failed to insert shop services: {:?}", e);
                AppError::Database(e)
            })
    }

    fn map_write_error(e: sqlx::Error) -> AppError {
        let err = AppError::Database(e);
        if err.is_unique_violation() {
            AppError::Conflict(DUPLICATE_EMAIL.to_string())
        } else {
            tracing::error!("Failed to write shop: {:?}", err);
            err
        }
    }

    /// Delete a shop (its services and work history cascade)
    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM shops WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to delete shop: {:?}", e);
                AppError::Database(e)
            })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Shop not found".to_string()));
        }

        tracing::info!("Shop deleted: id={}", id);
        Ok(())
    }

    /// Mechanics whose current (open) work history points at the shop
    pub async fn mechanics(&self, shop_id: Uuid) -> Result<Vec<ShopMechanicDto>> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM shops WHERE id = $1)")
            .bind(shop_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to check shop {}: {:?}", shop_id, e);
                AppError::Database(e)
            })?;

        if !exists {
            return Err(AppError::NotFound("Shop not found".to_string()));
        }

        let mechanics = sqlx::query_as::<_, ShopMechanic>(
            r#"
            SELECT u.id, u.email, u.name, h.start_date
            FROM mechanic_work_history h
            JOIN users u ON u.id = h.mechanic_id
            WHERE h.shop_id = $1 AND h.end_date IS NULL AND u.role = 'worker'
            ORDER BY h.start_date ASC
            "#,
        )
        .bind(shop_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list mechanics for shop {}: {:?}", shop_id, e);
            AppError::Database(e)
        })?;

        Ok(mechanics.into_iter().map(Into::into).collect())
    }
}
