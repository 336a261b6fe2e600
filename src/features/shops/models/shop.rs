use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database model for a repair shop
#[derive(Debug, Clone, FromRow)]
pub struct Shop {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub address: String,
    pub owner: String,
    pub phone: String,
    pub email: String,
    pub latitude: f64,
    pub longitude: f64,
    pub admin_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub const SHOP_COLUMNS: &str = "id, name, description, address, owner, phone, email, \
     latitude, longitude, admin_id, created_at, updated_at";

/// A service offered by a shop (e.g. "Oil Change")
#[derive(Debug, Clone, FromRow)]
pub struct ShopOffering {
    pub id: Uuid,
    pub shop_id: Uuid,
    pub name: String,
}

/// A mechanic currently attached to a shop
#[derive(Debug, Clone, FromRow)]
pub struct ShopMechanic {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub start_date: DateTime<Utc>,
}
