use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// A mechanic's stint at a shop, joined with the shop name
#[derive(Debug, Clone, FromRow)]
pub struct WorkHistoryEntry {
    pub id: Uuid,
    pub shop_id: Uuid,
    pub shop_name: String,
    pub start_date: DateTime<Utc>,
    /// `None` while the mechanic still works there
    pub end_date: Option<DateTime<Utc>>,
}

/// Minimal shop row offered in the profile's shop picker
#[derive(Debug, Clone, FromRow)]
pub struct ShopOption {
    pub id: Uuid,
    pub name: String,
    pub address: String,
}
