use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::features::auth::dtos::UserResponseDto;
use crate::features::profile::models::{ShopOption, WorkHistoryEntry};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WorkHistoryDto {
    pub id: Uuid,
    pub shop_id: Uuid,
    pub shop_name: String,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub current: bool,
}

impl From<WorkHistoryEntry> for WorkHistoryDto {
    fn from(e: WorkHistoryEntry) -> Self {
        Self {
            id: e.id,
            shop_id: e.shop_id,
            shop_name: e.shop_name,
            start_date: e.start_date,
            current: e.end_date.is_none(),
            end_date: e.end_date,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ShopOptionDto {
    pub id: Uuid,
    pub name: String,
    pub address: String,
}

impl From<ShopOption> for ShopOptionDto {
    fn from(s: ShopOption) -> Self {
        Self {
            id: s.id,
            name: s.name,
            address: s.address,
        }
    }
}

/// Response DTO for the profile page
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponseDto {
    pub user: UserResponseDto,
    /// Newest first
    pub work_history: Vec<WorkHistoryDto>,
    /// Shops a mechanic can join
    pub shops: Vec<ShopOptionDto>,
}

/// Request DTO for updating a mechanic's profile
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileDto {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: Option<String>,
    /// Shop to start working at; closes the current work history entry
    pub selected_shop: Option<Uuid>,
}
