use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::features::shops::models::{Shop, ShopMechanic, ShopOffering};
use crate::shared::types::{default_page, default_page_size, PaginationMeta, PaginationQuery};

// =============================================================================
// QUERY DTOs
// =============================================================================

/// Query params for listing shops
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct ShopQueryParams {
    /// Page number (1-indexed)
    #[serde(default = "default_page")]
    #[param(minimum = 1)]
    pub page: i64,
    /// Items per page
    #[serde(default = "default_page_size")]
    #[param(minimum = 1, maximum = 100)]
    pub limit: i64,
    /// Case-insensitive search in name, owner or address
    pub search: Option<String>,
}

impl ShopQueryParams {
    pub fn pagination(&self) -> PaginationQuery {
        PaginationQuery::new(self.page, self.limit)
    }

    /// Search term, `None` when blank
    pub fn search_term(&self) -> Option<&str> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

// =============================================================================
// REQUEST DTOs
// =============================================================================

/// Shop coordinates
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct LocationDto {
    #[validate(range(min = -90.0, max = 90.0, message = "Latitude must be between -90 and 90"))]
    pub lat: f64,
    #[validate(range(
        min = -180.0,
        max = 180.0,
        message = "Longitude must be between -180 and 180"
    ))]
    pub lng: f64,
}

/// Request DTO for creating a shop
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateShopDto {
    #[validate(length(min = 1, max = 200, message = "Name must be 1-200 characters"))]
    pub name: String,

    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,

    /// Names of the services offered
    #[schema(example = json!(["Oil Change", "Tire Replacement"]))]
    pub services: Vec<String>,

    #[validate(nested)]
    pub location: LocationDto,

    #[validate(length(min = 1, message = "Address is required"))]
    pub address: String,

    #[validate(length(min = 1, max = 200, message = "Owner must be 1-200 characters"))]
    pub owner: String,

    #[validate(regex(
        path = "*crate::shared::validation::PHONE_REGEX",
        message = "Invalid phone number"
    ))]
    pub phone: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,
}

/// Request DTO for updating a shop. Absent fields are left unchanged;
/// `services`, when present, replaces the whole list.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateShopDto {
    #[validate(length(min = 1, max = 200, message = "Name must be 1-200 characters"))]
    pub name: Option<String>,

    #[validate(length(min = 1, message = "Description must not be empty"))]
    pub description: Option<String>,

    pub services: Option<Vec<String>>,

    #[validate(nested)]
    pub location: Option<LocationDto>,

    #[validate(length(min = 1, message = "Address must not be empty"))]
    pub address: Option<String>,

    #[validate(length(min = 1, max = 200, message = "Owner must be 1-200 characters"))]
    pub owner: Option<String>,

    #[validate(regex(
        path = "*crate::shared::validation::PHONE_REGEX",
        message = "Invalid phone number"
    ))]
    pub phone: Option<String>,

    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
}

/// Trimmed, de-duplicated service names with blanks dropped
pub fn normalize_services(services: &[String]) -> Vec<String> {
    let mut names: Vec<String> = Vec::with_capacity(services.len());
    for name in services.iter().map(|s| s.trim()).filter(|s| !s.is_empty()) {
        if !names.iter().any(|n| n.eq_ignore_ascii_case(name)) {
            names.push(name.to_string());
        }
    }
    names
}

// =============================================================================
// RESPONSE DTOs
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ShopOfferingDto {
    pub id: Uuid,
    pub name: String,
}

impl From<ShopOffering> for ShopOfferingDto {
    fn from(s: ShopOffering) -> Self {
        Self {
            id: s.id,
            name: s.name,
        }
    }
}

/// Response DTO for a shop with its services
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ShopResponseDto {
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
    pub services: Vec<ShopOfferingDto>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ShopResponseDto {
    pub fn from_parts(shop: Shop, services: Vec<ShopOffering>) -> Self {
        Self {
            id: shop.id,
            name: shop.name,
            description: shop.description,
            address: shop.address,
            owner: shop.owner,
            phone: shop.phone,
            email: shop.email,
            latitude: shop.latitude,
            longitude: shop.longitude,
            admin_id: shop.admin_id,
            services: services.into_iter().map(Into::into).collect(),
            created_at: shop.created_at,
            updated_at: shop.updated_at,
        }
    }
}

/// Paginated list of shops
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ShopListDto {
    pub shops: Vec<ShopResponseDto>,
    pub pagination: PaginationMeta,
}

/// Mechanic currently working at a shop
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ShopMechanicDto {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub since: DateTime<Utc>,
}

impl From<ShopMechanic> for ShopMechanicDto {
    fn from(m: ShopMechanic) -> Self {
        Self {
            id: m.id,
            email: m.email,
            name: m.name,
            since: m.start_date,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_shop() -> CreateShopDto {
        CreateShopDto {
            name: "Quick Fix Garage".to_string(),
            description: "Full service garage".to_string(),
            services: vec!["Oil Change".to_string()],
            location: LocationDto {
                lat: -6.2,
                lng: 106.8,
            },
            address: "Jl. Sudirman 1".to_string(),
            owner: "Budi".to_string(),
            phone: "+62 812-3456-7890".to_string(),
            email: "garage@example.com".to_string(),
        }
    }

    #[test]
    fn test_create_shop_valid() {
        assert!(valid_shop().validate().is_ok());
    }

    #[test]
    fn test_create_shop_rejects_bad_fields() {
        let mut dto = valid_shop();
        dto.email = "garage".to_string();
        assert!(dto.validate().is_err());

        let mut dto = valid_shop();
        dto.phone = "call me".to_string();
        assert!(dto.validate().is_err());

        let mut dto = valid_shop();
        dto.name = String::new();
        assert!(dto.validate().is_err());
    }

    #[test]
    fn test_create_shop_rejects_out_of_range_location() {
        let mut dto = valid_shop();
        dto.location.lat = 91.0;
        assert!(dto.validate().is_err());

        let mut dto = valid_shop();
        dto.location.lng = -180.5;
        assert!(dto.validate().is_err());

        let mut dto = valid_shop();
        dto.location = LocationDto {
            lat: 90.0,
            lng: -180.0,
        };
        assert!(dto.validate().is_ok());
    }

    #[test]
    fn test_update_shop_validates_present_fields_only() {
        assert!(UpdateShopDto::default().validate().is_ok());

        let dto = UpdateShopDto {
            email: Some("nope".to_string()),
            ..Default::default()
        };
        assert!(dto.validate().is_err());

        let dto = UpdateShopDto {
            location: Some(LocationDto {
                lat: 0.0,
                lng: 200.0,
            }),
            ..Default::default()
        };
        assert!(dto.validate().is_err());
    }

    #[test]
    fn test_normalize_services() {
        let input = vec![
            " Oil Change ".to_string(),
            "".to_string(),
            "oil change".to_string(),
            "Car Wash".to_string(),
        ];
        assert_eq!(normalize_services(&input), vec!["Oil Change", "Car Wash"]);
    }

    #[test]
    fn test_search_term_ignores_blank() {
        let params = ShopQueryParams {
            page: 1,
            limit: 10,
            search: Some("   ".to_string()),
        };
        assert_eq!(params.search_term(), None);

        let params = ShopQueryParams {
            search: Some(" garage ".to_string()),
            ..params
        };
        assert_eq!(params.search_term(), Some("garage"));
    }
}
