//! Restaurant and menu catalog.
//!
//! Plain CRUD over restaurants and their menu items. The order service never
//! touches these tables directly; it reads this service over HTTP.

pub mod http;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Restaurant {
    pub id: Uuid,
    pub name: String,
    pub address: String,
    pub city: Option<String>,
    pub cuisine_type: Option<String>,
    pub contact_number: String,
    pub active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct MenuItem {
    pub id: Uuid,
    pub restaurant_id: Uuid,
    pub name: String,
    pub price: Decimal,
    pub description: Option<String>,
    pub available: bool,
}

/// Restaurant together with its full menu, as returned by `GET /api/restaurants/{id}`.
#[derive(Debug, Clone, Serialize)]
pub struct RestaurantDetail {
    #[serde(flatten)]
    pub restaurant: Restaurant,
    pub menu_items: Vec<MenuItem>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct RestaurantRequest {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    #[validate(length(min = 1, message = "address is required"))]
    pub address: String,
    pub city: Option<String>,
    pub cuisine_type: Option<String>,
    #[validate(length(min = 1, message = "contact_number is required"))]
    pub contact_number: String,
    #[serde(default = "default_true")]
    pub active: bool,
    /// Initial menu, only honored on create. Menu edits go through the menu
    /// endpoints.
    #[validate]
    #[serde(default)]
    pub menu_items: Vec<MenuItemRequest>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct MenuItemRequest {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    #[validate(custom = "non_negative_price")]
    pub price: Decimal,
    pub description: Option<String>,
    #[serde(default = "default_true")]
    pub available: bool,
}

#[derive(Debug, Deserialize)]
pub struct RestaurantSearchParams {
    pub city: Option<String>,
    pub cuisine: Option<String>,
    pub name: Option<String>,
}

fn default_true() -> bool {
    true
}

fn non_negative_price(price: &Decimal) -> Result<(), ValidationError> {
    if price.is_sign_negative() {
        return Err(ValidationError::new("price must not be negative"));
    }
    Ok(())
}
