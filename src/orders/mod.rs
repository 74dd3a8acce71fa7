//! Order creation and status lifecycle.
//!
//! The one subsystem that crosses service boundaries: pricing reads the
//! catalog service over HTTP, freezes what it saw into the order aggregate,
//! and persists the whole thing in a single transaction.

pub mod client;
pub mod http;
pub mod pricing;
pub mod service;
pub mod store;

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Created,
    Confirmed,
    Preparing,
    OutForDelivery,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Created => "CREATED",
            OrderStatus::Confirmed => "CONFIRMED",
            OrderStatus::Preparing => "PREPARING",
            OrderStatus::OutForDelivery => "OUT_FOR_DELIVERY",
            OrderStatus::Delivered => "DELIVERED",
            OrderStatus::Cancelled => "CANCELLED",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CREATED" => Ok(OrderStatus::Created),
            "CONFIRMED" => Ok(OrderStatus::Confirmed),
            "PREPARING" => Ok(OrderStatus::Preparing),
            "OUT_FOR_DELIVERY" => Ok(OrderStatus::OutForDelivery),
            "DELIVERED" => Ok(OrderStatus::Delivered),
            "CANCELLED" => Ok(OrderStatus::Cancelled),
            other => Err(format!("unknown order status: {other}")),
        }
    }
}

/// The persisted aggregate. Items live and die with their order.
#[derive(Debug, Clone, Serialize)]
pub struct Order {
    pub id: Uuid,
    pub restaurant_id: Uuid,
    pub customer_name: String,
    pub customer_phone: String,
    pub delivery_address: String,
    pub status: OrderStatus,
    pub total_amount: Decimal,
    pub created_at: DateTime<Utc>,
    pub items: Vec<OrderItem>,
}

/// A line frozen at creation time. Name and unit price are copies of the
/// menu snapshot, not live references; later catalog edits never reach
/// historical orders.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderItem {
    pub id: Uuid,
    pub menu_item_id: Uuid,
    pub name: String,
    pub unit_price: Decimal,
    pub quantity: u32,
    pub subtotal: Decimal,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateOrderRequest {
    pub restaurant_id: Uuid,
    #[validate(length(min = 1, message = "customer_name is required"))]
    pub customer_name: String,
    #[validate(custom = "validate_phone")]
    pub customer_phone: String,
    #[validate(length(min = 1, message = "delivery_address is required"))]
    pub delivery_address: String,
    #[validate]
    pub items: Vec<OrderLineRequest>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct OrderLineRequest {
    pub menu_item_id: Uuid,
    #[validate(range(min = 1, message = "quantity must be at least 1"))]
    pub quantity: u32,
}

#[derive(Debug, Deserialize)]
pub struct UpdateOrderStatusRequest {
    pub status: OrderStatus,
}

#[derive(Debug, Deserialize)]
pub struct ListOrdersParams {
    pub customer_phone: Option<String>,
    pub restaurant_id: Option<Uuid>,
}

// Digits plus optional + and -, 8 to 15 characters.
fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    let well_formed = (8..=15).contains(&phone.len())
        && phone.chars().all(|c| c.is_ascii_digit() || c == '+' || c == '-');
    if !well_formed {
        return Err(ValidationError::new("invalid phone number"));
    }
    Ok(())
}
