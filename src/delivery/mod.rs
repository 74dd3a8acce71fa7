//! Delivery tracking.
//!
//! A delivery references an order by id only; the two services share an
//! identifier space, never a database. Delivery status moves independently of
//! order status.

pub mod http;

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeliveryStatus {
    Assigned,
    PickedUp,
    OnTheWay,
    Delivered,
    Cancelled,
}

impl DeliveryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryStatus::Assigned => "ASSIGNED",
            DeliveryStatus::PickedUp => "PICKED_UP",
            DeliveryStatus::OnTheWay => "ON_THE_WAY",
            DeliveryStatus::Delivered => "DELIVERED",
            DeliveryStatus::Cancelled => "CANCELLED",
        }
    }
}

impl fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeliveryStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ASSIGNED" => Ok(DeliveryStatus::Assigned),
            "PICKED_UP" => Ok(DeliveryStatus::PickedUp),
            "ON_THE_WAY" => Ok(DeliveryStatus::OnTheWay),
            "DELIVERED" => Ok(DeliveryStatus::Delivered),
            "CANCELLED" => Ok(DeliveryStatus::Cancelled),
            other => Err(format!("unknown delivery status: {other}")),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Delivery {
    pub id: Uuid,
    pub order_id: Uuid,
    pub customer_name: String,
    pub customer_phone: String,
    pub delivery_address: String,
    pub status: DeliveryStatus,
    pub assigned_agent_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct DeliveryAgent {
    pub id: Uuid,
    pub name: String,
    pub phone: String,
    pub vehicle_number: String,
    pub available: bool,
}

#[derive(Debug, Deserialize, Validate)]
pub struct DeliveryRequest {
    pub order_id: Uuid,
    #[validate(length(min = 1, message = "customer_name is required"))]
    pub customer_name: String,
    #[validate(length(min = 1, message = "customer_phone is required"))]
    pub customer_phone: String,
    #[validate(length(min = 1, message = "delivery_address is required"))]
    pub delivery_address: String,
}

#[derive(Debug, Deserialize)]
pub struct DeliveryStatusUpdate {
    pub status: DeliveryStatus,
}

#[derive(Debug, Deserialize)]
pub struct AssignAgentRequest {
    pub agent_id: Uuid,
}

#[derive(Debug, Deserialize, Validate)]
pub struct AgentRequest {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    #[validate(length(min = 1, message = "phone is required"))]
    pub phone: String,
    #[validate(length(min = 1, message = "vehicle_number is required"))]
    pub vehicle_number: String,
    #[serde(default = "default_true")]
    pub available: bool,
}

fn default_true() -> bool {
    true
}
