//! Error taxonomy shared by the three services.
//!
//! Domain and upstream failures are carried unmodified through the service
//! layers; the HTTP boundary is the only place they turn into status codes.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("restaurant not found with id: {0}")]
    RestaurantNotFound(Uuid),

    #[error("menu item {menu_item_id} not found for restaurant {restaurant_id}")]
    MenuItemNotFound {
        restaurant_id: Uuid,
        menu_item_id: Uuid,
    },

    #[error("restaurant {0} is not accepting orders currently")]
    RestaurantInactive(Uuid),

    #[error("menu item {0} is not available right now")]
    MenuItemUnavailable(String),

    #[error("order not found with id: {0}")]
    OrderNotFound(Uuid),

    #[error("delivery not found with id: {0}")]
    DeliveryNotFound(Uuid),

    #[error("delivery agent not found with id: {0}")]
    AgentNotFound(Uuid),

    #[error("catalog request timed out")]
    UpstreamTimeout,

    #[error("catalog unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("corrupt record: {0}")]
    Decode(String),

    #[error("storage error: {0}")]
    Storage(#[from] sqlx::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<validator::ValidationErrors> for Error {
    fn from(e: validator::ValidationErrors) -> Self {
        Error::InvalidRequest(e.to_string())
    }
}

impl Error {
    fn status(&self) -> StatusCode {
        match self {
            Error::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Error::RestaurantNotFound(_)
            | Error::MenuItemNotFound { .. }
            | Error::OrderNotFound(_)
            | Error::DeliveryNotFound(_)
            | Error::AgentNotFound(_) => StatusCode::NOT_FOUND,
            Error::RestaurantInactive(_) | Error::MenuItemUnavailable(_) => StatusCode::CONFLICT,
            Error::UpstreamTimeout => StatusCode::GATEWAY_TIMEOUT,
            Error::UpstreamUnavailable(_) => StatusCode::BAD_GATEWAY,
            Error::Decode(_) | Error::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}
