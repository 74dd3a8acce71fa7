//! HTTP surface of the order service.
//!
//! Handlers stay thin; the error type carries its own status-code mapping.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, put};
use axum::{Json, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::error::Result;

use super::client::HttpCatalogClient;
use super::service::OrderService;
use super::store::{OrderFilter, PgOrderStore};
use super::{CreateOrderRequest, ListOrdersParams, Order, UpdateOrderStatusRequest};

pub type AppService = OrderService<HttpCatalogClient, PgOrderStore>;

pub fn router(service: AppService) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/orders", get(list_orders).post(create_order))
        .route("/api/orders/:id", get(get_order).delete(delete_order))
        .route("/api/orders/:id/status", put(update_status))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(Arc::new(service))
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "healthy", "service": "quickbite-orders" }))
}

async fn create_order(
    State(service): State<Arc<AppService>>,
    Json(req): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<Order>)> {
    let order = service.create_order(req).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

async fn get_order(
    State(service): State<Arc<AppService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Order>> {
    Ok(Json(service.get_order(id).await?))
}

async fn list_orders(
    State(service): State<Arc<AppService>>,
    Query(params): Query<ListOrdersParams>,
) -> Result<Json<Vec<Order>>> {
    // Phone wins when both filters are supplied; they never combine.
    let filter = if let Some(phone) = params.customer_phone {
        OrderFilter::CustomerPhone(phone)
    } else if let Some(restaurant_id) = params.restaurant_id {
        OrderFilter::Restaurant(restaurant_id)
    } else {
        OrderFilter::All
    };
    Ok(Json(service.list_orders(filter).await?))
}

async fn update_status(
    State(service): State<Arc<AppService>>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateOrderStatusRequest>,
) -> Result<Json<Order>> {
    Ok(Json(service.update_order_status(id, req.status).await?))
}

async fn delete_order(
    State(service): State<Arc<AppService>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    service.delete_order(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
