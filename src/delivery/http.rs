//! HTTP surface of the delivery service.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, put};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use uuid::Uuid;
use validator::Validate;

use crate::error::{Error, Result};

use super::{
    AgentRequest, AssignAgentRequest, Delivery, DeliveryAgent, DeliveryRequest, DeliveryStatus,
    DeliveryStatusUpdate,
};

pub fn router(db: PgPool) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/delivery", get(list_deliveries).post(create_delivery))
        .route("/api/delivery/agents", get(list_agents).post(create_agent))
        .route("/api/delivery/agents/:id", get(get_agent).put(update_agent))
        .route("/api/delivery/:id", get(get_delivery).delete(delete_delivery))
        .route("/api/delivery/:id/status", put(update_status))
        .route("/api/delivery/:id/agent", put(assign_agent))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(db)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "healthy", "service": "quickbite-delivery" }))
}

#[derive(sqlx::FromRow)]
struct DeliveryRow {
    id: Uuid,
    order_id: Uuid,
    customer_name: String,
    customer_phone: String,
    delivery_address: String,
    status: String,
    assigned_agent_id: Option<Uuid>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl DeliveryRow {
    fn into_delivery(self) -> Result<Delivery> {
        let status = self.status.parse::<DeliveryStatus>().map_err(Error::Decode)?;
        Ok(Delivery {
            id: self.id,
            order_id: self.order_id,
            customer_name: self.customer_name,
            customer_phone: self.customer_phone,
            delivery_address: self.delivery_address,
            status,
            assigned_agent_id: self.assigned_agent_id,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

async fn create_delivery(
    State(db): State<PgPool>,
    Json(req): Json<DeliveryRequest>,
) -> Result<(StatusCode, Json<Delivery>)> {
    req.validate()?;
    // Every delivery starts out ASSIGNED regardless of what the caller sends.
    let row = sqlx::query_as::<_, DeliveryRow>(
        "INSERT INTO deliveries (id, order_id, customer_name, customer_phone, delivery_address, \
         status, created_at, updated_at) VALUES ($1, $2, $3, $4, $5, $6, NOW(), NOW()) RETURNING *",
    )
    .bind(Uuid::now_v7())
    .bind(req.order_id)
    .bind(&req.customer_name)
    .bind(&req.customer_phone)
    .bind(&req.delivery_address)
    .bind(DeliveryStatus::Assigned.as_str())
    .fetch_one(&db)
    .await?;

    tracing::info!(delivery_id = %row.id, order_id = %row.order_id, "delivery created");
    Ok((StatusCode::CREATED, Json(row.into_delivery()?)))
}

async fn get_delivery(State(db): State<PgPool>, Path(id): Path<Uuid>) -> Result<Json<Delivery>> {
    let row = sqlx::query_as::<_, DeliveryRow>("SELECT * FROM deliveries WHERE id = $1")
        .bind(id)
        .fetch_optional(&db)
        .await?
        .ok_or(Error::DeliveryNotFound(id))?;
    Ok(Json(row.into_delivery()?))
}

async fn list_deliveries(State(db): State<PgPool>) -> Result<Json<Vec<Delivery>>> {
    let rows = sqlx::query_as::<_, DeliveryRow>("SELECT * FROM deliveries ORDER BY created_at DESC")
        .fetch_all(&db)
        .await?;
    let deliveries = rows
        .into_iter()
        .map(DeliveryRow::into_delivery)
        .collect::<Result<Vec<_>>>()?;
    Ok(Json(deliveries))
}

async fn update_status(
    State(db): State<PgPool>,
    Path(id): Path<Uuid>,
    Json(req): Json<DeliveryStatusUpdate>,
) -> Result<Json<Delivery>> {
    let row = sqlx::query_as::<_, DeliveryRow>(
        "UPDATE deliveries SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(req.status.as_str())
    .fetch_optional(&db)
    .await?
    .ok_or(Error::DeliveryNotFound(id))?;
    Ok(Json(row.into_delivery()?))
}

async fn assign_agent(
    State(db): State<PgPool>,
    Path(id): Path<Uuid>,
    Json(req): Json<AssignAgentRequest>,
) -> Result<Json<Delivery>> {
    find_agent(&db, req.agent_id).await?;
    let row = sqlx::query_as::<_, DeliveryRow>(
        "UPDATE deliveries SET assigned_agent_id = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(req.agent_id)
    .fetch_optional(&db)
    .await?
    .ok_or(Error::DeliveryNotFound(id))?;
    Ok(Json(row.into_delivery()?))
}

async fn delete_delivery(State(db): State<PgPool>, Path(id): Path<Uuid>) -> Result<StatusCode> {
    let result = sqlx::query("DELETE FROM deliveries WHERE id = $1").bind(id).execute(&db).await?;
    if result.rows_affected() == 0 {
        return Err(Error::DeliveryNotFound(id));
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn create_agent(
    State(db): State<PgPool>,
    Json(req): Json<AgentRequest>,
) -> Result<(StatusCode, Json<DeliveryAgent>)> {
    req.validate()?;
    let agent = sqlx::query_as::<_, DeliveryAgent>(
        "INSERT INTO delivery_agents (id, name, phone, vehicle_number, available) \
         VALUES ($1, $2, $3, $4, $5) RETURNING *",
    )
    .bind(Uuid::now_v7())
    .bind(&req.name)
    .bind(&req.phone)
    .bind(&req.vehicle_number)
    .bind(req.available)
    .fetch_one(&db)
    .await?;
    Ok((StatusCode::CREATED, Json(agent)))
}

async fn list_agents(State(db): State<PgPool>) -> Result<Json<Vec<DeliveryAgent>>> {
    let agents = sqlx::query_as::<_, DeliveryAgent>("SELECT * FROM delivery_agents ORDER BY name")
        .fetch_all(&db)
        .await?;
    Ok(Json(agents))
}

async fn get_agent(State(db): State<PgPool>, Path(id): Path<Uuid>) -> Result<Json<DeliveryAgent>> {
    Ok(Json(find_agent(&db, id).await?))
}

async fn update_agent(
    State(db): State<PgPool>,
    Path(id): Path<Uuid>,
    Json(req): Json<AgentRequest>,
) -> Result<Json<DeliveryAgent>> {
    req.validate()?;
    sqlx::query_as::<_, DeliveryAgent>(
        "UPDATE delivery_agents SET name = $2, phone = $3, vehicle_number = $4, available = $5 \
         WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(&req.name)
    .bind(&req.phone)
    .bind(&req.vehicle_number)
    .bind(req.available)
    .fetch_optional(&db)
    .await?
    .map(Json)
    .ok_or(Error::AgentNotFound(id))
}

async fn find_agent(db: &PgPool, id: Uuid) -> Result<DeliveryAgent> {
    sqlx::query_as::<_, DeliveryAgent>("SELECT * FROM delivery_agents WHERE id = $1")
        .bind(id)
        .fetch_optional(db)
        .await?
        .ok_or(Error::AgentNotFound(id))
}
