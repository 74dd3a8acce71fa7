//! HTTP surface of the catalog service.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use sqlx::PgPool;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use uuid::Uuid;
use validator::Validate;

use crate::error::{Error, Result};

use super::{MenuItem, MenuItemRequest, Restaurant, RestaurantDetail, RestaurantRequest, RestaurantSearchParams};

pub fn router(db: PgPool) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/restaurants", get(list_restaurants).post(create_restaurant))
        .route(
            "/api/restaurants/:id",
            get(get_restaurant).put(update_restaurant).delete(delete_restaurant),
        )
        .route("/api/restaurants/:id/menu", get(get_menu).post(add_menu_item))
        .route(
            "/api/restaurants/:id/menu/:item_id",
            axum::routing::put(update_menu_item).delete(delete_menu_item),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(db)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "healthy", "service": "quickbite-catalog" }))
}

async fn list_restaurants(
    State(db): State<PgPool>,
    Query(params): Query<RestaurantSearchParams>,
) -> Result<Json<Vec<Restaurant>>> {
    // One filter at a time: city, then cuisine, then name substring.
    let restaurants = if let Some(city) = params.city {
        sqlx::query_as::<_, Restaurant>("SELECT * FROM restaurants WHERE LOWER(city) = LOWER($1) ORDER BY name")
            .bind(city)
            .fetch_all(&db)
            .await?
    } else if let Some(cuisine) = params.cuisine {
        sqlx::query_as::<_, Restaurant>(
            "SELECT * FROM restaurants WHERE LOWER(cuisine_type) = LOWER($1) ORDER BY name",
        )
        .bind(cuisine)
        .fetch_all(&db)
        .await?
    } else if let Some(name) = params.name {
        sqlx::query_as::<_, Restaurant>(
            "SELECT * FROM restaurants WHERE name ILIKE '%' || $1 || '%' ORDER BY name",
        )
        .bind(name)
        .fetch_all(&db)
        .await?
    } else {
        sqlx::query_as::<_, Restaurant>("SELECT * FROM restaurants ORDER BY name")
            .fetch_all(&db)
            .await?
    };
    Ok(Json(restaurants))
}

async fn create_restaurant(
    State(db): State<PgPool>,
    Json(req): Json<RestaurantRequest>,
) -> Result<(StatusCode, Json<RestaurantDetail>)> {
    req.validate()?;

    let mut tx = db.begin().await?;
    let restaurant = sqlx::query_as::<_, Restaurant>(
        "INSERT INTO restaurants (id, name, address, city, cuisine_type, contact_number, active) \
         VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING *",
    )
    .bind(Uuid::now_v7())
    .bind(&req.name)
    .bind(&req.address)
    .bind(&req.city)
    .bind(&req.cuisine_type)
    .bind(&req.contact_number)
    .bind(req.active)
    .fetch_one(&mut *tx)
    .await?;

    let mut menu_items = Vec::with_capacity(req.menu_items.len());
    for item in &req.menu_items {
        let row = insert_menu_item(&mut tx, restaurant.id, item).await?;
        menu_items.push(row);
    }
    tx.commit().await?;

    tracing::info!(restaurant_id = %restaurant.id, "restaurant created");
    Ok((StatusCode::CREATED, Json(RestaurantDetail { restaurant, menu_items })))
}

async fn get_restaurant(State(db): State<PgPool>, Path(id): Path<Uuid>) -> Result<Json<RestaurantDetail>> {
    let restaurant = find_restaurant(&db, id).await?;
    let menu_items = menu_for(&db, id).await?;
    Ok(Json(RestaurantDetail { restaurant, menu_items }))
}

async fn update_restaurant(
    State(db): State<PgPool>,
    Path(id): Path<Uuid>,
    Json(req): Json<RestaurantRequest>,
) -> Result<Json<RestaurantDetail>> {
    req.validate()?;
    let restaurant = sqlx::query_as::<_, Restaurant>(
        "UPDATE restaurants SET name = $2, address = $3, city = $4, cuisine_type = $5, \
         contact_number = $6, active = $7 WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(&req.name)
    .bind(&req.address)
    .bind(&req.city)
    .bind(&req.cuisine_type)
    .bind(&req.contact_number)
    .bind(req.active)
    .fetch_optional(&db)
    .await?
    .ok_or(Error::RestaurantNotFound(id))?;

    let menu_items = menu_for(&db, id).await?;
    Ok(Json(RestaurantDetail { restaurant, menu_items }))
}

async fn delete_restaurant(State(db): State<PgPool>, Path(id): Path<Uuid>) -> Result<StatusCode> {
    let result = sqlx::query("DELETE FROM restaurants WHERE id = $1").bind(id).execute(&db).await?;
    if result.rows_affected() == 0 {
        return Err(Error::RestaurantNotFound(id));
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn get_menu(State(db): State<PgPool>, Path(id): Path<Uuid>) -> Result<Json<Vec<MenuItem>>> {
    find_restaurant(&db, id).await?;
    Ok(Json(menu_for(&db, id).await?))
}

async fn add_menu_item(
    State(db): State<PgPool>,
    Path(id): Path<Uuid>,
    Json(req): Json<MenuItemRequest>,
) -> Result<(StatusCode, Json<MenuItem>)> {
    req.validate()?;
    find_restaurant(&db, id).await?;
    let mut tx = db.begin().await?;
    let item = insert_menu_item(&mut tx, id, &req).await?;
    tx.commit().await?;
    Ok((StatusCode::CREATED, Json(item)))
}

async fn update_menu_item(
    State(db): State<PgPool>,
    Path((id, item_id)): Path<(Uuid, Uuid)>,
    Json(req): Json<MenuItemRequest>,
) -> Result<Json<MenuItem>> {
    req.validate()?;
    find_restaurant(&db, id).await?;
    // Matching on both keys doubles as the belongs-to-this-restaurant check.
    sqlx::query_as::<_, MenuItem>(
        "UPDATE menu_items SET name = $3, price = $4, description = $5, available = $6 \
         WHERE id = $2 AND restaurant_id = $1 RETURNING *",
    )
    .bind(id)
    .bind(item_id)
    .bind(&req.name)
    .bind(req.price)
    .bind(&req.description)
    .bind(req.available)
    .fetch_optional(&db)
    .await?
    .map(Json)
    .ok_or(Error::MenuItemNotFound { restaurant_id: id, menu_item_id: item_id })
}

async fn delete_menu_item(
    State(db): State<PgPool>,
    Path((id, item_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode> {
    find_restaurant(&db, id).await?;
    let result = sqlx::query("DELETE FROM menu_items WHERE id = $2 AND restaurant_id = $1")
        .bind(id)
        .bind(item_id)
        .execute(&db)
        .await?;
    if result.rows_affected() == 0 {
        return Err(Error::MenuItemNotFound { restaurant_id: id, menu_item_id: item_id });
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn find_restaurant(db: &PgPool, id: Uuid) -> Result<Restaurant> {
    sqlx::query_as::<_, Restaurant>("SELECT * FROM restaurants WHERE id = $1")
        .bind(id)
        .fetch_optional(db)
        .await?
        .ok_or(Error::RestaurantNotFound(id))
}

async fn menu_for(db: &PgPool, restaurant_id: Uuid) -> Result<Vec<MenuItem>> {
    Ok(sqlx::query_as::<_, MenuItem>(
        "SELECT * FROM menu_items WHERE restaurant_id = $1 ORDER BY name",
    )
    .bind(restaurant_id)
    .fetch_all(db)
    .await?)
}

async fn insert_menu_item(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    restaurant_id: Uuid,
    req: &MenuItemRequest,
) -> Result<MenuItem> {
    Ok(sqlx::query_as::<_, MenuItem>(
        "INSERT INTO menu_items (id, restaurant_id, name, price, description, available) \
         VALUES ($1, $2, $3, $4, $5, $6) RETURNING *",
    )
    .bind(Uuid::now_v7())
    .bind(restaurant_id)
    .bind(&req.name)
    .bind(req.price)
    .bind(&req.description)
    .bind(req.available)
    .fetch_one(&mut **tx)
    .await?)
}
