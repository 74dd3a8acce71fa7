//! Persistence for the order aggregate.
//!
//! An order and its items are written in one transaction and removed in one
//! statement (items cascade); the store never exposes a half-written
//! aggregate.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{Error, Result};

use super::pricing::PricedOrder;
use super::{Order, OrderItem, OrderStatus};

/// Everything known about an order before it is persisted. The id, creation
/// timestamp, and initial status are assigned by the store.
#[derive(Debug, Clone)]
pub struct OrderDraft {
    pub restaurant_id: Uuid,
    pub customer_name: String,
    pub customer_phone: String,
    pub delivery_address: String,
    pub priced: PricedOrder,
}

/// Exactly one filter or none; the two filters never combine.
#[derive(Debug, Clone, Default)]
pub enum OrderFilter {
    #[default]
    All,
    Restaurant(Uuid),
    CustomerPhone(String),
}

#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn create(&self, draft: OrderDraft) -> Result<Order>;
    async fn get(&self, id: Uuid) -> Result<Order>;
    async fn list(&self, filter: OrderFilter) -> Result<Vec<Order>>;
    async fn update_status(&self, id: Uuid, status: OrderStatus) -> Result<Order>;
    async fn delete(&self, id: Uuid) -> Result<()>;
}

#[async_trait]
impl<T: OrderStore + ?Sized> OrderStore for Arc<T> {
    async fn create(&self, draft: OrderDraft) -> Result<Order> {
        (**self).create(draft).await
    }

    async fn get(&self, id: Uuid) -> Result<Order> {
        (**self).get(id).await
    }

    async fn list(&self, filter: OrderFilter) -> Result<Vec<Order>> {
        (**self).list(filter).await
    }

    async fn update_status(&self, id: Uuid, status: OrderStatus) -> Result<Order> {
        (**self).update_status(id, status).await
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        (**self).delete(id).await
    }
}

pub struct PgOrderStore {
    pool: PgPool,
}

impl PgOrderStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn items_for(&self, order_id: Uuid) -> Result<Vec<ItemRow>> {
        Ok(sqlx::query_as::<_, ItemRow>(
            "SELECT id, menu_item_id, name, unit_price, quantity, subtotal \
             FROM order_items WHERE order_id = $1 ORDER BY line_no",
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?)
    }
}

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: Uuid,
    restaurant_id: Uuid,
    customer_name: String,
    customer_phone: String,
    delivery_address: String,
    status: String,
    total_amount: Decimal,
    created_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct ItemRow {
    id: Uuid,
    menu_item_id: Uuid,
    name: String,
    unit_price: Decimal,
    quantity: i32,
    subtotal: Decimal,
}

impl OrderRow {
    fn into_order(self, items: Vec<ItemRow>) -> Result<Order> {
        let status = self.status.parse::<OrderStatus>().map_err(Error::Decode)?;
        Ok(Order {
            id: self.id,
            restaurant_id: self.restaurant_id,
            customer_name: self.customer_name,
            customer_phone: self.customer_phone,
            delivery_address: self.delivery_address,
            status,
            total_amount: self.total_amount,
            created_at: self.created_at,
            items: items
                .into_iter()
                .map(|row| OrderItem {
                    id: row.id,
                    menu_item_id: row.menu_item_id,
                    name: row.name,
                    unit_price: row.unit_price,
                    quantity: row.quantity as u32,
                    subtotal: row.subtotal,
                })
                .collect(),
        })
    }
}

#[async_trait]
impl OrderStore for PgOrderStore {
    async fn create(&self, draft: OrderDraft) -> Result<Order> {
        // One transaction for the order row and every item row. Any failure
        // drops the transaction un-committed and rolls the whole write back.
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, OrderRow>(
            "INSERT INTO orders (id, restaurant_id, customer_name, customer_phone, \
             delivery_address, status, total_amount, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, NOW()) RETURNING *",
        )
        .bind(Uuid::now_v7())
        .bind(draft.restaurant_id)
        .bind(&draft.customer_name)
        .bind(&draft.customer_phone)
        .bind(&draft.delivery_address)
        .bind(OrderStatus::Created.as_str())
        .bind(draft.priced.total)
        .fetch_one(&mut *tx)
        .await?;

        let mut items = Vec::with_capacity(draft.priced.lines.len());
        for (line_no, line) in draft.priced.lines.iter().enumerate() {
            let item = sqlx::query_as::<_, ItemRow>(
                "INSERT INTO order_items (id, order_id, menu_item_id, name, unit_price, \
                 quantity, subtotal, line_no) VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
                 RETURNING id, menu_item_id, name, unit_price, quantity, subtotal",
            )
            .bind(Uuid::now_v7())
            .bind(row.id)
            .bind(line.menu_item_id)
            .bind(&line.name)
            .bind(line.unit_price)
            .bind(line.quantity as i32)
            .bind(line.subtotal)
            .bind(line_no as i32)
            .fetch_one(&mut *tx)
            .await?;
            items.push(item);
        }

        tx.commit().await?;
        row.into_order(items)
    }

    async fn get(&self, id: Uuid) -> Result<Order> {
        let row = sqlx::query_as::<_, OrderRow>("SELECT * FROM orders WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(Error::OrderNotFound(id))?;
        let items = self.items_for(row.id).await?;
        row.into_order(items)
    }

    async fn list(&self, filter: OrderFilter) -> Result<Vec<Order>> {
        let rows = match filter {
            OrderFilter::All => {
                sqlx::query_as::<_, OrderRow>("SELECT * FROM orders ORDER BY created_at DESC")
                    .fetch_all(&self.pool)
                    .await?
            }
            OrderFilter::Restaurant(restaurant_id) => {
                sqlx::query_as::<_, OrderRow>(
                    "SELECT * FROM orders WHERE restaurant_id = $1 ORDER BY created_at DESC",
                )
                .bind(restaurant_id)
                .fetch_all(&self.pool)
                .await?
            }
            OrderFilter::CustomerPhone(phone) => {
                sqlx::query_as::<_, OrderRow>(
                    "SELECT * FROM orders WHERE customer_phone = $1 ORDER BY created_at DESC",
                )
                .bind(phone)
                .fetch_all(&self.pool)
                .await?
            }
        };

        let mut orders = Vec::with_capacity(rows.len());
        for row in rows {
            let items = self.items_for(row.id).await?;
            orders.push(row.into_order(items)?);
        }
        Ok(orders)
    }

    async fn update_status(&self, id: Uuid, status: OrderStatus) -> Result<Order> {
        // Only the status column moves; total, items, and timestamps stay put.
        let row = sqlx::query_as::<_, OrderRow>(
            "UPDATE orders SET status = $2 WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(status.as_str())
        .fetch_optional(&self.pool)
        .await?
        .ok_or(Error::OrderNotFound(id))?;
        let items = self.items_for(id).await?;
        row.into_order(items)
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM orders WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(Error::OrderNotFound(id));
        }
        Ok(())
    }
}
