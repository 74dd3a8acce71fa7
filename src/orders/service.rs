//! Sequences the order use cases end to end.
//!
//! Request validation happens before any network call; pricing happens before
//! any write. A failure anywhere leaves the store exactly as it was.

use uuid::Uuid;
use validator::Validate;

use crate::error::{Error, Result};

use super::client::CatalogApi;
use super::pricing;
use super::store::{OrderDraft, OrderFilter, OrderStore};
use super::{CreateOrderRequest, Order, OrderStatus};

pub struct OrderService<C, S> {
    catalog: C,
    store: S,
}

impl<C: CatalogApi, S: OrderStore> OrderService<C, S> {
    pub fn new(catalog: C, store: S) -> Self {
        Self { catalog, store }
    }

    pub async fn create_order(&self, req: CreateOrderRequest) -> Result<Order> {
        req.validate()?;
        if req.items.is_empty() {
            return Err(Error::InvalidRequest("at least one item is required".into()));
        }

        let priced = pricing::price_order(&self.catalog, req.restaurant_id, &req.items).await?;
        let order = self
            .store
            .create(OrderDraft {
                restaurant_id: req.restaurant_id,
                customer_name: req.customer_name,
                customer_phone: req.customer_phone,
                delivery_address: req.delivery_address,
                priced,
            })
            .await?;

        tracing::info!(order_id = %order.id, total = %order.total_amount, "order created");
        Ok(order)
    }

    pub async fn get_order(&self, id: Uuid) -> Result<Order> {
        self.store.get(id).await
    }

    pub async fn list_orders(&self, filter: OrderFilter) -> Result<Vec<Order>> {
        self.store.list(filter).await
    }

    /// Any status may follow any other; the store applies the new value as-is.
    pub async fn update_order_status(&self, id: Uuid, status: OrderStatus) -> Result<Order> {
        let order = self.store.update_status(id, status).await?;
        tracing::info!(order_id = %order.id, status = %order.status, "order status updated");
        Ok(order)
    }

    pub async fn delete_order(&self, id: Uuid) -> Result<()> {
        self.store.delete(id).await?;
        tracing::info!(order_id = %id, "order deleted");
        Ok(())
    }
}
