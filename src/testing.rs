//! In-memory fakes for exercising the order workflow without Postgres or a
//! running catalog service.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::orders::client::{CatalogApi, MenuItemSnapshot, RestaurantSnapshot};
use crate::orders::store::{OrderDraft, OrderFilter, OrderStore};
use crate::orders::{Order, OrderItem, OrderStatus};

/// Catalog double with a per-fetch call counter, so tests can assert how many
/// network round trips a flow would have made.
#[derive(Default)]
pub struct FakeCatalog {
    restaurants: Mutex<HashMap<Uuid, RestaurantSnapshot>>,
    menus: Mutex<HashMap<Uuid, Vec<MenuItemSnapshot>>>,
    calls: AtomicUsize,
}

impl FakeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_restaurant(self, id: Uuid, name: &str, active: bool) -> Self {
        self.restaurants.lock().unwrap().insert(
            id,
            RestaurantSnapshot { id, name: name.to_string(), active },
        );
        self
    }

    pub fn with_menu_item(self, restaurant_id: Uuid, id: Uuid, name: &str, price: &str, available: bool) -> Self {
        self.menus.lock().unwrap().entry(restaurant_id).or_default().push(MenuItemSnapshot {
            id,
            name: name.to_string(),
            price: price.parse().unwrap(),
            description: None,
            available,
        });
        self
    }

    /// Edits the live menu, as a restaurant admin would between two requests.
    pub fn set_price(&self, restaurant_id: Uuid, menu_item_id: Uuid, price: &str) {
        let mut menus = self.menus.lock().unwrap();
        let item = menus
            .get_mut(&restaurant_id)
            .and_then(|menu| menu.iter_mut().find(|i| i.id == menu_item_id))
            .expect("menu item not seeded");
        item.price = price.parse().unwrap();
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CatalogApi for FakeCatalog {
    async fn fetch_restaurant(&self, restaurant_id: Uuid) -> Result<RestaurantSnapshot> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.restaurants
            .lock()
            .unwrap()
            .get(&restaurant_id)
            .cloned()
            .ok_or(Error::RestaurantNotFound(restaurant_id))
    }

    async fn fetch_menu(&self, restaurant_id: Uuid) -> Result<Vec<MenuItemSnapshot>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.restaurants.lock().unwrap().contains_key(&restaurant_id) {
            return Err(Error::RestaurantNotFound(restaurant_id));
        }
        Ok(self.menus.lock().unwrap().get(&restaurant_id).cloned().unwrap_or_default())
    }
}

/// Order store backed by a Vec, mirroring the aggregate semantics of the
/// Postgres store: create is all-or-nothing, delete drops the items with the
/// order, update touches only the status field.
#[derive(Default)]
pub struct MemoryOrderStore {
    orders: Mutex<Vec<Order>>,
}

impl MemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.orders.lock().unwrap().len()
    }
}

#[async_trait]
impl OrderStore for MemoryOrderStore {
    async fn create(&self, draft: OrderDraft) -> Result<Order> {
        let order = Order {
            id: Uuid::now_v7(),
            restaurant_id: draft.restaurant_id,
            customer_name: draft.customer_name,
            customer_phone: draft.customer_phone,
            delivery_address: draft.delivery_address,
            status: OrderStatus::Created,
            total_amount: draft.priced.total,
            created_at: Utc::now(),
            items: draft
                .priced
                .lines
                .into_iter()
                .map(|line| OrderItem {
                    id: Uuid::now_v7(),
                    menu_item_id: line.menu_item_id,
                    name: line.name,
                    unit_price: line.unit_price,
                    quantity: line.quantity,
                    subtotal: line.subtotal,
                })
                .collect(),
        };
        self.orders.lock().unwrap().push(order.clone());
        Ok(order)
    }

    async fn get(&self, id: Uuid) -> Result<Order> {
        self.orders
            .lock()
            .unwrap()
            .iter()
            .find(|o| o.id == id)
            .cloned()
            .ok_or(Error::OrderNotFound(id))
    }

    async fn list(&self, filter: OrderFilter) -> Result<Vec<Order>> {
        let orders = self.orders.lock().unwrap();
        Ok(orders
            .iter()
            .filter(|o| match &filter {
                OrderFilter::All => true,
                OrderFilter::Restaurant(restaurant_id) => o.restaurant_id == *restaurant_id,
                OrderFilter::CustomerPhone(phone) => o.customer_phone == *phone,
            })
            .cloned()
            .collect())
    }

    async fn update_status(&self, id: Uuid, status: OrderStatus) -> Result<Order> {
        let mut orders = self.orders.lock().unwrap();
        let order = orders
            .iter_mut()
            .find(|o| o.id == id)
            .ok_or(Error::OrderNotFound(id))?;
        order.status = status;
        Ok(order.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let mut orders = self.orders.lock().unwrap();
        let before = orders.len();
        orders.retain(|o| o.id != id);
        if orders.len() == before {
            return Err(Error::OrderNotFound(id));
        }
        Ok(())
    }
}
