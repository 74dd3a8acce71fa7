//! Read-only HTTP client for the catalog service.
//!
//! Every call is a fresh fetch; nothing is cached between requests. A menu
//! edit landing between two fetches of the same order is an accepted
//! inconsistency window, not something this client tries to hide.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::{Error, Result};

/// What the order service needs to know about a restaurant. Extra catalog
/// fields are ignored on deserialization.
#[derive(Debug, Clone, Deserialize)]
pub struct RestaurantSnapshot {
    pub id: Uuid,
    pub name: String,
    pub active: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MenuItemSnapshot {
    pub id: Uuid,
    pub name: String,
    pub price: Decimal,
    pub description: Option<String>,
    pub available: bool,
}

#[async_trait]
pub trait CatalogApi: Send + Sync {
    async fn fetch_restaurant(&self, restaurant_id: Uuid) -> Result<RestaurantSnapshot>;

    async fn fetch_menu(&self, restaurant_id: Uuid) -> Result<Vec<MenuItemSnapshot>>;

    /// The catalog has no single-item endpoint: fetch the whole menu and pick
    /// the item out locally. A missing item is `MenuItemNotFound`, never
    /// `RestaurantNotFound`.
    async fn fetch_menu_item(&self, restaurant_id: Uuid, menu_item_id: Uuid) -> Result<MenuItemSnapshot> {
        let menu = self.fetch_menu(restaurant_id).await?;
        menu.into_iter()
            .find(|item| item.id == menu_item_id)
            .ok_or(Error::MenuItemNotFound { restaurant_id, menu_item_id })
    }
}

#[async_trait]
impl<T: CatalogApi + ?Sized> CatalogApi for Arc<T> {
    async fn fetch_restaurant(&self, restaurant_id: Uuid) -> Result<RestaurantSnapshot> {
        (**self).fetch_restaurant(restaurant_id).await
    }

    async fn fetch_menu(&self, restaurant_id: Uuid) -> Result<Vec<MenuItemSnapshot>> {
        (**self).fetch_menu(restaurant_id).await
    }

    async fn fetch_menu_item(&self, restaurant_id: Uuid, menu_item_id: Uuid) -> Result<MenuItemSnapshot> {
        (**self).fetch_menu_item(restaurant_id, menu_item_id).await
    }
}

pub struct HttpCatalogClient {
    http: reqwest::Client,
    base_url: String,
}

impl HttpCatalogClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> reqwest::Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self { http, base_url })
    }

    async fn get_json<T: DeserializeOwned>(&self, url: String, not_found: Error) -> Result<T> {
        let response = self.http.get(&url).send().await.map_err(transport_error)?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(not_found);
        }
        let response = response.error_for_status().map_err(transport_error)?;
        response.json::<T>().await.map_err(transport_error)
    }
}

/// A timeout must surface as a timeout. Treating it as "not found" would let
/// a slow catalog silently reject valid orders.
fn transport_error(err: reqwest::Error) -> Error {
    if err.is_timeout() {
        Error::UpstreamTimeout
    } else {
        Error::UpstreamUnavailable(err.to_string())
    }
}

#[async_trait]
impl CatalogApi for HttpCatalogClient {
    async fn fetch_restaurant(&self, restaurant_id: Uuid) -> Result<RestaurantSnapshot> {
        let url = format!("{}/api/restaurants/{restaurant_id}", self.base_url);
        self.get_json(url, Error::RestaurantNotFound(restaurant_id)).await
    }

    async fn fetch_menu(&self, restaurant_id: Uuid) -> Result<Vec<MenuItemSnapshot>> {
        let url = format!("{}/api/restaurants/{restaurant_id}/menu", self.base_url);
        self.get_json(url, Error::RestaurantNotFound(restaurant_id)).await
    }
}
