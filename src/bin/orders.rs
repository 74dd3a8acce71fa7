//! Order service: order creation and status lifecycle.

use std::time::Duration;

use anyhow::Result;
use quickbite::orders::client::HttpCatalogClient;
use quickbite::orders::service::OrderService;
use quickbite::orders::store::PgOrderStore;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let db = PgPoolOptions::new()
        .max_connections(10)
        .connect(&std::env::var("DATABASE_URL")?)
        .await?;
    sqlx::migrate!("./migrations/orders").run(&db).await?;

    let catalog_url =
        std::env::var("CATALOG_URL").unwrap_or_else(|_| "http://localhost:8081".to_string());
    let timeout_secs = std::env::var("CATALOG_TIMEOUT_SECS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(5);
    let catalog = HttpCatalogClient::new(catalog_url, Duration::from_secs(timeout_secs))?;

    let service = OrderService::new(catalog, PgOrderStore::new(db));
    let app = quickbite::orders::http::router(service);

    let port = std::env::var("PORT").unwrap_or_else(|_| "8082".to_string());
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;
    tracing::info!("quickbite orders listening on 0.0.0.0:{}", port);
    axum::serve(listener, app).await?;
    Ok(())
}
