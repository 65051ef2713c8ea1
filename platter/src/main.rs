//! Platter demo binary
//!
//! Loads the first page of restaurants and every category from the API named
//! by `PLATTER_API_URL`, then prints the container snapshot.

use anyhow::Context;
use platter::AppStore;
use platter::catalog::CatalogAction;
use platter_api::ApiConfig;
use platter_api::models::RestaurantQuery;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "platter=debug,platter_api=info,platter_runtime=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ApiConfig::from_env().context("reading configuration")?;
    let app = AppStore::connect(&config).context("connecting to the API")?;

    println!("=== Platter: {} ===\n", config.base_url);

    println!(">>> Sending: FetchRestaurants(page 1)");
    let mut handle = app
        .catalog()
        .send(CatalogAction::FetchRestaurants(RestaurantQuery::default()))
        .await?;
    handle.wait_with_timeout(config.timeout * 2).await?;

    let (status, pagination) = app
        .catalog()
        .state(|s| (s.lifecycle.status(), s.pagination))
        .await;
    println!(
        "Restaurants: {status}, page {}/{} ({} total)",
        pagination.current_page, pagination.total_pages, pagination.total_elements
    );

    println!("\n>>> Sending: FetchCategories");
    let mut handle = app.catalog().send(CatalogAction::FetchCategories).await?;
    handle.wait_with_timeout(config.timeout * 2).await?;

    let error = app
        .catalog()
        .state(|s| s.lifecycle.error().map(|failure| failure.summary()))
        .await;
    if let Some(error) = error {
        println!("Last error: {error}");
    }

    let snapshot = app.snapshot().await;
    println!("\n{}", serde_json::to_string_pretty(&snapshot)?);

    app.shutdown(Duration::from_secs(5)).await?;
    Ok(())
}
