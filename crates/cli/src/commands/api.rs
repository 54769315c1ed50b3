//! Commerce API reachability check.
//!
//! Loads the same `API_*` variables the storefront does and makes two
//! cheap public reads: the province list and the first product page.

use harbor_storefront::api::{ApiClient, ProductQuery};
use harbor_storefront::config::ApiConfig;

use super::CommandError;

/// Probe the commerce API.
///
/// # Errors
///
/// Returns the first configuration or API error encountered.
pub async fn check() -> Result<(), CommandError> {
    dotenvy::dotenv().ok();

    let config = ApiConfig::from_env()?;
    tracing::info!(base_url = %config.base_url, "Checking commerce API");

    let client = ApiClient::new(&config)?;

    let provinces = client.get_provinces().await?;
    tracing::info!(count = provinces.len(), "Regions reachable");

    let products = client
        .get_products(&ProductQuery {
            per_page: 1,
            ..ProductQuery::default()
        })
        .await?;
    tracing::info!(total = products.total, "Catalog reachable");

    Ok(())
}
