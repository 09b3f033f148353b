//! Catalog client: every call to the store's admin API goes through here.
//!
//! The driver only sees the `CatalogApi` trait, so a dry run swaps in
//! `DryRunCatalog` and tests swap in a recording implementation. The product
//! export reads through `CatalogReader` the same way.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{LINK, RETRY_AFTER};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

pub mod listing;
pub mod payload;

pub use listing::{ProductListing, ProductPage};
pub use payload::{ImageSource, ProductUpdate, VariantPriceUpdate};
use listing::{next_page_url, InventoryLevelsResponse, ProductsResponse, PAGE_LIMIT};
use payload::{ProductEnvelope, VariantEnvelope};

const ACCESS_TOKEN_HEADER: &str = "X-Shopify-Access-Token";
const REQUEST_TIMEOUT_SECS: u64 = 60;
const MAX_ATTEMPTS: u32 = 3;
/// Upper bound on a server-requested `Retry-After` wait.
const MAX_RETRY_AFTER: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Write operations the batch driver needs from the catalog.
#[async_trait]
pub trait CatalogApi: Send + Sync {
    async fn update_product(&self, update: &ProductUpdate) -> Result<(), CatalogError>;

    async fn update_variant_price(&self, update: &VariantPriceUpdate) -> Result<(), CatalogError>;
}

/// Read operations the product export needs.
#[async_trait]
pub trait CatalogReader: Send + Sync {
    /// Fetches one page of products. `None` asks for the first page; later pages
    /// are requested with the `next_page` value of the previous one.
    async fn list_products(&self, page: Option<&str>) -> Result<ProductPage, CatalogError>;

    /// Location ids holding stock for an inventory item.
    async fn inventory_location_ids(&self, inventory_item_id: u64) -> Result<Vec<u64>, CatalogError>;
}

#[derive(Debug, Deserialize)]
struct ShopifyErrorBody {
    errors: serde_json::Value,
}

/// Admin REST API client.
#[derive(Clone)]
pub struct ShopifyClient {
    client: Client,
    base_url: String,
    access_token: String,
}

impl ShopifyClient {
    pub fn new(shop_name: &str, api_version: &str, access_token: String) -> Result<Self, CatalogError> {
        Self::with_base_url(admin_base_url(shop_name, api_version), access_token)
    }

    /// Client against an explicit admin base URL, e.g. `https://shop.myshopify.com/admin/api/2025-01`.
    pub fn with_base_url(base_url: impl Into<String>, access_token: String) -> Result<Self, CatalogError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            access_token,
        })
    }

    pub fn product_url(&self, product_id: u64) -> String {
        format!("{}/products/{product_id}.json", self.base_url)
    }

    pub fn variant_url(&self, variant_id: u64) -> String {
        format!("{}/variants/{variant_id}.json", self.base_url)
    }

    pub fn products_url(&self) -> String {
        format!("{}/products.json?limit={PAGE_LIMIT}", self.base_url)
    }

    pub fn inventory_levels_url(&self, inventory_item_id: u64) -> String {
        format!(
            "{}/inventory_levels.json?inventory_item_ids={inventory_item_id}",
            self.base_url
        )
    }

    /// Sends the request built by `request`, rebuilding it for each attempt.
    ///
    /// Transport errors, 429 and 5xx are retried, `MAX_ATTEMPTS` in total. The wait honours the
    /// store's `Retry-After` header and falls back to 1s, 2s backoff. Any other non-2xx
    /// status fails immediately.
    async fn send_with_retry<F>(&self, request: F) -> Result<Response, CatalogError>
    where
        F: Fn() -> RequestBuilder + Send + Sync,
    {
        let mut attempt = 1;
        loop {
            let sent = request()
                .header(ACCESS_TOKEN_HEADER, &self.access_token)
                .send()
                .await;

            let response = match sent {
                Ok(response) => response,
                Err(e) if attempt < MAX_ATTEMPTS => {
                    let delay = retry_delay(attempt, None);
                    warn!(
                        "Catalog request failed ({e}), attempt {attempt}/{MAX_ATTEMPTS}; retrying in {}ms",
                        delay.as_millis()
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                    continue;
                }
                Err(e) => return Err(CatalogError::Http(e)),
            };

            let status = response.status();
            if status.is_success() {
                debug!("{} -> {status}", response.url());
                return Ok(response);
            }

            if is_retryable(status) && attempt < MAX_ATTEMPTS {
                let delay = retry_delay(
                    attempt,
                    response
                        .headers()
                        .get(RETRY_AFTER)
                        .and_then(|value| value.to_str().ok()),
                );
                warn!(
                    "Catalog API returned {status}, attempt {attempt}/{MAX_ATTEMPTS}; retrying in {}ms",
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
                continue;
            }

            let body = response.text().await.unwrap_or_default();
            return Err(api_error(status, body));
        }
    }

    async fn put_json<T: Serialize + Sync>(&self, url: &str, body: &T) -> Result<(), CatalogError> {
        self.send_with_retry(|| self.client.put(url).json(body))
            .await
            .map(|_| ())
    }
}

#[async_trait]
impl CatalogApi for ShopifyClient {
    async fn update_product(&self, update: &ProductUpdate) -> Result<(), CatalogError> {
        let url = self.product_url(update.id);
        self.put_json(&url, &ProductEnvelope { product: update }).await
    }

    async fn update_variant_price(&self, update: &VariantPriceUpdate) -> Result<(), CatalogError> {
        let url = self.variant_url(update.id);
        self.put_json(&url, &VariantEnvelope { variant: update }).await
    }
}

#[async_trait]
impl CatalogReader for ShopifyClient {
    async fn list_products(&self, page: Option<&str>) -> Result<ProductPage, CatalogError> {
        let url = page.map_or_else(|| self.products_url(), str::to_string);
        let response = self.send_with_retry(|| self.client.get(&url)).await?;

        let next_page = response
            .headers()
            .get(LINK)
            .and_then(|value| value.to_str().ok())
            .and_then(next_page_url);
        let body = response.text().await?;
        let parsed: ProductsResponse = serde_json::from_str(&body)?;

        Ok(ProductPage {
            products: parsed.products,
            next_page,
        })
    }

    async fn inventory_location_ids(&self, inventory_item_id: u64) -> Result<Vec<u64>, CatalogError> {
        let url = self.inventory_levels_url(inventory_item_id);
        let response = self.send_with_retry(|| self.client.get(&url)).await?;
        let body = response.text().await?;
        let parsed: InventoryLevelsResponse = serde_json::from_str(&body)?;

        Ok(parsed
            .inventory_levels
            .into_iter()
            .filter_map(|level| level.location_id)
            .collect())
    }
}

/// Logs what would be sent and sends nothing.
#[derive(Debug, Default, Clone)]
pub struct DryRunCatalog;

#[async_trait]
impl CatalogApi for DryRunCatalog {
    async fn update_product(&self, update: &ProductUpdate) -> Result<(), CatalogError> {
        let body = serde_json::to_string_pretty(&ProductEnvelope { product: update })?;
        info!("[dry run] PUT product {}:\n{body}", update.id);
        Ok(())
    }

    async fn update_variant_price(&self, update: &VariantPriceUpdate) -> Result<(), CatalogError> {
        let body = serde_json::to_string(&VariantEnvelope { variant: update })?;
        info!("[dry run] PUT variant {}: {body}", update.id);
        Ok(())
    }
}

fn admin_base_url(shop_name: &str, api_version: &str) -> String {
    format!("https://{shop_name}.myshopify.com/admin/api/{api_version}")
}

fn is_retryable(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

/// Wait before the next attempt. A valid `Retry-After` (seconds, possibly fractional)
/// wins, capped at `MAX_RETRY_AFTER`; otherwise 1s after the first attempt, 2s after the second.
fn retry_delay(attempt: u32, retry_after: Option<&str>) -> Duration {
    retry_after
        .and_then(|value| value.trim().parse::<f64>().ok())
        .filter(|secs| secs.is_finite() && *secs >= 0.0)
        .map(|secs| Duration::from_secs_f64(secs).min(MAX_RETRY_AFTER))
        .unwrap_or_else(|| Duration::from_millis(1000 << attempt.saturating_sub(1).min(4)))
}

fn api_error(status: StatusCode, body: String) -> CatalogError {
    CatalogError::Api {
        status: status.as_u16(),
        message: api_error_message(body),
    }
}

/// Prefers the `errors` field of an API error body, falling back to the raw text.
fn api_error_message(body: String) -> String {
    match serde_json::from_str::<ShopifyErrorBody>(&body) {
        Ok(parsed) => match parsed.errors {
            serde_json::Value::String(s) => s,
            other => other.to_string(),
        },
        Err(_) => body,
    }
}
