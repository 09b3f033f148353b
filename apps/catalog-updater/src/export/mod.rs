// Product export: pages through the catalog and flattens it to one CSV row per variant.
// The output supplies the product and variant ids the update CSV needs.

pub mod writer;

use std::time::Duration;

use tracing::{info, warn};

use crate::catalog::{CatalogError, CatalogReader, ProductListing};

pub use writer::{write_export, ExportRow};

/// Follows `next_page` links until the catalog reports no more pages.
pub async fn fetch_all_products(reader: &dyn CatalogReader) -> Result<Vec<ProductListing>, CatalogError> {
    let mut products = Vec::new();
    let mut page_url: Option<String> = None;

    loop {
        let page = reader.list_products(page_url.as_deref()).await?;
        info!(
            "Fetched {} products (total so far: {})",
            page.products.len(),
            products.len() + page.products.len()
        );
        products.extend(page.products);

        match page.next_page {
            Some(next) if page_url.as_deref() != Some(next.as_str()) => page_url = Some(next),
            Some(next) => {
                warn!("Next page link repeats the current page ({next}); stopping");
                break;
            }
            None => break,
        }
    }

    Ok(products)
}

/// Flattens products to export rows. With `with_locations`, each product's
/// inventory locations are looked up once, from its first variant, and shared
/// by all its rows; a failed lookup leaves the column blank.
pub async fn export_rows(
    reader: &dyn CatalogReader,
    products: &[ProductListing],
    with_locations: bool,
    delay: Duration,
) -> Vec<ExportRow> {
    let mut rows = Vec::new();
    let mut lookups = 0usize;

    for product in products {
        if product.variants.is_empty() {
            rows.push(ExportRow {
                product_id: product.id,
                product_title: product.title.clone(),
                ..ExportRow::default()
            });
            continue;
        }

        let inventory_item = product.variants[0].inventory_item_id;
        let location_ids = match inventory_item {
            Some(item_id) if with_locations => {
                if lookups > 0 && !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                lookups += 1;
                match reader.inventory_location_ids(item_id).await {
                    Ok(ids) => join_ids(&ids),
                    Err(e) => {
                        warn!("Product {}: location lookup failed: {e}", product.id);
                        String::new()
                    }
                }
            }
            _ => String::new(),
        };

        for variant in &product.variants {
            rows.push(ExportRow {
                product_id: product.id,
                product_title: product.title.clone(),
                variant_id: Some(variant.id),
                variant_title: Some(variant.title.clone()),
                variant_sku: variant.sku.clone(),
                variant_price: variant.price.clone(),
                location_ids: location_ids.clone(),
            });
        }
    }

    rows
}

fn join_ids(ids: &[u64]) -> String {
    ids.iter()
        .map(u64::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::catalog::listing::VariantListing;
    use crate::catalog::ProductPage;

    /// Serves pages keyed by the requested page URL (`""` for the first page).
    #[derive(Default)]
    struct FakeCatalog {
        pages: HashMap<String, ProductPage>,
        locations: HashMap<u64, Vec<u64>>,
        page_requests: Mutex<Vec<Option<String>>>,
        location_requests: Mutex<Vec<u64>>,
    }

    #[async_trait]
    impl CatalogReader for FakeCatalog {
        async fn list_products(&self, page: Option<&str>) -> Result<ProductPage, CatalogError> {
            self.page_requests
                .lock()
                .unwrap()
                .push(page.map(str::to_string));
            self.pages
                .get(page.unwrap_or(""))
                .cloned()
                .ok_or_else(|| CatalogError::Api {
                    status: 404,
                    message: "no such page".to_string(),
                })
        }

        async fn inventory_location_ids(&self, inventory_item_id: u64) -> Result<Vec<u64>, CatalogError> {
            self.location_requests.lock().unwrap().push(inventory_item_id);
            self.locations
                .get(&inventory_item_id)
                .cloned()
                .ok_or_else(|| CatalogError::Api {
                    status: 500,
                    message: "boom".to_string(),
                })
        }
    }

    fn variant(id: u64, title: &str, inventory_item_id: u64) -> VariantListing {
        VariantListing {
            id,
            title: title.to_string(),
            sku: Some(format!("SKU-{id}")),
            price: Some("49.99".to_string()),
            inventory_item_id: Some(inventory_item_id),
        }
    }

    fn product(id: u64, title: &str, variants: Vec<VariantListing>) -> ProductListing {
        ProductListing {
            id,
            title: title.to_string(),
            variants,
        }
    }

    fn page(products: Vec<ProductListing>, next: Option<&str>) -> ProductPage {
        ProductPage {
            products,
            next_page: next.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_fetch_all_products_follows_next_links() {
        let mut catalog = FakeCatalog::default();
        catalog
            .pages
            .insert(String::new(), page(vec![product(1, "A", vec![])], Some("p2")));
        catalog
            .pages
            .insert("p2".to_string(), page(vec![product(2, "B", vec![])], Some("p3")));
        catalog
            .pages
            .insert("p3".to_string(), page(vec![product(3, "C", vec![])], None));

        let products = fetch_all_products(&catalog).await.unwrap();
        let ids: Vec<u64> = products.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(
            *catalog.page_requests.lock().unwrap(),
            vec![None, Some("p2".to_string()), Some("p3".to_string())]
        );
    }

    #[tokio::test]
    async fn test_fetch_all_products_stops_on_repeated_link() {
        let mut catalog = FakeCatalog::default();
        catalog
            .pages
            .insert(String::new(), page(vec![product(1, "A", vec![])], Some("p2")));
        catalog
            .pages
            .insert("p2".to_string(), page(vec![product(2, "B", vec![])], Some("p2")));

        let products = fetch_all_products(&catalog).await.unwrap();
        assert_eq!(products.len(), 2);
        assert_eq!(catalog.page_requests.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_fetch_all_products_propagates_page_error() {
        let mut catalog = FakeCatalog::default();
        catalog
            .pages
            .insert(String::new(), page(vec![product(1, "A", vec![])], Some("missing")));

        let err = fetch_all_products(&catalog).await.unwrap_err();
        assert!(matches!(err, CatalogError::Api { status: 404, .. }));
    }

    #[tokio::test]
    async fn test_export_rows_one_per_variant() {
        let catalog = FakeCatalog::default();
        let products = vec![
            product(1, "Dress", vec![variant(10, "S", 100), variant(11, "M", 101)]),
            product(2, "Gift Card", vec![]),
        ];

        let rows = export_rows(&catalog, &products, false, Duration::ZERO).await;
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].variant_id, Some(10));
        assert_eq!(rows[0].variant_sku.as_deref(), Some("SKU-10"));
        assert_eq!(rows[1].variant_title.as_deref(), Some("M"));
        assert_eq!(
            rows[2],
            ExportRow {
                product_id: 2,
                product_title: "Gift Card".to_string(),
                ..ExportRow::default()
            }
        );
        assert!(rows.iter().all(|row| row.location_ids.is_empty()));
        assert!(catalog.location_requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_export_rows_looks_up_locations_once_per_product() {
        let mut catalog = FakeCatalog::default();
        catalog.locations.insert(100, vec![7, 8]);
        let products = vec![
            product(1, "Dress", vec![variant(10, "S", 100), variant(11, "M", 101)]),
            product(2, "Skirt", vec![variant(20, "One Size", 200)]),
        ];

        let rows = export_rows(&catalog, &products, true, Duration::ZERO).await;
        assert_eq!(rows[0].location_ids, "7, 8");
        assert_eq!(rows[1].location_ids, "7, 8");
        // lookup for item 200 fails; column left blank
        assert_eq!(rows[2].location_ids, "");
        assert_eq!(*catalog.location_requests.lock().unwrap(), vec![100, 200]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_export_rows_waits_between_location_lookups() {
        let mut catalog = FakeCatalog::default();
        catalog.locations.insert(100, vec![1]);
        catalog.locations.insert(200, vec![2]);
        catalog.locations.insert(300, vec![3]);
        let products = vec![
            product(1, "A", vec![variant(10, "S", 100)]),
            product(2, "B", vec![variant(20, "S", 200)]),
            product(3, "C", vec![variant(30, "S", 300)]),
        ];

        let start = tokio::time::Instant::now();
        export_rows(&catalog, &products, true, Duration::from_millis(300)).await;
        assert!(start.elapsed() >= Duration::from_millis(600));
    }
}
