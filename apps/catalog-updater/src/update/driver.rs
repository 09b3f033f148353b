//! Batch driver: walks the CSV rows and sends the enabled field updates.
//!
//! Per row: product update (title / description / tags / images, whichever are
//! enabled and present), then the variant price update. A failing row is logged
//! and counted; the batch always runs to the end.

use std::time::Duration;

use serde::Serialize;
use tracing::{info, warn};

use crate::catalog::{CatalogApi, ProductUpdate, VariantPriceUpdate};
use crate::description::{prepare_description, ParseWarning};
use crate::update::images::image_sources;
use crate::update::rows::{ProductRow, RowError};
use crate::update::UpdateFlags;

// ────────────────────────────────────────────────────────────────────────────
// Types
// ────────────────────────────────────────────────────────────────────────────

/// Product update for one row, with any warnings from formatting its description.
#[derive(Debug, Clone)]
pub struct ProductPlan {
    pub update: ProductUpdate,
    pub description_warnings: Vec<ParseWarning>,
}

/// Counts for the end-of-run report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub rows: usize,
    pub products_updated: usize,
    /// Rows with a product id but no enabled, non-blank field.
    pub products_skipped: usize,
    pub products_failed: usize,
    pub prices_updated: usize,
    pub prices_failed: usize,
    pub description_warnings: usize,
}

impl BatchSummary {
    pub fn has_failures(&self) -> bool {
        self.products_failed > 0 || self.prices_failed > 0
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Payload construction
// ────────────────────────────────────────────────────────────────────────────

/// Builds the product update for a row. A field is included only when its flag
/// is on and its cell is non-blank.
pub fn build_product_update(product_id: u64, row: &ProductRow, flags: &UpdateFlags) -> ProductPlan {
    let mut update = ProductUpdate::new(product_id);
    let mut description_warnings = Vec::new();

    if flags.update_title {
        update.title = row.title().map(str::to_string);
    }

    if flags.update_description {
        if let Some(raw) = row.description() {
            let (body, warnings) = prepare_description(raw, flags.use_template);
            update.body_html = Some(body.into_owned());
            description_warnings = warnings;
        }
    }

    if flags.update_tags {
        update.tags = row.tags().map(str::to_string);
    }

    if flags.update_images {
        if let Some(links) = row.image_links() {
            update.images = image_sources(links);
        }
    }

    ProductPlan {
        update,
        description_warnings,
    }
}

/// Builds the price update for a row, if price updates are enabled and the row has both
/// a variant id and a price.
pub fn build_price_update(
    row: &ProductRow,
    flags: &UpdateFlags,
) -> Option<Result<VariantPriceUpdate, RowError>> {
    if !flags.update_price {
        return None;
    }

    let (variant_id, price) = (row.variant_id()?, row.price()?);
    Some(variant_id.and_then(|id| {
        price.map(|price| VariantPriceUpdate {
            id,
            price: price.to_string(),
        })
    }))
}

// ────────────────────────────────────────────────────────────────────────────
// Batch loop
// ────────────────────────────────────────────────────────────────────────────

/// Runs every row against the catalog. Sleeps `delay` between rows.
pub async fn run_batch(
    catalog: &dyn CatalogApi,
    rows: &[ProductRow],
    flags: &UpdateFlags,
    delay: Duration,
) -> BatchSummary {
    let mut summary = BatchSummary::default();

    for (idx, row) in rows.iter().enumerate() {
        if idx > 0 && !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        let row_no = idx + 1;
        summary.rows += 1;

        match row.product_id() {
            None => {}
            Some(Err(e)) => {
                warn!("Row {row_no}: {e}; product update skipped");
                summary.products_failed += 1;
            }
            Some(Ok(product_id)) => {
                let plan = build_product_update(product_id, row, flags);
                summary.description_warnings += plan.description_warnings.len();
                send_product_update(catalog, row_no, &plan.update, &mut summary).await;
            }
        }

        match build_price_update(row, flags) {
            None => {}
            Some(Err(e)) => {
                warn!("Row {row_no}: {e}; price update skipped");
                summary.prices_failed += 1;
            }
            Some(Ok(update)) => match catalog.update_variant_price(&update).await {
                Ok(()) => {
                    info!("Row {row_no}: variant {} price set to {}", update.id, update.price);
                    summary.prices_updated += 1;
                }
                Err(e) => {
                    warn!("Row {row_no}: failed to update variant {}: {e}", update.id);
                    summary.prices_failed += 1;
                }
            },
        }
    }

    info!(
        "Batch complete: {} rows, {} products updated, {} skipped, {} failed; {} prices updated, {} failed",
        summary.rows,
        summary.products_updated,
        summary.products_skipped,
        summary.products_failed,
        summary.prices_updated,
        summary.prices_failed
    );

    summary
}

async fn send_product_update(
    catalog: &dyn CatalogApi,
    row_no: usize,
    update: &ProductUpdate,
    summary: &mut BatchSummary,
) {
    if !update.has_changes() {
        info!("Row {row_no}: product {} skipped (no fields enabled for update)", update.id);
        summary.products_skipped += 1;
        return;
    }

    match catalog.update_product(update).await {
        Ok(()) => {
            info!(
                "Row {row_no}: product {} updated ({})",
                update.id,
                update.changed_fields().join(", ")
            );
            summary.products_updated += 1;
        }
        Err(e) => {
            warn!("Row {row_no}: failed to update product {}: {e}", update.id);
            summary.products_failed += 1;
        }
    }
}
