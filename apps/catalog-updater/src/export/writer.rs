//! CSV sink for the product export. Column order matches what the update CSV is built from.

use std::io::Write;

use csv::WriterBuilder;
use serde::Serialize;

use crate::errors::AppError;

pub const EXPORT_HEADERS: [&str; 7] = [
    "Product ID",
    "Product Title",
    "Variant ID",
    "Variant Title",
    "Variant SKU",
    "Variant Price",
    "Location IDs",
];

/// One output line: a variant, or a product with no variants (variant columns blank).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExportRow {
    pub product_id: u64,
    pub product_title: String,
    pub variant_id: Option<u64>,
    pub variant_title: Option<String>,
    pub variant_sku: Option<String>,
    pub variant_price: Option<String>,
    /// Comma-separated, empty when locations were not requested or not found.
    pub location_ids: String,
}

/// Writes the header and every row. The header is written even with no rows.
/// Returns the number of data rows written.
pub fn write_export<W: Write>(rows: &[ExportRow], sink: W) -> Result<usize, AppError> {
    let mut writer = WriterBuilder::new().has_headers(false).from_writer(sink);
    writer.write_record(EXPORT_HEADERS)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(rows.len())
}
