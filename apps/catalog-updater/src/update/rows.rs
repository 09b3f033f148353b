//! CSV row source: one `ProductRow` per product.

use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, Trim};
use serde::Deserialize;
use thiserror::Error;
use tracing::info;

use crate::errors::AppError;

/// Problems confined to a single row. The batch logs them and moves on.
#[derive(Debug, Error, PartialEq)]
pub enum RowError {
    #[error("invalid {column} '{value}': expected a numeric id")]
    InvalidId { column: &'static str, value: String },

    #[error("invalid price '{0}': expected a decimal number")]
    InvalidPrice(String),
}

/// One CSV row. Every column is optional; missing columns and blank cells read as `None`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ProductRow {
    pub product_id: Option<String>,
    pub variant_id: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub tags: Option<String>,
    pub price: Option<String>,
    pub image_links: Option<String>,
}

impl ProductRow {
    pub fn title(&self) -> Option<&str> {
        cell(&self.title)
    }

    pub fn description(&self) -> Option<&str> {
        cell(&self.description)
    }

    pub fn tags(&self) -> Option<&str> {
        cell(&self.tags)
    }

    pub fn image_links(&self) -> Option<&str> {
        cell(&self.image_links)
    }

    /// `None` when the cell is blank.
    pub fn product_id(&self) -> Option<Result<u64, RowError>> {
        cell(&self.product_id).map(|raw| parse_id("product_id", raw))
    }

    pub fn variant_id(&self) -> Option<Result<u64, RowError>> {
        cell(&self.variant_id).map(|raw| parse_id("variant_id", raw))
    }

    /// The price as written, once it is known to be a number.
    pub fn price(&self) -> Option<Result<&str, RowError>> {
        cell(&self.price).map(|raw| {
            raw.parse::<f64>()
                .ok()
                .filter(|p| p.is_finite() && *p >= 0.0)
                .map(|_| raw)
                .ok_or_else(|| RowError::InvalidPrice(raw.to_string()))
        })
    }
}

fn cell(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Accepts `123` and the spreadsheet export form `123.0`.
fn parse_id(column: &'static str, raw: &str) -> Result<u64, RowError> {
    let digits = raw.strip_suffix(".0").unwrap_or(raw);
    digits.parse::<u64>().map_err(|_| RowError::InvalidId {
        column,
        value: raw.to_string(),
    })
}

/// Reads every row of a CSV file with a header row.
pub fn read_rows(path: &Path) -> Result<Vec<ProductRow>, AppError> {
    let file = std::fs::File::open(path)?;
    let rows = parse_rows(file)?;
    info!("Read {} rows from {}", rows.len(), path.display());
    Ok(rows)
}

/// Parses CSV content. Any malformed record fails the whole file, before anything is sent.
pub fn parse_rows<R: Read>(reader: R) -> Result<Vec<ProductRow>, AppError> {
    let mut reader = ReaderBuilder::new()
        .trim(Trim::Headers)
        .flexible(true)
        .from_reader(reader);

    let mut rows = Vec::new();
    for result in reader.deserialize::<ProductRow>() {
        rows.push(result?);
    }
    Ok(rows)
}
