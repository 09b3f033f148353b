//! Read side of the catalog: product listing pages and inventory levels.

use serde::Deserialize;

/// Page size for product listing requests. The admin API maximum.
pub const PAGE_LIMIT: u32 = 250;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProductListing {
    pub id: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub variants: Vec<VariantListing>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct VariantListing {
    pub id: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub price: Option<String>,
    #[serde(default)]
    pub inventory_item_id: Option<u64>,
}

/// One page of products plus the URL of the next page, if any.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductPage {
    pub products: Vec<ProductListing>,
    pub next_page: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ProductsResponse {
    #[serde(default)]
    pub products: Vec<ProductListing>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct InventoryLevelsResponse {
    #[serde(default)]
    pub inventory_levels: Vec<InventoryLevel>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct InventoryLevel {
    pub location_id: Option<u64>,
}

/// Pulls the `rel="next"` target out of a `Link` header.
///
/// `<https://…?page_info=abc>; rel="previous", <https://…?page_info=def>; rel="next"`
pub fn next_page_url(link_header: &str) -> Option<String> {
    link_header.split(',').find_map(|entry| {
        let mut parts = entry.split(';');
        let target = parts.next()?.trim();
        let is_next = parts.any(|param| {
            param
                .trim()
                .strip_prefix("rel=")
                .map(|rel| rel.trim_matches('"') == "next")
                .unwrap_or(false)
        });
        if !is_next {
            return None;
        }
        target
            .strip_prefix('<')
            .and_then(|t| t.strip_suffix('>'))
            .filter(|url| !url.is_empty())
            .map(str::to_string)
    })
}
