//! Request bodies for the product and variant endpoints.

use serde::Serialize;

/// Partial product update. Only fields that are `Some` (or non-empty) are sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProductUpdate {
    pub id: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body_html: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<ImageSource>,
}

impl ProductUpdate {
    pub fn new(id: u64) -> Self {
        Self {
            id,
            ..Default::default()
        }
    }

    /// False when the update would carry nothing but the id.
    pub fn has_changes(&self) -> bool {
        self.title.is_some()
            || self.body_html.is_some()
            || self.tags.is_some()
            || !self.images.is_empty()
    }

    /// Names of the fields this update touches, for logging.
    pub fn changed_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.title.is_some() {
            fields.push("title");
        }
        if self.body_html.is_some() {
            fields.push("body_html");
        }
        if self.tags.is_some() {
            fields.push("tags");
        }
        if !self.images.is_empty() {
            fields.push("images");
        }
        fields
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageSource {
    pub src: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariantPriceUpdate {
    pub id: u64,
    pub price: String,
}

/// `{"product": {...}}` envelope.
#[derive(Debug, Serialize)]
pub struct ProductEnvelope<'a> {
    pub product: &'a ProductUpdate,
}

/// `{"variant": {...}}` envelope.
#[derive(Debug, Serialize)]
pub struct VariantEnvelope<'a> {
    pub variant: &'a VariantPriceUpdate,
}
