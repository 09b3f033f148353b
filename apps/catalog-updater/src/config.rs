use anyhow::{bail, Context, Result};

use crate::update::UpdateFlags;

const DEFAULT_API_VERSION: &str = "2025-01";
const DEFAULT_CSV_FILE: &str = "products_to_update.csv";
const DEFAULT_REQUEST_DELAY_MS: u64 = 800;

/// Store credentials. Only needed when updates are actually sent.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub shop_name: String,
    pub access_token: String,
}

/// Application configuration loaded from environment variables (and `.env` if present).
#[derive(Debug, Clone)]
pub struct Config {
    pub credentials: Option<Credentials>,
    pub api_version: String,
    pub csv_file: String,
    pub flags: UpdateFlags,
    pub request_delay_ms: u64,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let credentials = match (optional_env("SHOP_NAME"), optional_env("SHOPIFY_ACCESS_TOKEN")) {
            (Some(shop_name), Some(access_token)) => Some(Credentials {
                shop_name,
                access_token,
            }),
            _ => None,
        };

        let defaults = UpdateFlags::default();
        let flags = UpdateFlags {
            update_title: bool_env("UPDATE_TITLE", defaults.update_title)?,
            update_description: bool_env("UPDATE_DESCRIPTION", defaults.update_description)?,
            update_tags: bool_env("UPDATE_TAGS", defaults.update_tags)?,
            update_price: bool_env("UPDATE_PRICE", defaults.update_price)?,
            update_images: bool_env("UPDATE_IMAGES", defaults.update_images)?,
            use_template: bool_env("USE_TEMPLATE", defaults.use_template)?,
        };

        Ok(Config {
            credentials,
            api_version: optional_env("SHOPIFY_API_VERSION")
                .unwrap_or_else(|| DEFAULT_API_VERSION.to_string()),
            csv_file: optional_env("CSV_FILE").unwrap_or_else(|| DEFAULT_CSV_FILE.to_string()),
            flags,
            request_delay_ms: match optional_env("REQUEST_DELAY_MS") {
                Some(raw) => raw
                    .parse::<u64>()
                    .context("REQUEST_DELAY_MS must be a whole number of milliseconds")?,
                None => DEFAULT_REQUEST_DELAY_MS,
            },
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }

    /// Credentials, or an error naming the missing variables.
    pub fn require_credentials(&self) -> Result<&Credentials> {
        self.credentials.as_ref().with_context(|| {
            "Required environment variables 'SHOP_NAME' and 'SHOPIFY_ACCESS_TOKEN' are not set"
                .to_string()
        })
    }
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn bool_env(key: &str, default: bool) -> Result<bool> {
    match optional_env(key) {
        Some(raw) => parse_bool(&raw).with_context(|| format!("Invalid value for '{key}'")),
        None => Ok(default),
    }
}

fn parse_bool(raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        other => bail!("expected true/false, got '{other}'"),
    }
}
