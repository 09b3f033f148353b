// Catalog update driver: CSV rows in, per-field product and price updates out.
// Which fields are touched is decided by `UpdateFlags`, fixed for the whole run.

pub mod driver;
pub mod images;
pub mod rows;

use serde::Serialize;
use tracing::info;

pub use driver::run_batch;
pub use rows::read_rows;

/// Which product fields a run updates, and whether descriptions go through the template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UpdateFlags {
    pub update_title: bool,
    pub update_description: bool,
    pub update_tags: bool,
    pub update_price: bool,
    pub update_images: bool,
    pub use_template: bool,
}

impl Default for UpdateFlags {
    fn default() -> Self {
        Self {
            update_title: true,
            update_description: true,
            update_tags: true,
            update_price: false,
            update_images: false,
            use_template: true,
        }
    }
}

fn status(enabled: bool) -> &'static str {
    if enabled {
        "ENABLED"
    } else {
        "DISABLED"
    }
}

/// Logs the run configuration before anything is sent.
pub fn log_flags(flags: &UpdateFlags) {
    info!("Update configuration:");
    info!("  Title:       {}", status(flags.update_title));
    info!("  Description: {}", status(flags.update_description));
    if flags.update_description {
        info!("    Template formatting: {}", status(flags.use_template));
    }
    info!("  Tags:        {}", status(flags.update_tags));
    info!("  Price:       {}", status(flags.update_price));
    info!("  Images:      {}", status(flags.update_images));
}
