// Description formatting: section parser and HTML template renderer.
// Both are pure and synchronous; the update driver calls them once per CSV row.

pub mod parser;
pub mod renderer;
pub mod section;

use std::borrow::Cow;

use serde::Serialize;
use tracing::{debug, warn};

pub use parser::parse_description;
pub use renderer::render_html;
pub use section::ParseWarning;

/// Rendered HTML plus whatever the parser had to degrade to produce it.
#[derive(Debug, Clone, Serialize)]
pub struct FormattedDescription {
    pub html: String,
    pub warnings: Vec<ParseWarning>,
}

/// Parses and renders a raw description. Warnings are logged, never fatal.
pub fn format_description(raw: &str) -> FormattedDescription {
    let outcome = parse_description(raw);
    for warning in &outcome.warnings {
        warn!("Description: {warning}");
    }
    if outcome.description.is_empty() && !raw.trim().is_empty() {
        debug!("Description has no recognized sections; rendering delivery details only");
    }

    FormattedDescription {
        html: render_html(&outcome.description),
        warnings: outcome.warnings,
    }
}

/// Applies the template toggle: rendered HTML when enabled, the raw text untouched otherwise.
pub fn prepare_description(raw: &str, use_template: bool) -> (Cow<'_, str>, Vec<ParseWarning>) {
    if !use_template {
        return (Cow::Borrowed(raw), Vec::new());
    }

    let formatted = format_description(raw);
    (Cow::Owned(formatted.html), formatted.warnings)
}
