//! Template Renderer: turns a `ParsedDescription` into the product-page HTML.
//!
//! Pure: the same record always renders to the same bytes.

use crate::description::section::{KeyValueLine, ParsedDescription, SectionContent, SectionKind};

/// Order sections are emitted in, independent of the order markers appeared in the input.
/// The delivery table always follows.
pub const CANONICAL_ORDER: [SectionKind; 5] = [
    SectionKind::ShortDesc,
    SectionKind::WhyLove,
    SectionKind::SizeFit,
    SectionKind::FabricCare,
    SectionKind::WhatsIncluded,
];

/// Placed between sections. Never leading or trailing.
pub const SEPARATOR: &str = "\n<hr>\n";

/// One row of the delivery table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeliveryOption {
    pub method: &'static str,
    pub cost: &'static str,
    pub delivery_time: &'static str,
}

/// Shipping options shown on every product. Not derived from input.
pub const DELIVERY_OPTIONS: [DeliveryOption; 4] = [
    DeliveryOption {
        method: "Ordinary",
        cost: "£4.00",
        delivery_time: "7–15 days",
    },
    DeliveryOption {
        method: "Ordinary Plus",
        cost: "£5.00",
        delivery_time: "5–11 days",
    },
    DeliveryOption {
        method: "Ordinary Fast",
        cost: "£6.14",
        delivery_time: "4–9 days",
    },
    DeliveryOption {
        method: "DHL Express",
        cost: "£39.56",
        delivery_time: "3–7 days",
    },
];

const DELIVERY_HEADING: &str = "Delivery Details";
const DELIVERY_INTRO: &str =
    "Delivery times to Europe (including UK) depend on the shipping method selected:";

// ────────────────────────────────────────────────────────────────────────────
// Rendering
// ────────────────────────────────────────────────────────────────────────────

/// Renders the description HTML: present sections in canonical order, then the delivery table.
pub fn render_html(parsed: &ParsedDescription) -> String {
    let mut blocks: Vec<String> = CANONICAL_ORDER
        .iter()
        .filter_map(|&kind| {
            parsed
                .get(kind)
                .filter(|content| !content.is_empty())
                .map(|content| render_section(kind, content))
        })
        .collect();

    blocks.push(render_delivery_table());
    blocks.join(SEPARATOR)
}

/// Heading text for sections that carry one. Already HTML-safe.
fn heading(kind: SectionKind) -> Option<&'static str> {
    match kind {
        SectionKind::ShortDesc => None,
        SectionKind::WhyLove => Some("Why You'll Love It:"),
        SectionKind::SizeFit => Some("Size &amp; Fit:"),
        SectionKind::FabricCare => Some("Fabric &amp; Care:"),
        SectionKind::WhatsIncluded => Some("What's Included:"),
    }
}

fn render_section(kind: SectionKind, content: &SectionContent) -> String {
    let mut out = String::new();
    if let Some(title) = heading(kind) {
        out.push_str(&format!("<h3>{title}</h3>\n"));
    }

    match content {
        SectionContent::Text(text) => {
            let body = text
                .lines()
                .map(escape_html)
                .collect::<Vec<_>>()
                .join("<br>\n");
            out.push_str(&format!("<p>{body}</p>"));
        }
        SectionContent::Pairs(pairs) => {
            out.push_str("<ul>\n");
            for pair in pairs {
                out.push_str(&render_pair(pair));
                out.push('\n');
            }
            out.push_str("</ul>");
        }
        SectionContent::Lines(lines) => {
            out.push_str("<ul>\n");
            for line in lines {
                out.push_str(&format!("  <li>{}</li>\n", escape_html(line)));
            }
            out.push_str("</ul>");
        }
    }

    out
}

/// `Label: Value`, or just `Label:` when there is no value.
fn render_pair(pair: &KeyValueLine) -> String {
    let label = escape_html(&pair.label);
    if pair.value.is_empty() {
        format!("  <li><strong>{label}:</strong></li>")
    } else {
        format!(
            "  <li><strong>{label}:</strong> {}</li>",
            escape_html(&pair.value)
        )
    }
}

fn render_delivery_table() -> String {
    let mut out = String::new();
    out.push_str(&format!("<h3>{DELIVERY_HEADING}</h3>\n"));
    out.push_str(&format!("<p>{DELIVERY_INTRO}</p>\n"));
    out.push_str("<table>\n");
    out.push_str("  <thead>\n");
    out.push_str("    <tr>\n");
    out.push_str("      <th>Shipping Method</th>\n");
    out.push_str("      <th>Shipping Cost</th>\n");
    out.push_str("      <th>Estimated Delivery Time</th>\n");
    out.push_str("    </tr>\n");
    out.push_str("  </thead>\n");
    out.push_str("  <tbody>\n");
    for option in &DELIVERY_OPTIONS {
        out.push_str("    <tr>\n");
        out.push_str(&format!("      <td>{}</td>\n", option.method));
        out.push_str(&format!("      <td>{}</td>\n", option.cost));
        out.push_str(&format!("      <td>{}</td>\n", option.delivery_time));
        out.push_str("    </tr>\n");
    }
    out.push_str("  </tbody>\n");
    out.push_str("</table>");
    out
}

/// Escapes text for use in element content.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::description::parser::parse_description;

    fn render(raw: &str) -> String {
        render_html(&parse_description(raw).description)
    }

    /// Undoes `escape_html`, for pulling text back out of rendered markup.
    fn unescape(text: &str) -> String {
        text.replace("&lt;", "<")
            .replace("&gt;", ">")
            .replace("&quot;", "\"")
            .replace("&amp;", "&")
    }

    /// Extracts `(label, value)` from every `<li><strong>` line in the HTML.
    fn extract_pairs(html: &str) -> Vec<(String, String)> {
        html.lines()
            .filter_map(|line| {
                let rest = line.trim().strip_prefix("<li><strong>")?;
                let (label, rest) = rest.split_once(":</strong>")?;
                let value = rest.strip_suffix("</li>")?.trim();
                Some((unescape(label), unescape(value)))
            })
            .collect()
    }

    #[test]
    fn test_no_sections_renders_only_delivery_table() {
        let html = render("no markers here");
        assert_eq!(html, render_delivery_table());
        assert!(!html.contains("<hr>"));
    }

    #[test]
    fn test_empty_input_renders_only_delivery_table() {
        assert_eq!(render(""), render_delivery_table());
    }

    #[test]
    fn test_delivery_table_identical_for_every_input() {
        let table = render_delivery_table();
        for raw in [
            "[SHORT_DESC]\nA dress.",
            "[WHY_LOVE]\nFit: Mermaid\n[SIZE_FIT]\nLength: Midi",
            "[FABRIC_CARE]\nFabric: <Silk> & Lace\n[WHATS_INCLUDED]\n1 x Dress",
            "[NOTES]\nignored\n[SHORT_DESC]\nHi.",
        ] {
            let html = render(raw);
            assert!(html.ends_with(&format!("{SEPARATOR}{table}")), "{raw}");
            assert_eq!(html.matches("Delivery Details").count(), 1);
        }
    }

    #[test]
    fn test_empty_content_in_hand_built_record_is_skipped() {
        let mut parsed = ParsedDescription::default();
        parsed
            .sections
            .insert(SectionKind::ShortDesc, SectionContent::Text("Hello.".to_string()));
        parsed
            .sections
            .insert(SectionKind::WhyLove, SectionContent::Pairs(Vec::new()));
        parsed
            .sections
            .insert(SectionKind::WhatsIncluded, SectionContent::Lines(Vec::new()));
        parsed
            .sections
            .insert(SectionKind::SizeFit, SectionContent::Text(String::new()));

        let html = render_html(&parsed);
        assert_eq!(
            html,
            format!("<p>Hello.</p>{SEPARATOR}{}", render_delivery_table())
        );
        assert!(!html.contains("<ul>"));
    }

    #[test]
    fn test_delivery_table_has_four_fixed_rows() {
        let table = render_delivery_table();
        assert_eq!(table.matches("<tr>").count(), 5); // header + 4 rows
        for option in &DELIVERY_OPTIONS {
            assert!(table.contains(option.method));
            assert!(table.contains(option.cost));
            assert!(table.contains(option.delivery_time));
        }
        assert!(table.contains("DHL Express"));
        assert!(table.contains("£39.56"));
    }

    #[test]
    fn test_short_desc_and_size_fit_example() {
        let html =
            render("[SHORT_DESC]\nA lovely dress.\n\n[SIZE_FIT]\nFit Type: Bodycon\nLength: Floor-Length");

        assert!(html.starts_with("<p>A lovely dress.</p>"));
        assert!(html.contains("<h3>Size &amp; Fit:</h3>"));
        assert!(html.contains("<li><strong>Fit Type:</strong> Bodycon</li>"));
        assert!(html.contains("<li><strong>Length:</strong> Floor-Length</li>"));
        assert!(!html.contains("Why You'll Love It"));
        assert!(!html.contains("Fabric &amp; Care"));
        assert!(!html.contains("What's Included"));
        assert!(html.contains("Delivery Details"));
        // short desc | size fit | delivery
        assert_eq!(html.matches("<hr>").count(), 2);
    }

    #[test]
    fn test_separator_never_leading_or_trailing() {
        let html = render("[WHY_LOVE]\nFit: Mermaid");
        assert!(!html.starts_with("<hr>"));
        assert!(!html.trim_end().ends_with("<hr>"));
        assert!(html.starts_with("<h3>Why You'll Love It:</h3>"));
        assert!(html.ends_with("</table>"));
    }

    #[test]
    fn test_canonical_order_regardless_of_input_order() {
        let raw = "[WHATS_INCLUDED]\n1 x Dress\n[FABRIC_CARE]\nFabric: Silk\n[SIZE_FIT]\nLength: Midi\n[WHY_LOVE]\nFit: Mermaid\n[SHORT_DESC]\nHello.";
        let html = render(raw);

        let positions: Vec<usize> = [
            "<p>Hello.</p>",
            "Why You'll Love It:",
            "Size &amp; Fit:",
            "Fabric &amp; Care:",
            "What's Included:",
            "Delivery Details",
        ]
        .iter()
        .map(|needle| html.find(needle).unwrap())
        .collect();

        let mut sorted = positions.clone();
        sorted.sort();
        assert_eq!(positions, sorted);
        assert_eq!(html.matches("<hr>").count(), 5);
    }

    #[test]
    fn test_empty_value_renders_label_only() {
        let html = render("[WHY_LOVE]\nMermaid fit");
        assert!(html.contains("<li><strong>Mermaid fit:</strong></li>"));
    }

    #[test]
    fn test_whats_included_renders_list_items() {
        let html = render("[WHATS_INCLUDED]\n1 x Dress\n1 x Belt");
        assert!(html.contains("<h3>What's Included:</h3>\n<ul>\n  <li>1 x Dress</li>\n  <li>1 x Belt</li>\n</ul>"));
    }

    #[test]
    fn test_short_desc_line_breaks_become_br() {
        let html = render("[SHORT_DESC]\nLine one.\nLine two.");
        assert!(html.starts_with("<p>Line one.<br>\nLine two.</p>"));
    }

    #[test]
    fn test_user_text_is_escaped() {
        let html = render("[FABRIC_CARE]\nFabric: <b>Silk</b> & Lace");
        assert!(html.contains("<li><strong>Fabric:</strong> &lt;b&gt;Silk&lt;/b&gt; &amp; Lace</li>"));
    }

    #[test]
    fn test_unknown_sections_are_not_rendered() {
        let html = render("[INTERNAL_NOTES]\nsupplier: acme\n[SHORT_DESC]\nHi.");
        assert!(!html.contains("acme"));
        assert!(html.starts_with("<p>Hi.</p>"));
    }

    #[test]
    fn test_rendering_is_idempotent() {
        let parsed = parse_description(
            "[SHORT_DESC]\nA dress.\n[WHY_LOVE]\nFit: Mermaid\n[WHATS_INCLUDED]\n1 x Dress",
        )
        .description;
        assert_eq!(render_html(&parsed), render_html(&parsed));
    }

    #[test]
    fn test_key_values_round_trip_through_markup() {
        let raw = "[WHY_LOVE]\nStyle: Lace & straps\nFit: Mermaid\n[SIZE_FIT]\nLength: Floor-Length\n[FABRIC_CARE]\nFabric: 95% Polyester, 5% Elastane\nCare: Hand wash: cold";
        let parsed = parse_description(raw).description;
        let html = render_html(&parsed);

        let expected: Vec<(String, String)> = [SectionKind::WhyLove, SectionKind::SizeFit, SectionKind::FabricCare]
            .iter()
            .flat_map(|&kind| parsed.pairs(kind).unwrap().to_vec())
            .map(|kv| (kv.label, kv.value))
            .collect();

        assert_eq!(extract_pairs(&html), expected);
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("a & b"), "a &amp; b");
        assert_eq!(escape_html("<x>"), "&lt;x&gt;");
        assert_eq!(escape_html("\"q\""), "&quot;q&quot;");
        assert_eq!(escape_html("It's fine"), "It's fine");
    }
}
