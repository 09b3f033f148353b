//! Section types: the structured record produced by the parser and consumed by the renderer.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

/// One of the five recognized description sections.
///
/// Variant order is the canonical render order, so a `BTreeMap` keyed on
/// `SectionKind` iterates in the same order the renderer emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SectionKind {
    ShortDesc,
    WhyLove,
    SizeFit,
    FabricCare,
    WhatsIncluded,
}

/// How the body of a section is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentShape {
    Paragraph,
    KeyValue,
    Lines,
}

impl SectionKind {
    pub const ALL: [SectionKind; 5] = [
        SectionKind::ShortDesc,
        SectionKind::WhyLove,
        SectionKind::SizeFit,
        SectionKind::FabricCare,
        SectionKind::WhatsIncluded,
    ];

    /// The exact text between the brackets of this section's marker.
    pub fn marker(self) -> &'static str {
        match self {
            SectionKind::ShortDesc => "SHORT_DESC",
            SectionKind::WhyLove => "WHY_LOVE",
            SectionKind::SizeFit => "SIZE_FIT",
            SectionKind::FabricCare => "FABRIC_CARE",
            SectionKind::WhatsIncluded => "WHATS_INCLUDED",
        }
    }

    /// Case-sensitive lookup of a marker name.
    pub fn from_marker(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.marker() == name)
    }

    pub fn shape(self) -> ContentShape {
        match self {
            SectionKind::ShortDesc => ContentShape::Paragraph,
            SectionKind::WhyLove | SectionKind::SizeFit | SectionKind::FabricCare => {
                ContentShape::KeyValue
            }
            SectionKind::WhatsIncluded => ContentShape::Lines,
        }
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.marker())
    }
}

/// A `Label: Value` line. `value` is empty when the source line had no colon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyValueLine {
    pub label: String,
    pub value: String,
}

impl KeyValueLine {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "content", rename_all = "snake_case")]
pub enum SectionContent {
    Text(String),
    Pairs(Vec<KeyValueLine>),
    Lines(Vec<String>),
}

/// A bracketed section whose name is not one of the recognized kinds.
/// Kept so callers can inspect it; never rendered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnknownSection {
    pub name: String,
    pub lines: Vec<String>,
}

/// Parsed form of one product's description text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParsedDescription {
    pub sections: BTreeMap<SectionKind, SectionContent>,
    pub unknown_sections: Vec<UnknownSection>,
}

impl SectionContent {
    /// True when there is nothing to render. The parser never produces this,
    /// but a hand-built record can.
    pub fn is_empty(&self) -> bool {
        match self {
            SectionContent::Text(text) => text.trim().is_empty(),
            SectionContent::Pairs(pairs) => pairs.is_empty(),
            SectionContent::Lines(lines) => lines.is_empty(),
        }
    }
}

impl ParsedDescription {
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn get(&self, kind: SectionKind) -> Option<&SectionContent> {
        self.sections.get(&kind)
    }
}

#[cfg(test)]
impl ParsedDescription {
    pub fn contains(&self, kind: SectionKind) -> bool {
        self.sections.contains_key(&kind)
    }

    pub fn short_desc(&self) -> Option<&str> {
        match self.get(SectionKind::ShortDesc) {
            Some(SectionContent::Text(text)) => Some(text),
            _ => None,
        }
    }

    pub fn pairs(&self, kind: SectionKind) -> Option<&[KeyValueLine]> {
        match self.get(kind) {
            Some(SectionContent::Pairs(pairs)) => Some(pairs),
            _ => None,
        }
    }

    pub fn whats_included(&self) -> Option<&[String]> {
        match self.get(SectionKind::WhatsIncluded) {
            Some(SectionContent::Lines(lines)) => Some(lines),
            _ => None,
        }
    }
}

/// What went wrong on a line. None of these stop the parse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WarningKind {
    /// Bracketed uppercase name that is not a known section.
    UnknownMarker { name: String },
    /// Key/value line with no colon; kept as a label-only entry.
    MissingColon { section: SectionKind, text: String },
    /// Bracketed line that is not all-uppercase, e.g. `[short_desc]`.
    MalformedMarker { text: String },
    /// A second marker for a section already seen. The later block wins.
    DuplicateSection { section: SectionKind },
    /// Text before the first recognized marker.
    StrayContent,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParseWarning {
    /// 1-based line number in the raw text.
    pub line: usize,
    #[serde(flatten)]
    pub kind: WarningKind,
}

impl fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: ", self.line)?;
        match &self.kind {
            WarningKind::UnknownMarker { name } => {
                write!(f, "unknown section marker [{name}] ignored")
            }
            WarningKind::MissingColon { section, text } => write!(
                f,
                "no ':' in {section} line '{text}', kept as label without value"
            ),
            WarningKind::MalformedMarker { text } => write!(
                f,
                "'{text}' looks like a section marker but markers must be uppercase; treated as text"
            ),
            WarningKind::DuplicateSection { section } => {
                write!(f, "{section} appears more than once; last occurrence wins")
            }
            WarningKind::StrayContent => {
                write!(f, "text outside any section marker ignored")
            }
        }
    }
}

/// Result of parsing: always a record, plus whatever was degraded along the way.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParseOutcome {
    pub description: ParsedDescription,
    pub warnings: Vec<ParseWarning>,
}
