//! Section Parser: splits a raw description field into its bracket-delimited sections.
//!
//! Never fails. Anything malformed degrades locally (label-only entries, ignored
//! blocks) and is reported as a `ParseWarning`, so one bad row cannot stop a batch.

use std::collections::BTreeSet;

use crate::description::section::{
    ContentShape, KeyValueLine, ParseOutcome, ParseWarning, SectionContent, SectionKind,
    UnknownSection, WarningKind,
};

/// Classification of a single raw line.
#[derive(Debug, PartialEq)]
enum LineKind<'a> {
    /// `[NAME]` with NAME made only of `A-Z`, `0-9`, `_`.
    Marker(&'a str),
    /// Bracketed word that would be a marker if it were uppercase.
    LowercaseMarker,
    Content,
}

#[derive(Debug)]
enum BlockTarget {
    Known(SectionKind),
    Unknown(String),
}

/// Lines collected since the last marker, with their 1-based line numbers.
#[derive(Debug)]
struct Block<'a> {
    target: BlockTarget,
    lines: Vec<(usize, &'a str)>,
}

/// Parses a raw description into sections plus non-fatal warnings.
pub fn parse_description(raw: &str) -> ParseOutcome {
    let mut outcome = ParseOutcome::default();
    let mut seen: BTreeSet<SectionKind> = BTreeSet::new();
    let mut current: Option<Block> = None;
    let mut stray_reported = false;

    for (idx, line) in raw.lines().enumerate() {
        let line_no = idx + 1;

        match classify_line(line) {
            LineKind::Marker(name) => {
                if let Some(block) = current.take() {
                    close_block(block, &mut outcome);
                }
                let target = match SectionKind::from_marker(name) {
                    Some(kind) => {
                        if !seen.insert(kind) {
                            outcome.warnings.push(ParseWarning {
                                line: line_no,
                                kind: WarningKind::DuplicateSection { section: kind },
                            });
                        }
                        BlockTarget::Known(kind)
                    }
                    None => {
                        outcome.warnings.push(ParseWarning {
                            line: line_no,
                            kind: WarningKind::UnknownMarker {
                                name: name.to_string(),
                            },
                        });
                        BlockTarget::Unknown(name.to_string())
                    }
                };
                current = Some(Block {
                    target,
                    lines: Vec::new(),
                });
                continue;
            }
            LineKind::LowercaseMarker => {
                outcome.warnings.push(ParseWarning {
                    line: line_no,
                    kind: WarningKind::MalformedMarker {
                        text: line.trim().to_string(),
                    },
                });
            }
            LineKind::Content => {}
        }

        match current.as_mut() {
            Some(block) => block.lines.push((line_no, line)),
            None => {
                if !stray_reported && !line.trim().is_empty() {
                    outcome.warnings.push(ParseWarning {
                        line: line_no,
                        kind: WarningKind::StrayContent,
                    });
                    stray_reported = true;
                }
            }
        }
    }

    if let Some(block) = current.take() {
        close_block(block, &mut outcome);
    }

    outcome
}

fn classify_line(line: &str) -> LineKind<'_> {
    let trimmed = line.trim();
    let Some(inner) = trimmed
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
    else {
        return LineKind::Content;
    };

    if inner.is_empty() {
        return LineKind::Content;
    }

    if inner
        .chars()
        .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
    {
        return LineKind::Marker(inner);
    }

    let marker_like = inner
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_');
    if marker_like && inner.chars().any(|c| c.is_ascii_lowercase()) {
        LineKind::LowercaseMarker
    } else {
        LineKind::Content
    }
}

/// Drops leading and trailing blank lines.
fn trim_blank_edges<'b, 'a>(lines: &'b [(usize, &'a str)]) -> &'b [(usize, &'a str)] {
    let is_blank = |(_, text): &(usize, &str)| text.trim().is_empty();
    let Some(start) = lines.iter().position(|l| !is_blank(l)) else {
        return &[];
    };
    // A non-blank line exists, so rposition always finds one.
    let end = lines.iter().rposition(|l| !is_blank(l)).unwrap_or(start);
    &lines[start..=end]
}

fn close_block(block: Block<'_>, outcome: &mut ParseOutcome) {
    let body = trim_blank_edges(&block.lines);

    let kind = match block.target {
        BlockTarget::Known(kind) => kind,
        BlockTarget::Unknown(name) => {
            outcome.description.unknown_sections.push(UnknownSection {
                name,
                lines: non_blank(body).map(|(_, text)| text.to_string()).collect(),
            });
            return;
        }
    };

    // Last occurrence wins, including an empty one.
    if body.is_empty() {
        outcome.description.sections.remove(&kind);
        return;
    }

    let content = match kind.shape() {
        ContentShape::Paragraph => SectionContent::Text(
            body.iter()
                .map(|(_, text)| text.trim_end())
                .collect::<Vec<_>>()
                .join("\n")
                .trim()
                .to_string(),
        ),
        ContentShape::KeyValue => SectionContent::Pairs(
            non_blank(body)
                .map(|(line_no, text)| parse_key_value(kind, line_no, text, &mut outcome.warnings))
                .collect(),
        ),
        ContentShape::Lines => {
            SectionContent::Lines(non_blank(body).map(|(_, text)| text.to_string()).collect())
        }
    };

    outcome.description.sections.insert(kind, content);
}

/// Non-blank lines of a block, trimmed.
fn non_blank<'b, 'a: 'b>(
    lines: &'b [(usize, &'a str)],
) -> impl Iterator<Item = (usize, &'a str)> + 'b {
    lines
        .iter()
        .map(|&(line_no, text)| (line_no, text.trim()))
        .filter(|(_, text)| !text.is_empty())
}

fn parse_key_value(
    section: SectionKind,
    line_no: usize,
    text: &str,
    warnings: &mut Vec<ParseWarning>,
) -> KeyValueLine {
    match text.split_once(':') {
        Some((label, value)) => KeyValueLine::new(label.trim(), value.trim()),
        None => {
            warnings.push(ParseWarning {
                line: line_no,
                kind: WarningKind::MissingColon {
                    section,
                    text: text.to_string(),
                },
            });
            KeyValueLine::new(text, "")
        }
    }
}
