//! # Block Access
//!
//! Reads and writes one block of a mkly document straight from the text.
//! Nothing here keeps a parse tree: every call re-scans the lines it needs.
//!
//! - **`locate`**: finds the block around a cursor line and its properties
//! - **`properties`**: adds, updates, or removes one property line
//!
//! ## Property cluster
//!
//! Properties sit at the top of a block, directly under the header. The
//! cluster runs over property lines and the blank lines between them; the
//! first content line (or a blank run followed by content) ends it. Body text
//! that happens to look like `Note: something` after the first paragraph line
//! is therefore never read or rewritten as a property.

pub mod locate;
pub mod properties;

pub use locate::{CursorBlock, locate_block};
pub use properties::patch_property;

use crate::lines::{LineKind, classify_line};

/// One property line inside a block's cluster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PropertyLine<'a> {
    /// 1-based line number.
    pub line: usize,
    pub indent: &'a str,
    pub key: &'a str,
    pub value: &'a str,
}

/// Collects the property cluster of the block spanning `[start_line, end_line)`.
pub(crate) fn property_cluster<'a>(
    lines: &[&'a str],
    start_line: usize,
    end_line: usize,
) -> Vec<PropertyLine<'a>> {
    let end_line = end_line.min(lines.len() + 1);
    let mut cluster: Vec<PropertyLine<'a>> = Vec::new();
    let mut line = start_line + 1;
    while line < end_line {
        match classify_line(lines[line - 1]) {
            LineKind::Property { indent, key, value } => {
                cluster.push(PropertyLine {
                    line,
                    indent,
                    key,
                    value,
                });
                line += 1;
            }
            LineKind::Blank => {
                // Keep going only when the blank run leads to another property.
                match (line..end_line).find(|&l| !classify_line(lines[l - 1]).is_blank()) {
                    Some(next) if classify_line(lines[next - 1]).is_property() => line = next,
                    _ => break,
                }
            }
            _ => break,
        }
    }
    cluster
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lines::split_lines;
    use pretty_assertions::assert_eq;

    fn keys(text: &str, end_line: usize) -> Vec<(usize, String)> {
        property_cluster(&split_lines(text), 1, end_line)
            .into_iter()
            .map(|p| (p.line, p.key.to_string()))
            .collect()
    }

    #[test]
    fn cluster_spans_blank_lines_between_properties() {
        let text = "--- core/image\nsrc: a.png\n\nalt: A cat\n\nCaption: below\n--- core/text\nHi";
        assert_eq!(
            keys(text, 7),
            vec![
                (2, "src".to_string()),
                (4, "alt".to_string()),
                (6, "Caption".to_string()),
            ]
        );
    }

    #[test]
    fn content_ends_the_cluster() {
        let text = "--- core/text\n\nsize: 2\n\nIntro\nNote: read this";
        assert_eq!(keys(text, 7), vec![(3, "size".to_string())]);
        assert!(keys("--- core/text\nHello\nsize: 2", 4).is_empty());
    }
}
