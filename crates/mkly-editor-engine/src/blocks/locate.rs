use indexmap::IndexMap;
use serde::Serialize;

use crate::lines::{LineKind, STYLE_BLOCK_TYPE, classify_line, is_special_block_type, split_lines};

use super::property_cluster;

/// The block enclosing a cursor line, derived fresh from the text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CursorBlock {
    pub block_type: String,
    /// 1-based line of the block header.
    pub start_line: usize,
    /// 1-based line of the next header or closing tag, `line_count + 1` at EOF.
    pub end_line: usize,
    /// Property cluster in source order; `@`-prefixed keys keep their prefix.
    pub properties: IndexMap<String, String>,
    /// `use`, `meta`, `theme` and `preset` blocks.
    pub is_special: bool,
    /// Instance label, or the header argument of a special block.
    pub label: Option<String>,
}

impl CursorBlock {
    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    /// Properties carrying an inline per-instance style override (`@key`).
    pub fn inline_styles(&self) -> impl Iterator<Item = (&str, &str)> {
        self.properties
            .iter()
            .filter_map(|(k, v)| k.strip_prefix('@').map(|k| (k, v.as_str())))
    }
}

/// Finds the block enclosing `cursor_line` (1-based, may exceed the document).
///
/// Returns `None` for an empty source, a cursor above the first header, or a
/// cursor inside a `--- style` block (styles go through the style graph).
pub fn locate_block(text: &str, cursor_line: usize) -> Option<CursorBlock> {
    if text.is_empty() || cursor_line == 0 {
        return None;
    }

    let lines = split_lines(text);
    let last_line = lines.len();
    let from = cursor_line.min(last_line);

    let (start_line, block_type, label) = (1..=from).rev().find_map(|line| {
        match classify_line(lines[line - 1]) {
            LineKind::Header { block_type, label } => Some((line, block_type, label)),
            _ => None,
        }
    })?;

    if block_type == STYLE_BLOCK_TYPE {
        return None;
    }

    let scan_from = cursor_line.max(start_line) + 1;
    let end_line = (scan_from..=last_line)
        .find(|&line| classify_line(lines[line - 1]).is_boundary())
        .unwrap_or(last_line + 1);

    let properties = property_cluster(&lines, start_line, end_line)
        .into_iter()
        .map(|p| (p.key.to_string(), p.value.to_string()))
        .collect();

    Some(CursorBlock {
        block_type: block_type.to_string(),
        start_line,
        end_line,
        properties,
        is_special: is_special_block_type(block_type),
        label: label.map(str::to_string),
    })
}
