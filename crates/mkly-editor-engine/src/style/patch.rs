use crate::error::EditError;
use crate::lines::{LineKind, classify_line, is_special_block_type, join_lines, line_delta, split_lines};

use super::model::StyleGraph;
use super::parser::find_style_block;
use super::serializer::{SerializeOptions, serialize_style_graph_with};

const STYLE_HEADER: &str = "--- style";

/// One style-property change requested by the inspector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleEdit {
    pub block_type: String,
    pub target: String,
    pub property: String,
    /// Empty removes the property.
    pub value: String,
    pub label: Option<String>,
}

impl StyleEdit {
    pub fn new(
        block_type: impl Into<String>,
        target: impl Into<String>,
        property: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            block_type: block_type.into(),
            target: target.into(),
            property: property.into(),
            value: value.into(),
            label: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

/// Result of a style edit: the new text and graph plus line bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StylePatch {
    pub text: String,
    pub graph: StyleGraph,
    /// New line count minus old line count.
    pub line_delta: isize,
    /// Line numbers held before the edit that are `>= shift_after_line` must
    /// have `line_delta` added to keep pointing at the same text.
    pub shift_after_line: usize,
}

impl StylePatch {
    /// Maps a line number from before the edit to the same text after it.
    pub fn shift_line(&self, line: usize) -> usize {
        if line >= self.shift_after_line {
            line.saturating_add_signed(self.line_delta).max(1)
        } else {
            line
        }
    }
}

/// Applies one style edit with the default serializer settings.
pub fn patch_style(
    source: &str,
    graph: &StyleGraph,
    edit: &StyleEdit,
) -> Result<StylePatch, EditError> {
    patch_style_with(source, graph, edit, &SerializeOptions::default())
}

/// Applies one style edit to both the graph and the `--- style` block.
///
/// The graph is updated first, then serialized whole and written back over
/// the existing style body (or into a new block). Editing to the value a
/// property already has, or deleting one that is absent, leaves the text
/// untouched.
pub fn patch_style_with(
    source: &str,
    graph: &StyleGraph,
    edit: &StyleEdit,
    options: &SerializeOptions,
) -> Result<StylePatch, EditError> {
    let block_type = edit.block_type.trim();
    let target = edit.target.trim();
    let property = edit.property.trim();
    if block_type.is_empty() {
        return Err(EditError::EmptyName("block type"));
    }
    if is_special_block_type(block_type) {
        log::warn!("Refusing to style reserved block type '{block_type}'");
        return Err(EditError::ReservedBlockType(block_type.to_string()));
    }
    if target.is_empty() {
        return Err(EditError::EmptyName("target"));
    }
    if property.is_empty() {
        return Err(EditError::EmptyName("property"));
    }
    let label = edit
        .label
        .as_deref()
        .map(str::trim)
        .filter(|label| !label.is_empty());

    let mut graph = graph.clone();
    let changed = graph.set_property(block_type, target, label, property, edit.value.trim());
    if !changed {
        return Ok(StylePatch {
            text: source.to_string(),
            graph,
            line_delta: 0,
            shift_after_line: split_lines(source).len() + 1,
        });
    }

    let (text, shift_after_line) = write_style_block(source, &graph, options);
    let line_delta = line_delta(source, &text);
    log::debug!(
        "Style edit {block_type}:{target} {property} -> delta {line_delta} from line {shift_after_line}"
    );

    Ok(StylePatch {
        text,
        graph,
        line_delta,
        shift_after_line,
    })
}

/// Writes `graph` into the document's `--- style` block.
///
/// Returns the new text and the first line (1-based, pre-edit numbering)
/// whose position moves. An empty graph removes the block; a missing block is
/// created after the last `--- use:` line, else after a leading `--- meta`
/// block, else at the top of the document.
pub fn write_style_block(
    source: &str,
    graph: &StyleGraph,
    options: &SerializeOptions,
) -> (String, usize) {
    let lines = split_lines(source);
    let body = serialize_style_graph_with(graph, options);
    let body_lines: Vec<&str> = if body.is_empty() {
        Vec::new()
    } else {
        body.split('\n').collect()
    };

    let mut out: Vec<&str> = Vec::with_capacity(lines.len() + body_lines.len() + 2);
    let shift_after_line = match find_style_block(source) {
        Some(range) => {
            let header_idx = range.header_line - 1;
            let body_end_idx = range.body_end - 1;
            if body_lines.is_empty() {
                out.extend(lines[..header_idx].iter().copied());
            } else {
                out.extend(lines[..=header_idx].iter().copied());
                out.extend(body_lines.iter().copied());
            }
            out.extend(lines[body_end_idx..].iter().copied());
            range.body_end
        }
        None if body_lines.is_empty() => return (source.to_string(), lines.len() + 1),
        None => {
            let at = style_insertion_index(&lines);
            out.extend(lines[..at].iter().copied());
            out.push(STYLE_HEADER);
            out.extend(body_lines.iter().copied());
            if lines.get(at).is_some_and(|line| !classify_line(line).is_blank()) {
                out.push("");
            }
            out.extend(lines[at..].iter().copied());
            at + 1
        }
    };

    (join_lines(&out), shift_after_line)
}

/// 0-based index of the line a new `--- style` block is inserted before.
fn style_insertion_index(lines: &[&str]) -> usize {
    if let Some(idx) = lines.iter().rposition(|line| {
        matches!(classify_line(line), LineKind::Header { block_type: "use", .. })
    }) {
        return idx + 1;
    }

    let first_boundary = lines
        .iter()
        .position(|line| classify_line(line).is_boundary());
    if let Some(meta_idx) = first_boundary
        && matches!(
            classify_line(lines[meta_idx]),
            LineKind::Header {
                block_type: "meta",
                ..
            }
        )
    {
        let end = ((meta_idx + 1)..lines.len())
            .find(|&idx| classify_line(lines[idx]).is_boundary())
            .unwrap_or(lines.len());
        let last_filled = ((meta_idx + 1)..end)
            .rev()
            .find(|&idx| !classify_line(lines[idx]).is_blank())
            .unwrap_or(meta_idx);
        return last_filled + 1;
    }

    0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lines::line_count;
    use crate::style::parser::parse_style_graph_from_source;
    use pretty_assertions::assert_eq;

    const DOC: &str = "--- use: core\n\n--- core/heading\nlevel: 2\nTitle";

    fn apply(source: &str, graph: &StyleGraph, edit: StyleEdit) -> StylePatch {
        patch_style(source, graph, &edit).unwrap()
    }

    #[test]
    fn creates_style_block_after_use_line() {
        let patch = apply(
            DOC,
            &StyleGraph::new(),
            StyleEdit::new("core/heading", "self", "color", "#ff0000"),
        );
        assert_eq!(
            patch.text,
            "--- use: core\n--- style\ncore/heading\n  color: #ff0000\n\n--- core/heading\nlevel: 2\nTitle"
        );
        assert_eq!(patch.line_delta, 3);
        assert_eq!(patch.shift_after_line, 2);
        assert_eq!(patch.shift_line(3), 6);
        assert_eq!(patch.shift_line(1), 1);

        let reparsed = parse_style_graph_from_source(&patch.text);
        assert_eq!(
            reparsed.property("core/heading", "self", None, "color"),
            Some("#ff0000")
        );
        assert!(reparsed.same_rules_as(&patch.graph));
    }

    #[test]
    fn set_then_delete_restores_document() {
        let set = apply(
            DOC,
            &StyleGraph::new(),
            StyleEdit::new("core/heading", "self", "color", "#ff0000"),
        );
        let unset = apply(
            &set.text,
            &set.graph,
            StyleEdit::new("core/heading", "self", "color", ""),
        );
        assert!(unset.graph.is_empty());
        assert_eq!(unset.text, DOC);
        assert_eq!(unset.line_delta, -3);
        assert_eq!(set.line_delta + unset.line_delta, 0);
    }

    #[test]
    fn removing_one_of_several_rules_keeps_the_block() {
        let first = apply(
            DOC,
            &StyleGraph::new(),
            StyleEdit::new("core/heading", "self", "color", "red"),
        );
        let second = apply(
            &first.text,
            &first.graph,
            StyleEdit::new("core/heading", "link", "color", "blue"),
        );
        assert_eq!(second.line_delta, 2);
        assert_eq!(second.shift_after_line, 5);

        let third = apply(
            &second.text,
            &second.graph,
            StyleEdit::new("core/heading", "self", "color", ""),
        );
        assert!(third.text.contains("--- style\ncore/heading\n  .link\n    color: blue\n\n"));
        assert!(!third.text.contains("color: red"));
    }

    #[test]
    fn inserts_after_leading_meta_block() {
        let source = "--- meta\ntitle: Weekly\n\n--- core/text\nHi";
        let patch = apply(
            source,
            &StyleGraph::new(),
            StyleEdit::new("core/text", "self", "color", "red"),
        );
        assert_eq!(
            patch.text,
            "--- meta\ntitle: Weekly\n--- style\ncore/text\n  color: red\n\n--- core/text\nHi"
        );
        assert_eq!(patch.shift_after_line, 3);
    }

    #[test]
    fn inserts_at_document_start_with_separator() {
        let source = "--- core/text\nHi";
        let patch = apply(
            source,
            &StyleGraph::new(),
            StyleEdit::new("core/text", "self", "color", "red"),
        );
        assert_eq!(patch.text, "--- style\ncore/text\n  color: red\n\n--- core/text\nHi");
        assert_eq!(patch.line_delta, 4);
        assert_eq!(patch.shift_after_line, 1);
    }

    #[test]
    fn labelled_edits_stay_scoped_to_the_instance() {
        let patch = apply(
            DOC,
            &StyleGraph::new(),
            StyleEdit::new("core/heading", "self", "color", "red").with_label("s1"),
        );
        assert!(patch.text.contains("core/heading:s1\n  color: red"));
        assert_eq!(
            patch.graph.property("core/heading", "self", None, "color"),
            None
        );
    }

    #[test]
    fn edits_survive_a_reparse_with_a_second_style_block() {
        let source = "--- style\ncore/text\n  color: red\n--- core/text\nHi\n--- style\ncore/text\n  color: blue";
        let graph = parse_style_graph_from_source(source);
        let patch = apply(
            source,
            &graph,
            StyleEdit::new("core/text", "self", "color", "green"),
        );
        assert_eq!(
            patch.text,
            "--- style\ncore/text\n  color: green\n--- core/text\nHi\n--- style\ncore/text\n  color: blue"
        );
        assert_eq!(patch.line_delta, 0);

        let reparsed = parse_style_graph_from_source(&patch.text);
        assert_eq!(
            reparsed.property("core/text", "self", None, "color"),
            Some("green")
        );
        assert!(reparsed.same_rules_as(&patch.graph));
    }

    #[test]
    fn rejects_reserved_and_empty_names() {
        let graph = StyleGraph::new();
        assert_eq!(
            patch_style(DOC, &graph, &StyleEdit::new("meta", "self", "color", "red")),
            Err(EditError::ReservedBlockType("meta".to_string()))
        );
        assert_eq!(
            patch_style(DOC, &graph, &StyleEdit::new("core/text", "self", " ", "red")),
            Err(EditError::EmptyName("property"))
        );
    }

    #[test]
    fn no_op_edits_leave_text_alone() {
        let patch = apply(
            DOC,
            &StyleGraph::new(),
            StyleEdit::new("core/heading", "self", "color", ""),
        );
        assert_eq!(patch.text, DOC);
        assert_eq!(patch.line_delta, 0);
    }

    #[test]
    fn deltas_compose_over_a_sequence() {
        let edits = [
            StyleEdit::new("core/heading", "self", "color", "red"),
            StyleEdit::new("core/heading", ">p", "margin", "0"),
            StyleEdit::new("core/text", "self:hover", "color", "blue"),
            StyleEdit::new("core/heading", "self", "color", ""),
            StyleEdit::new("core/heading", ">p", "margin", "4px"),
            StyleEdit::new("core/text", "self:hover", "color", ""),
            StyleEdit::new("core/heading", ">p", "margin", ""),
        ];
        let mut text = DOC.to_string();
        let mut graph = StyleGraph::new();
        let mut total = 0isize;
        let mut heading_line = 3;
        for edit in edits {
            let patch = apply(&text, &graph, edit);
            total += patch.line_delta;
            heading_line = patch.shift_line(heading_line);
            text = patch.text;
            graph = patch.graph;
            assert_eq!(text.split('\n').nth(heading_line - 1), Some("--- core/heading"));
        }
        assert_eq!(total, line_count(&text) as isize - line_count(DOC) as isize);
        assert_eq!(text, DOC);
    }
}
