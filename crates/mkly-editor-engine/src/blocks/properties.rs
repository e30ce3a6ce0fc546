use crate::lines::{LineKind, classify_line, join_lines, split_lines};

use super::{locate_block, property_cluster};

/// Sets, replaces, or removes (`value == ""`) the property `key` of the block
/// whose header sits on `start_line`.
///
/// Only lines inside `[start_line, end_line)` are touched. The range is
/// re-validated against the text first: a stale `end_line` that reaches into
/// the next block is clamped, and a `start_line` that is no longer a block
/// header leaves the text unchanged.
pub fn patch_property(
    text: &str,
    start_line: usize,
    end_line: usize,
    key: &str,
    value: &str,
) -> String {
    let Some(block) = locate_block(text, start_line).filter(|b| b.start_line == start_line)
    else {
        log::warn!("No block header at line {start_line}; property '{key}' not patched");
        return text.to_string();
    };
    let end_line = end_line.min(block.end_line);

    let value = value.replace(['\r', '\n'], " ");
    let value = value.trim();

    let lines = split_lines(text);
    let cluster = property_cluster(&lines, start_line, end_line);
    let mut out: Vec<String> = lines.iter().map(|line| line.to_string()).collect();

    if let Some(existing) = cluster.iter().find(|p| p.key == key) {
        if value.is_empty() {
            log::debug!("Removing property '{key}' at line {}", existing.line);
            out.remove(existing.line - 1);
        } else {
            log::debug!("Replacing property '{key}' at line {}", existing.line);
            out[existing.line - 1] = format!("{}{key}: {value}", existing.indent);
        }
        return join_lines(&out);
    }

    if value.is_empty() {
        return text.to_string();
    }

    // 0-based index where the new line goes: right after the cluster, or right
    // after the header for a block without properties.
    let insert_at = cluster.last().map_or(start_line, |p| p.line);
    out.insert(insert_at, format!("{key}: {value}"));

    // The line that used to follow the insertion point is now one further down.
    let following_line = insert_at + 1;
    let needs_separator = following_line < end_line
        && lines
            .get(insert_at)
            .is_some_and(|line| matches!(classify_line(line), LineKind::Content));
    if needs_separator {
        out.insert(insert_at + 1, String::new());
    }

    log::debug!(
        "Inserted property '{key}' at line {} (separator: {needs_separator})",
        insert_at + 1
    );
    join_lines(&out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    const DOC: &str = "--- core/heading\nlevel: 2\n\nTitle\n--- core/text\nBody\n";

    #[test]
    fn replaces_existing_value() {
        let out = patch_property(DOC, 1, 5, "level", "3");
        assert_eq!(out, "--- core/heading\nlevel: 3\n\nTitle\n--- core/text\nBody\n");
    }

    #[test]
    fn appends_to_property_cluster() {
        let out = patch_property(DOC, 1, 5, "align", "center");
        assert_eq!(
            out,
            "--- core/heading\nlevel: 2\nalign: center\n\nTitle\n--- core/text\nBody\n"
        );
    }

    #[test]
    fn inserts_separator_before_body_content() {
        let out = patch_property(DOC, 5, 8, "@color", "red");
        assert_eq!(
            out,
            "--- core/heading\nlevel: 2\n\nTitle\n--- core/text\n@color: red\n\nBody\n"
        );
    }

    #[test]
    fn no_separator_before_next_header() {
        let text = "--- core/divider\n--- core/text\nBody";
        let out = patch_property(text, 1, 2, "size", "small");
        assert_eq!(out, "--- core/divider\nsize: small\n--- core/text\nBody");
    }

    #[test]
    fn replaces_property_after_a_blank_line() {
        let text = "--- core/image\nsrc: a.png\n\nalt: A cat\n--- core/text\nHi";
        let out = patch_property(text, 1, 5, "alt", "A dog");
        assert_eq!(out, "--- core/image\nsrc: a.png\n\nalt: A dog\n--- core/text\nHi");

        let added = patch_property(text, 1, 5, "width", "80");
        assert_eq!(
            added,
            "--- core/image\nsrc: a.png\n\nalt: A cat\nwidth: 80\n--- core/text\nHi"
        );
    }

    #[test]
    fn deletes_with_empty_value() {
        let out = patch_property(DOC, 1, 5, "level", "");
        assert_eq!(out, "--- core/heading\n\nTitle\n--- core/text\nBody\n");
    }

    #[test]
    fn deleting_missing_key_is_a_no_op() {
        assert_eq!(patch_property(DOC, 1, 5, "missing", ""), DOC);
    }

    #[rstest]
    #[case("@link:hover", "blue")]
    #[case("image.alt", "A cat")]
    #[case("@padding-top", "4px")]
    #[case("src/fallback", "none")]
    fn targeted_keys_round_trip(#[case] key: &str, #[case] value: &str) {
        let once = patch_property(DOC, 1, 5, key, value);
        let block = locate_block(&once, 1).unwrap();
        assert_eq!(block.property(key), Some(value));
        assert_eq!(patch_property(&once, 1, block.end_line, key, value), once);
    }

    #[test]
    fn stale_end_line_is_clamped_to_the_block() {
        let out = patch_property(DOC, 1, 99, "align", "left");
        assert!(out.ends_with("--- core/text\nBody\n"));
        assert_eq!(locate_block(&out, 6).unwrap().properties.len(), 0);
    }

    #[test]
    fn start_line_not_on_header_is_ignored() {
        assert_eq!(patch_property(DOC, 2, 5, "level", "9"), DOC);
    }

    #[test]
    fn multiline_values_are_folded() {
        let out = patch_property(DOC, 1, 5, "alt", "two\nlines");
        assert!(out.contains("alt: two lines\n"));
    }
}
