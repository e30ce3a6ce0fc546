//! `sN` identifiers for block labels and style classes.
//!
//! Labels and classes share one namespace per document. The next number is
//! always derived by scanning the current text, never from a stored counter,
//! so undo/redo can rewind the document freely.

use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

use crate::blocks::property_cluster;
use crate::lines::{
    LineKind, STYLE_BLOCK_TYPE, classify_line, is_special_block_type, join_lines, split_lines,
};

fn identifier_scan_regex() -> &'static Regex {
    static IDENTIFIER_SCAN_REGEX: OnceLock<Regex> = OnceLock::new();
    IDENTIFIER_SCAN_REGEX.get_or_init(|| {
        Regex::new(r"(?:^|[^A-Za-z0-9_\-])s(\d+)\b").expect("Invalid identifier scan regex")
    })
}

fn identifier_regex() -> &'static Regex {
    static IDENTIFIER_REGEX: OnceLock<Regex> = OnceLock::new();
    IDENTIFIER_REGEX.get_or_init(|| Regex::new(r"^s\d+$").expect("Invalid identifier regex"))
}

fn class_annotation_regex() -> &'static Regex {
    static CLASS_ANNOTATION_REGEX: OnceLock<Regex> = OnceLock::new();
    CLASS_ANNOTATION_REGEX
        .get_or_init(|| Regex::new(r"\{\s*\.[^}]*\}\s*$").expect("Invalid annotation regex"))
}

fn html_open_tag_regex() -> &'static Regex {
    static HTML_OPEN_TAG_REGEX: OnceLock<Regex> = OnceLock::new();
    HTML_OPEN_TAG_REGEX.get_or_init(|| {
        Regex::new(r"^(\s*<[A-Za-z][\w-]*)([^>]*?)(\s*/?>)").expect("Invalid open tag regex")
    })
}

fn class_attribute_regex() -> &'static Regex {
    static CLASS_ATTRIBUTE_REGEX: OnceLock<Regex> = OnceLock::new();
    CLASS_ATTRIBUTE_REGEX.get_or_init(|| {
        Regex::new(r#"(\bclass\s*=\s*")([^"]*)(")"#).expect("Invalid class attribute regex")
    })
}

/// Whether `name` has the `sN` shape.
pub fn is_identifier(name: &str) -> bool {
    identifier_regex().is_match(name)
}

fn identifier_numbers(source: &str) -> impl Iterator<Item = u64> + '_ {
    identifier_scan_regex()
        .captures_iter(source)
        .filter_map(|caps| caps.get(1)?.as_str().parse::<u64>().ok())
}

/// Highest `N` of any `sN` anywhere in the source (labels, annotations,
/// class attributes, style selectors).
pub fn max_identifier(source: &str) -> Option<u64> {
    identifier_numbers(source).max()
}

/// The next unused identifier, `s<max+1>` (`s1` for a fresh document).
/// When `max` is already `u64::MAX` the lowest free number is used instead.
pub fn next_identifier(source: &str) -> String {
    let next = match max_identifier(source) {
        None => 1,
        Some(max) => max
            .checked_add(1)
            .unwrap_or_else(|| lowest_free_identifier(source)),
    };
    format!("s{next}")
}

fn lowest_free_identifier(source: &str) -> u64 {
    let used: HashSet<u64> = identifier_numbers(source).collect();
    // One more candidate than there are used numbers always leaves a gap.
    (1..=used.len() as u64 + 1)
        .find(|n| !used.contains(n))
        .unwrap_or(1)
}

/// A fresh style class name; same namespace as [`generate_block_label`].
pub fn generate_style_class(source: &str) -> String {
    next_identifier(source)
}

/// A fresh block label; same namespace as [`generate_style_class`].
pub fn generate_block_label(source: &str) -> String {
    next_identifier(source)
}

fn split_carriage_return(line: &str) -> (&str, &str) {
    match line.strip_suffix('\r') {
        Some(stripped) => (stripped, "\r"),
        None => (line, ""),
    }
}

/// Annotates a content line with `{.class_name}`.
///
/// When `content_line` is blank or a header, the nearest content line above
/// it is used. Verbatim HTML lines get a `class` attribute on their first tag
/// instead. Returns `None` when the line already carries a class, when the
/// scan lands in a property cluster or a style block, or when no content
/// line is found.
pub fn inject_class(source: &str, content_line: usize, class_name: &str) -> Option<String> {
    let lines = split_lines(source);
    let from = content_line.min(lines.len());

    let target = (1..=from).rev().find_map(|line| match classify_line(lines[line - 1]) {
        LineKind::Blank | LineKind::Header { .. } | LineKind::CloseTag { .. } => None,
        kind => Some((line, kind)),
    })?;
    let (line_no, kind) = target;
    let header = (1..line_no).rev().find_map(|line| match classify_line(lines[line - 1]) {
        LineKind::Header { block_type, .. } => Some((line, block_type)),
        _ => None,
    });
    if let Some((header_line, block_type)) = header {
        if block_type == STYLE_BLOCK_TYPE {
            return None;
        }
        if kind.is_property()
            && property_cluster(&lines, header_line, lines.len() + 1)
                .iter()
                .any(|p| p.line == line_no)
        {
            log::debug!("Line {line_no} is a property line; no class injected");
            return None;
        }
    }

    let (line, cr) = split_carriage_return(lines[line_no - 1]);
    let annotated = if html_open_tag_regex().is_match(line) {
        add_class_attribute(line, class_name)?
    } else {
        if class_annotation_regex().is_match(line) {
            return None;
        }
        format!("{} {{.{class_name}}}", line.trim_end())
    };

    let mut out: Vec<String> = lines.iter().map(|l| l.to_string()).collect();
    out[line_no - 1] = format!("{annotated}{cr}");
    log::debug!("Injected class '{class_name}' on line {line_no}");
    Some(join_lines(&out))
}

fn add_class_attribute(line: &str, class_name: &str) -> Option<String> {
    let caps = html_open_tag_regex().captures(line)?;
    let whole = caps.get(0)?;
    let (tag, attrs, close) = (caps.get(1)?.as_str(), caps.get(2)?.as_str(), caps.get(3)?.as_str());
    let rest = &line[whole.end()..];

    let attrs = match class_attribute_regex().captures(attrs) {
        Some(class_caps) => {
            let existing = class_caps.get(2)?.as_str();
            if existing.split_whitespace().any(is_identifier) {
                return None;
            }
            let merged = if existing.trim().is_empty() {
                class_name.to_string()
            } else {
                format!("{} {class_name}", existing.trim_end())
            };
            class_attribute_regex()
                .replace(attrs, |c: &regex::Captures| format!("{}{merged}{}", &c[1], &c[3]))
                .into_owned()
        }
        None => format!(" class=\"{class_name}\"{attrs}"),
    };
    Some(format!("{tag}{attrs}{close}{rest}"))
}

/// Appends `: label` to the block header on `header_line`.
///
/// Returns `None` when the line is not an opening header, already has a
/// label, or belongs to a reserved block type.
pub fn inject_label(source: &str, header_line: usize, label: &str) -> Option<String> {
    let lines = split_lines(source);
    let line = *lines.get(header_line.checked_sub(1)?)?;
    match classify_line(line) {
        LineKind::Header {
            block_type,
            label: None,
        } if !is_special_block_type(block_type) => {}
        _ => return None,
    }

    let (line, cr) = split_carriage_return(line);
    let mut out: Vec<String> = lines.iter().map(|l| l.to_string()).collect();
    out[header_line - 1] = format!("{}: {label}{cr}", line.trim_end());
    log::debug!("Labelled block at line {header_line} as '{label}'");
    Some(join_lines(&out))
}
