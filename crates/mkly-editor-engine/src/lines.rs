//! Line utilities shared by every text patch.
//!
//! The document is addressed by 1-based line numbers everywhere outside this
//! crate. Lines are split on `\n` only, so `join_lines(&split_lines(t)) == t`
//! holds for any input, including a trailing newline (which yields a final
//! empty line).

use regex::Regex;
use std::sync::OnceLock;

/// Block types that are never styled and never carry a label target.
pub const RESERVED_BLOCK_TYPES: [&str; 5] = ["style", "meta", "use", "theme", "preset"];

/// The block type whose body holds the style sub-language.
pub const STYLE_BLOCK_TYPE: &str = "style";

/// Shape of a single source line, decided from local facts only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind<'a> {
    /// `--- type` or `--- type: label`
    Header {
        block_type: &'a str,
        label: Option<&'a str>,
    },
    /// `--- /type`
    CloseTag { block_type: &'a str },
    /// `key: value` or `@key: value`
    Property {
        indent: &'a str,
        key: &'a str,
        value: &'a str,
    },
    Blank,
    Content,
}

impl LineKind<'_> {
    /// Headers and closing tags both end the block above them.
    pub fn is_boundary(&self) -> bool {
        matches!(self, LineKind::Header { .. } | LineKind::CloseTag { .. })
    }

    pub fn is_blank(&self) -> bool {
        matches!(self, LineKind::Blank)
    }

    pub fn is_property(&self) -> bool {
        matches!(self, LineKind::Property { .. })
    }
}

fn header_regex() -> &'static Regex {
    static HEADER_REGEX: OnceLock<Regex> = OnceLock::new();
    HEADER_REGEX.get_or_init(|| {
        Regex::new(r"^---\s+(/)?([A-Za-z0-9_][\w.\-/]*)(?:\s*:\s*(.*?))?\s*$")
            .expect("Invalid header regex")
    })
}

fn property_regex() -> &'static Regex {
    static PROPERTY_REGEX: OnceLock<Regex> = OnceLock::new();
    PROPERTY_REGEX.get_or_init(|| {
        // Lazy key: the first colon followed by whitespace (or end of line)
        // separates key from value, so `@link:hover: red` keys on `@link:hover`.
        Regex::new(r"^(\s*)(@?[A-Za-z_][A-Za-z0-9_.\-/:+]*?):(?:\s+(.*?))?\s*$")
            .expect("Invalid property regex")
    })
}

/// Classifies one line. Total: every input maps to exactly one variant.
pub fn classify_line(line: &str) -> LineKind<'_> {
    let line = line.strip_suffix('\r').unwrap_or(line);
    if line.trim().is_empty() {
        return LineKind::Blank;
    }

    if let Some(caps) = header_regex().captures(line) {
        let block_type = caps.get(2).map_or("", |m| m.as_str());
        if caps.get(1).is_some() {
            return LineKind::CloseTag { block_type };
        }
        let label = caps
            .get(3)
            .map(|m| m.as_str())
            .filter(|label| !label.is_empty());
        return LineKind::Header { block_type, label };
    }

    if let Some(caps) = property_regex().captures(line) {
        return LineKind::Property {
            indent: caps.get(1).map_or("", |m| m.as_str()),
            key: caps.get(2).map_or("", |m| m.as_str()),
            value: caps.get(3).map_or("", |m| m.as_str()),
        };
    }

    LineKind::Content
}

pub fn is_special_block_type(block_type: &str) -> bool {
    RESERVED_BLOCK_TYPES.contains(&block_type)
}

pub fn split_lines(text: &str) -> Vec<&str> {
    text.split('\n').collect()
}

pub fn join_lines<S: AsRef<str>>(lines: &[S]) -> String {
    let mut out = String::new();
    for (i, line) in lines.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        out.push_str(line.as_ref());
    }
    out
}

/// Number of lines as seen by 1-based callers.
pub fn line_count(text: &str) -> usize {
    text.split('\n').count()
}

/// Signed difference in line count between two texts.
pub fn line_delta(before: &str, after: &str) -> isize {
    line_count(after) as isize - line_count(before) as isize
}
