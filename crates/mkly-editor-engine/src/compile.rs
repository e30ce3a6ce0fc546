//! The seam between the editing engine and whatever turns mkly source into
//! HTML. The engine only needs the style graph and a source map back from a
//! compile; rendering stays with the host.

use serde::Serialize;

use crate::lines::{LineKind, STYLE_BLOCK_TYPE, classify_line, split_lines};
use crate::style::{StyleGraph, parse_style_graph_from_source};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    /// 1-based source line.
    pub line: usize,
    pub message: String,
}

/// Where one block's source lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceMapEntry {
    pub block_type: String,
    pub label: Option<String>,
    pub start_line: usize,
    /// Exclusive.
    pub end_line: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CompileOutput {
    pub html: String,
    pub errors: Vec<Diagnostic>,
    pub source_map: Vec<SourceMapEntry>,
    pub style_graph: StyleGraph,
}

impl CompileOutput {
    pub fn has_errors(&self) -> bool {
        self.errors
            .iter()
            .any(|diagnostic| diagnostic.severity == Severity::Error)
    }

    /// The innermost source map entry covering `line`.
    pub fn block_at(&self, line: usize) -> Option<&SourceMapEntry> {
        self.source_map
            .iter()
            .filter(|entry| line >= entry.start_line && line < entry.end_line)
            .max_by_key(|entry| entry.start_line)
    }
}

pub trait Compiler {
    fn compile(&self, source: &str) -> CompileOutput;
}

/// Derives the style graph and block map without rendering anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct StyleOnlyCompiler;

impl Compiler for StyleOnlyCompiler {
    fn compile(&self, source: &str) -> CompileOutput {
        let (source_map, errors) = map_blocks(source);
        CompileOutput {
            html: String::new(),
            errors,
            source_map,
            style_graph: parse_style_graph_from_source(source),
        }
    }
}

/// One entry per header, ending at the next header or closing tag. Closing
/// tags are matched against open containers; stray ones become warnings, as
/// does every `--- style` block after the first.
fn map_blocks(source: &str) -> (Vec<SourceMapEntry>, Vec<Diagnostic>) {
    let lines = split_lines(source);
    let mut entries: Vec<SourceMapEntry> = Vec::new();
    let mut errors = Vec::new();
    let mut open: Vec<&str> = Vec::new();

    for (idx, line) in lines.iter().enumerate() {
        let line_no = idx + 1;
        let kind = classify_line(line);
        if !kind.is_boundary() {
            continue;
        }
        if let Some(previous) = entries.last_mut()
            && previous.end_line > line_no
        {
            previous.end_line = line_no;
        }

        match kind {
            LineKind::Header { block_type, label } => {
                if block_type != STYLE_BLOCK_TYPE {
                    open.push(block_type);
                } else if entries.iter().any(|e| e.block_type == STYLE_BLOCK_TYPE) {
                    errors.push(Diagnostic {
                        severity: Severity::Warning,
                        line: line_no,
                        message: "Only the first '--- style' block is used".to_string(),
                    });
                }
                entries.push(SourceMapEntry {
                    block_type: block_type.to_string(),
                    label: label.map(str::to_string),
                    start_line: line_no,
                    end_line: lines.len() + 1,
                });
            }
            LineKind::CloseTag { block_type } => match open.iter().rposition(|t| *t == block_type) {
                Some(pos) => open.truncate(pos),
                None => {
                    log::debug!("Stray closing tag for '{block_type}' at line {line_no}");
                    errors.push(Diagnostic {
                        severity: Severity::Warning,
                        line: line_no,
                        message: format!("Closing tag '--- /{block_type}' has no open block"),
                    });
                }
            },
            _ => {}
        }
    }

    (entries, errors)
}
