//! Text-native editing engine for mkly documents.
//!
//! The document source is the single source of truth. Every operation reads
//! the text it needs, returns new text, and reports how line numbers moved.

pub mod blocks;
pub mod compile;
pub mod error;
pub mod io;
pub mod lines;
pub mod session;
pub mod style;
pub mod targets;

// Re-export key types for easier usage
pub use blocks::{CursorBlock, locate_block, patch_property};
pub use compile::{
    CompileOutput, Compiler, Diagnostic, Severity, SourceMapEntry, StyleOnlyCompiler,
};
pub use error::EditError;
pub use io::*;
pub use session::EditorSession;
pub use style::{
    SerializeOptions, StyleEdit, StyleGraph, StylePatch, StyleRule, StyleVariable,
    compile_descendant_css, parse_style_graph, parse_style_graph_from_source, patch_style,
    patch_style_with, serialize_style_graph, serialize_style_graph_with,
};
pub use targets::{
    ElementId, RenderedTree, TargetOptions, detect_target, generate_block_label,
    generate_style_class, inject_class, inject_label, next_identifier,
};
