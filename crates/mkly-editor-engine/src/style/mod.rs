//! # Style Graph
//!
//! The `--- style` block holds a small indentation-based style language:
//!
//! ```text
//! accent: #d33
//! core/heading
//!   color: $accent
//!   .link
//!     text-decoration: none
//!   :hover
//!     color: black
//! core/text:s2
//!   >p
//!     margin: 0
//! ```
//!
//! ## Modules
//!
//! - **`model`**: `StyleGraph`, `StyleRule`, canonical target strings
//! - **`parser`**: text → graph, plus locating style blocks in a document
//! - **`serializer`**: graph → text, grouped by block type and label
//! - **`descendant`**: compiles `>tag` / `>.class` targets to plain CSS
//! - **`patch`**: applies one property edit to graph and text together
//!
//! ## Key Invariants
//!
//! - At most one rule per `(block_type, target, label)`
//! - Rules never exist without properties
//! - Text produced by the serializer parses back to an equal graph

pub mod descendant;
pub mod model;
pub mod parser;
pub mod patch;
pub mod serializer;

pub use descendant::{
    DEFAULT_CLASS_PREFIX, block_class_name, compile_descendant_css, split_descendant_rules,
};
pub use model::{RAW_BLOCK_TYPE, SELF_TARGET, StyleGraph, StyleRule, StyleVariable, TargetKind};
pub use parser::{
    StyleBlockRange, find_style_block, find_style_blocks, is_pseudo_class, parse_style_graph,
    parse_style_graph_from_source,
};
pub use patch::{StyleEdit, StylePatch, patch_style, patch_style_with, write_style_block};
pub use serializer::{SerializeOptions, serialize_style_graph, serialize_style_graph_with};
