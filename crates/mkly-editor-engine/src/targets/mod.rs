//! # Style Targets
//!
//! Turns a click in the rendered preview into the target string a style edit
//! applies to, and mints the `sN` identifiers used to scope edits to one
//! block instance or one content line.
//!
//! - **`dom`**: arena mirror of the rendered preview
//! - **`resolve`**: click → `self` / sub-element / `>tag` / `>.sN`
//! - **`identifiers`**: next-identifier scan, class and label injection

pub mod dom;
pub mod identifiers;
pub mod resolve;

pub use dom::{ElementId, RenderedElement, RenderedTree};
pub use identifiers::{
    generate_block_label, generate_style_class, inject_class, inject_label, is_identifier,
    max_identifier, next_identifier,
};
pub use resolve::{TargetOptions, detect_target, is_inline_tag};
