//! One editing session over one document.
//!
//! The session owns the source text, so every edit produces exactly one new
//! generation. After each change the text is recompiled and the cached style
//! graph re-seeded from the compile output.

use crate::blocks::{CursorBlock, locate_block, patch_property};
use crate::compile::{CompileOutput, Compiler, Diagnostic, StyleOnlyCompiler};
use crate::error::EditError;
use crate::lines::{line_delta, split_lines};
use crate::style::{
    SELF_TARGET, SerializeOptions, StyleEdit, StyleGraph, StylePatch, patch_style_with,
};
use crate::targets::{
    ElementId, RenderedTree, TargetOptions, detect_target, generate_block_label,
    generate_style_class, inject_class, inject_label,
};

pub struct EditorSession<C: Compiler = StyleOnlyCompiler> {
    compiler: C,
    source: String,
    generation: u64,
    cursor_line: usize,
    style_graph: StyleGraph,
    output: CompileOutput,
    serialize_options: SerializeOptions,
    target_options: TargetOptions,
}

impl EditorSession<StyleOnlyCompiler> {
    pub fn from_source(source: impl Into<String>) -> Self {
        Self::new(StyleOnlyCompiler, source)
    }
}

impl<C: Compiler> EditorSession<C> {
    pub fn new(compiler: C, source: impl Into<String>) -> Self {
        let source = source.into();
        let output = compiler.compile(&source);
        Self {
            compiler,
            style_graph: output.style_graph.clone(),
            output,
            source,
            generation: 0,
            cursor_line: 1,
            serialize_options: SerializeOptions::default(),
            target_options: TargetOptions::default(),
        }
    }

    pub fn with_options(mut self, serialize: SerializeOptions, targets: TargetOptions) -> Self {
        self.serialize_options = serialize;
        self.target_options = targets;
        self
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn cursor_line(&self) -> usize {
        self.cursor_line
    }

    pub fn style_graph(&self) -> &StyleGraph {
        &self.style_graph
    }

    pub fn output(&self) -> &CompileOutput {
        &self.output
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.output.errors
    }

    pub fn serialize_options(&self) -> &SerializeOptions {
        &self.serialize_options
    }

    pub fn target_options(&self) -> &TargetOptions {
        &self.target_options
    }

    /// Moves the cursor, clamped to the document.
    pub fn set_cursor(&mut self, line: usize) {
        self.cursor_line = line.clamp(1, split_lines(&self.source).len());
    }

    pub fn cursor_block(&self) -> Option<CursorBlock> {
        locate_block(&self.source, self.cursor_line)
    }

    /// Swaps in new text from outside the engine (typing, undo, reload).
    pub fn replace_source(&mut self, source: impl Into<String>) {
        self.commit(source.into());
        self.set_cursor(self.cursor_line);
    }

    fn commit(&mut self, source: String) {
        self.source = source;
        self.generation += 1;
        self.output = self.compiler.compile(&self.source);
        self.style_graph = self.output.style_graph.clone();
        log::debug!(
            "Generation {} compiled with {} diagnostics",
            self.generation,
            self.output.errors.len()
        );
    }

    fn require_cursor_block(&self) -> Result<CursorBlock, EditError> {
        self.cursor_block()
            .ok_or(EditError::NoBlockAtLine(self.cursor_line))
    }

    /// Sets (or removes, for `""`) a property of the block under the cursor.
    /// Returns whether the text changed.
    pub fn set_property(&mut self, key: &str, value: &str) -> Result<bool, EditError> {
        let block = self.require_cursor_block()?;
        let text = patch_property(&self.source, block.start_line, block.end_line, key, value);
        if text == self.source {
            return Ok(false);
        }

        let first_changed = first_changed_line(&self.source, &text);
        let delta = line_delta(&self.source, &text);
        if self.cursor_line >= first_changed {
            self.cursor_line = self.cursor_line.saturating_add_signed(delta).max(1);
        }
        self.commit(text);
        Ok(true)
    }

    /// Applies a style edit and keeps the cursor on the same text.
    pub fn apply_style(&mut self, edit: &StyleEdit) -> Result<StylePatch, EditError> {
        let patch = patch_style_with(&self.source, &self.style_graph, edit, &self.serialize_options)?;
        if patch.text == self.source {
            self.style_graph = patch.graph.clone();
            return Ok(patch);
        }

        self.cursor_line = patch.shift_line(self.cursor_line);
        self.commit(patch.text.clone());
        if !self.style_graph.same_rules_as(&patch.graph) {
            log::warn!("Recompiled style graph differs from the patched graph");
        }
        Ok(patch)
    }

    /// Styles `target` of the block under the cursor, scoped to its label
    /// when the block has one.
    pub fn set_style(
        &mut self,
        target: &str,
        property: &str,
        value: &str,
    ) -> Result<StylePatch, EditError> {
        let block = self.require_cursor_block()?;
        let mut edit = StyleEdit::new(&block.block_type, target, property, value);
        if let Some(label) = block.label.filter(|_| !block.is_special) {
            edit = edit.with_label(label);
        }
        self.apply_style(&edit)
    }

    /// Gives the cursor block a label so later style edits only hit this
    /// instance. Returns the label, minting one when the block has none.
    pub fn scope_cursor_block_to_instance(&mut self) -> Result<String, EditError> {
        let block = self.require_cursor_block()?;
        if block.is_special {
            return Err(EditError::ReservedBlockType(block.block_type));
        }
        if let Some(label) = block.label {
            return Ok(label);
        }

        let label = generate_block_label(&self.source);
        let text = inject_label(&self.source, block.start_line, &label)
            .ok_or(EditError::NoBlockAtLine(block.start_line))?;
        self.commit(text);
        Ok(label)
    }

    /// Tags the content line with a fresh class and returns the `>.sN`
    /// target for it, or `None` when the line cannot be tagged.
    pub fn tag_content_line(&mut self, line: usize) -> Option<String> {
        let class = generate_style_class(&self.source);
        let text = inject_class(&self.source, line, &class)?;
        self.commit(text);
        Some(format!(">.{class}"))
    }

    /// Target for a click in the rendered block rooted at `root`.
    pub fn pick_target(&self, tree: &RenderedTree, clicked: ElementId, root: ElementId) -> String {
        let target = detect_target(tree, clicked, root, &self.target_options);
        if target == SELF_TARGET {
            log::trace!("Click resolved to the block root");
        }
        target
    }
}

/// 1-based first line that differs between two texts.
fn first_changed_line(before: &str, after: &str) -> usize {
    before
        .split('\n')
        .zip(after.split('\n'))
        .position(|(a, b)| a != b)
        .map_or_else(
            || before.split('\n').count().min(after.split('\n').count()) + 1,
            |idx| idx + 1,
        )
}
