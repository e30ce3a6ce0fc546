//! Descendant-selector compatibility layer.
//!
//! The mkly compiler understands `self`, pseudo and kit sub-element targets
//! but has no notion of `>tag` or `>.class` descendants. Those rules are
//! split off here and compiled to plain CSS against the rendered block class,
//! e.g. `core/text` + `>p` becomes `.mkly-core-text p`.

use super::model::{StyleGraph, StyleRule, TargetKind};

/// Class prefix used by the stock kits.
pub const DEFAULT_CLASS_PREFIX: &str = "mkly";

/// Rendered class of a block type: `core/heading` → `mkly-core-heading`.
pub fn block_class_name(block_type: &str, class_prefix: &str) -> String {
    let slug: String = block_type
        .chars()
        .map(|c| if c == '/' || c == '.' { '-' } else { c })
        .collect();
    format!("{class_prefix}-{slug}")
}

/// Separates descendant rules from the ones the compiler handles natively.
pub fn split_descendant_rules(graph: &StyleGraph) -> (StyleGraph, Vec<StyleRule>) {
    let (descendants, native): (Vec<StyleRule>, Vec<StyleRule>) = graph
        .rules
        .iter()
        .cloned()
        .partition(|rule| !rule.is_raw() && matches!(rule.target_kind(), TargetKind::Descendant(_)));
    (
        StyleGraph {
            variables: graph.variables.clone(),
            rules: native,
        },
        descendants,
    )
}

/// CSS selector for a descendant rule, `None` for any other rule.
pub fn descendant_selector(rule: &StyleRule, class_prefix: &str) -> Option<String> {
    let TargetKind::Descendant(rest) = rule.target_kind() else {
        return None;
    };
    if rule.is_raw() {
        return None;
    }
    let mut selector = format!(".{}", block_class_name(&rule.block_type, class_prefix));
    if let Some(label) = &rule.label {
        selector.push('.');
        selector.push_str(label);
    }
    Some(format!("{selector} {}", rest.trim()))
}

/// Compiles every descendant rule of `graph` into a CSS stylesheet.
pub fn compile_descendant_css(graph: &StyleGraph, class_prefix: &str) -> String {
    let mut css = String::new();
    for rule in &graph.rules {
        let Some(selector) = descendant_selector(rule, class_prefix) else {
            continue;
        };
        if rule.properties.is_empty() {
            continue;
        }
        css.push_str(&selector);
        css.push_str(" {\n");
        for (property, value) in &rule.properties {
            css.push_str(&format!("  {property}: {value};\n"));
        }
        css.push_str("}\n");
    }
    css
}
