use mkly_editor_engine::style::TargetKind;
use mkly_editor_engine::{
    CursorBlock, Diagnostic, SerializeOptions, Severity, StyleGraph, compile_descendant_css,
    serialize_style_graph_with,
};

/// Lines describing a block, its properties and the style rules that apply.
pub fn describe_block(block: &CursorBlock, graph: &StyleGraph) -> Vec<String> {
    let mut lines = Vec::new();
    let header = match &block.label {
        Some(label) => format!("{}: {label}", block.block_type),
        None => block.block_type.clone(),
    };
    lines.push(format!(
        "{header} (lines {}-{})",
        block.start_line,
        block.end_line - 1
    ));
    if block.is_special {
        lines.push("reserved block, not styleable".to_string());
        return lines;
    }

    lines.push(String::new());
    if block.properties.is_empty() {
        lines.push("No properties".to_string());
    } else {
        lines.push("Properties:".to_string());
        for (key, value) in &block.properties {
            lines.push(format!("  {key}: {value}"));
        }
    }

    let rules: Vec<_> = graph
        .rules_for(&block.block_type)
        .filter(|rule| rule.label.is_none() || rule.label == block.label)
        .collect();
    lines.push(String::new());
    if rules.is_empty() {
        lines.push("No style rules".to_string());
        return lines;
    }
    lines.push("Style rules:".to_string());
    for rule in rules {
        let scope = match (&rule.label, rule.target_kind()) {
            (Some(label), _) => format!("{} [{label}]", rule.target),
            (None, TargetKind::Descendant(_)) => format!("{} [descendant]", rule.target),
            (None, _) => rule.target.clone(),
        };
        lines.push(format!("  {scope}"));
        for (property, value) in &rule.properties {
            lines.push(format!("    {property}: {value}"));
        }
    }
    lines
}

/// The serialized style block followed by the compiled descendant CSS.
pub fn describe_styles(
    graph: &StyleGraph,
    options: &SerializeOptions,
    class_prefix: &str,
) -> String {
    if graph.is_empty() {
        return "No styles".to_string();
    }
    let mut out = serialize_style_graph_with(graph, options);
    let css = compile_descendant_css(graph, class_prefix);
    if !css.is_empty() {
        out.push_str("\n\n/* descendant rules */\n");
        out.push_str(css.trim_end());
    }
    out
}

pub fn describe_diagnostic(diagnostic: &Diagnostic) -> String {
    let severity = match diagnostic.severity {
        Severity::Error => "error",
        Severity::Warning => "warning",
    };
    format!("{severity}: line {}: {}", diagnostic.line, diagnostic.message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mkly_editor_engine::{locate_block, parse_style_graph_from_source};
    use pretty_assertions::assert_eq;

    const DOC: &str = "--- style\ncore/text\n  color: red\ncore/text:s1\n  >p\n    margin: 0\ncore/text:s9\n  color: blue\n\n--- core/text: s1\nsize: 2\n\nHello";

    #[test]
    fn describes_block_with_matching_rules() {
        let graph = parse_style_graph_from_source(DOC);
        let block = locate_block(DOC, 13).unwrap();
        assert_eq!(
            describe_block(&block, &graph),
            vec![
                "core/text: s1 (lines 10-13)",
                "",
                "Properties:",
                "  size: 2",
                "",
                "Style rules:",
                "  self",
                "    color: red",
                "  >p [s1]",
                "    margin: 0",
            ]
        );
    }

    #[test]
    fn styles_include_descendant_css() {
        let graph = parse_style_graph_from_source(DOC);
        let out = describe_styles(&graph, &SerializeOptions::default(), "mkly");
        assert!(out.starts_with("core/text\n  color: red\ncore/text:s1\n  >p\n    margin: 0"));
        assert!(out.ends_with("/* descendant rules */\n.mkly-core-text.s1 p {\n  margin: 0;\n}"));
    }

    #[test]
    fn empty_graph() {
        let out = describe_styles(&StyleGraph::new(), &SerializeOptions::default(), "mkly");
        assert_eq!(out, "No styles");
    }
}
