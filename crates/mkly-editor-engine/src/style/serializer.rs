use super::model::{StyleGraph, StyleRule, TargetKind};

/// Formatting knobs for the serialized style block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerializeOptions {
    /// Spaces per nesting level.
    pub indent: usize,
}

impl Default for SerializeOptions {
    fn default() -> Self {
        Self { indent: 2 }
    }
}

/// Serializes a graph with two-space nesting.
pub fn serialize_style_graph(graph: &StyleGraph) -> String {
    serialize_style_graph_with(graph, &SerializeOptions::default())
}

/// Serializes a graph into the body of a `--- style` block.
///
/// Variables come first. Rules are grouped by `(block_type, label)` in order
/// of first appearance: the group's `self` properties sit one level in, every
/// other target follows as a nested selector with its properties two levels
/// in. Raw rules close the output, one group each. No trailing newline.
pub fn serialize_style_graph_with(graph: &StyleGraph, options: &SerializeOptions) -> String {
    let one = " ".repeat(options.indent);
    let two = " ".repeat(options.indent * 2);
    let mut out: Vec<String> = Vec::new();

    for var in &graph.variables {
        out.push(format!("{}: {}", var.name, var.value));
    }

    let mut groups: Vec<(&str, Option<&str>)> = Vec::new();
    for rule in graph.rules.iter().filter(|rule| !rule.is_raw()) {
        let key = (rule.block_type.as_str(), rule.label.as_deref());
        if !groups.contains(&key) {
            groups.push(key);
        }
    }

    for (block_type, label) in groups {
        let members: Vec<&StyleRule> = graph
            .rules
            .iter()
            .filter(|rule| {
                !rule.is_raw()
                    && rule.block_type == block_type
                    && rule.label.as_deref() == label
                    && !rule.properties.is_empty()
            })
            .collect();
        if members.is_empty() {
            continue;
        }

        out.push(match label {
            Some(label) => format!("{block_type}:{label}"),
            None => block_type.to_string(),
        });

        for rule in members.iter().filter(|r| r.target_kind() == TargetKind::Root) {
            push_properties(&mut out, &one, rule);
        }
        for rule in members.iter().filter(|r| r.target_kind() != TargetKind::Root) {
            out.push(format!("{one}{}", nested_selector(rule.target_kind())));
            push_properties(&mut out, &two, rule);
        }
    }

    for rule in graph
        .rules
        .iter()
        .filter(|rule| rule.is_raw() && !rule.properties.is_empty())
    {
        out.push(rule.target.clone());
        push_properties(&mut out, &one, rule);
    }

    out.join("\n")
}

fn push_properties(out: &mut Vec<String>, indent: &str, rule: &StyleRule) {
    for (property, value) in &rule.properties {
        out.push(format!("{indent}{property}: {value}"));
    }
}

fn nested_selector(kind: TargetKind<'_>) -> String {
    match kind {
        TargetKind::Root => String::new(),
        TargetKind::RootPseudo(pseudo) => format!(":{pseudo}"),
        TargetKind::SubElement(name) => format!(".{name}"),
        TargetKind::SubElementPseudo { name, pseudo } => format!(".{name}:{pseudo}"),
        TargetKind::Descendant(rest) => format!(">{rest}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::model::RAW_BLOCK_TYPE;
    use crate::style::parser::parse_style_graph;
    use pretty_assertions::assert_eq;

    fn sample_graph() -> StyleGraph {
        let mut graph = StyleGraph::new();
        graph.set_variable("accent", "#f00");
        graph.set_property("core/card", "title", None, "font-size", "2rem");
        graph.set_property("core/card", "self", None, "padding", "8px");
        graph.set_property("core/text", "self:hover", None, "color", "$accent");
        graph.set_property("core/card", ">p:nth-of-type(2)", None, "margin", "0");
        graph.set_property("core/card", "self", Some("s1"), "border", "1px solid");
        graph.set_property(RAW_BLOCK_TYPE, "h1, h2", None, "font-weight", "700");
        graph.set_property("core/card", "title:hover", None, "color", "blue");
        graph
    }

    #[test]
    fn groups_by_block_type_and_label() {
        insta::assert_snapshot!(serialize_style_graph(&sample_graph()), @r"
        accent: #f00
        core/card
          padding: 8px
          .title
            font-size: 2rem
          >p:nth-of-type(2)
            margin: 0
          .title:hover
            color: blue
        core/text
          :hover
            color: $accent
        core/card:s1
          border: 1px solid
        h1, h2
          font-weight: 700
        ");
    }

    #[test]
    fn honours_indent_width() {
        let mut graph = StyleGraph::new();
        graph.set_property("core/text", "link", None, "color", "red");
        let out = serialize_style_graph_with(&graph, &SerializeOptions { indent: 4 });
        assert_eq!(out, "core/text\n    .link\n        color: red");
    }

    #[test]
    fn empty_graph_serializes_to_nothing() {
        assert_eq!(serialize_style_graph(&StyleGraph::new()), "");
    }

    #[test]
    fn parse_serialize_parse_round_trip() {
        let graph = sample_graph();
        let reparsed = parse_style_graph(&serialize_style_graph(&graph));
        assert!(reparsed.same_rules_as(&graph), "{reparsed:#?}");

        let again = parse_style_graph(&serialize_style_graph(&reparsed));
        assert!(again.same_rules_as(&reparsed));
        assert_eq!(serialize_style_graph(&again), serialize_style_graph(&reparsed));
    }
}
