use crate::style::{DEFAULT_CLASS_PREFIX, SELF_TARGET};

use super::dom::{ElementId, RenderedElement, RenderedTree};
use super::identifiers::is_identifier;

/// Inline formatting wrappers walked through on the way to a block element.
const INLINE_TAGS: &[&str] = &[
    "a", "abbr", "b", "bdi", "bdo", "br", "cite", "code", "data", "del", "dfn", "em", "i", "ins",
    "kbd", "mark", "q", "s", "samp", "small", "span", "strong", "sub", "sup", "time", "u", "var",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetOptions {
    /// Prefix of rendered block classes (`mkly` in `mkly-core-text`).
    pub class_prefix: String,
    /// Suffix tag targets with `:nth-of-type(k)` when same-tag siblings exist.
    pub positional: bool,
}

impl Default for TargetOptions {
    fn default() -> Self {
        Self {
            class_prefix: DEFAULT_CLASS_PREFIX.to_string(),
            positional: false,
        }
    }
}

pub fn is_inline_tag(tag: &str) -> bool {
    INLINE_TAGS.contains(&tag)
}

/// The block's own rendered class, e.g. `mkly-core-text`.
fn block_class<'a>(root: &'a RenderedElement, prefix: &str) -> Option<&'a str> {
    root.classes
        .iter()
        .map(String::as_str)
        .find(|class| class.starts_with(prefix) && class[prefix.len()..].starts_with('-'))
        .filter(|class| !class.contains("__"))
}

/// Name of a kit sub-element encoded as `<block class>__<name>`.
fn sub_element_name<'a>(
    element: &'a RenderedElement,
    block_class: Option<&str>,
    prefix: &str,
) -> Option<&'a str> {
    element.classes.iter().find_map(|class| match block_class {
        Some(block) => class.strip_prefix(block)?.strip_prefix("__"),
        None if class.starts_with(prefix) => class.split_once("__").map(|(_, name)| name),
        None => None,
    })
}

/// Decides which part of a rendered block a click landed on.
///
/// Walking up from `clicked`: an injected `sN` class wins (`>.sN`), then a
/// kit sub-element class (`name`), then the first block-level element
/// (`>tag`). Inline wrappers without either class are walked through.
/// Reaching `root`, or a click outside it, yields `self`.
pub fn detect_target(
    tree: &RenderedTree,
    clicked: ElementId,
    root: ElementId,
    options: &TargetOptions,
) -> String {
    if clicked == root || !tree.is_within(clicked, root) {
        return SELF_TARGET.to_string();
    }
    let Some(root_element) = tree.get(root) else {
        return SELF_TARGET.to_string();
    };
    let block = block_class(root_element, &options.class_prefix);

    let mut current = Some(clicked);
    while let Some(id) = current {
        if id == root {
            break;
        }
        let Some(element) = tree.get(id) else {
            break;
        };

        if let Some(class) = element.classes.iter().find(|c| is_identifier(c)) {
            return format!(">.{class}");
        }
        if let Some(name) = sub_element_name(element, block, &options.class_prefix) {
            return name.to_string();
        }
        if !is_inline_tag(&element.tag) {
            return tag_target(tree, id, element, options);
        }
        current = element.parent;
    }

    SELF_TARGET.to_string()
}

fn tag_target(
    tree: &RenderedTree,
    id: ElementId,
    element: &RenderedElement,
    options: &TargetOptions,
) -> String {
    if options.positional
        && let Some((index, count)) = tree.position_of_type(id)
        && count > 1
    {
        return format!(">{}:nth-of-type({index})", element.tag);
    }
    format!(">{}", element.tag)
}
