use regex::Regex;
use std::ops::Range;
use std::sync::OnceLock;

use crate::lines::{LineKind, STYLE_BLOCK_TYPE, classify_line, split_lines};

use super::model::{RAW_BLOCK_TYPE, SELF_TARGET, StyleGraph};

/// Suffixes after `type:` that name a pseudo-class rather than an instance
/// label. Anything with parentheses (`nth-child(2)`) is a pseudo-class too.
const PSEUDO_CLASSES: &[&str] = &[
    "hover",
    "active",
    "focus",
    "focus-visible",
    "focus-within",
    "visited",
    "link",
    "target",
    "checked",
    "disabled",
    "enabled",
    "empty",
    "first-child",
    "last-child",
    "only-child",
    "first-of-type",
    "last-of-type",
    "only-of-type",
    "placeholder-shown",
    "before",
    "after",
];

pub fn is_pseudo_class(name: &str) -> bool {
    name.contains('(') || PSEUDO_CLASSES.contains(&name)
}

/// Line range of one `--- style` block, all 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StyleBlockRange {
    /// The `--- style` header.
    pub header_line: usize,
    /// Exclusive end of the body; trailing blank lines are left outside.
    pub body_end: usize,
    /// Next header or closing tag, `line_count + 1` at EOF.
    pub end_line: usize,
}

impl StyleBlockRange {
    pub fn body_lines(&self) -> Range<usize> {
        (self.header_line + 1)..self.body_end
    }
}

/// Shape of a single line of the style sub-language.
#[derive(Debug, Clone, PartialEq, Eq)]
enum StyleLine<'a> {
    Blank,
    Comment,
    /// `core/heading`, `core/heading:s1`, `core/heading:hover`
    BlockSelector {
        block_type: &'a str,
        suffix: Option<&'a str>,
    },
    /// Top-level `name: value`
    Variable { name: &'a str, value: &'a str },
    /// Legacy one-line rule `selector { prop: value; ... }`
    Compact {
        selector: &'a str,
        declarations: &'a str,
    },
    /// Any other top-level line, kept verbatim.
    RawSelector(&'a str),
    /// Indented `.sub`, `:pseudo`, `.sub:pseudo`, `>rest`
    SubSelector(&'a str),
    /// Indented `property: value`
    Declaration { property: &'a str, value: &'a str },
    Unknown(&'a str),
}

fn block_selector_regex() -> &'static Regex {
    static BLOCK_SELECTOR_REGEX: OnceLock<Regex> = OnceLock::new();
    BLOCK_SELECTOR_REGEX.get_or_init(|| {
        Regex::new(r"^([A-Za-z][\w-]*(?:/[\w-]+)+)(?:\s*:\s*([\w\-()+]+))?$")
            .expect("Invalid block selector regex")
    })
}

fn variable_regex() -> &'static Regex {
    static VARIABLE_REGEX: OnceLock<Regex> = OnceLock::new();
    VARIABLE_REGEX.get_or_init(|| {
        Regex::new(r"^([A-Za-z_$\-][\w$\-]*):\s+(\S.*)$").expect("Invalid variable regex")
    })
}

fn declaration_regex() -> &'static Regex {
    static DECLARATION_REGEX: OnceLock<Regex> = OnceLock::new();
    DECLARATION_REGEX.get_or_init(|| {
        Regex::new(r"^([A-Za-z\-][\w\-]*)\s*:\s*(.*?);?$").expect("Invalid declaration regex")
    })
}

fn compact_selector_regex() -> &'static Regex {
    static COMPACT_SELECTOR_REGEX: OnceLock<Regex> = OnceLock::new();
    COMPACT_SELECTOR_REGEX.get_or_init(|| {
        Regex::new(
            r"^([A-Za-z][\w-]*(?:/[\w-]+)+)(?::([\w-]+))?(?:\.([\w-]+))?(?::([\w\-()+:]+))?(?:\s*>\s*(.+))?$",
        )
        .expect("Invalid compact selector regex")
    })
}

fn indent_width(line: &str) -> usize {
    line.chars()
        .take_while(|c| c.is_whitespace())
        .map(|c| if c == '\t' { 2 } else { 1 })
        .sum()
}

fn classify_style_line(line: &str) -> (usize, StyleLine<'_>) {
    let line = line.strip_suffix('\r').unwrap_or(line);
    let content = line.trim();
    if content.is_empty() || content == "}" {
        return (0, StyleLine::Blank);
    }
    if content.starts_with("//") {
        return (0, StyleLine::Comment);
    }

    let indent = indent_width(line);
    if indent == 0 {
        if let Some((selector, rest)) = content.split_once('{')
            && let Some(declarations) = rest.trim_end().strip_suffix('}')
        {
            return (
                0,
                StyleLine::Compact {
                    selector: selector.trim(),
                    declarations: declarations.trim(),
                },
            );
        }
        if let Some(caps) = block_selector_regex().captures(content) {
            return (
                0,
                StyleLine::BlockSelector {
                    block_type: caps.get(1).map_or("", |m| m.as_str()),
                    suffix: caps.get(2).map(|m| m.as_str()),
                },
            );
        }
        if let Some(caps) = variable_regex().captures(content) {
            return (
                0,
                StyleLine::Variable {
                    name: caps.get(1).map_or("", |m| m.as_str()),
                    value: caps.get(2).map_or("", |m| m.as_str().trim()),
                },
            );
        }
        let selector = content.trim_end_matches('{').trim_end();
        return (0, StyleLine::RawSelector(selector));
    }

    if content.starts_with(['.', ':', '>']) {
        return (indent, StyleLine::SubSelector(content));
    }
    if let Some(caps) = declaration_regex().captures(content) {
        let value = caps.get(2).map_or("", |m| m.as_str().trim());
        if !value.is_empty() {
            return (
                indent,
                StyleLine::Declaration {
                    property: caps.get(1).map_or("", |m| m.as_str()),
                    value,
                },
            );
        }
    }
    (indent, StyleLine::Unknown(content))
}

/// The rule a run of declarations is currently feeding.
struct RuleContext {
    block_type: String,
    label: Option<String>,
    /// `self`, or the verbatim selector of a raw rule.
    base: String,
    target: String,
    /// An open `.sub` selector and its indentation, for nested `:pseudo` lines.
    sub: Option<(usize, String)>,
}

impl RuleContext {
    fn block(block_type: &str, label: Option<String>, target: String) -> Self {
        Self {
            block_type: block_type.to_string(),
            label,
            base: SELF_TARGET.to_string(),
            target,
            sub: None,
        }
    }

    fn raw(selector: &str) -> Self {
        Self {
            block_type: RAW_BLOCK_TYPE.to_string(),
            label: None,
            base: selector.to_string(),
            target: selector.to_string(),
            sub: None,
        }
    }

    fn enter(&mut self, indent: usize, selector: &str) {
        if self.block_type == RAW_BLOCK_TYPE {
            self.target = if selector.starts_with(':') {
                format!("{}{selector}", self.base)
            } else {
                format!("{} {selector}", self.base)
            };
            return;
        }

        if let Some(rest) = selector.strip_prefix('>') {
            self.target = format!(">{}", rest.trim_start());
            self.sub = None;
        } else if let Some(pseudo) = selector.strip_prefix(':') {
            self.target = match &self.sub {
                Some((sub_indent, name)) if indent > *sub_indent => format!("{name}:{pseudo}"),
                _ => format!("{SELF_TARGET}:{pseudo}"),
            };
        } else if let Some(name) = selector.strip_prefix('.') {
            self.target = name.to_string();
            self.sub = (!name.contains(':')).then(|| (indent, name.to_string()));
        }
    }
}

/// Resolves a legacy compact selector into `(block_type, label, target)`.
fn parse_compact_selector(selector: &str) -> Option<(String, Option<String>, String)> {
    let caps = compact_selector_regex().captures(selector)?;
    let block_type = caps.get(1)?.as_str().to_string();
    let mut label = caps.get(2).map(|m| m.as_str());
    let sub = caps.get(3).map(|m| m.as_str());
    let mut pseudo = caps.get(4).map(|m| m.as_str());
    let descendant = caps.get(5).map(|m| m.as_str().trim());

    if let Some(candidate) = label
        && is_pseudo_class(candidate)
    {
        if sub.is_some() || pseudo.is_some() || descendant.is_some() {
            return None;
        }
        pseudo = Some(candidate);
        label = None;
    }

    let target = match (sub, pseudo, descendant) {
        (None, None, None) => SELF_TARGET.to_string(),
        (None, None, Some(desc)) => format!(">{desc}"),
        (None, Some(pseudo), None) => format!("{SELF_TARGET}:{pseudo}"),
        (Some(sub), None, None) => sub.to_string(),
        (Some(sub), Some(pseudo), None) => format!("{sub}:{pseudo}"),
        _ => return None,
    };
    Some((block_type, label.map(str::to_string), target))
}

fn compact_declarations(declarations: &str) -> impl Iterator<Item = (&str, &str)> {
    declarations.split(';').filter_map(|decl| {
        let (property, value) = decl.split_once(':')?;
        let (property, value) = (property.trim(), value.trim());
        (!property.is_empty() && !value.is_empty()).then_some((property, value))
    })
}

/// Parses the body of a `--- style` block.
///
/// Never fails: unrecognised top-level lines become `__raw` rules keyed by
/// their selector text, stray lines are skipped.
pub fn parse_style_graph(body: &str) -> StyleGraph {
    let mut graph = StyleGraph::new();
    let mut context: Option<RuleContext> = None;

    for line in body.split('\n') {
        let (indent, kind) = classify_style_line(line);
        match kind {
            StyleLine::Blank | StyleLine::Comment => {}
            StyleLine::BlockSelector { block_type, suffix } => {
                let (target, label) = match suffix {
                    Some(pseudo) if is_pseudo_class(pseudo) => {
                        (format!("{SELF_TARGET}:{pseudo}"), None)
                    }
                    Some(label) => (SELF_TARGET.to_string(), Some(label.to_string())),
                    None => (SELF_TARGET.to_string(), None),
                };
                context = Some(RuleContext::block(block_type, label, target));
            }
            StyleLine::Variable { name, value } => {
                graph.set_variable(name, value);
                context = None;
            }
            StyleLine::Compact {
                selector,
                declarations,
            } => {
                let (block_type, label, target) = parse_compact_selector(selector)
                    .unwrap_or_else(|| {
                        log::trace!("Keeping compact selector '{selector}' as raw CSS");
                        (RAW_BLOCK_TYPE.to_string(), None, selector.to_string())
                    });
                for (property, value) in compact_declarations(declarations) {
                    graph.set_property(&block_type, &target, label.as_deref(), property, value);
                }
                context = None;
            }
            StyleLine::RawSelector(selector) => {
                log::trace!("Keeping selector '{selector}' as raw CSS");
                context = Some(RuleContext::raw(selector));
            }
            StyleLine::SubSelector(selector) => match context.as_mut() {
                Some(ctx) => ctx.enter(indent, selector),
                None => log::trace!("Ignoring selector '{selector}' outside a rule"),
            },
            StyleLine::Declaration { property, value } => match &context {
                Some(ctx) => {
                    graph.set_property(
                        &ctx.block_type,
                        &ctx.target,
                        ctx.label.as_deref(),
                        property,
                        value,
                    );
                }
                None => log::trace!("Ignoring declaration '{property}' outside a rule"),
            },
            StyleLine::Unknown(text) => log::trace!("Ignoring style line '{text}'"),
        }
    }

    graph
}

/// Finds every `--- style` block in a document.
pub fn find_style_blocks(source: &str) -> Vec<StyleBlockRange> {
    let lines = split_lines(source);
    let mut blocks = Vec::new();

    for (idx, line) in lines.iter().enumerate() {
        let is_style_header = matches!(
            classify_line(line),
            LineKind::Header { block_type, .. } if block_type == STYLE_BLOCK_TYPE
        );
        if !is_style_header {
            continue;
        }

        let header_line = idx + 1;
        let end_line = ((header_line + 1)..=lines.len())
            .find(|&line| classify_line(lines[line - 1]).is_boundary())
            .unwrap_or(lines.len() + 1);
        let mut body_end = end_line;
        while body_end > header_line + 1 && classify_line(lines[body_end - 2]).is_blank() {
            body_end -= 1;
        }

        blocks.push(StyleBlockRange {
            header_line,
            body_end,
            end_line,
        });
    }

    blocks
}

/// Finds the first `--- style` block, the one the style patcher rewrites.
pub fn find_style_block(source: &str) -> Option<StyleBlockRange> {
    find_style_blocks(source).into_iter().next()
}

/// Parses the document's first `--- style` block, the same block
/// [`write_style_block`](super::patch::write_style_block) rewrites. Any later
/// style block is ignored (the compiler reports it).
pub fn parse_style_graph_from_source(source: &str) -> StyleGraph {
    let Some(block) = find_style_block(source) else {
        return StyleGraph::new();
    };
    let lines = split_lines(source);
    parse_style_graph(&lines[block.header_line..block.body_end - 1].join("\n"))
}
