use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Block type holding verbatim selectors the parser could not classify.
pub const RAW_BLOCK_TYPE: &str = "__raw";

/// Target naming the block's own root element.
pub const SELF_TARGET: &str = "self";

/// In-memory form of a `--- style` block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyleGraph {
    pub variables: Vec<StyleVariable>,
    pub rules: Vec<StyleRule>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyleVariable {
    pub name: String,
    pub value: String,
}

/// Properties applied to one target of one block type (optionally one labelled
/// instance). A graph holds at most one rule per `(block_type, target, label)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyleRule {
    pub block_type: String,
    pub target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub properties: IndexMap<String, String>,
}

/// The shape of a canonical target string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind<'a> {
    /// `self`
    Root,
    /// `self:hover`
    RootPseudo(&'a str),
    /// `link`
    SubElement(&'a str),
    /// `link:hover`
    SubElementPseudo { name: &'a str, pseudo: &'a str },
    /// `>p`, `>p:nth-of-type(2)`, `>.s3` (stored without the leading `>`)
    Descendant(&'a str),
}

impl<'a> TargetKind<'a> {
    pub fn of(target: &'a str) -> Self {
        if let Some(rest) = target.strip_prefix('>') {
            return TargetKind::Descendant(rest);
        }
        if target == SELF_TARGET {
            return TargetKind::Root;
        }
        match target.split_once(':') {
            Some((SELF_TARGET, pseudo)) => TargetKind::RootPseudo(pseudo),
            Some((name, pseudo)) => TargetKind::SubElementPseudo { name, pseudo },
            None => TargetKind::SubElement(target),
        }
    }
}

impl StyleRule {
    pub fn new(block_type: &str, target: &str, label: Option<&str>) -> Self {
        Self {
            block_type: block_type.to_string(),
            target: target.to_string(),
            label: label.map(str::to_string),
            properties: IndexMap::new(),
        }
    }

    pub fn matches(&self, block_type: &str, target: &str, label: Option<&str>) -> bool {
        self.block_type == block_type && self.target == target && self.label.as_deref() == label
    }

    pub fn is_raw(&self) -> bool {
        self.block_type == RAW_BLOCK_TYPE
    }

    pub fn target_kind(&self) -> TargetKind<'_> {
        TargetKind::of(&self.target)
    }
}

impl StyleGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty() && self.rules.is_empty()
    }

    pub fn rule(&self, block_type: &str, target: &str, label: Option<&str>) -> Option<&StyleRule> {
        self.rules
            .iter()
            .find(|rule| rule.matches(block_type, target, label))
    }

    /// Returns the rule for the triple, creating an empty one at the end if
    /// missing. Callers that leave it empty must remove it again.
    pub(crate) fn rule_entry(
        &mut self,
        block_type: &str,
        target: &str,
        label: Option<&str>,
    ) -> &mut StyleRule {
        let idx = match self
            .rules
            .iter()
            .position(|rule| rule.matches(block_type, target, label))
        {
            Some(idx) => idx,
            None => {
                self.rules.push(StyleRule::new(block_type, target, label));
                self.rules.len() - 1
            }
        };
        &mut self.rules[idx]
    }

    /// Sets `property` on the rule for the triple, or removes it when `value`
    /// is empty. A rule left without properties is dropped. Returns whether
    /// the graph changed.
    pub fn set_property(
        &mut self,
        block_type: &str,
        target: &str,
        label: Option<&str>,
        property: &str,
        value: &str,
    ) -> bool {
        if value.is_empty() {
            let Some(idx) = self
                .rules
                .iter()
                .position(|rule| rule.matches(block_type, target, label))
            else {
                return false;
            };
            let removed = self.rules[idx].properties.shift_remove(property).is_some();
            if self.rules[idx].properties.is_empty() {
                self.rules.remove(idx);
            }
            return removed;
        }

        let rule = self.rule_entry(block_type, target, label);
        let previous = rule.properties.insert(property.to_string(), value.to_string());
        previous.as_deref() != Some(value)
    }

    pub fn property(
        &self,
        block_type: &str,
        target: &str,
        label: Option<&str>,
        property: &str,
    ) -> Option<&str> {
        self.rule(block_type, target, label)?
            .properties
            .get(property)
            .map(String::as_str)
    }

    pub fn variable(&self, name: &str) -> Option<&str> {
        self.variables
            .iter()
            .find(|var| var.name == name)
            .map(|var| var.value.as_str())
    }

    /// Sets a variable in place, appends it when new, removes it for `""`.
    pub fn set_variable(&mut self, name: &str, value: &str) {
        let existing = self.variables.iter().position(|var| var.name == name);
        match (existing, value.is_empty()) {
            (Some(idx), true) => {
                self.variables.remove(idx);
            }
            (Some(idx), false) => self.variables[idx].value = value.to_string(),
            (None, false) => self.variables.push(StyleVariable {
                name: name.to_string(),
                value: value.to_string(),
            }),
            (None, true) => {}
        }
    }

    /// Rules that style `block_type`, in graph order.
    pub fn rules_for<'a>(&'a self, block_type: &'a str) -> impl Iterator<Item = &'a StyleRule> {
        self.rules
            .iter()
            .filter(move |rule| rule.block_type == block_type)
    }

    /// Compares two graphs as sets of variables and rules, ignoring order.
    pub fn same_rules_as(&self, other: &StyleGraph) -> bool {
        self.variables.len() == other.variables.len()
            && self.rules.len() == other.rules.len()
            && self
                .variables
                .iter()
                .all(|var| other.variable(&var.name) == Some(var.value.as_str()))
            && self.rules.iter().all(|rule| {
                other
                    .rule(&rule.block_type, &rule.target, rule.label.as_deref())
                    .is_some_and(|theirs| theirs.properties == rule.properties)
            })
    }
}
