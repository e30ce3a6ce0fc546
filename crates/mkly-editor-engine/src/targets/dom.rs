/// Index of an element inside a [`RenderedTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(usize);

/// One element of the rendered preview, as much of it as target
/// resolution needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedElement {
    /// Lowercase tag name.
    pub tag: String,
    pub classes: Vec<String>,
    pub parent: Option<ElementId>,
    pub children: Vec<ElementId>,
}

impl RenderedElement {
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }
}

/// Arena snapshot of the preview DOM, mirrored by the host after each render.
#[derive(Debug, Clone, Default)]
pub struct RenderedTree {
    elements: Vec<RenderedElement>,
}

impl RenderedTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a parentless element.
    pub fn add_root(&mut self, tag: &str, classes: &[&str]) -> ElementId {
        self.push(tag, classes, None)
    }

    /// Adds an element as the last child of `parent`.
    pub fn append_child(&mut self, parent: ElementId, tag: &str, classes: &[&str]) -> ElementId {
        let id = self.push(tag, classes, Some(parent));
        if let Some(parent) = self.elements.get_mut(parent.0) {
            parent.children.push(id);
        }
        id
    }

    fn push(&mut self, tag: &str, classes: &[&str], parent: Option<ElementId>) -> ElementId {
        let id = ElementId(self.elements.len());
        self.elements.push(RenderedElement {
            tag: tag.to_ascii_lowercase(),
            classes: classes
                .iter()
                .flat_map(|c| c.split_whitespace())
                .map(str::to_string)
                .collect(),
            parent,
            children: Vec::new(),
        });
        id
    }

    pub fn get(&self, id: ElementId) -> Option<&RenderedElement> {
        self.elements.get(id.0)
    }

    pub fn parent(&self, id: ElementId) -> Option<ElementId> {
        self.get(id)?.parent
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// 1-based position of `id` among same-tag siblings, and how many there are.
    pub fn position_of_type(&self, id: ElementId) -> Option<(usize, usize)> {
        let element = self.get(id)?;
        let parent = self.get(element.parent?)?;
        let same_tag: Vec<ElementId> = parent
            .children
            .iter()
            .copied()
            .filter(|child| self.get(*child).is_some_and(|c| c.tag == element.tag))
            .collect();
        let index = same_tag.iter().position(|child| *child == id)?;
        Some((index + 1, same_tag.len()))
    }

    /// Whether `ancestor` is `id` or lies on its parent chain.
    pub fn is_within(&self, id: ElementId, ancestor: ElementId) -> bool {
        let mut current = Some(id);
        while let Some(node) = current {
            if node == ancestor {
                return true;
            }
            current = self.parent(node);
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_parent_and_child_links() {
        let mut tree = RenderedTree::new();
        let root = tree.add_root("DIV", &["mkly-core-text"]);
        let p = tree.append_child(root, "p", &["s1 lead"]);
        assert_eq!(tree.parent(p), Some(root));
        assert_eq!(tree.get(root).unwrap().children, vec![p]);
        assert_eq!(tree.get(root).unwrap().tag, "div");
        assert!(tree.get(p).unwrap().has_class("lead"));
        assert!(tree.is_within(p, root));
        assert!(!tree.is_within(root, p));
    }

    #[test]
    fn positions_among_same_tag_siblings() {
        let mut tree = RenderedTree::new();
        let root = tree.add_root("div", &[]);
        let first = tree.append_child(root, "p", &[]);
        tree.append_child(root, "ul", &[]);
        let second = tree.append_child(root, "p", &[]);
        assert_eq!(tree.position_of_type(first), Some((1, 2)));
        assert_eq!(tree.position_of_type(second), Some((2, 2)));
        assert_eq!(tree.position_of_type(root), None);
    }
}
