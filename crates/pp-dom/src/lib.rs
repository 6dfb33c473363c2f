//! DOM tree data structures.
//!
//! Nodes live in a flat arena and are linked by [`NodeId`]. Nodes removed from
//! the tree stay in the arena detached (no parent) so stale handles never alias
//! a different node.

mod serialize;
mod style;

use pp_core::LocatorError;
use pp_core::LocatorResult;

pub use serialize::escape_attribute;
pub use serialize::escape_text;
pub use serialize::is_void_element;

/// ID used to address nodes in the DOM arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// Synthetic root above the document element.
    Document,
    Element(ElementData),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementData {
    /// Lower-cased tag name.
    pub tag: String,
    pub attrs: Vec<(String, String)>,
}

impl ElementData {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            attrs: Vec::new(),
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub kind: NodeKind,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

/// Arena-backed document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    nodes: Vec<Node>,
    root: NodeId,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                kind: NodeKind::Document,
                parent: None,
                children: Vec::new(),
            }],
            root: NodeId(0),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    fn node_mut(&mut self, id: NodeId) -> LocatorResult<&mut Node> {
        self.nodes
            .get_mut(id.0)
            .ok_or_else(|| missing_node(id))
    }

    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.push(NodeKind::Element(ElementData::new(tag)))
    }

    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.push(NodeKind::Text(text.into()))
    }

    fn push(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            kind,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    /// Appends `child` as the last child of `parent`, detaching it first.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> LocatorResult<()> {
        if parent == child || self.is_ancestor_of(child, parent) {
            return Err(LocatorError::dom(
                "dom.append_cycle",
                format!("cannot append node {} under its own descendant", child.0),
            ));
        }
        self.node(parent).ok_or_else(|| missing_node(parent))?;
        self.detach(child)?;
        self.node_mut(parent)?.children.push(child);
        self.node_mut(child)?.parent = Some(parent);
        Ok(())
    }

    /// Removes `id` from its parent's child list. Detached nodes are left as is.
    pub fn detach(&mut self, id: NodeId) -> LocatorResult<()> {
        let Some(parent) = self.node(id).ok_or_else(|| missing_node(id))?.parent else {
            return Ok(());
        };
        self.node_mut(parent)?.children.retain(|child| *child != id);
        self.node_mut(id)?.parent = None;
        Ok(())
    }

    /// Replaces `old` in its parent with `replacements`, in order, at the same position.
    pub fn replace_with(&mut self, old: NodeId, replacements: &[NodeId]) -> LocatorResult<()> {
        let parent = self
            .parent(old)
            .ok_or_else(|| LocatorError::dom("dom.replace_detached", "node has no parent"))?;
        for replacement in replacements {
            if *replacement == old || self.is_ancestor_of(*replacement, parent) {
                return Err(LocatorError::dom(
                    "dom.replace_cycle",
                    "replacement would create a cycle",
                ));
            }
            self.detach(*replacement)?;
        }

        let position = self
            .children(parent)
            .iter()
            .position(|child| *child == old)
            .ok_or_else(|| missing_node(old))?;

        let siblings = &mut self.node_mut(parent)?.children;
        siblings.splice(position..=position, replacements.iter().copied());

        for replacement in replacements {
            self.node_mut(*replacement)?.parent = Some(parent);
        }
        self.node_mut(old)?.parent = None;
        Ok(())
    }

    fn is_ancestor_of(&self, candidate: NodeId, id: NodeId) -> bool {
        let mut cursor = self.parent(id);
        while let Some(current) = cursor {
            if current == candidate {
                return true;
            }
            cursor = self.parent(current);
        }
        false
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(|node| node.parent)
    }

    /// Parent if it is an element; the document node does not count.
    pub fn parent_element(&self, id: NodeId) -> Option<NodeId> {
        self.parent(id).filter(|parent| self.is_element(*parent))
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id)
            .map(|node| node.children.as_slice())
            .unwrap_or(&[])
    }

    /// Siblings before `id`, nearest last. Empty for detached nodes.
    pub fn preceding_siblings(&self, id: NodeId) -> &[NodeId] {
        let Some(parent) = self.parent(id) else {
            return &[];
        };
        let siblings = self.children(parent);
        match siblings.iter().position(|child| *child == id) {
            Some(position) => &siblings[..position],
            None => &[],
        }
    }

    pub fn element(&self, id: NodeId) -> Option<&ElementData> {
        match &self.node(id)?.kind {
            NodeKind::Element(data) => Some(data),
            _ => None,
        }
    }

    fn element_mut(&mut self, id: NodeId) -> LocatorResult<&mut ElementData> {
        match &mut self.node_mut(id)?.kind {
            NodeKind::Element(data) => Ok(data),
            _ => Err(LocatorError::dom(
                "dom.not_element",
                format!("node {} is not an element", id.0),
            )),
        }
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        self.element(id).is_some()
    }

    pub fn is_text(&self, id: NodeId) -> bool {
        matches!(self.node(id).map(|node| &node.kind), Some(NodeKind::Text(_)))
    }

    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(|data| data.tag.as_str())
    }

    pub fn text(&self, id: NodeId) -> Option<&str> {
        match &self.node(id)?.kind {
            NodeKind::Text(text) => Some(text.as_str()),
            _ => None,
        }
    }

    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id)?.attribute(name)
    }

    /// Identifier attribute, ignoring empty values.
    pub fn element_id(&self, id: NodeId) -> Option<&str> {
        self.attribute(id, "id").filter(|value| !value.is_empty())
    }

    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) -> LocatorResult<()> {
        let data = self.element_mut(id)?;
        match data
            .attrs
            .iter_mut()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
        {
            Some((_, existing)) => value.clone_into(existing),
            None => data
                .attrs
                .push((name.to_ascii_lowercase(), value.to_owned())),
        }
        Ok(())
    }

    pub fn remove_attribute(&mut self, id: NodeId, name: &str) -> LocatorResult<()> {
        self.element_mut(id)?
            .attrs
            .retain(|(key, _)| !key.eq_ignore_ascii_case(name));
        Ok(())
    }

    pub fn style_property(&self, id: NodeId, property: &str) -> Option<String> {
        let style = self.attribute(id, "style")?;
        style::get(style, property)
    }

    /// Sets an inline style property; an empty value removes it.
    pub fn set_style_property(
        &mut self,
        id: NodeId,
        property: &str,
        value: &str,
    ) -> LocatorResult<()> {
        let current = self.attribute(id, "style").unwrap_or_default().to_owned();
        let updated = style::set(&current, property, value);
        if updated.is_empty() {
            self.remove_attribute(id, "style")
        } else {
            self.set_attribute(id, "style", &updated)
        }
    }

    /// Number of element ancestors including `id` itself; 0 for non-elements.
    pub fn element_depth(&self, id: NodeId) -> usize {
        let mut depth = 0;
        let mut cursor = Some(id).filter(|node| self.is_element(*node));
        while let Some(current) = cursor {
            depth += 1;
            cursor = self.parent_element(current);
        }
        depth
    }

    /// First element child of the synthetic root.
    pub fn document_element(&self) -> Option<NodeId> {
        self.children(self.root)
            .iter()
            .copied()
            .find(|child| self.is_element(*child))
    }

    pub fn body(&self) -> Option<NodeId> {
        self.find_first_element(self.root, "body")
    }

    pub fn find_first_element(&self, from: NodeId, tag: &str) -> Option<NodeId> {
        self.descendants(from)
            .find(|id| self.tag_name(*id).is_some_and(|name| name.eq_ignore_ascii_case(tag)))
    }

    /// Elements under `from` (inclusive) carrying `name`, in document order.
    pub fn elements_with_attribute(&self, from: NodeId, name: &str) -> Vec<NodeId> {
        self.descendants(from)
            .filter(|id| self.attribute(*id, name).is_some())
            .collect()
    }

    /// Pre-order walk starting at (and including) `from`.
    pub fn descendants(&self, from: NodeId) -> Descendants<'_> {
        let stack = if self.node(from).is_some() {
            vec![from]
        } else {
            Vec::new()
        };
        Descendants { doc: self, stack }
    }

    pub fn text_content(&self, id: NodeId) -> String {
        self.descendants(id)
            .filter_map(|node| self.text(node))
            .collect()
    }
}

/// Iterator returned by [`Document::descendants`].
pub struct Descendants<'a> {
    doc: &'a Document,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let next = self.stack.pop()?;
        self.stack
            .extend(self.doc.children(next).iter().rev().copied());
        Some(next)
    }
}

fn missing_node(id: NodeId) -> LocatorError {
    LocatorError::dom("dom.node_missing", format!("node {} does not exist", id.0))
}

#[cfg(test)]
mod tests {
    use super::Document;
    use super::NodeId;

    fn sample() -> (Document, NodeId, NodeId, NodeId, NodeId) {
        let mut doc = Document::new();
        let html = doc.create_element("HTML");
        let body = doc.create_element("body");
        let first = doc.create_element("p");
        let text = doc.create_text("hello");
        let second = doc.create_element("p");
        let results = [
            doc.append_child(doc.root(), html),
            doc.append_child(html, body),
            doc.append_child(body, first),
            doc.append_child(body, text),
            doc.append_child(body, second),
        ];
        assert!(results.iter().all(Result::is_ok));
        (doc, body, first, text, second)
    }

    #[test]
    fn links_parents_and_siblings() {
        let (doc, body, first, text, second) = sample();
        assert_eq!(doc.parent(first), Some(body));
        assert_eq!(doc.preceding_siblings(second), &[first, text]);
        assert!(doc.preceding_siblings(first).is_empty());
        assert_eq!(doc.tag_name(doc.document_element().unwrap_or(body)), Some("html"));
    }

    #[test]
    fn replace_with_keeps_position() {
        let (mut doc, body, first, text, second) = sample();
        let a = doc.create_text("he");
        let mark = doc.create_element("mark");
        let b = doc.create_text("lo");
        assert!(doc.replace_with(text, &[a, mark, b]).is_ok());

        assert_eq!(doc.children(body), &[first, a, mark, b, second]);
        assert_eq!(doc.parent(text), None);
        assert_eq!(doc.parent(mark), Some(body));
    }

    #[test]
    fn rejects_cycles() {
        let (mut doc, body, first, _, _) = sample();
        assert!(doc.append_child(first, body).is_err());
        assert!(doc.append_child(body, body).is_err());
    }

    #[test]
    fn attributes_and_inline_style() {
        let (mut doc, _, first, text, _) = sample();
        assert!(doc.set_attribute(first, "ID", "").is_ok());
        assert_eq!(doc.attribute(first, "id"), Some(""));
        assert_eq!(doc.element_id(first), None);

        assert!(doc.set_style_property(first, "outline", "3px solid red").is_ok());
        assert!(doc.set_style_property(first, "background-color", "#b2fab4").is_ok());
        assert_eq!(
            doc.attribute(first, "style"),
            Some("outline: 3px solid red; background-color: #b2fab4")
        );

        assert!(doc.set_style_property(first, "outline", "").is_ok());
        assert!(doc.set_style_property(first, "background-color", "").is_ok());
        assert_eq!(doc.attribute(first, "style"), None);

        assert!(doc.set_attribute(text, "id", "x").is_err());
    }

    #[test]
    fn depth_counts_element_ancestors() {
        let (doc, body, first, text, _) = sample();
        assert_eq!(doc.element_depth(first), 3);
        assert_eq!(doc.element_depth(body), 2);
        assert_eq!(doc.element_depth(text), 0);
    }

    #[test]
    fn text_content_in_document_order() {
        let (mut doc, body, first, _, second) = sample();
        let inner = doc.create_text("A");
        let tail = doc.create_text("B");
        assert!(doc.append_child(first, inner).is_ok());
        assert!(doc.append_child(second, tail).is_ok());
        assert_eq!(doc.text_content(body), "AhelloB");
    }
}
