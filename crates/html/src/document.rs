//! Mutable arena document.
//!
//! Contract:
//! - Nodes are addressed by `NodeId`; ids are never reused while the document lives.
//! - Every node stores its parent and an ordered child list. Sibling relations are
//!   derived from the parent's child list, so a structural edit only touches the
//!   lists it changes.
//! - A detached node keeps its own subtree. It can be reattached or simply dropped
//!   with the document.
//! - All sibling-list mutations go through `insert_before` and `detach`; the other
//!   splicing helpers are built on those two.

use crate::types::{Attributes, NodeData, NodeId};

#[derive(Clone, Debug)]
struct Entry {
    data: NodeData,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

#[derive(Clone, Debug)]
pub struct Document {
    nodes: Vec<Entry>,
    root: NodeId,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        let mut doc = Self {
            nodes: Vec::new(),
            root: NodeId(0),
        };
        doc.root = doc.push(NodeData::Fragment);
        doc
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of arena slots, including detached nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children(self.root).is_empty()
    }

    fn entry(&self, id: NodeId) -> &Entry {
        &self.nodes[id.index()]
    }

    fn entry_mut(&mut self, id: NodeId) -> &mut Entry {
        &mut self.nodes[id.index()]
    }

    fn push(&mut self, data: NodeData) -> NodeId {
        let index = u32::try_from(self.nodes.len()).unwrap_or_else(|_| {
            unreachable!("document arena exceeded u32::MAX nodes");
        });
        self.nodes.push(Entry {
            data,
            parent: None,
            children: Vec::new(),
        });
        NodeId(index)
    }

    pub fn data(&self, id: NodeId) -> &NodeData {
        &self.entry(id).data
    }

    pub fn data_mut(&mut self, id: NodeId) -> &mut NodeData {
        &mut self.entry_mut(id).data
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.entry(id).parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.entry(id).children
    }

    pub fn create_element(&mut self, name: &str, attributes: Attributes) -> NodeId {
        self.push(NodeData::Element {
            name: name.to_string(),
            attributes,
        })
    }

    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.push(NodeData::Text(text.into()))
    }

    pub fn create_comment(&mut self, text: impl Into<String>) -> NodeId {
        self.push(NodeData::Comment(text.into()))
    }

    pub fn create_doctype(&mut self, text: impl Into<String>) -> NodeId {
        self.push(NodeData::Doctype(text.into()))
    }

    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        self.data(id).element_name()
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        matches!(self.data(id), NodeData::Element { .. })
    }

    pub fn is_element_named(&self, id: NodeId, target: &str) -> bool {
        self.tag_name(id)
            .is_some_and(|name| name.eq_ignore_ascii_case(target))
    }

    pub fn attributes(&self, id: NodeId) -> &[(String, Option<String>)] {
        match self.data(id) {
            NodeData::Element { attributes, .. } => attributes,
            _ => &[],
        }
    }

    pub fn attributes_mut(&mut self, id: NodeId) -> Option<&mut Attributes> {
        match self.data_mut(id) {
            NodeData::Element { attributes, .. } => Some(attributes),
            _ => None,
        }
    }

    pub fn has_attr(&self, id: NodeId, name: &str) -> bool {
        self.attributes(id).iter().any(|(k, _)| k == name)
    }

    /// Attribute value; a valueless attribute reads as the empty string.
    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.attributes(id)
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_deref().unwrap_or(""))
    }

    pub fn set_attr(&mut self, id: NodeId, name: &str, value: impl Into<String>) {
        let Some(attributes) = self.attributes_mut(id) else {
            return;
        };
        let value = Some(value.into());
        match attributes.iter_mut().find(|(k, _)| k == name) {
            Some(slot) => slot.1 = value,
            None => attributes.push((name.to_string(), value)),
        }
    }

    pub fn text(&self, id: NodeId) -> Option<&str> {
        match self.data(id) {
            NodeData::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn set_text(&mut self, id: NodeId, value: impl Into<String>) {
        if let NodeData::Text(text) = self.data_mut(id) {
            *text = value.into();
        }
    }

    /// Concatenated text of all descendant text nodes, in document order.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        let mut stack = vec![id];
        while let Some(node) = stack.pop() {
            if let NodeData::Text(text) = self.data(node) {
                out.push_str(text);
            }
            stack.extend(self.children(node).iter().rev());
        }
        out
    }

    /// Removes `id` from its parent's child list. The subtree stays intact.
    pub fn detach(&mut self, id: NodeId) {
        let Some(parent) = self.entry_mut(id).parent.take() else {
            return;
        };
        let siblings = &mut self.entry_mut(parent).children;
        if let Some(pos) = siblings.iter().position(|&c| c == id) {
            siblings.remove(pos);
        }
    }

    pub fn append(&mut self, parent: NodeId, child: NodeId) {
        debug_assert!(
            self.data(parent).can_have_children(),
            "append target {parent} cannot have children"
        );
        self.detach(child);
        self.entry_mut(parent).children.push(child);
        self.entry_mut(child).parent = Some(parent);
    }

    /// Inserts `node` as the previous sibling of `reference`.
    pub fn insert_before(&mut self, reference: NodeId, node: NodeId) {
        let Some(parent) = self.parent(reference) else {
            unreachable!("insert_before reference {reference} is detached");
        };
        self.detach(node);
        let siblings = &mut self.entry_mut(parent).children;
        let pos = siblings
            .iter()
            .position(|&c| c == reference)
            .unwrap_or(siblings.len());
        siblings.insert(pos, node);
        self.entry_mut(node).parent = Some(parent);
    }

    /// Inserts `replacements` (in order) where `node` is and detaches `node`.
    pub fn replace_with(&mut self, node: NodeId, replacements: &[NodeId]) {
        if self.parent(node).is_none() {
            return;
        }
        for &replacement in replacements {
            self.insert_before(node, replacement);
        }
        self.detach(node);
    }

    /// Moves every child of `from` (in order) in front of `reference`.
    pub fn move_children_before(&mut self, from: NodeId, reference: NodeId) {
        let children = self.children(from).to_vec();
        for child in children {
            self.insert_before(reference, child);
        }
    }

    /// Replaces `node` with its own children.
    pub fn unwrap_node(&mut self, node: NodeId) {
        let children = self.children(node).to_vec();
        self.replace_with(node, &children);
    }

    /// Next sibling that is an element, skipping text and comments in between.
    pub fn next_element_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let siblings = self.children(parent);
        let pos = siblings.iter().position(|&c| c == id)?;
        siblings[pos + 1..]
            .iter()
            .copied()
            .find(|&c| self.is_element(c))
    }

    /// Descendants of `root` (excluding `root`) matching `pred`, in document order.
    pub fn descendants_where(&self, root: NodeId, pred: impl Fn(NodeId) -> bool) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(root).iter().rev().copied().collect();
        while let Some(node) = stack.pop() {
            if pred(node) {
                out.push(node);
            }
            stack.extend(self.children(node).iter().rev());
        }
        out
    }

    pub fn descendants_named(&self, root: NodeId, name: &str) -> Vec<NodeId> {
        self.descendants_where(root, |node| self.is_element_named(node, name))
    }

    /// First descendant of `root` (excluding `root`) matching `pred`, in document order.
    pub fn find_first(&self, root: NodeId, pred: impl Fn(NodeId) -> bool) -> Option<NodeId> {
        let mut stack: Vec<NodeId> = self.children(root).iter().rev().copied().collect();
        while let Some(node) = stack.pop() {
            if pred(node) {
                return Some(node);
            }
            stack.extend(self.children(node).iter().rev());
        }
        None
    }

    /// Copies the subtree rooted at `id` into fresh, detached arena slots.
    pub fn deep_clone(&mut self, id: NodeId) -> NodeId {
        let copy = self.push(self.data(id).clone());
        let mut stack: Vec<(NodeId, NodeId)> = vec![(id, copy)];
        while let Some((source, target)) = stack.pop() {
            let children = self.children(source).to_vec();
            for child in children {
                let child_copy = self.push(self.data(child).clone());
                self.entry_mut(target).children.push(child_copy);
                self.entry_mut(child_copy).parent = Some(target);
                stack.push((child, child_copy));
            }
        }
        copy
    }
}
