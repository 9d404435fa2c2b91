use std::fmt;

/// Stable handle of a node inside a [`crate::Document`] arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

pub type Attributes = Vec<(String, Option<String>)>;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Token {
    Doctype(String),
    StartTag {
        name: String,
        attributes: Attributes,
        self_closing: bool,
    },
    EndTag(String),
    Comment(String),
    Text(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeData {
    /// Root container of a parsed document or of a detached clone.
    Fragment,
    Element { name: String, attributes: Attributes },
    Text(String),
    Comment(String),
    Doctype(String),
}

impl NodeData {
    pub fn can_have_children(&self) -> bool {
        matches!(self, NodeData::Fragment | NodeData::Element { .. })
    }

    pub fn element_name(&self) -> Option<&str> {
        match self {
            NodeData::Element { name, .. } => Some(name),
            _ => None,
        }
    }
}
