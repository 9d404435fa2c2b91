//! Markup serializer, the inverse of [`crate::parse`].
//!
//! Text and attribute values are written verbatim (they were never decoded),
//! except that `"` inside an attribute value is written as `&quot;`. Void
//! elements get no end tag; every other element does, even when empty.

use crate::document::Document;
use crate::tokenizer::is_void_element;
use crate::types::{NodeData, NodeId};

enum Step {
    Open(NodeId),
    Close(NodeId),
}

/// Serializes `node` and its subtree. A fragment serializes as its children.
pub fn serialize(doc: &Document, node: NodeId) -> String {
    let mut out = String::new();
    let mut stack = vec![Step::Open(node)];

    while let Some(step) = stack.pop() {
        match step {
            Step::Open(id) => match doc.data(id) {
                NodeData::Fragment => {
                    stack.extend(doc.children(id).iter().rev().map(|&c| Step::Open(c)));
                }
                NodeData::Element { name, attributes } => {
                    out.push('<');
                    out.push_str(name);
                    for (key, value) in attributes {
                        out.push(' ');
                        out.push_str(key);
                        if let Some(value) = value {
                            out.push_str("=\"");
                            push_attr_value(&mut out, value);
                            out.push('"');
                        }
                    }
                    out.push('>');
                    if is_void_element(name) {
                        continue;
                    }
                    stack.push(Step::Close(id));
                    stack.extend(doc.children(id).iter().rev().map(|&c| Step::Open(c)));
                }
                NodeData::Text(text) => out.push_str(text),
                NodeData::Comment(text) => {
                    out.push_str("<!--");
                    out.push_str(text);
                    out.push_str("-->");
                }
                NodeData::Doctype(text) => {
                    out.push_str("<!");
                    out.push_str(text);
                    out.push('>');
                }
            },
            Step::Close(id) => {
                if let Some(name) = doc.tag_name(id) {
                    out.push_str("</");
                    out.push_str(name);
                    out.push('>');
                }
            }
        }
    }

    out
}

fn push_attr_value(out: &mut String, value: &str) {
    let mut rest = value;
    while let Some(pos) = rest.find('"') {
        out.push_str(&rest[..pos]);
        out.push_str("&quot;");
        rest = &rest[pos + 1..];
    }
    out.push_str(rest);
}

impl Document {
    /// Serializes the whole document.
    pub fn to_html(&self) -> String {
        serialize(self, self.root())
    }

    /// Serializes the children of `node` without the node itself.
    pub fn inner_html(&self, node: NodeId) -> String {
        self.children(node)
            .iter()
            .map(|&child| serialize(self, child))
            .collect()
    }
}
