//! Generic tree walk with per-node control.
//!
//! Contract:
//! - Each node in the sequence is passed to [`Visit::visit`] in order.
//! - `Continue` descends into the node's children as they are *after* the visit,
//!   so a handler can rewrite a subtree and have the walk process the result.
//! - `Skip` moves to the next sibling without descending.
//! - `Stop` ends the whole walk, including enclosing levels; the walk reports it
//!   as `ControlFlow::Break` so re-entrant callers can pass it on.
//! - The walk keeps an explicit stack, so tree depth is not bounded by the call stack.

use html::{Document, NodeId};
use std::ops::ControlFlow;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Signal {
    Continue,
    Skip,
    Stop,
}

pub trait Visit {
    type Error;

    fn visit(&mut self, doc: &mut Document, node: NodeId) -> Result<Signal, Self::Error>;

    fn children(&self, doc: &Document, node: NodeId) -> Vec<NodeId> {
        doc.children(node).to_vec()
    }
}

pub fn walk<V: Visit>(
    visitor: &mut V,
    doc: &mut Document,
    nodes: &[NodeId],
) -> Result<ControlFlow<()>, V::Error> {
    let mut stack: Vec<std::vec::IntoIter<NodeId>> = vec![nodes.to_vec().into_iter()];

    while let Some(level) = stack.last_mut() {
        let Some(node) = level.next() else {
            stack.pop();
            continue;
        };
        match visitor.visit(doc, node)? {
            Signal::Stop => return Ok(ControlFlow::Break(())),
            Signal::Skip => {}
            Signal::Continue => {
                let children = visitor.children(doc, node);
                if !children.is_empty() {
                    stack.push(children.into_iter());
                }
            }
        }
    }

    Ok(ControlFlow::Continue(()))
}
