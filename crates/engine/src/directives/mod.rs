//! Directive processor: the [`Visit`] implementation that rewrites a template.
//!
//! Handlers that replace their node walk the replacement content themselves,
//! splice it in, and answer `Skip`. Nodes that left the tree before the walk
//! reached them are skipped as well, and so is exported content that lands in
//! a region the walk has yet to reach.

mod compose;
mod control;
mod resource;
mod script;

use crate::config::Config;
use crate::error::Error;
use crate::state::State;
use crate::visitor::{Signal, Visit, walk};
use expr::{Helpers, Value, interpolate};
use html::{Document, NodeId};
use std::ops::ControlFlow;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Directive {
    Include,
    Export,
    Resource,
    If,
    Branch,
    For,
    Foreach,
    Block,
    Parent,
    Script,
}

impl Directive {
    fn from_tag(name: &str) -> Option<Self> {
        Some(match name {
            "include" => Directive::Include,
            "export" => Directive::Export,
            "resource" => Directive::Resource,
            "if" => Directive::If,
            "elseif" | "else" => Directive::Branch,
            "for" => Directive::For,
            "foreach" => Directive::Foreach,
            "block" => Directive::Block,
            "parent" => Directive::Parent,
            "script" => Directive::Script,
            _ => return None,
        })
    }
}

pub(crate) struct Processor<'e> {
    pub(crate) config: &'e Config,
    pub(crate) helpers: &'e Helpers,
    pub(crate) state: State,
}

impl Visit for Processor<'_> {
    type Error = Error;

    fn visit(&mut self, doc: &mut Document, node: NodeId) -> Result<Signal, Error> {
        if doc.parent(node).is_none() || self.state.rendered.contains(&node) {
            return Ok(Signal::Skip);
        }
        log::trace!(target: "pearl.walk", "visit {node} {:?}", doc.tag_name(node));

        if doc.text(node).is_some() {
            self.text(doc, node)?;
            return Ok(Signal::Continue);
        }
        let Some(name) = doc.tag_name(node) else {
            return Ok(Signal::Continue);
        };
        let directive = Directive::from_tag(name);

        let signal = match directive {
            Some(Directive::Include) => self.include(doc, node)?,
            Some(Directive::Export) => self.export(doc, node)?,
            Some(Directive::Resource) => self.resource(doc, node)?,
            Some(Directive::If) => self.if_chain(doc, node)?,
            Some(Directive::Branch) => self.orphan_branch(doc, node),
            Some(Directive::For) => self.for_loop(doc, node)?,
            Some(Directive::Foreach) => self.foreach_loop(doc, node)?,
            Some(Directive::Block) => self.block(doc, node)?,
            Some(Directive::Parent) => self.parent(doc, node)?,
            Some(Directive::Script) => self.script(doc, node)?,
            None => Signal::Continue,
        };

        if signal == Signal::Continue {
            self.attributes(doc, node)?;
        }
        Ok(signal)
    }
}

impl Processor<'_> {
    /// Interpolates `text` against the current model, attributing failures to `node`.
    fn interpolate(&self, doc: &Document, node: NodeId, text: &str) -> Result<Value, Error> {
        interpolate(text, &self.state.models, self.helpers)
            .map_err(|err| Error::evaluation(doc, node, err))
    }

    /// Interpolated value of attribute `name`; a missing attribute is `undefined`.
    fn attr_value(&self, doc: &Document, node: NodeId, name: &str) -> Result<Value, Error> {
        match doc.attr(node, name) {
            Some(raw) => self.interpolate(doc, node, raw),
            None => Ok(Value::Undefined),
        }
    }

    fn attr_string(&self, doc: &Document, node: NodeId, name: &str) -> Result<String, Error> {
        Ok(self.attr_value(doc, node, name)?.to_interpolated_string())
    }

    /// Walks the children of `node`, turning a nested stop into this
    /// handler's answer.
    fn walk_children(&mut self, doc: &mut Document, node: NodeId) -> Result<Signal, Error> {
        let children = doc.children(node).to_vec();
        Ok(match walk(self, doc, &children)? {
            ControlFlow::Break(()) => Signal::Stop,
            ControlFlow::Continue(()) => Signal::Skip,
        })
    }

    /// Walks the children of a detached subtree root, keeping regions inside
    /// it resolvable while it is rendered.
    fn walk_detached(&mut self, doc: &mut Document, root: NodeId) -> Result<Signal, Error> {
        self.state.roots.push(root);
        let walked = self.walk_children(doc, root);
        self.state.roots.pop();
        walked
    }

    /// Walks the children of `node`, then puts them where `node` was.
    fn unwrap_walked(&mut self, doc: &mut Document, node: NodeId) -> Result<Signal, Error> {
        let signal = self.walk_children(doc, node)?;
        doc.unwrap_node(node);
        Ok(signal)
    }

    fn text(&mut self, doc: &mut Document, node: NodeId) -> Result<(), Error> {
        let Some(text) = doc.text(node) else {
            return Ok(());
        };
        let rendered = self.interpolate(doc, node, text)?;
        doc.set_text(node, rendered.to_interpolated_string());
        Ok(())
    }

    fn attributes(&mut self, doc: &mut Document, node: NodeId) -> Result<(), Error> {
        for index in 0..doc.attributes(node).len() {
            let Some(raw) = doc.attributes(node)[index].1.as_deref() else {
                continue;
            };
            let rendered = self.interpolate(doc, node, raw)?.to_interpolated_string();
            if let Some(attributes) = doc.attributes_mut(node) {
                attributes[index].1 = Some(rendered);
            }
        }
        Ok(())
    }
}
