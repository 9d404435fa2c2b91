//! Composition directives: `include`, `block`, `parent` and `export`.

use super::Processor;
use crate::error::Error;
use crate::state::{BlockFrame, Override};
use crate::visitor::Signal;
use html::{Document, NodeId};
use serde_json::{Map, Value as JsonValue};

/// Model key under which an included component sees its arguments.
const ARGUMENTS_KEY: &str = "$";

/// Deepest allowed chain of includes, counting the outermost one.
const MAX_INCLUDE_DEPTH: usize = 64;

impl Processor<'_> {
    pub(super) fn include(&mut self, doc: &mut Document, node: NodeId) -> Result<Signal, Error> {
        let name = self.attr_string(doc, node, "name")?;
        let Some(&template) = self.state.templates.get(&name) else {
            log::warn!(
                target: "pearl.include",
                "include of unknown component `{name}` at {node}; rendering its content in place"
            );
            return self.unwrap_walked(doc, node);
        };

        if self.state.blocks.len() >= MAX_INCLUDE_DEPTH {
            return Err(Error::IncludeDepth {
                node,
                name,
                limit: MAX_INCLUDE_DEPTH,
            });
        }

        let instance = doc.deep_clone(template);
        let mut arguments = Map::new();
        // Defaults declared on the component, then call-site values on top.
        for source in [instance, node] {
            for (key, raw) in parameters(doc, source) {
                let value = self.interpolate(doc, node, &raw)?;
                arguments.insert(key, value.into_json());
            }
        }

        let overrides = collect_overrides(doc, node, instance);
        self.state.register_regions(doc, instance);
        log::debug!(
            target: "pearl.include",
            "instantiating `{name}` at {node} with {} argument(s), {} override(s)",
            arguments.len(),
            overrides.len()
        );

        let mut frame = Map::new();
        frame.insert(ARGUMENTS_KEY.to_string(), JsonValue::Object(arguments));
        self.state.models.push(frame);
        self.state.blocks.push(overrides);
        let walked = self.walk_detached(doc, instance);
        self.state.blocks.pop();
        self.state.models.pop();
        let signal = walked?;

        let body = doc.children(instance).to_vec();
        doc.replace_with(node, &body);
        Ok(signal)
    }

    pub(super) fn block(&mut self, doc: &mut Document, node: NodeId) -> Result<Signal, Error> {
        let id = doc.attr(node, "id").unwrap_or_default().to_string();
        let Some(found) = self.state.take_override(&id) else {
            return self.unwrap_walked(doc, node);
        };
        log::debug!(target: "pearl.include", "block `{id}` at {node} overridden");

        self.state.parents.push(found);
        let walked = self.walk_detached(doc, found.content);
        self.state.parents.pop();
        let signal = walked?;

        let content = doc.children(found.content).to_vec();
        doc.replace_with(node, &content);
        Ok(signal)
    }

    pub(super) fn parent(&mut self, doc: &mut Document, node: NodeId) -> Result<Signal, Error> {
        let Some(current) = self.state.parents.pop() else {
            log::warn!(target: "pearl.include", "`parent` at {node} is not inside a block override; removed");
            doc.detach(node);
            return Ok(Signal::Skip);
        };
        let Some(orig) = current.orig else {
            log::debug!(target: "pearl.include", "`parent` at {node} has no original block content");
            self.state.parents.push(current);
            doc.detach(node);
            return Ok(Signal::Skip);
        };

        // The original content renders outside the override it came from, so a
        // `parent` inside it refers to the next enclosing override.
        let copy = doc.deep_clone(orig);
        let walked = self.walk_detached(doc, copy);
        self.state.parents.push(current);
        let signal = walked?;

        let content = doc.children(copy).to_vec();
        doc.replace_with(node, &content);
        Ok(signal)
    }

    pub(super) fn export(&mut self, doc: &mut Document, node: NodeId) -> Result<Signal, Error> {
        if doc.has_attr(node, "unique") {
            let key = self.attr_string(doc, node, "unique")?;
            if !self.state.exports.insert(key) {
                log::debug!(target: "pearl.export", "duplicate unique export at {node} dropped");
                doc.detach(node);
                return Ok(Signal::Skip);
            }
        }

        if self.walk_children(doc, node)? == Signal::Stop {
            return Ok(Signal::Stop);
        }

        let into = self.attr_string(doc, node, "into")?;
        let Some(region) = self.state.region(doc, &into) else {
            return Err(Error::UnresolvedRegion { node, region: into });
        };
        log::debug!(target: "pearl.export", "export at {node} into region `{into}`");
        self.state.rendered.extend(doc.children(node).iter().copied());
        doc.move_children_before(node, region);
        doc.detach(node);
        Ok(Signal::Skip)
    }
}

/// `$name` attributes of `node` as `(name, raw value)`; valueless ones are empty.
fn parameters(doc: &Document, node: NodeId) -> Vec<(String, String)> {
    doc.attributes(node)
        .iter()
        .filter_map(|(name, value)| {
            let key = name.strip_prefix('$')?;
            Some((key.to_string(), value.clone().unwrap_or_default()))
        })
        .collect()
}

/// Detaches the override blocks of an include site and pairs each with the
/// same-id block of the template instance.
///
/// Overrides are the `block` descendants of the include that are not inside
/// another `block` or a nested `include`.
fn collect_overrides(doc: &mut Document, include: NodeId, instance: NodeId) -> BlockFrame {
    let mut found = Vec::new();
    let mut stack: Vec<NodeId> = doc.children(include).iter().rev().copied().collect();
    while let Some(node) = stack.pop() {
        match doc.tag_name(node) {
            Some("block") => found.push(node),
            Some("include") => {}
            _ => stack.extend(doc.children(node).iter().rev()),
        }
    }

    let mut frame = BlockFrame::new();
    for content in found {
        let id = doc.attr(content, "id").unwrap_or_default().to_string();
        let orig = doc.find_first(instance, |candidate| {
            doc.is_element_named(candidate, "block")
                && doc.attr(candidate, "id") == Some(id.as_str())
        });
        doc.detach(content);
        frame.insert(id, Override { content, orig });
    }
    frame
}
