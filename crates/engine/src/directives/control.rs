//! Control flow directives: `if` / `elseif` / `else`, `for` and `foreach`.

use super::Processor;
use crate::error::Error;
use crate::visitor::Signal;
use expr::{Value, evaluate};
use html::{Document, NodeId};
use serde_json::Value as JsonValue;

impl Processor<'_> {
    /// Renders the first truthy branch of the chain that starts at `node`.
    pub(super) fn if_chain(&mut self, doc: &mut Document, node: NodeId) -> Result<Signal, Error> {
        let mut chain = vec![node];
        let mut cursor = node;
        while let Some(next) = doc.next_element_sibling(cursor) {
            match doc.tag_name(next) {
                Some("elseif") => chain.push(next),
                Some("else") => {
                    chain.push(next);
                    break;
                }
                _ => break,
            }
            cursor = next;
        }

        let mut signal = Signal::Skip;
        for &branch in &chain {
            if self.branch_taken(doc, branch)? {
                signal = self.walk_children(doc, branch)?;
                doc.move_children_before(branch, branch);
                break;
            }
        }
        for branch in chain {
            doc.detach(branch);
        }
        Ok(signal)
    }

    fn branch_taken(&self, doc: &Document, branch: NodeId) -> Result<bool, Error> {
        if doc.is_element_named(branch, "else") {
            return Ok(true);
        }
        let Some(condition) = doc.attr(branch, "condition") else {
            log::warn!(target: "pearl.control", "branch at {branch} has no condition");
            return Ok(false);
        };
        let value = evaluate(condition, &self.state.models)
            .map_err(|err| Error::evaluation(doc, branch, err))?;
        Ok(is_taken(&value))
    }

    /// An `elseif` or `else` that does not follow an `if` chain.
    pub(super) fn orphan_branch(&mut self, doc: &mut Document, node: NodeId) -> Signal {
        log::warn!(
            target: "pearl.control",
            "<{}> at {node} does not follow an `if`; removed",
            doc.tag_name(node).unwrap_or_default()
        );
        doc.detach(node);
        Signal::Skip
    }

    pub(super) fn for_loop(&mut self, doc: &mut Document, node: NodeId) -> Result<Signal, Error> {
        let target = self.attr_value(doc, node, "in")?;
        let indices = (0..target.length().unwrap_or(0)).map(JsonValue::from);
        self.repeat(doc, node, indices)
    }

    pub(super) fn foreach_loop(&mut self, doc: &mut Document, node: NodeId) -> Result<Signal, Error> {
        let target = self.attr_value(doc, node, "in")?;
        let keys = target.keys().into_iter().map(JsonValue::String);
        self.repeat(doc, node, keys)
    }

    /// Renders a fresh copy of the loop body per key, binding the loop
    /// variable to the key, and puts the copies where the loop was.
    fn repeat(
        &mut self,
        doc: &mut Document,
        node: NodeId,
        keys: impl Iterator<Item = JsonValue>,
    ) -> Result<Signal, Error> {
        let var = doc.attr(node, "var").unwrap_or_default().to_string();
        let mut iterations = 0usize;

        for key in keys {
            let body = doc.deep_clone(node);
            self.state.models.push_binding(&var, key);
            let walked = self.walk_detached(doc, body);
            self.state.models.pop();
            if walked? == Signal::Stop {
                return Ok(Signal::Stop);
            }
            doc.move_children_before(body, node);
            iterations += 1;
        }

        log::trace!(target: "pearl.control", "loop at {node} ran {iterations} time(s)");
        doc.detach(node);
        Ok(Signal::Skip)
    }
}

/// Branch truthiness: a truthy value that is not the text `"undefined"`.
fn is_taken(value: &Value) -> bool {
    value.is_truthy() && !matches!(value, Value::String(s) if s == "undefined")
}
