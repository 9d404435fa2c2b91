use super::Processor;
use crate::error::Error;
use crate::visitor::Signal;
use html::{Document, NodeId};

/// `type` that marks a script as model-patch statements for the engine.
const PATCH_SCRIPT_TYPE: &str = "text/pearl";

impl Processor<'_> {
    /// Applies `<script type="text/pearl">` statements to the model and leaves an
    /// empty text node in its place. Other scripts are ordinary elements.
    pub(super) fn script(&mut self, doc: &mut Document, node: NodeId) -> Result<Signal, Error> {
        if doc.attr(node, "type") != Some(PATCH_SCRIPT_TYPE) {
            return Ok(Signal::Continue);
        }
        let source = doc.text_content(node);
        let applied = expr::apply_statements(&source, &mut self.state.models)
            .map_err(|err| Error::evaluation(doc, node, err))?;
        log::debug!(target: "pearl.script", "applied {applied} model patch(es) at {node}");

        let empty = doc.create_text("");
        doc.replace_with(node, &[empty]);
        Ok(Signal::Skip)
    }
}
