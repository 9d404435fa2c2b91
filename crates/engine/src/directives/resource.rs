use super::Processor;
use crate::error::Error;
use crate::visitor::Signal;
use html::{Document, NodeId};

impl Processor<'_> {
    /// Replaces `<resource type path>` with a stylesheet link or a script tag.
    pub(super) fn resource(&mut self, doc: &mut Document, node: NodeId) -> Result<Signal, Error> {
        let kind = self.attr_string(doc, node, "type")?;
        let path = self.attr_string(doc, node, "path")?;
        let url = self.config.resource_path(&path, &kind);

        let element = match kind.as_str() {
            "css" => doc.create_element(
                "link",
                vec![
                    ("href".to_string(), Some(url)),
                    ("rel".to_string(), Some("stylesheet".to_string())),
                ],
            ),
            "js" => doc.create_element(
                "script",
                vec![
                    ("src".to_string(), Some(url)),
                    ("type".to_string(), Some("text/javascript".to_string())),
                ],
            ),
            _ => return Err(Error::UnknownResourceType { node, kind }),
        };
        doc.replace_with(node, &[element]);
        Ok(Signal::Skip)
    }
}
