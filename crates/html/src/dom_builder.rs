use crate::document::Document;
use crate::tokenizer::tokenize;
use crate::types::{NodeData, NodeId, Token};

/// Parses template markup into a fresh [`Document`].
pub fn parse(markup: &str) -> Document {
    build_dom(&tokenize(markup))
}

/// Builds a document from a token list.
///
/// End tags close the nearest open element with the same name; an end tag
/// with no matching open element is ignored. Adjacent text tokens are merged.
pub fn build_dom(tokens: &[Token]) -> Document {
    let mut doc = Document::new();
    let root = doc.root();
    let mut open_elements: Vec<NodeId> = Vec::new();

    for token in tokens {
        let parent = open_elements.last().copied().unwrap_or(root);
        match token {
            Token::Doctype(s) => {
                let node = doc.create_doctype(s.clone());
                doc.append(parent, node);
            }
            Token::Comment(c) => {
                let node = doc.create_comment(c.clone());
                doc.append(parent, node);
            }
            Token::Text(txt) => {
                if txt.is_empty() {
                    continue;
                }
                if let Some(&last) = doc.children(parent).last()
                    && let NodeData::Text(existing) = doc.data_mut(last)
                {
                    existing.push_str(txt);
                    continue;
                }
                let node = doc.create_text(txt.clone());
                doc.append(parent, node);
            }
            Token::StartTag {
                name,
                attributes,
                self_closing,
            } => {
                let node = doc.create_element(name, attributes.clone());
                doc.append(parent, node);
                if !*self_closing {
                    open_elements.push(node);
                }
            }
            Token::EndTag(name) => {
                let Some(pos) = open_elements
                    .iter()
                    .rposition(|&open| doc.is_element_named(open, name))
                else {
                    log::trace!(target: "html.builder", "ignoring unmatched end tag </{name}>");
                    continue;
                };
                open_elements.truncate(pos);
            }
        }
    }

    doc
}
