//! Markup collaborator for the template engine: an arena document tree plus
//! the parse/serialize pair that moves between markup text and that tree.

pub mod entities;

mod document;
mod dom_builder;
mod serialize;
mod tokenizer;
mod types;

pub use crate::document::Document;
pub use crate::dom_builder::{build_dom, parse};
pub use crate::entities::escape_html;
pub use crate::serialize::serialize;
pub use crate::tokenizer::tokenize;
pub use crate::types::{Attributes, NodeData, NodeId, Token};
