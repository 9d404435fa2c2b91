use html::{Document, NodeId};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error("export at node {node} targets unknown region `{region}`")]
    UnresolvedRegion { node: NodeId, region: String },

    #[error("evaluation failed in <{tag}> at node {node}: {source}")]
    Evaluation {
        node: NodeId,
        tag: String,
        #[source]
        source: expr::Error,
    },

    #[error("unknown helper `{helper}` at node {node}")]
    UnknownHelper { node: NodeId, helper: String },

    #[error("unknown resource type `{kind}` at node {node}")]
    UnknownResourceType { node: NodeId, kind: String },

    #[error("include of `{name}` at node {node} exceeds the nesting limit of {limit}")]
    IncludeDepth {
        node: NodeId,
        name: String,
        limit: usize,
    },
}

impl Error {
    /// Attaches node context to an expression failure.
    pub(crate) fn evaluation(doc: &Document, node: NodeId, source: expr::Error) -> Self {
        match source {
            expr::Error::UnknownHelper { name } => Error::UnknownHelper { node, helper: name },
            source => Error::Evaluation {
                node,
                tag: doc.tag_name(node).unwrap_or("#text").to_string(),
                source,
            },
        }
    }

    pub fn node(&self) -> NodeId {
        match self {
            Error::UnresolvedRegion { node, .. }
            | Error::Evaluation { node, .. }
            | Error::UnknownHelper { node, .. }
            | Error::UnknownResourceType { node, .. }
            | Error::IncludeDepth { node, .. } => *node,
        }
    }
}
