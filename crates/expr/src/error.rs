use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error("syntax error in `{expr}` at offset {offset}: {message}")]
    Syntax {
        expr: String,
        offset: usize,
        message: String,
    },

    #[error("`{name}` is not defined")]
    Unbound { name: String },

    #[error("cannot read property `{property}` of {target}")]
    PropertyOfNothing { property: String, target: &'static str },

    #[error("unknown helper `{name}`")]
    UnknownHelper { name: String },

    #[error("unterminated marker in `{text}`")]
    UnterminatedMarker { text: String },

    #[error("invalid assignment: {message}")]
    InvalidAssignment { message: String },
}

impl Error {
    pub(crate) fn syntax(expr: &str, offset: usize, message: impl Into<String>) -> Self {
        Error::Syntax {
            expr: expr.to_string(),
            offset,
            message: message.into(),
        }
    }
}
