//! The expression sub-language embedded in templates.
//!
//! - [`evaluate`]: a C-like expression against a [`Scope`].
//! - [`interpolate`]: rewrites `{{expr}}` / `{{expr#helper}}` markers in text.
//! - [`apply_statements`]: restricted `target op expr;` model patches.

mod error;
mod eval;
mod helpers;
mod interpolate;
mod lexer;
mod parser;
mod patch;
mod scope;
mod value;

pub use crate::error::{Error, Result};
pub use crate::eval::{eval_expr, evaluate};
pub use crate::helpers::{HelperFn, Helpers};
pub use crate::interpolate::{Markers, interpolate, interpolate_with};
pub use crate::parser::{
    AssignOp, Assignment, BinaryOp, Expr, LogicalOp, UnaryOp, parse_expression, parse_statements,
};
pub use crate::patch::apply_statements;
pub use crate::scope::{Scope, ScopeMut};
pub use crate::value::Value;
