//! pearl: server-side HTML templates with directive tags.
//!
//! ```
//! let html = pearl::render_html(
//!     r#"<for var="i" in="{{items}}"><li>{{items[i]}}</li></for>"#,
//!     serde_json::json!({ "items": ["a", "b"] }),
//! )
//! .unwrap();
//! assert_eq!(html, "<li>a</li><li>b</li>");
//! ```
//!
//! [`render_html`] and [`render_dom`] use a default [`Engine`]. Build an
//! engine yourself to change the [`Config`] or register extra helpers.

pub use engine::{Config, Engine, Error, Mode, ResourceConfig};
pub use expr::{Helpers, Scope, Value};
pub use html::{Document, NodeId, parse, serialize};

pub use engine;
pub use expr;
pub use html;

use serde_json::Value as JsonValue;

/// Parses `markup`, renders it against `model` and serializes the result.
pub fn render_html(markup: &str, model: JsonValue) -> Result<String, Error> {
    Engine::default().render_html(markup, model)
}

/// Renders an already parsed document.
pub fn render_dom(doc: Document, model: JsonValue) -> Result<Document, Error> {
    Engine::default().process(doc, model)
}
