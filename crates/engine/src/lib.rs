//! Directive processing for pearl templates.
//!
//! An [`Engine`] is built once (configuration plus helper registry) and then
//! renders any number of documents. Each render owns its own scope state, so
//! one engine can serve concurrent renders.

pub mod config;
pub mod helpers;
pub mod visitor;

mod directives;
mod error;
mod state;

pub use crate::config::{Config, Mode, ParseModeError, ResourceConfig};
pub use crate::error::Error;
pub use crate::helpers::{builtin_helpers, encode_uri};
pub use crate::visitor::{Signal, Visit, walk};

use crate::directives::Processor;
use crate::state::State;
use expr::{Helpers, Scope, Value};
use html::Document;
use serde_json::Value as JsonValue;

#[derive(Debug, Clone)]
pub struct Engine {
    config: Config,
    helpers: Helpers,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl Engine {
    /// Engine with the built-in `escape` and `encode` helpers installed.
    pub fn new(config: Config) -> Self {
        Self {
            config,
            helpers: builtin_helpers(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn helpers(&self) -> &Helpers {
        &self.helpers
    }

    /// Registers a helper under each of `names` for use as `{{expr#name}}`.
    pub fn register_helper<F>(&mut self, names: &[&str], helper: F)
    where
        F: Fn(Value, &dyn Scope) -> Value + Send + Sync + 'static,
    {
        self.helpers.register(names, helper);
    }

    /// Renders `doc` against `model`.
    ///
    /// Components are taken out of the tree and become templates, directives
    /// are rewritten in document order, and region placeholders are removed at
    /// the end. On error nothing is returned.
    pub fn process(&self, mut doc: Document, model: JsonValue) -> Result<Document, Error> {
        let root = doc.root();
        let mut state = State::new(model, root);
        state.register_components(&mut doc, root);
        state.register_regions(&doc, root);
        log::debug!(
            target: "pearl.engine",
            "processing {} template(s), {} region(s)",
            state.templates.len(),
            state.regions.len()
        );

        let mut processor = Processor {
            config: &self.config,
            helpers: &self.helpers,
            state,
        };
        let top = doc.children(root).to_vec();
        if walk(&mut processor, &mut doc, &top)?.is_break() {
            log::debug!(target: "pearl.engine", "walk stopped early");
        }

        debug_assert_eq!(processor.state.models.depth(), 1, "unbalanced model frames");
        processor.state.remove_placeholders(&mut doc);
        Ok(doc)
    }

    /// Parses `markup`, renders it and serializes the result.
    pub fn render_html(&self, markup: &str, model: JsonValue) -> Result<String, Error> {
        let doc = self.process(html::parse(markup), model)?;
        Ok(doc.to_html())
    }
}
