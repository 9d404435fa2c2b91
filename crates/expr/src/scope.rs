//! Name resolution for expressions.
//!
//! Expressions never see ambient state: every free identifier is looked up
//! through a [`Scope`]. Hosts with layered data (for example a stack of model
//! frames) implement the trait to search their layers.

use serde_json::{Map, Value as JsonValue};

pub trait Scope {
    fn lookup(&self, name: &str) -> Option<&JsonValue>;
}

/// A scope whose bindings can be patched by model-patch statements.
pub trait ScopeMut: Scope {
    fn lookup_mut(&mut self, name: &str) -> Option<&mut JsonValue>;

    /// Rebinds `name`, creating the binding when it does not exist yet.
    fn assign(&mut self, name: &str, value: JsonValue);
}

impl Scope for Map<String, JsonValue> {
    fn lookup(&self, name: &str) -> Option<&JsonValue> {
        self.get(name)
    }
}

impl ScopeMut for Map<String, JsonValue> {
    fn lookup_mut(&mut self, name: &str) -> Option<&mut JsonValue> {
        self.get_mut(name)
    }

    fn assign(&mut self, name: &str, value: JsonValue) {
        self.insert(name.to_string(), value);
    }
}

/// A JSON object exposes its fields; any other JSON value binds nothing.
impl Scope for JsonValue {
    fn lookup(&self, name: &str) -> Option<&JsonValue> {
        self.as_object().and_then(|map| map.get(name))
    }
}
