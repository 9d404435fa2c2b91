//! Per-render state: model frames, block overrides, registries.
//!
//! One `State` exists per `process` call and is dropped with it, so
//! independent renders never share bindings, overrides or exports.

use expr::{Scope, ScopeMut};
use html::{Document, NodeId};
use serde_json::{Map, Value as JsonValue};
use std::collections::{HashMap, HashSet};

/// Stack of binding frames, outermost (the caller's model) first.
///
/// Lookup searches innermost first, which is the same as merging all frames
/// in order with later keys winning.
#[derive(Debug, Default)]
pub(crate) struct ModelStack {
    frames: Vec<Map<String, JsonValue>>,
}

impl ModelStack {
    pub(crate) fn new(root: JsonValue) -> Self {
        let root = match root {
            JsonValue::Object(map) => map,
            JsonValue::Null => Map::new(),
            other => {
                log::warn!(
                    target: "pearl.state",
                    "model is not an object ({other}); rendering without root bindings"
                );
                Map::new()
            }
        };
        Self { frames: vec![root] }
    }

    pub(crate) fn push(&mut self, frame: Map<String, JsonValue>) {
        self.frames.push(frame);
    }

    pub(crate) fn push_binding(&mut self, name: &str, value: JsonValue) {
        let mut frame = Map::new();
        frame.insert(name.to_string(), value);
        self.push(frame);
    }

    pub(crate) fn pop(&mut self) {
        debug_assert!(self.frames.len() > 1, "popped the root model frame");
        self.frames.pop();
    }

    pub(crate) fn depth(&self) -> usize {
        self.frames.len()
    }
}

impl Scope for ModelStack {
    fn lookup(&self, name: &str) -> Option<&JsonValue> {
        self.frames.iter().rev().find_map(|frame| frame.get(name))
    }
}

impl ScopeMut for ModelStack {
    fn lookup_mut(&mut self, name: &str) -> Option<&mut JsonValue> {
        self.frames
            .iter_mut()
            .rev()
            .find_map(|frame| frame.get_mut(name))
    }

    fn assign(&mut self, name: &str, value: JsonValue) {
        if let Some(slot) = self.lookup_mut(name) {
            *slot = value;
        } else if let Some(innermost) = self.frames.last_mut() {
            innermost.insert(name.to_string(), value);
        }
    }
}

/// Replacement content for one block id, captured at an include site.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Override {
    /// Detached `block` element whose children replace the template block.
    pub content: NodeId,
    /// Same-id block inside the template instance, for `parent`.
    pub orig: Option<NodeId>,
}

pub(crate) type BlockFrame = HashMap<String, Override>;

#[derive(Debug, Default)]
pub(crate) struct State {
    pub models: ModelStack,
    pub blocks: Vec<BlockFrame>,
    /// Overrides currently being rendered, innermost last.
    pub parents: Vec<Override>,
    pub regions: HashMap<String, NodeId>,
    /// Every region placeholder seen, removed once the walk is done.
    pub placeholders: Vec<NodeId>,
    /// Detached, never-rendered component definitions.
    pub templates: HashMap<String, NodeId>,
    pub exports: HashSet<String>,
    /// Exported nodes already rendered at their export site; the walk must
    /// not visit them again at their region.
    pub rendered: HashSet<NodeId>,
    /// Subtrees currently being rendered: the document root, then any detached
    /// template instance or override body a handler is walking.
    pub roots: Vec<NodeId>,
}

impl State {
    pub(crate) fn new(model: JsonValue, root: NodeId) -> Self {
        Self {
            models: ModelStack::new(model),
            roots: vec![root],
            ..Self::default()
        }
    }

    /// Detaches every `component` under `root` and records it by id.
    pub(crate) fn register_components(&mut self, doc: &mut Document, root: NodeId) {
        for component in doc.descendants_named(root, "component") {
            doc.detach(component);
            let Some(id) = doc.attr(component, "id") else {
                log::warn!(target: "pearl.state", "component {component} has no id; dropped");
                continue;
            };
            log::debug!(target: "pearl.state", "registered component `{id}`");
            if self.templates.insert(id.to_string(), component).is_some() {
                log::warn!(target: "pearl.state", "component `{id}` redefined; last definition wins");
            }
        }
    }

    /// Records every `region` under `root`; later ids replace earlier ones.
    pub(crate) fn register_regions(&mut self, doc: &Document, root: NodeId) {
        for region in doc.descendants_named(root, "region") {
            self.placeholders.push(region);
            match doc.attr(region, "id") {
                Some(id) => {
                    log::debug!(target: "pearl.state", "registered region `{id}`");
                    self.regions.insert(id.to_string(), region);
                }
                None => log::warn!(target: "pearl.state", "region {region} has no id"),
            }
        }
    }

    /// Live placeholder for `id`. A region whose placeholder was dropped with
    /// its subtree (for example an untaken `if` branch) no longer exists.
    pub(crate) fn region(&self, doc: &Document, id: &str) -> Option<NodeId> {
        self.regions.get(id).copied().filter(|&region| {
            doc.parent(region).is_some() && self.roots.contains(&topmost(doc, region))
        })
    }

    /// Removes the override for `id` from the innermost frame that has one.
    pub(crate) fn take_override(&mut self, id: &str) -> Option<Override> {
        self.blocks
            .iter_mut()
            .rev()
            .find_map(|frame| frame.remove(id))
    }

    pub(crate) fn remove_placeholders(&self, doc: &mut Document) {
        for &region in &self.placeholders {
            doc.detach(region);
        }
    }
}

fn topmost(doc: &Document, mut node: NodeId) -> NodeId {
    while let Some(parent) = doc.parent(node) {
        node = parent;
    }
    node
}

#[cfg(test)]
mod tests {
    use super::*;
    use expr::evaluate;
    use serde_json::json;

    #[test]
    fn inner_frames_shadow_outer_ones() {
        let mut models = ModelStack::new(json!({ "a": 1, "b": 2 }));
        models.push_binding("a", json!(10));
        assert_eq!(models.lookup("a"), Some(&json!(10)));
        assert_eq!(models.lookup("b"), Some(&json!(2)));
        assert_eq!(evaluate("a + b", &models), Ok(expr::Value::Number(12.0)));

        models.pop();
        assert_eq!(models.lookup("a"), Some(&json!(1)));
        assert_eq!(models.depth(), 1);
    }

    #[test]
    fn assign_updates_the_binding_frame() {
        let mut models = ModelStack::new(json!({ "count": 1 }));
        models.push_binding("i", json!(0));
        models.assign("count", json!(2));
        models.assign("fresh", json!(true));
        models.pop();
        assert_eq!(models.lookup("count"), Some(&json!(2)));
        assert_eq!(models.lookup("fresh"), None);
    }

    #[test]
    fn non_object_models_bind_nothing() {
        let models = ModelStack::new(json!([1, 2]));
        assert_eq!(models.lookup("0"), None);
        assert_eq!(models.depth(), 1);
    }

    #[test]
    fn overrides_are_consumed_innermost_first() {
        let mut doc = Document::new();
        let outer = doc.create_element("block", Vec::new());
        let inner = doc.create_element("block", Vec::new());

        let mut state = State::new(json!({}), doc.root());
        state.blocks.push(BlockFrame::from([(
            "body".to_string(),
            Override { content: outer, orig: None },
        )]));
        state.blocks.push(BlockFrame::from([(
            "body".to_string(),
            Override { content: inner, orig: None },
        )]));

        assert_eq!(state.take_override("body").map(|o| o.content), Some(inner));
        assert_eq!(state.take_override("body").map(|o| o.content), Some(outer));
        assert!(state.take_override("body").is_none());
    }

    #[test]
    fn registration_detaches_components_and_tracks_regions() {
        let mut doc = html::parse(
            r#"<region id="head"></region><component id="card">x</component><p>y</p>"#,
        );
        let root = doc.root();
        let mut state = State::new(json!({}), root);
        state.register_components(&mut doc, root);
        state.register_regions(&doc, root);

        assert!(state.templates.contains_key("card"));
        assert_eq!(doc.to_html(), r#"<region id="head"></region><p>y</p>"#);
        let head = state.region(&doc, "head");
        assert!(head.is_some());

        state.remove_placeholders(&mut doc);
        assert_eq!(doc.to_html(), "<p>y</p>");
        assert!(state.region(&doc, "head").is_none());
    }
}
