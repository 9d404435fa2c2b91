use crate::scope::Scope;
use crate::value::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A post-processing transform applied by the `expr#name` pipeline suffix.
pub type HelperFn = Arc<dyn Fn(Value, &dyn Scope) -> Value + Send + Sync>;

/// Name → helper registry.
///
/// Filled once before rendering starts and only read afterwards, so a
/// registry can be shared by concurrent renders behind a plain reference.
#[derive(Clone, Default)]
pub struct Helpers {
    map: HashMap<String, HelperFn>,
}

impl Helpers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `helper` under every name in `names`, replacing earlier
    /// registrations of the same name.
    pub fn register<F>(&mut self, names: &[&str], helper: F)
    where
        F: Fn(Value, &dyn Scope) -> Value + Send + Sync + 'static,
    {
        let helper: HelperFn = Arc::new(helper);
        for name in names {
            self.map.insert((*name).to_string(), Arc::clone(&helper));
        }
    }

    pub fn get(&self, name: &str) -> Option<&HelperFn> {
        self.map.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.map.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

impl fmt::Debug for Helpers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.map.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("Helpers").field("names", &names).finish()
    }
}
