use std::collections::HashMap;

use rhai::Dynamic;

/// Per-actor scripted variables. Values are untyped; an unset name reads back as unit.
#[derive(Debug, Clone, Default)]
pub struct VariableStore {
    values: HashMap<String, Dynamic>,
}

impl VariableStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Dynamic {
        self.values.get(name).cloned().unwrap_or(Dynamic::UNIT)
    }

    pub fn set(&mut self, name: impl Into<String>, value: Dynamic) {
        self.values.insert(name.into(), value);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }
}
