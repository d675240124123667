use std::cell::OnceCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::error::ActorError;
use crate::scripts::{CompiledScript, ScriptCompiler};

/// One scripted event: the author's source text and, once first invoked, its compiled form.
pub struct Action {
    script: String,
    compiled: OnceCell<Rc<dyn CompiledScript>>,
}

impl Action {
    pub fn new(script: impl Into<String>) -> Self {
        Self { script: script.into(), compiled: OnceCell::new() }
    }

    pub fn script(&self) -> &str {
        &self.script
    }

    pub fn is_compiled(&self) -> bool {
        self.compiled.get().is_some()
    }

    /// Returns the cached callable, compiling it first if this is the first use.
    /// The cache is written at most once for the lifetime of the action.
    pub fn compiled_or_compile(
        &self,
        event: &str,
        arg_names: &[&str],
        compiler: &dyn ScriptCompiler,
    ) -> Result<Rc<dyn CompiledScript>, ActorError> {
        if let Some(compiled) = self.compiled.get() {
            return Ok(compiled.clone());
        }
        log::debug!("compiling scripted event '{event}' with arguments {arg_names:?}");
        let compiled = compiler.compile(event, arg_names, &self.script)?;
        Ok(self.compiled.get_or_init(|| compiled).clone())
    }
}

impl std::fmt::Debug for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Action").field("script", &self.script).field("compiled", &self.is_compiled()).finish()
    }
}

#[derive(Debug, Default)]
pub struct ActionRegistry {
    actions: HashMap<String, Action>,
}

impl ActionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a fresh action for `name`, dropping whatever was registered (and compiled) before.
    pub fn set(&mut self, name: impl Into<String>, script: impl Into<String>) {
        self.actions.insert(name.into(), Action::new(script));
    }

    pub fn get(&self, name: &str) -> Option<&Action> {
        self.actions.get(name)
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn clear(&mut self) {
        self.actions.clear();
    }
}
