use std::rc::Rc;

use crate::actor::SpriteActor;
use crate::scripts::ScriptCompiler;

/// Keeps released actors around so they can be handed out again without reallocating.
pub struct ActorPool {
    free: Vec<SpriteActor>,
    capacity: usize,
    compiler: Rc<dyn ScriptCompiler>,
}

impl ActorPool {
    pub fn new(capacity: usize, compiler: Rc<dyn ScriptCompiler>) -> Self {
        Self { free: Vec::with_capacity(capacity), capacity, compiler }
    }

    pub fn acquire(&mut self, name: impl Into<String>) -> SpriteActor {
        match self.free.pop() {
            Some(mut actor) => {
                actor.reset(name);
                actor
            }
            None => SpriteActor::with_compiler(name, self.compiler.clone()),
        }
    }

    /// Empties the actor's actions and variables and keeps it for reuse while capacity allows.
    pub fn release(&mut self, mut actor: SpriteActor) {
        actor.release();
        if self.free.len() < self.capacity {
            self.free.push(actor);
        } else {
            log::debug!("actor pool full, dropping '{}'", actor.name());
        }
    }

    pub fn available(&self) -> usize {
        self.free.len()
    }
}
