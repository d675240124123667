use std::any::Any;

use crate::geometry::Transform;
use crate::render::RenderContext;

pub const DRAW_SLOT: &str = "draw";
pub const COLLIDE_SLOT: &str = "collide";

/// A named behavioural facet attached to an actor. The actor owns its components exclusively
/// and calls [`Component::release`] when one is removed or when the actor goes away.
pub trait Component: Any {
    fn type_name(&self) -> &'static str;

    fn execute(&mut self, _ctx: &mut dyn RenderContext, _transform: &Transform, _world_time: u64) {}

    fn release(&mut self) {}

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

#[derive(Default)]
pub struct ComponentSlots {
    slots: Vec<(String, Box<dyn Component>)>,
}

impl ComponentSlots {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches `component` under `slot`. An occupied slot is left untouched and `false` returned.
    pub fn add(&mut self, slot: impl Into<String>, component: Box<dyn Component>) -> bool {
        let slot = slot.into();
        if self.contains(&slot) {
            log::debug!("component slot '{slot}' already occupied");
            return false;
        }
        self.slots.push((slot, component));
        true
    }

    pub fn contains(&self, slot: &str) -> bool {
        self.slots.iter().any(|(name, _)| name == slot)
    }

    pub fn get<T: Component>(&self, slot: &str) -> Option<&T> {
        self.slots.iter().find(|(name, _)| name == slot).and_then(|(_, c)| c.as_any().downcast_ref::<T>())
    }

    pub fn get_mut<T: Component>(&mut self, slot: &str) -> Option<&mut T> {
        self.slots
            .iter_mut()
            .find(|(name, _)| name == slot)
            .and_then(|(_, c)| c.as_any_mut().downcast_mut::<T>())
    }

    /// Detaches the component in `slot` without releasing it.
    pub fn remove(&mut self, slot: &str) -> Option<Box<dyn Component>> {
        let idx = self.slots.iter().position(|(name, _)| name == slot)?;
        Some(self.slots.remove(idx).1)
    }

    pub fn remove_and_release(&mut self, slot: &str) -> bool {
        match self.remove(slot) {
            Some(mut component) => {
                component.release();
                true
            }
            None => false,
        }
    }

    pub fn execute_all(&mut self, ctx: &mut dyn RenderContext, transform: &Transform, world_time: u64) {
        for (_, component) in &mut self.slots {
            component.execute(ctx, transform, world_time);
        }
    }

    pub fn release_all(&mut self) {
        for (slot, mut component) in self.slots.drain(..) {
            log::debug!("releasing {} in slot '{slot}'", component.type_name());
            component.release();
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn slot_names(&self) -> impl Iterator<Item = &str> {
        self.slots.iter().map(|(name, _)| name.as_str())
    }
}
