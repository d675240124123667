use std::any::Any;
use std::rc::Rc;

use crate::components::Component;
use crate::geometry::{Rect, Transform};
use crate::render::RenderContext;

/// A loaded sprite as seen by actors: a display name and the bounding box of its frame.
#[derive(Debug, Clone, PartialEq)]
pub struct SpriteResource {
    name: String,
    bounding_box: Rect,
}

impl SpriteResource {
    pub fn new(name: impl Into<String>, bounding_box: Rect) -> Self {
        Self { name: name.into(), bounding_box }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bounding_box(&self) -> Rect {
        self.bounding_box
    }
}

/// Render component that draws the actor's current sprite during the update pass.
#[derive(Default)]
pub struct SpriteRenderer {
    sprite: Option<Rc<SpriteResource>>,
    draws: u64,
}

impl SpriteRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_sprite(&mut self, sprite: Rc<SpriteResource>) {
        self.sprite = Some(sprite);
    }

    pub fn sprite(&self) -> Option<&Rc<SpriteResource>> {
        self.sprite.as_ref()
    }

    pub fn draws(&self) -> u64 {
        self.draws
    }
}

impl Component for SpriteRenderer {
    fn type_name(&self) -> &'static str {
        "SpriteRenderer"
    }

    fn execute(&mut self, ctx: &mut dyn RenderContext, _transform: &Transform, world_time: u64) {
        if let Some(sprite) = &self.sprite {
            ctx.draw_sprite(sprite, world_time);
            self.draws += 1;
        }
    }

    fn release(&mut self) {
        self.sprite = None;
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
