use crate::geometry::{Rect, Transform};
use crate::sprite::SpriteResource;

/// Drawing surface consumed by actors during the update pass. Back-ends live outside this crate.
pub trait RenderContext {
    fn push_transform(&mut self, transform: &Transform);
    fn pop_transform(&mut self);
    fn set_line_style(&mut self, style: &str);
    fn set_line_width(&mut self, width: f32);
    fn draw_rectangle(&mut self, rect: Rect);
    fn draw_sprite(&mut self, sprite: &SpriteResource, world_time: u64);
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    PushTransform(Transform),
    PopTransform,
    LineStyle(String),
    LineWidth(f32),
    Rectangle(Rect),
    Sprite { name: String, world_time: u64 },
}

/// Headless context that records every call, used by the stage runner and tests.
#[derive(Debug, Default)]
pub struct CommandRecorder {
    commands: Vec<DrawCommand>,
    depth: usize,
}

impl CommandRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn take_commands(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn sprite_draws(&self) -> usize {
        self.commands.iter().filter(|cmd| matches!(cmd, DrawCommand::Sprite { .. })).count()
    }
}

impl RenderContext for CommandRecorder {
    fn push_transform(&mut self, transform: &Transform) {
        self.depth += 1;
        self.commands.push(DrawCommand::PushTransform(*transform));
    }

    fn pop_transform(&mut self) {
        if self.depth == 0 {
            log::warn!("pop_transform called with an empty transform stack");
            return;
        }
        self.depth -= 1;
        self.commands.push(DrawCommand::PopTransform);
    }

    fn set_line_style(&mut self, style: &str) {
        self.commands.push(DrawCommand::LineStyle(style.to_string()));
    }

    fn set_line_width(&mut self, width: f32) {
        self.commands.push(DrawCommand::LineWidth(width));
    }

    fn draw_rectangle(&mut self, rect: Rect) {
        self.commands.push(DrawCommand::Rectangle(rect));
    }

    fn draw_sprite(&mut self, sprite: &SpriteResource, world_time: u64) {
        self.commands.push(DrawCommand::Sprite { name: sprite.name().to_string(), world_time });
    }
}
