use std::collections::BTreeMap;
use std::path::Path;
use std::rc::Rc;

use anyhow::{anyhow, Context, Result};
use glam::Vec2;

use crate::actor::{ActorEvent, SpriteActor};
use crate::config::{ActorDefinition, LevelConfig};
use crate::editor::EditorHost;
use crate::sprite::SpriteResource;
use crate::stage::Stage;

/// Named sprites available to a level. Also serves as the editor's sprite catalogue.
#[derive(Debug, Default, Clone)]
pub struct SpriteTable {
    group: String,
    sprites: BTreeMap<String, Rc<SpriteResource>>,
}

impl SpriteTable {
    pub fn new(group: impl Into<String>) -> Self {
        Self { group: group.into(), sprites: BTreeMap::new() }
    }

    pub fn insert(&mut self, sprite: SpriteResource) -> Rc<SpriteResource> {
        let sprite = Rc::new(sprite);
        self.sprites.insert(sprite.name().to_string(), sprite.clone());
        sprite
    }

    pub fn get(&self, name: &str) -> Option<Rc<SpriteResource>> {
        self.sprites.get(name).cloned()
    }

    pub fn len(&self) -> usize {
        self.sprites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sprites.is_empty()
    }
}

impl EditorHost for SpriteTable {
    fn sprite_canonical_name(&self, sprite: &SpriteResource) -> String {
        format!("{}: {}", self.group, sprite.name())
    }

    fn sprite_options(&self) -> Vec<String> {
        self.sprites.values().map(|sprite| self.sprite_canonical_name(sprite)).collect()
    }

    fn sprite_for_name(&self, name: &str) -> Option<Rc<SpriteResource>> {
        let prefix = format!("{}: ", self.group);
        self.get(name.strip_prefix(&prefix).unwrap_or(name))
    }
}

/// A stage populated from a level file, plus the sprites it was built from.
pub struct Level {
    pub stage: Stage,
    pub sprites: SpriteTable,
}

pub fn load_level(path: impl AsRef<Path>) -> Result<Level> {
    let path = path.as_ref();
    let config = LevelConfig::load(path)?;
    build_level(&config).with_context(|| format!("Building level {}", path.display()))
}

pub fn build_level(config: &LevelConfig) -> Result<Level> {
    let mut sprites = SpriteTable::new("sprites");
    for (name, bounds) in &config.sprites {
        sprites.insert(SpriteResource::new(name.clone(), *bounds));
    }

    let mut stage = Stage::new(config.stage.clone());
    for (idx, definition) in config.actors.iter().enumerate() {
        let actor = build_actor(&stage, &sprites, definition)
            .with_context(|| format!("Actor #{idx} ({})", definition.name.as_deref().unwrap_or("unnamed")))?;
        stage.add(actor).with_context(|| format!("Adding actor #{idx} to the stage"))?;
    }
    log::info!("level ready: {} sprites, {} actors", sprites.len(), stage.actors().len());
    Ok(Level { stage, sprites })
}

fn build_actor(stage: &Stage, sprites: &SpriteTable, definition: &ActorDefinition) -> Result<SpriteActor> {
    let mut actor = stage.spawn_actor(definition.name.clone().unwrap_or_default());
    actor.set_actor_id(definition.actor_id.clone());
    if let Some(mask) = &definition.collision_mask {
        actor.set_collision_mask_str(mask)?;
    }
    if let Some(sprite_name) = &definition.sprite {
        let sprite = sprites.get(sprite_name).ok_or_else(|| anyhow!("Unknown sprite '{sprite_name}'"))?;
        actor.set_sprite(sprite);
    }
    let [x, y] = definition.position;
    actor.set_position(Vec2::new(x, y));
    let [vx, vy] = definition.velocity;
    actor.set_velocity(Vec2::new(vx, vy));
    actor.set_collidable(definition.collidable);
    if definition.editing {
        actor.set_editing(true);
    }
    for (event, script) in &definition.events {
        if ActorEvent::from_name(event).is_none() {
            log::warn!("actor '{}' registers '{event}', which the engine never fires", actor.name());
        }
        actor.set_actor_event(event.clone(), script.clone());
    }
    Ok(actor)
}
