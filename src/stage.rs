use std::rc::Rc;

use rhai::Dynamic;

use crate::actor::{Lifecycle, SpriteActor};
use crate::collision::{CollisionData, CollisionMask};
use crate::config::StageConfig;
use crate::error::ActorError;
use crate::events::{EventBus, StageEvent};
use crate::geometry::{ObbHull, Transform};
use crate::render::RenderContext;
use crate::scripts::{RhaiCompiler, ScriptCompiler};
use crate::time::FrameClock;

/// Outcome of one colliding pair. Responses are whatever the actors' `onCollide` handlers returned.
#[derive(Debug, Clone)]
pub struct CollisionReport {
    pub first: String,
    pub second: String,
    pub first_response: Dynamic,
    pub second_response: Dynamic,
}

#[derive(Debug, Clone, Default)]
pub struct FrameReport {
    pub world_time: u64,
    pub collisions: Vec<CollisionReport>,
}

struct HullSnapshot {
    index: usize,
    label: String,
    hull: ObbHull,
    transform: Transform,
    mask: CollisionMask,
}

/// Minimal scene host: owns actors and drives their lifecycle hooks frame by frame.
pub struct Stage {
    config: StageConfig,
    clock: FrameClock,
    actors: Vec<SpriteActor>,
    events: EventBus,
    compiler: Rc<dyn ScriptCompiler>,
}

fn label(actor: &SpriteActor) -> String {
    if actor.actor_id().is_empty() {
        actor.name().to_string()
    } else {
        actor.actor_id().to_string()
    }
}

impl Stage {
    pub fn new(config: StageConfig) -> Self {
        let compiler: Rc<dyn ScriptCompiler> = Rc::new(RhaiCompiler::new(&config.script));
        Self::with_compiler(config, compiler)
    }

    pub fn with_compiler(config: StageConfig, compiler: Rc<dyn ScriptCompiler>) -> Self {
        let clock = FrameClock::new(config.frame_ms);
        Self { config, clock, actors: Vec::new(), events: EventBus::default(), compiler }
    }

    pub fn config(&self) -> &StageConfig {
        &self.config
    }

    /// Creates an actor sharing this stage's script compiler. It is not part of the scene until added.
    pub fn spawn_actor(&self, name: impl Into<String>) -> SpriteActor {
        let mut actor = SpriteActor::with_compiler(name, self.compiler.clone());
        actor.set_editing(self.config.editing);
        actor
    }

    /// Adds the actor to the scene and runs its `onInit` handler. A failing handler is
    /// reported but the actor stays in the scene. Destroyed actors are rejected.
    pub fn add(&mut self, actor: SpriteActor) -> Result<usize, ActorError> {
        if actor.lifecycle() == Lifecycle::Destroyed {
            return Err(ActorError::Destroyed(actor.name().to_string()));
        }
        let index = self.actors.len();
        let name = label(&actor);
        self.actors.push(actor);
        self.events.push(StageEvent::ActorAdded { actor: name.clone() });
        log::info!("added actor '{name}'");
        self.actors[index].after_add()?;
        Ok(index)
    }

    /// Removes the first actor with `actor_id` and destroys it.
    pub fn remove(&mut self, actor_id: &str) -> Result<Option<SpriteActor>, ActorError> {
        let Some(index) = self.actors.iter().position(|actor| actor.actor_id() == actor_id) else {
            return Ok(None);
        };
        let mut actor = self.actors.remove(index);
        self.events.push(StageEvent::ActorRemoved { actor: label(&actor) });
        log::info!("removed actor '{}'", label(&actor));
        actor.destroy()?;
        Ok(Some(actor))
    }

    pub fn find(&self, actor_id: &str) -> Option<&SpriteActor> {
        self.actors.iter().find(|actor| actor.actor_id() == actor_id)
    }

    pub fn find_mut(&mut self, actor_id: &str) -> Option<&mut SpriteActor> {
        self.actors.iter_mut().find(|actor| actor.actor_id() == actor_id)
    }

    pub fn actors(&self) -> &[SpriteActor] {
        &self.actors
    }

    pub fn world_time(&self) -> u64 {
        self.clock.world_time()
    }

    pub fn frames(&self) -> u64 {
        self.clock.frames()
    }

    pub fn drain_events(&mut self) -> Vec<StageEvent> {
        self.events.drain()
    }

    /// Runs one frame: update every live actor, refresh visibility, then dispatch collisions.
    /// Actors destroyed while still in the scene are skipped. The first scripted failure
    /// aborts the frame and is returned to the caller.
    pub fn step(&mut self, ctx: &mut dyn RenderContext) -> Result<FrameReport, ActorError> {
        let now = self.clock.tick();
        for actor in self.actors.iter_mut().filter(|actor| actor.lifecycle() != Lifecycle::Destroyed) {
            actor.update(ctx, now)?;
        }
        self.refresh_visibility()?;
        let collisions = self.dispatch_collisions(now)?;
        Ok(FrameReport { world_time: now, collisions })
    }

    fn refresh_visibility(&mut self) -> Result<(), ActorError> {
        let viewport = self.config.viewport;
        for actor in self.actors.iter_mut().filter(|actor| actor.lifecycle() != Lifecycle::Destroyed) {
            let visible = actor.world_bounds().map_or(false, |bounds| bounds.intersects(&viewport));
            if visible != actor.is_visible() {
                self.events.push(StageEvent::VisibilityChanged { actor: label(actor), visible });
                actor.set_visible(visible)?;
            }
        }
        Ok(())
    }

    fn dispatch_collisions(&mut self, now: u64) -> Result<Vec<CollisionReport>, ActorError> {
        let snapshots: Vec<HullSnapshot> = self
            .actors
            .iter()
            .enumerate()
            .filter(|(_, actor)| actor.is_collidable() && actor.lifecycle() == Lifecycle::Active)
            .filter_map(|(index, actor)| {
                actor.collision_hull().map(|hull| HullSnapshot {
                    index,
                    label: label(actor),
                    hull: *hull,
                    transform: *actor.transform(),
                    mask: actor.collision_mask(),
                })
            })
            .collect();

        let mut reports = Vec::new();
        for (i, a) in snapshots.iter().enumerate() {
            for b in &snapshots[i + 1..] {
                let Some(contact) = a.hull.contact(&a.transform, &b.hull, &b.transform) else {
                    continue;
                };
                self.events.push(StageEvent::collision(a.label.clone(), b.label.clone(), now));
                let first_response = self.notify(a, b, contact.normal, contact.overlap, now)?;
                let second_response = self.notify(b, a, -contact.normal, contact.overlap, now)?;
                reports.push(CollisionReport {
                    first: a.label.clone(),
                    second: b.label.clone(),
                    first_response,
                    second_response,
                });
            }
        }
        Ok(reports)
    }

    fn notify(
        &mut self,
        target: &HullSnapshot,
        other: &HullSnapshot,
        normal: glam::Vec2,
        overlap: f32,
        now: u64,
    ) -> Result<Dynamic, ActorError> {
        let actor = &mut self.actors[target.index];
        // An earlier handler this frame may have switched collisions off.
        let Some(collider) = actor.collider_mut() else {
            return Ok(Dynamic::UNIT);
        };
        collider.record_contact(CollisionData { other: other.label.clone(), overlap, normal, world_time: now });
        actor.on_collide(&other.label, now, other.mask)
    }
}
