use std::fmt;
use std::rc::Rc;

use glam::Vec2;
use rhai::Dynamic;
use smallvec::{smallvec, SmallVec};

use crate::actions::{Action, ActionRegistry};
use crate::collision::{CollisionMask, ConvexCollider};
use crate::components::{ComponentSlots, COLLIDE_SLOT, DRAW_SLOT};
use crate::editor::{EditorHost, Property, PropertyEditor};
use crate::error::ActorError;
use crate::geometry::{ObbHull, Rect, Transform};
use crate::render::RenderContext;
use crate::scripts::{ActorContext, RhaiCompiler, ScriptCompiler};
use crate::sprite::{SpriteRenderer, SpriteResource};
use crate::variables::VariableStore;

pub const DEFAULT_ACTOR_NAME: &str = "Actor";

thread_local! {
    static DEFAULT_COMPILER: Rc<RhaiCompiler> = Rc::new(RhaiCompiler::default());
}

/// Shared rhai compiler used by actors that were not given one explicitly.
pub fn default_compiler() -> Rc<dyn ScriptCompiler> {
    DEFAULT_COMPILER.with(|compiler| compiler.clone() as Rc<dyn ScriptCompiler>)
}

/// Engine-defined scripted events and the argument names each one receives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActorEvent {
    Init,
    Destroy,
    Collide,
    Visibility,
    BeforeUpdate,
    AfterUpdate,
}

impl ActorEvent {
    pub const ALL: [ActorEvent; 6] = [
        ActorEvent::Init,
        ActorEvent::Destroy,
        ActorEvent::Collide,
        ActorEvent::Visibility,
        ActorEvent::BeforeUpdate,
        ActorEvent::AfterUpdate,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ActorEvent::Init => "onInit",
            ActorEvent::Destroy => "onDestroy",
            ActorEvent::Collide => "onCollide",
            ActorEvent::Visibility => "onVisibility",
            ActorEvent::BeforeUpdate => "onBeforeUpdate",
            ActorEvent::AfterUpdate => "onAfterUpdate",
        }
    }

    pub fn arg_names(self) -> &'static [&'static str] {
        match self {
            ActorEvent::Init | ActorEvent::Destroy => &[],
            ActorEvent::Collide => &["collisionData", "targetMask", "worldTime"],
            ActorEvent::Visibility => &["state"],
            ActorEvent::BeforeUpdate | ActorEvent::AfterUpdate => &["worldTime"],
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|event| event.name() == name)
    }
}

impl fmt::Display for ActorEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Constructed,
    Active,
    Destroyed,
}

/// Kind of a configurable entry reported by [`SpriteActor::event_config`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKind {
    Script,
    Var,
}

type EventArgs = SmallVec<[Dynamic; 3]>;

/// A game actor drawn with a sprite, optionally collidable, whose behaviour is supplied by
/// scripted event handlers compiled on first use.
pub struct SpriteActor {
    name: String,
    actor_id: String,
    collision_mask: CollisionMask,
    collidable: bool,
    editing: bool,
    visible: bool,
    lifecycle: Lifecycle,
    sprite: Option<Rc<SpriteResource>>,
    bounding_box: Rect,
    hull: Option<ObbHull>,
    origin: Vec2,
    transform: Transform,
    velocity: Vec2,
    last_update: Option<u64>,
    components: ComponentSlots,
    actions: ActionRegistry,
    variables: VariableStore,
    compiler: Rc<dyn ScriptCompiler>,
}

impl SpriteActor {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_compiler(name, default_compiler())
    }

    pub fn with_compiler(name: impl Into<String>, compiler: Rc<dyn ScriptCompiler>) -> Self {
        let mut actor = Self {
            name: String::new(),
            actor_id: String::new(),
            collision_mask: CollisionMask::NONE,
            collidable: false,
            editing: false,
            visible: false,
            lifecycle: Lifecycle::Constructed,
            sprite: None,
            bounding_box: Rect::default(),
            hull: None,
            origin: Vec2::ZERO,
            transform: Transform::default(),
            velocity: Vec2::ZERO,
            last_update: None,
            components: ComponentSlots::new(),
            actions: ActionRegistry::new(),
            variables: VariableStore::new(),
            compiler,
        };
        actor.reset(name);
        actor
    }

    /// Brings the actor back to its freshly constructed state. Used by the constructor and
    /// when a pooled actor is handed out again.
    pub(crate) fn reset(&mut self, name: impl Into<String>) {
        let name = name.into();
        self.name = if name.is_empty() { DEFAULT_ACTOR_NAME.to_string() } else { name };
        self.actor_id.clear();
        self.collision_mask = CollisionMask::NONE;
        self.collidable = false;
        self.editing = false;
        self.visible = false;
        self.lifecycle = Lifecycle::Constructed;
        self.sprite = None;
        self.bounding_box = Rect::default();
        self.hull = None;
        self.origin = Vec2::ZERO;
        self.transform = Transform::default();
        self.velocity = Vec2::ZERO;
        self.last_update = None;
        self.components.release_all();
        self.actions.clear();
        self.variables.clear();
        self.components.add(DRAW_SLOT, Box::new(SpriteRenderer::new()));
    }

    // ---------- scripted events ----------

    pub fn set_actor_event(&mut self, event_name: impl Into<String>, script: impl Into<String>) {
        self.actions.set(event_name, script);
    }

    pub fn get_actor_event(&self, event_name: &str) -> Option<&Action> {
        self.actions.get(event_name)
    }

    pub fn actions(&self) -> &ActionRegistry {
        &self.actions
    }

    /// Runs the handler registered for `event_name`, compiling it on first use. Values are
    /// bound to `arg_names` by position. An unregistered event is a no-op returning unit.
    pub fn call_scripted_event(
        &mut self,
        event_name: &str,
        arg_names: &[&str],
        args: &[Dynamic],
    ) -> Result<Dynamic, ActorError> {
        let compiled = match self.actions.get(event_name) {
            Some(action) => action.compiled_or_compile(event_name, arg_names, self.compiler.as_ref())?,
            None => return Ok(Dynamic::UNIT),
        };
        compiled.call(self, args)
    }

    fn fire(&mut self, event: ActorEvent, args: EventArgs) -> Result<Dynamic, ActorError> {
        self.call_scripted_event(event.name(), event.arg_names(), &args)
    }

    pub fn get_variable(&self, name: &str) -> Dynamic {
        self.variables.get(name)
    }

    pub fn set_variable(&mut self, name: impl Into<String>, value: Dynamic) {
        self.variables.set(name, value);
    }

    pub fn variables(&self) -> &VariableStore {
        &self.variables
    }

    /// Configurable entries an editor may fill in: the six engine events as script slots,
    /// followed by the currently set variables in name order.
    pub fn event_config(&self) -> Vec<(String, ConfigKind)> {
        let mut vars: Vec<&str> = self.variables.names().collect();
        vars.sort_unstable();
        ActorEvent::ALL
            .iter()
            .map(|event| (event.name().to_string(), ConfigKind::Script))
            .chain(vars.into_iter().map(|name| (name.to_string(), ConfigKind::Var)))
            .collect()
    }

    pub(crate) fn take_script_context(&mut self) -> ActorContext {
        ActorContext {
            name: self.name.clone(),
            actor_id: self.actor_id.clone(),
            collision_mask: self.collision_mask,
            collidable: self.collidable,
            editing: self.editing,
            translation: self.transform.translation,
            rotation: self.transform.rotation,
            velocity: self.velocity,
            variables: self.variables.clone(),
        }
    }

    pub(crate) fn restore_script_context(&mut self, context: ActorContext) {
        self.variables = context.variables;
        self.actor_id = context.actor_id;
        self.collision_mask = context.collision_mask;
        self.transform.translation = context.translation;
        self.transform.rotation = context.rotation;
        self.velocity = context.velocity;
        if context.collidable != self.collidable {
            self.set_collidable(context.collidable);
        }
    }

    // ---------- lifecycle hooks ----------

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    fn ensure_alive(&self) -> Result<(), ActorError> {
        match self.lifecycle {
            Lifecycle::Destroyed => Err(ActorError::Destroyed(self.name.clone())),
            _ => Ok(()),
        }
    }

    /// Called by the host once the actor has been added to the scene.
    pub fn after_add(&mut self) -> Result<(), ActorError> {
        self.ensure_alive()?;
        self.lifecycle = Lifecycle::Active;
        log::debug!("actor '{}' added to scene", self.name);
        self.fire(ActorEvent::Init, SmallVec::new()).map(|_| ())
    }

    pub fn update(&mut self, ctx: &mut dyn RenderContext, world_time: u64) -> Result<(), ActorError> {
        self.ensure_alive()?;
        ctx.push_transform(&self.transform);
        let result = self.update_in_transform(ctx, world_time);
        ctx.pop_transform();
        result
    }

    fn update_in_transform(&mut self, ctx: &mut dyn RenderContext, world_time: u64) -> Result<(), ActorError> {
        let time = Dynamic::from_int(world_time as rhai::INT);
        self.fire(ActorEvent::BeforeUpdate, smallvec![time.clone()])?;

        if let Some(last) = self.last_update {
            let dt = world_time.saturating_sub(last) as f32 / 1000.0;
            self.transform.translation += self.velocity * dt;
        }
        self.last_update = Some(world_time);
        self.components.execute_all(ctx, &self.transform, world_time);

        if self.editing && self.sprite.is_some() {
            ctx.set_line_style("white");
            ctx.set_line_width(2.0);
            ctx.draw_rectangle(self.bounding_box.offset(-self.origin));
        }

        self.fire(ActorEvent::AfterUpdate, smallvec![time]).map(|_| ())
    }

    /// Collision notification from the host. The returned value is passed back to the collision
    /// system untouched; unit means the actor has no opinion.
    pub fn on_collide(
        &mut self,
        other: &str,
        world_time: u64,
        target_mask: CollisionMask,
    ) -> Result<Dynamic, ActorError> {
        self.ensure_alive()?;
        let data = self
            .collider()
            .and_then(|collider| collider.collision_data())
            .map(|data| Dynamic::from(data.clone()))
            .unwrap_or(Dynamic::UNIT);
        log::debug!("actor '{}' collided with '{other}' at {world_time}", self.name);
        self.fire(
            ActorEvent::Collide,
            smallvec![data, Dynamic::from_int(target_mask.as_script_int()), Dynamic::from_int(world_time as rhai::INT)],
        )
    }

    /// Records whether the actor is currently rendered; a change fires `onVisibility`.
    pub fn set_visible(&mut self, state: bool) -> Result<(), ActorError> {
        self.ensure_alive()?;
        if self.visible == state {
            return Ok(());
        }
        self.visible = state;
        self.fire(ActorEvent::Visibility, smallvec![Dynamic::from_bool(state)]).map(|_| ())
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Fires `onDestroy`, then releases components, actions and variables. The handler's
    /// failure is reported after the release so the actor never outlives its destruction.
    pub fn destroy(&mut self) -> Result<(), ActorError> {
        if self.lifecycle == Lifecycle::Destroyed {
            return Ok(());
        }
        let outcome = self.fire(ActorEvent::Destroy, SmallVec::new());
        self.components.release_all();
        self.actions.clear();
        self.variables.clear();
        self.sprite = None;
        self.hull = None;
        self.collidable = false;
        self.lifecycle = Lifecycle::Destroyed;
        log::debug!("actor '{}' destroyed", self.name);
        outcome.map(|_| ())
    }

    /// Returns the actor to a pool: scripted state is emptied and components released,
    /// without running any handler.
    pub fn release(&mut self) {
        self.components.release_all();
        self.actions.clear();
        self.variables.clear();
        self.collidable = false;
        self.lifecycle = Lifecycle::Destroyed;
    }

    // ---------- composition ----------

    pub fn set_collidable(&mut self, state: bool) {
        self.collidable = state;
        if state {
            if !self.components.contains(COLLIDE_SLOT) {
                self.components.add(COLLIDE_SLOT, Box::new(ConvexCollider::new()));
            }
        } else {
            self.components.remove_and_release(COLLIDE_SLOT);
        }
    }

    pub fn is_collidable(&self) -> bool {
        self.collidable
    }

    pub fn collider(&self) -> Option<&ConvexCollider> {
        self.components.get::<ConvexCollider>(COLLIDE_SLOT)
    }

    pub fn collider_mut(&mut self) -> Option<&mut ConvexCollider> {
        self.components.get_mut::<ConvexCollider>(COLLIDE_SLOT)
    }

    pub fn components(&self) -> &ComponentSlots {
        &self.components
    }

    /// Assigns the sprite, taking over its bounding box and rebuilding the collision hull.
    pub fn set_sprite(&mut self, sprite: Rc<SpriteResource>) {
        self.bounding_box = sprite.bounding_box();
        if let Some(renderer) = self.components.get_mut::<SpriteRenderer>(DRAW_SLOT) {
            renderer.set_sprite(sprite.clone());
        }
        self.hull = Some(ObbHull::from_bounding_box(sprite.bounding_box()));
        self.sprite = Some(sprite);
    }

    pub fn sprite(&self) -> Option<&Rc<SpriteResource>> {
        self.sprite.as_ref()
    }

    pub fn bounding_box(&self) -> Rect {
        self.bounding_box
    }

    pub fn collision_hull(&self) -> Option<&ObbHull> {
        self.hull.as_ref()
    }

    /// Bounding box of the hull placed in the world, if a sprite has been assigned.
    pub fn world_bounds(&self) -> Option<Rect> {
        self.hull.map(|hull| hull.world_bounds(&self.transform))
    }

    // ---------- identity and transform ----------

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_actor_id(&mut self, actor_id: impl Into<String>) {
        self.actor_id = actor_id.into();
    }

    pub fn actor_id(&self) -> &str {
        &self.actor_id
    }

    pub fn set_collision_mask(&mut self, mask: CollisionMask) {
        self.collision_mask = mask;
    }

    pub fn set_collision_mask_str(&mut self, mask: &str) -> Result<(), ActorError> {
        self.collision_mask = mask.parse()?;
        Ok(())
    }

    pub fn collision_mask(&self) -> CollisionMask {
        self.collision_mask
    }

    pub fn set_editing(&mut self, state: bool) {
        self.editing = state;
    }

    pub fn is_editing(&self) -> bool {
        self.editing
    }

    pub fn is_editable(&self) -> bool {
        true
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    pub fn transform_mut(&mut self) -> &mut Transform {
        &mut self.transform
    }

    pub fn set_position(&mut self, position: Vec2) {
        self.transform.translation = position;
    }

    pub fn set_origin(&mut self, origin: Vec2) {
        self.origin = origin;
    }

    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    pub fn set_velocity(&mut self, velocity: Vec2) {
        self.velocity = velocity;
    }

    // ---------- editor properties ----------

    pub fn properties(&self, editor: Option<&dyn EditorHost>) -> Vec<Property> {
        let t = &self.transform;
        let mut props = vec![
            Property::read_only("Name", self.name.clone()),
            Property::read_only("ActorId", self.actor_id.clone()),
            Property::read_only("Position", format!("{:.2}, {:.2}", t.translation.x, t.translation.y)),
            Property::read_only("Rotation", format!("{:.2}", t.rotation)),
            Property::read_only("Scale", format!("{:.2}, {:.2}", t.scale.x, t.scale.y)),
        ];

        let sprite_name = match (editor, &self.sprite) {
            (Some(editor), Some(sprite)) => editor.sprite_canonical_name(sprite),
            (None, Some(sprite)) => sprite.name().to_string(),
            (_, None) => String::new(),
        };
        props.push(Property {
            name: "Sprite",
            value: sprite_name,
            editor: editor.map(|editor| PropertyEditor::Multi { options: editor.sprite_options() }),
        });
        props.push(Property {
            name: "Collidable",
            value: self.collidable.to_string(),
            editor: editor.map(|_| PropertyEditor::Toggle),
        });
        props
    }

    /// Applies an edit made through one of the editable properties.
    pub fn apply_property(&mut self, name: &str, value: &str, editor: &dyn EditorHost) -> Result<(), ActorError> {
        let invalid = || ActorError::InvalidProperty { property: name.to_string(), value: value.to_string() };
        match name {
            "Sprite" => {
                let sprite = editor.sprite_for_name(value).ok_or_else(invalid)?;
                self.set_sprite(sprite);
            }
            "Collidable" => {
                let state = value.parse::<bool>().map_err(|_| invalid())?;
                self.set_collidable(state);
            }
            other => return Err(ActorError::UnknownProperty(other.to_string())),
        }
        Ok(())
    }
}
