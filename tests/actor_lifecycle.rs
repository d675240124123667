use glam::Vec2;
use rhai::Dynamic;
use sprite_actors::actor::{Lifecycle, SpriteActor};
use sprite_actors::collision::CollisionMask;
use sprite_actors::components::{COLLIDE_SLOT, DRAW_SLOT};
use sprite_actors::editor::{EditorHost, PropertyEditor};
use sprite_actors::error::ActorError;
use sprite_actors::geometry::{ObbHull, Rect};
use sprite_actors::level::SpriteTable;
use sprite_actors::render::{CommandRecorder, DrawCommand};
use sprite_actors::scripts::{CompiledScript, ScriptCompiler};
use sprite_actors::sprite::{SpriteRenderer, SpriteResource};
use std::cell::RefCell;
use std::rc::Rc;

/// Records what an actor looked like at the moment each handler ran.
#[derive(Debug, Clone, PartialEq)]
struct Observation {
    event: String,
    closed: bool,
    components: usize,
    draws: u64,
}

struct ObservingCompiler {
    seen: Rc<RefCell<Vec<Observation>>>,
}

struct ObservingScript {
    event: String,
    seen: Rc<RefCell<Vec<Observation>>>,
}

impl ScriptCompiler for ObservingCompiler {
    fn compile(&self, event: &str, _arg_names: &[&str], _source: &str) -> Result<Rc<dyn CompiledScript>, ActorError> {
        Ok(Rc::new(ObservingScript { event: event.to_string(), seen: self.seen.clone() }))
    }
}

impl CompiledScript for ObservingScript {
    fn call(&self, actor: &mut SpriteActor, _args: &[Dynamic]) -> Result<Dynamic, ActorError> {
        if self.event == "onDestroy" {
            actor.set_variable("closed", Dynamic::from_bool(true));
        }
        let draws = actor.components().get::<SpriteRenderer>(DRAW_SLOT).map_or(0, |renderer| renderer.draws());
        self.seen.borrow_mut().push(Observation {
            event: self.event.clone(),
            closed: actor.get_variable("closed").as_bool().unwrap_or(false),
            components: actor.components().len(),
            draws,
        });
        Ok(Dynamic::UNIT)
    }
}

fn observed_actor(name: &str) -> (SpriteActor, Rc<RefCell<Vec<Observation>>>) {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let actor = SpriteActor::with_compiler(name, Rc::new(ObservingCompiler { seen: seen.clone() }));
    (actor, seen)
}

fn ship() -> Rc<SpriteResource> {
    Rc::new(SpriteResource::new("ship", Rect::new(-8.0, -8.0, 16.0, 16.0)))
}

#[test]
fn init_handler_runs_when_added_to_scene() {
    let mut actor = SpriteActor::new("A1");
    actor.set_actor_event("onInit", r#"actor.set_variable("x", 1)"#);
    actor.after_add().expect("onInit runs");
    assert_eq!(actor.get_variable("x").as_int(), Ok(1));
    assert_eq!(actor.lifecycle(), Lifecycle::Active);
}

#[test]
fn collide_handler_result_is_passed_back() {
    let mut actor = SpriteActor::new("Bumper");
    actor.set_collidable(true);
    actor.set_actor_event("onCollide", "return targetMask > 0");
    actor.after_add().expect("init");
    let flag = actor.on_collide("wall", 1000, CollisionMask::from_bits(3)).expect("onCollide runs");
    assert_eq!(flag.as_bool(), Ok(true));
}

#[test]
fn collide_without_handler_has_no_opinion() {
    let mut actor = SpriteActor::new("Quiet");
    actor.set_collidable(true);
    let flag = actor.on_collide("wall", 5, CollisionMask::from_bits(1)).expect("no handler");
    assert!(flag.is_unit());
}

#[test]
fn destroy_handler_runs_before_resources_are_released() {
    let (mut actor, seen) = observed_actor("Doomed");
    actor.set_collidable(true);
    actor.set_actor_event("onDestroy", "ignored by the observing compiler");
    actor.after_add().expect("init");

    actor.destroy().expect("destroy");

    let seen = seen.borrow();
    assert_eq!(seen.len(), 1);
    assert!(seen[0].closed, "variable store must be readable inside onDestroy");
    assert_eq!(seen[0].components, 2, "draw and collide components still attached inside onDestroy");
    assert!(actor.get_variable("closed").is_unit(), "store is emptied after destroy");
    assert!(actor.components().is_empty());
    assert_eq!(actor.lifecycle(), Lifecycle::Destroyed);
}

#[test]
fn destroyed_actor_rejects_lifecycle_hooks() {
    let mut actor = SpriteActor::new("Ghost");
    actor.destroy().expect("destroy");
    actor.destroy().expect("second destroy is a no-op");
    let mut ctx = CommandRecorder::new();
    assert!(matches!(actor.update(&mut ctx, 16), Err(ActorError::Destroyed(_))));
    assert!(matches!(actor.after_add(), Err(ActorError::Destroyed(_))));
    assert!(matches!(actor.on_collide("x", 16, CollisionMask::NONE), Err(ActorError::Destroyed(_))));
}

#[test]
fn update_fires_before_and_after_around_drawing() {
    let (mut actor, seen) = observed_actor("Walker");
    actor.set_sprite(ship());
    actor.set_actor_event("onBeforeUpdate", "");
    actor.set_actor_event("onAfterUpdate", "");
    let mut ctx = CommandRecorder::new();

    actor.update(&mut ctx, 16).expect("frame");

    let events: Vec<_> = seen.borrow().iter().map(|o| (o.event.clone(), o.draws)).collect();
    assert_eq!(events, vec![("onBeforeUpdate".to_string(), 0), ("onAfterUpdate".to_string(), 1)]);
    assert_eq!(ctx.sprite_draws(), 1);
    assert_eq!(ctx.depth(), 0);
}

#[test]
fn update_hooks_run_every_frame_and_receive_world_time() {
    let mut actor = SpriteActor::new("Clock");
    actor.set_actor_event("onBeforeUpdate", r#"actor.set_variable("before", worldTime);"#);
    actor.set_actor_event("onAfterUpdate", r#"actor.set_variable("after", worldTime);"#);
    let mut ctx = CommandRecorder::new();
    for time in [16_u64, 32, 48] {
        actor.update(&mut ctx, time).expect("frame");
    }
    assert_eq!(actor.get_variable("before").as_int(), Ok(48));
    assert_eq!(actor.get_variable("after").as_int(), Ok(48));
}

#[test]
fn failing_after_update_keeps_completed_movement() {
    let mut actor = SpriteActor::new("Runner");
    actor.set_velocity(Vec2::new(100.0, 0.0));
    actor.set_actor_event("onAfterUpdate", r#"if worldTime > 100 { throw "late"; }"#);
    let mut ctx = CommandRecorder::new();
    actor.update(&mut ctx, 100).expect("first frame");
    let err = actor.update(&mut ctx, 200).err().expect("second frame fails");
    assert!(matches!(err, ActorError::Runtime { .. }));
    assert_eq!(actor.transform().translation, Vec2::new(10.0, 0.0));
    assert_eq!(ctx.depth(), 0, "transform is popped even when a handler fails");
}

#[test]
fn scripts_can_move_the_actor_before_it_updates() {
    let mut actor = SpriteActor::new("Scripted");
    actor.set_actor_event("onBeforeUpdate", "actor.x += 5.0; actor.set_velocity(0, 10);");
    let mut ctx = CommandRecorder::new();
    actor.update(&mut ctx, 0).expect("frame one");
    actor.update(&mut ctx, 1000).expect("frame two");
    assert_eq!(actor.transform().translation, Vec2::new(10.0, 10.0));
}

#[test]
fn editing_mode_draws_the_bounding_box() {
    let mut actor = SpriteActor::new("Editable");
    actor.set_sprite(ship());
    actor.set_editing(true);
    let mut ctx = CommandRecorder::new();
    actor.update(&mut ctx, 16).expect("frame");
    let commands = ctx.commands();
    assert!(commands.contains(&DrawCommand::LineStyle("white".to_string())));
    assert!(commands.contains(&DrawCommand::LineWidth(2.0)));
    assert!(commands.contains(&DrawCommand::Rectangle(Rect::new(-8.0, -8.0, 16.0, 16.0))));
}

#[test]
fn collidable_toggle_is_idempotent() {
    let mut actor = SpriteActor::new("Toggle");
    actor.set_collidable(true);
    actor.set_collidable(true);
    assert!(actor.is_collidable());
    assert!(actor.components().contains(COLLIDE_SLOT));
    assert_eq!(actor.components().len(), 2);

    actor.set_collidable(false);
    actor.set_collidable(false);
    assert!(!actor.is_collidable());
    assert!(actor.collider().is_none());
    assert_eq!(actor.components().len(), 1);
}

#[test]
fn script_can_switch_collidability() {
    let mut actor = SpriteActor::new("Phaser");
    actor.set_actor_event("onInit", "actor.collidable = true;");
    actor.after_add().expect("init");
    assert!(actor.collider().is_some());
}

#[test]
fn sprite_assignment_sets_bounds_hull_and_renderer() {
    let mut actor = SpriteActor::new("Painted");
    assert!(actor.collision_hull().is_none());
    let sprite = ship();
    actor.set_sprite(sprite.clone());
    assert_eq!(actor.bounding_box(), sprite.bounding_box());
    assert_eq!(actor.collision_hull(), Some(&ObbHull::from_bounding_box(sprite.bounding_box())));
    let renderer = actor.components().get::<SpriteRenderer>(DRAW_SLOT).expect("draw component");
    assert_eq!(renderer.sprite().map(|s| s.name()), Some("ship"));
}

#[test]
fn visibility_handler_fires_on_change_only() {
    let mut actor = SpriteActor::new("Peek");
    actor.set_actor_event(
        "onVisibility",
        r#"
            let count = if actor.has_variable("count") { actor.get_variable("count") } else { 0 };
            actor.set_variable("count", count + 1);
            actor.set_variable("state", state);
        "#,
    );
    actor.set_visible(true).expect("shown");
    actor.set_visible(true).expect("still shown");
    assert_eq!(actor.get_variable("count").as_int(), Ok(1));
    assert_eq!(actor.get_variable("state").as_bool(), Ok(true));
    actor.set_visible(false).expect("hidden");
    assert_eq!(actor.get_variable("count").as_int(), Ok(2));
    assert_eq!(actor.get_variable("state").as_bool(), Ok(false));
}

#[test]
fn properties_expose_editors_only_with_an_editor_host() {
    let mut table = SpriteTable::new("sprites");
    let rock = table.insert(SpriteResource::new("rock", Rect::new(0.0, 0.0, 32.0, 32.0)));
    table.insert(SpriteResource::new("ship", Rect::new(-8.0, -8.0, 16.0, 16.0)));
    let mut actor = SpriteActor::new("Prop");
    actor.set_sprite(rock);

    let plain = actor.properties(None);
    let sprite = plain.iter().find(|p| p.name == "Sprite").expect("sprite property");
    assert_eq!(sprite.value, "rock");
    assert!(plain.iter().all(|p| !p.editable()));

    let edited = actor.properties(Some(&table as &dyn EditorHost));
    let sprite = edited.iter().find(|p| p.name == "Sprite").expect("sprite property");
    assert_eq!(sprite.value, "sprites: rock");
    assert_eq!(
        sprite.editor,
        Some(PropertyEditor::Multi { options: vec!["sprites: rock".to_string(), "sprites: ship".to_string()] })
    );
    let collidable = edited.iter().find(|p| p.name == "Collidable").expect("collidable property");
    assert_eq!(collidable.editor, Some(PropertyEditor::Toggle));
}

#[test]
fn editor_edits_apply_to_the_actor() {
    let mut table = SpriteTable::new("sprites");
    table.insert(SpriteResource::new("ship", Rect::new(-8.0, -8.0, 16.0, 16.0)));
    let mut actor = SpriteActor::new("Edited");

    actor.apply_property("Sprite", "sprites: ship", &table).expect("sprite edit");
    actor.apply_property("Collidable", "true", &table).expect("toggle edit");
    assert_eq!(actor.sprite().map(|s| s.name()), Some("ship"));
    assert!(actor.is_collidable());

    assert!(matches!(actor.apply_property("Collidable", "maybe", &table), Err(ActorError::InvalidProperty { .. })));
    assert!(matches!(actor.apply_property("Sprite", "sprites: nope", &table), Err(ActorError::InvalidProperty { .. })));
    assert!(matches!(actor.apply_property("Speed", "3", &table), Err(ActorError::UnknownProperty(_))));
}

#[test]
fn collision_mask_accepts_binary_strings_only() {
    let mut actor = SpriteActor::new("Masked");
    actor.set_collision_mask_str("1010").expect("valid mask");
    assert_eq!(actor.collision_mask().bits(), 10);
    assert!(matches!(actor.set_collision_mask_str("abc"), Err(ActorError::Mask(_))));
    assert_eq!(actor.collision_mask().bits(), 10);
}
