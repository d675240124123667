use std::rc::Rc;

use glam::Vec2;
use rhai::{Dynamic, Engine, EvalAltResult, Scope, AST, FLOAT, INT};

use crate::actor::SpriteActor;
use crate::collision::{CollisionData, CollisionMask};
use crate::config::ScriptConfig;
use crate::error::ActorError;
use crate::variables::VariableStore;

/// Name under which the invoking actor is visible to scripted event bodies.
pub const ACTOR_VAR: &str = "actor";

/// Turns an event body plus its formal argument names into something callable.
pub trait ScriptCompiler {
    fn compile(&self, event: &str, arg_names: &[&str], source: &str) -> Result<Rc<dyn CompiledScript>, ActorError>;
}

/// A compiled event body. The owning actor is passed explicitly as the call context.
pub trait CompiledScript {
    fn call(&self, actor: &mut SpriteActor, args: &[Dynamic]) -> Result<Dynamic, ActorError>;
}

/// Script-side view of an actor. Copied out of the actor for the duration of a call and
/// written back afterwards, so scripts mutate the real actor state.
#[derive(Debug, Clone)]
pub struct ActorContext {
    pub(crate) name: String,
    pub(crate) actor_id: String,
    pub(crate) collision_mask: CollisionMask,
    pub(crate) collidable: bool,
    pub(crate) editing: bool,
    pub(crate) translation: Vec2,
    pub(crate) rotation: f32,
    pub(crate) velocity: Vec2,
    pub(crate) variables: VariableStore,
}

pub struct RhaiCompiler {
    engine: Rc<Engine>,
}

impl RhaiCompiler {
    pub fn new(config: &ScriptConfig) -> Self {
        let mut engine = Engine::new();
        engine.set_fast_operators(true);
        if config.max_operations > 0 {
            engine.set_max_operations(config.max_operations);
        }
        if config.max_call_levels > 0 {
            engine.set_max_call_levels(config.max_call_levels);
        }
        engine.set_max_expr_depths(config.max_expr_depth, config.max_expr_depth);
        if config.max_string_size > 0 {
            engine.set_max_string_size(config.max_string_size);
        }
        engine.on_print(|text| log::info!(target: "script", "{text}"));
        engine.on_debug(|text, source, pos| match source {
            Some(source) => log::debug!(target: "script", "{source} @ {pos:?}: {text}"),
            None => log::debug!(target: "script", "{pos:?}: {text}"),
        });
        register_api(&mut engine);
        Self { engine: Rc::new(engine) }
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }
}

impl Default for RhaiCompiler {
    fn default() -> Self {
        Self::new(&ScriptConfig::default())
    }
}

impl ScriptCompiler for RhaiCompiler {
    fn compile(&self, event: &str, arg_names: &[&str], source: &str) -> Result<Rc<dyn CompiledScript>, ActorError> {
        let ast = self.engine.compile(source).map_err(|err| ActorError::compile(event, err))?;
        Ok(Rc::new(RhaiEvent {
            engine: self.engine.clone(),
            event: event.to_string(),
            arg_names: arg_names.iter().map(|name| name.to_string()).collect(),
            ast,
        }))
    }
}

struct RhaiEvent {
    engine: Rc<Engine>,
    event: String,
    arg_names: Vec<String>,
    ast: AST,
}

impl CompiledScript for RhaiEvent {
    fn call(&self, actor: &mut SpriteActor, args: &[Dynamic]) -> Result<Dynamic, ActorError> {
        let mut scope = Scope::new();
        scope.push(ACTOR_VAR, actor.take_script_context());
        // Positional binding: missing values read as unit, surplus values stay unbound.
        for (idx, name) in self.arg_names.iter().enumerate() {
            scope.push_dynamic(name.as_str(), args.get(idx).cloned().unwrap_or(Dynamic::UNIT));
        }

        let result = self.engine.eval_ast_with_scope::<Dynamic>(&mut scope, &self.ast);

        // Drop arguments and any script-level lets so the lookup below cannot hit a shadow.
        scope.rewind(1);
        let context = scope
            .get_mut(ACTOR_VAR)
            .map(|slot| std::mem::replace(slot, Dynamic::UNIT))
            .and_then(|value| value.try_cast::<ActorContext>());
        let restored = match context {
            Some(context) => {
                actor.restore_script_context(context);
                true
            }
            // The actor still holds its pre-call state, so nothing is lost beyond this call's writes.
            None => false,
        };

        let value = result.map_err(|err| ActorError::runtime(&self.event, err))?;
        if !restored {
            return Err(ActorError::runtime(&self.event, "actor context replaced"));
        }
        Ok(value)
    }
}

fn register_api(engine: &mut Engine) {
    engine.register_type_with_name::<ActorContext>("Actor");
    engine.register_get("name", |ctx: &mut ActorContext| ctx.name.clone());
    engine.register_get_set(
        "actor_id",
        |ctx: &mut ActorContext| ctx.actor_id.clone(),
        |ctx: &mut ActorContext, id: String| ctx.actor_id = id,
    );
    engine.register_get("collision_mask", |ctx: &mut ActorContext| ctx.collision_mask.to_string());
    engine.register_set(
        "collision_mask",
        |ctx: &mut ActorContext, mask: String| -> Result<(), Box<EvalAltResult>> {
            ctx.collision_mask = mask.parse().map_err(|err: crate::collision::MaskParseError| err.to_string())?;
            Ok(())
        },
    );
    engine.register_get("mask_bits", |ctx: &mut ActorContext| ctx.collision_mask.as_script_int());
    engine.register_get_set(
        "collidable",
        |ctx: &mut ActorContext| ctx.collidable,
        |ctx: &mut ActorContext, state: bool| ctx.collidable = state,
    );
    engine.register_get("editing", |ctx: &mut ActorContext| ctx.editing);
    engine.register_get_set(
        "x",
        |ctx: &mut ActorContext| ctx.translation.x as FLOAT,
        |ctx: &mut ActorContext, x: FLOAT| ctx.translation.x = x as f32,
    );
    engine.register_get_set(
        "y",
        |ctx: &mut ActorContext| ctx.translation.y as FLOAT,
        |ctx: &mut ActorContext, y: FLOAT| ctx.translation.y = y as f32,
    );
    engine.register_get_set(
        "rotation",
        |ctx: &mut ActorContext| ctx.rotation as FLOAT,
        |ctx: &mut ActorContext, r: FLOAT| ctx.rotation = r as f32,
    );
    engine.register_fn("set_position", |ctx: &mut ActorContext, x: FLOAT, y: FLOAT| {
        ctx.translation = Vec2::new(x as f32, y as f32);
    });
    engine.register_fn("set_position", |ctx: &mut ActorContext, x: INT, y: INT| {
        ctx.translation = Vec2::new(x as f32, y as f32);
    });
    engine.register_fn("set_velocity", |ctx: &mut ActorContext, vx: FLOAT, vy: FLOAT| {
        ctx.velocity = Vec2::new(vx as f32, vy as f32);
    });
    engine.register_fn("set_velocity", |ctx: &mut ActorContext, vx: INT, vy: INT| {
        ctx.velocity = Vec2::new(vx as f32, vy as f32);
    });
    engine.register_fn("get_variable", |ctx: &mut ActorContext, name: &str| ctx.variables.get(name));
    engine.register_fn("set_variable", |ctx: &mut ActorContext, name: &str, value: Dynamic| {
        ctx.variables.set(name, value);
    });
    engine.register_fn("has_variable", |ctx: &mut ActorContext, name: &str| ctx.variables.contains(name));
    engine.register_fn("log", |ctx: &mut ActorContext, message: &str| {
        log::info!(target: "script", "[{}] {message}", ctx.name);
    });

    engine.register_type_with_name::<CollisionData>("CollisionData");
    engine.register_get("other", |data: &mut CollisionData| data.other.clone());
    engine.register_get("overlap", |data: &mut CollisionData| data.overlap as FLOAT);
    engine.register_get("normal_x", |data: &mut CollisionData| data.normal.x as FLOAT);
    engine.register_get("normal_y", |data: &mut CollisionData| data.normal.y as FLOAT);
    engine.register_get("world_time", |data: &mut CollisionData| data.world_time as INT);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn syntax_errors_surface_at_compile_time() {
        let compiler = RhaiCompiler::default();
        let err = compiler.compile("onInit", &[], "let = ;").err().expect("malformed body should not compile");
        assert!(matches!(err, ActorError::Compile { ref event, .. } if event == "onInit"), "unexpected error {err}");
    }

    #[test]
    fn operation_limit_stops_runaway_bodies() {
        let config = ScriptConfig { max_operations: 1_000, ..ScriptConfig::default() };
        let compiler = RhaiCompiler::new(&config);
        let compiled = compiler
            .compile("onBeforeUpdate", &["worldTime"], "let n = 0; loop { n += 1; }")
            .expect("loop compiles");
        let mut actor = SpriteActor::new("Spinner");
        let err = compiled.call(&mut actor, &[Dynamic::from_int(0)]).err().expect("limit should trip");
        assert!(matches!(err, ActorError::Runtime { .. }), "unexpected error {err}");
    }

    #[test]
    fn zero_call_levels_keeps_function_calls_working() {
        let config = ScriptConfig { max_call_levels: 0, ..ScriptConfig::default() };
        let compiler = RhaiCompiler::new(&config);
        let body = "fn twice(x) { x * 2 } twice(worldTime)";
        let compiled = compiler.compile("onAfterUpdate", &["worldTime"], body).expect("body compiles");
        let mut actor = SpriteActor::new("Caller");
        let result = compiled.call(&mut actor, &[Dynamic::from_int(21)]).expect("call levels are not forced to zero");
        assert_eq!(result.as_int(), Ok(42));
    }

    #[test]
    fn scripts_see_and_mutate_actor_state() {
        let compiler = RhaiCompiler::default();
        let body = r#"
            actor.actor_id = "hero";
            actor.collision_mask = "110";
            actor.set_position(3, 4);
            actor.set_variable("seen", actor.name);
            actor.mask_bits
        "#;
        let compiled = compiler.compile("onInit", &[], body).expect("body compiles");
        let mut actor = SpriteActor::new("Knight");
        let result = compiled.call(&mut actor, &[]).expect("body runs");
        assert_eq!(result.as_int(), Ok(6));
        assert_eq!(actor.actor_id(), "hero");
        assert_eq!(actor.collision_mask(), CollisionMask::from_bits(6));
        assert_eq!(actor.transform().translation, Vec2::new(3.0, 4.0));
        assert_eq!(actor.get_variable("seen").into_string().as_deref(), Ok("Knight"));
    }

    #[test]
    fn invalid_mask_from_script_is_a_runtime_error_and_keeps_variables() {
        let compiler = RhaiCompiler::default();
        let body = r#"actor.set_variable("before", true); actor.collision_mask = "2";"#;
        let compiled = compiler.compile("onInit", &[], body).expect("body compiles");
        let mut actor = SpriteActor::new("Broken");
        let err = compiled.call(&mut actor, &[]).err().expect("bad mask should fail");
        assert!(matches!(err, ActorError::Runtime { .. }));
        assert_eq!(actor.get_variable("before").as_bool(), Ok(true));
    }
}
