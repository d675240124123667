pub mod actions;
pub mod actor;
pub mod cli;
pub mod collision;
pub mod components;
pub mod config;
pub mod editor;
pub mod error;
pub mod events;
pub mod geometry;
pub mod level;
pub mod logging;
pub mod pool;
pub mod render;
pub mod scripts;
pub mod sprite;
pub mod stage;
pub mod time;
pub mod variables;

pub use actor::{ActorEvent, SpriteActor};
pub use error::ActorError;
pub use stage::Stage;
