use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::geometry::Rect;

/// Limits applied to the rhai engine that compiles scripted events. A zero operation, call-level
/// or string-size limit leaves rhai's own default in place; `max_expr_depth` is always applied.
#[derive(Debug, Clone, Deserialize)]
pub struct ScriptConfig {
    #[serde(default)]
    pub max_operations: u64,
    #[serde(default = "ScriptConfig::default_max_call_levels")]
    pub max_call_levels: usize,
    #[serde(default = "ScriptConfig::default_max_expr_depth")]
    pub max_expr_depth: usize,
    #[serde(default)]
    pub max_string_size: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StageConfig {
    #[serde(default = "StageConfig::default_viewport")]
    pub viewport: Rect,
    #[serde(default = "StageConfig::default_frame_ms")]
    pub frame_ms: u64,
    #[serde(default)]
    pub editing: bool,
    #[serde(default)]
    pub script: ScriptConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ActorDefinition {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub actor_id: String,
    #[serde(default)]
    pub sprite: Option<String>,
    #[serde(default)]
    pub position: [f32; 2],
    #[serde(default)]
    pub velocity: [f32; 2],
    #[serde(default)]
    pub collidable: bool,
    #[serde(default)]
    pub collision_mask: Option<String>,
    #[serde(default)]
    pub editing: bool,
    /// Scripted event bodies keyed by event name (`onInit`, `onCollide`, ...).
    #[serde(default)]
    pub events: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct LevelConfig {
    #[serde(default)]
    pub stage: StageConfig,
    #[serde(default)]
    pub sprites: BTreeMap<String, Rect>,
    #[serde(default)]
    pub actors: Vec<ActorDefinition>,
}

impl ScriptConfig {
    const fn default_max_call_levels() -> usize {
        64
    }

    const fn default_max_expr_depth() -> usize {
        64
    }
}

impl Default for ScriptConfig {
    fn default() -> Self {
        Self {
            max_operations: 0,
            max_call_levels: Self::default_max_call_levels(),
            max_expr_depth: Self::default_max_expr_depth(),
            max_string_size: 0,
        }
    }
}

impl StageConfig {
    const fn default_viewport() -> Rect {
        Rect::new(0.0, 0.0, 480.0, 480.0)
    }

    const fn default_frame_ms() -> u64 {
        33
    }
}

impl Default for StageConfig {
    fn default() -> Self {
        Self {
            viewport: Self::default_viewport(),
            frame_ms: Self::default_frame_ms(),
            editing: false,
            script: ScriptConfig::default(),
        }
    }
}

impl LevelConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path).with_context(|| format!("Failed to read level {}", path.display()))?;
        Self::from_slice(&bytes).with_context(|| format!("Failed to parse level {}", path.display()))
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }
}
