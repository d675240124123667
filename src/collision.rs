use std::any::Any;
use std::fmt;
use std::str::FromStr;

use glam::Vec2;
use thiserror::Error;

use crate::components::Component;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MaskParseError {
    #[error("collision mask is empty")]
    Empty,
    #[error("collision mask '{0}' contains a character other than 0 or 1")]
    InvalidDigit(String),
    #[error("collision mask '{0}' is wider than 64 bits")]
    TooWide(String),
}

/// Collision filter bitmask, written as a string of binary digits (`"0"`, `"101"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CollisionMask(u64);

impl CollisionMask {
    pub const NONE: Self = Self(0);

    pub const fn from_bits(bits: u64) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u64 {
        self.0
    }

    pub const fn overlaps(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    /// Integer view handed to scripts as `targetMask`.
    pub fn as_script_int(self) -> rhai::INT {
        self.0 as rhai::INT
    }
}

impl FromStr for CollisionMask {
    type Err = MaskParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.trim();
        if digits.is_empty() {
            return Err(MaskParseError::Empty);
        }
        if !digits.chars().all(|c| c == '0' || c == '1') {
            return Err(MaskParseError::InvalidDigit(s.to_string()));
        }
        let significant = digits.trim_start_matches('0');
        if significant.len() > 64 {
            return Err(MaskParseError::TooWide(s.to_string()));
        }
        if significant.is_empty() {
            return Ok(Self::NONE);
        }
        u64::from_str_radix(significant, 2).map(Self).map_err(|_| MaskParseError::InvalidDigit(s.to_string()))
    }
}

impl fmt::Display for CollisionMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:b}", self.0)
    }
}

/// Contact details produced by the collision system for one side of a colliding pair.
#[derive(Debug, Clone, PartialEq)]
pub struct CollisionData {
    pub other: String,
    pub overlap: f32,
    pub normal: Vec2,
    pub world_time: u64,
}

/// Convex collision component stored in the actor's `"collide"` slot.
#[derive(Default)]
pub struct ConvexCollider {
    last: Option<CollisionData>,
}

impl ConvexCollider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn collision_data(&self) -> Option<&CollisionData> {
        self.last.as_ref()
    }

    pub fn record_contact(&mut self, data: CollisionData) {
        self.last = Some(data);
    }
}

impl Component for ConvexCollider {
    fn type_name(&self) -> &'static str {
        "ConvexCollider"
    }

    fn release(&mut self) {
        self.last = None;
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
