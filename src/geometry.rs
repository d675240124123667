use glam::Vec2;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    pub fn min(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    pub fn max(&self) -> Vec2 {
        Vec2::new(self.x + self.w, self.y + self.h)
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.w, self.h)
    }

    pub fn center(&self) -> Vec2 {
        self.min() + self.size() * 0.5
    }

    pub fn offset(&self, by: Vec2) -> Self {
        Self { x: self.x + by.x, y: self.y + by.y, ..*self }
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        let (a_min, a_max) = (self.min(), self.max());
        let (b_min, b_max) = (other.min(), other.max());
        a_min.x < b_max.x && b_min.x < a_max.x && a_min.y < b_max.y && b_min.y < a_max.y
    }
}

impl Default for Rect {
    fn default() -> Self {
        Self::new(0.0, 0.0, 0.0, 0.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub translation: Vec2,
    pub rotation: f32,
    pub scale: Vec2,
}

impl Default for Transform {
    fn default() -> Self {
        Self { translation: Vec2::ZERO, rotation: 0.0, scale: Vec2::splat(1.0) }
    }
}

impl Transform {
    /// Maps a point from local space into world space (scale, then rotate, then translate).
    pub fn apply(&self, local: Vec2) -> Vec2 {
        let scaled = local * self.scale;
        Vec2::from_angle(self.rotation).rotate(scaled) + self.translation
    }
}

/// Oriented bounding-box hull in local space. Placed into the world by a [`Transform`]
/// when tested against another hull.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObbHull {
    pub center: Vec2,
    pub half_extents: Vec2,
}

/// Result of a separating-axis test between two hulls.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HullContact {
    /// Unit vector pointing from the first hull towards the second.
    pub normal: Vec2,
    pub overlap: f32,
}

impl ObbHull {
    pub fn from_bounding_box(bbox: Rect) -> Self {
        Self { center: bbox.center(), half_extents: bbox.size() * 0.5 }
    }

    pub fn world_corners(&self, transform: &Transform) -> [Vec2; 4] {
        let h = self.half_extents;
        [
            transform.apply(self.center + Vec2::new(-h.x, -h.y)),
            transform.apply(self.center + Vec2::new(h.x, -h.y)),
            transform.apply(self.center + Vec2::new(h.x, h.y)),
            transform.apply(self.center + Vec2::new(-h.x, h.y)),
        ]
    }

    pub fn world_center(&self, transform: &Transform) -> Vec2 {
        transform.apply(self.center)
    }

    pub fn world_bounds(&self, transform: &Transform) -> Rect {
        let corners = self.world_corners(transform);
        let mut min = corners[0];
        let mut max = corners[0];
        for corner in &corners[1..] {
            min = min.min(*corner);
            max = max.max(*corner);
        }
        Rect::new(min.x, min.y, max.x - min.x, max.y - min.y)
    }

    /// Separating-axis test. Returns the axis of least penetration when the hulls overlap.
    pub fn contact(&self, own: &Transform, other: &ObbHull, other_transform: &Transform) -> Option<HullContact> {
        let a = self.world_corners(own);
        let b = other.world_corners(other_transform);
        let axes = [edge_normal(a[0], a[1]), edge_normal(a[1], a[2]), edge_normal(b[0], b[1]), edge_normal(b[1], b[2])];

        let mut best: Option<HullContact> = None;
        for axis in axes {
            if axis == Vec2::ZERO {
                continue;
            }
            let (a_min, a_max) = project(&a, axis);
            let (b_min, b_max) = project(&b, axis);
            let overlap = a_max.min(b_max) - a_min.max(b_min);
            if overlap <= 0.0 {
                return None;
            }
            if best.map_or(true, |contact| overlap < contact.overlap) {
                best = Some(HullContact { normal: axis, overlap });
            }
        }

        best.map(|mut contact| {
            let towards = other.world_center(other_transform) - self.world_center(own);
            if towards.dot(contact.normal) < 0.0 {
                contact.normal = -contact.normal;
            }
            contact
        })
    }
}

fn edge_normal(from: Vec2, to: Vec2) -> Vec2 {
    (to - from).perp().normalize_or_zero()
}

fn project(corners: &[Vec2; 4], axis: Vec2) -> (f32, f32) {
    let mut min = f32::MAX;
    let mut max = f32::MIN;
    for corner in corners {
        let d = corner.dot(axis);
        min = min.min(d);
        max = max.max(d);
    }
    (min, max)
}
