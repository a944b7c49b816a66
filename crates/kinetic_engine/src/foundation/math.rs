//! Math utilities and types
//!
//! Provides the 2D math types used by the simulation core. Everything is
//! backed by `nalgebra`, which is also what the physics library speaks.

pub use nalgebra::{Isometry2, Vector2};
use serde::{Deserialize, Serialize};

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// 2D point type
pub type Point2 = nalgebra::Point2<f32>;

/// World "up" direction. Gravity points along the negative of this.
pub const UP: Vec2 = Vec2::new(0.0, 1.0);

/// Position and rotation of a body or shape in the plane
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose2 {
    /// Translation in world units
    pub translation: Vec2,

    /// Counter-clockwise rotation in radians
    pub angle: f32,
}

impl Default for Pose2 {
    fn default() -> Self {
        Self::identity()
    }
}

impl Pose2 {
    /// Pose at the origin with no rotation
    pub fn identity() -> Self {
        Self {
            translation: Vec2::zeros(),
            angle: 0.0,
        }
    }

    /// Create a pose with only a translation
    pub fn from_translation(x: f32, y: f32) -> Self {
        Self {
            translation: Vec2::new(x, y),
            angle: 0.0,
        }
    }

    /// Create a pose from translation and angle
    pub fn new(translation: Vec2, angle: f32) -> Self {
        Self { translation, angle }
    }

    /// Convert to an isometry
    pub fn to_isometry(&self) -> Isometry2<f32> {
        Isometry2::new(self.translation, self.angle)
    }

    /// Build from an isometry
    pub fn from_isometry(iso: &Isometry2<f32>) -> Self {
        Self {
            translation: iso.translation.vector,
            angle: iso.rotation.angle(),
        }
    }

    /// Compose: apply `local` in the frame of `self`
    pub fn combine(&self, local: &Pose2) -> Pose2 {
        Self::from_isometry(&(self.to_isometry() * local.to_isometry()))
    }

    /// Transform a point from local space to the space this pose lives in
    pub fn transform_point(&self, point: &Point2) -> Point2 {
        self.to_isometry().transform_point(point)
    }

    /// Whether every component is finite
    pub fn is_finite(&self) -> bool {
        self.translation.x.is_finite() && self.translation.y.is_finite() && self.angle.is_finite()
    }
}

/// Math utility functions
pub mod utils {
    /// Whether every component of a vector is finite
    pub fn is_finite(v: &super::Vec2) -> bool {
        v.x.is_finite() && v.y.is_finite()
    }
}
