//! Ray query types shared by the world and its callers

use crate::foundation::math::{Point2, Vec2};
use super::world::{BodyHandle, FixtureHandle};

/// One fixture intersected by a ray cast
#[derive(Debug, Clone, Copy)]
pub struct RayHit {
    /// The fixture (collider) that was hit
    pub fixture: FixtureHandle,
    /// The body the fixture is attached to, if any
    pub body: Option<BodyHandle>,
    /// The point of intersection in world space
    pub point: Point2,
    /// The surface normal at the intersection point
    pub normal: Vec2,
    /// Distance along the ray as a fraction of the cast length, in `[0, 1]`
    pub fraction: f32,
    /// Distance from the ray origin to the hit point
    pub distance: f32,
}

/// What the world should do after reporting a hit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RayCastControl {
    /// Keep reporting intersections
    Continue,
    /// Stop the query now
    Stop,
}
