//! Ground detection by ray casting
//!
//! A probe is cast straight down from the centre of an entity's anchor body.
//! The world reports every fixture along the segment in no particular order,
//! and [`GroundRayCast`] folds those reports into the closest hit that does not
//! belong to the entity itself. Distances are measured from the entity's
//! lowest point, so a web whose anchor rides above its other shapes still
//! lands when those shapes touch down.

use crate::foundation::math::{Point2, Vec2, UP};
use crate::physics::{BodyHandle, PhysicsWorld, RayCastControl, RayHit};

/// Result of one ground probe
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroundContact {
    /// Something other than the entity itself lies below it
    pub hit: bool,
    /// Gap between the bottom of the entity and the ground
    pub distance: f32,
    /// Surface normal of the ground
    pub normal: Vec2,
    /// Where the probe hit the ground
    pub point: Point2,
}

impl GroundContact {
    /// A probe that found nothing
    pub fn none() -> Self {
        Self {
            hit: false,
            distance: f32::INFINITY,
            normal: UP,
            point: Point2::origin(),
        }
    }

    /// Whether ground was found no more than `tolerance` below the body
    pub fn within(&self, tolerance: f32) -> bool {
        self.hit && self.distance <= tolerance
    }
}

impl Default for GroundContact {
    fn default() -> Self {
        Self::none()
    }
}

/// Ray-cast callback that keeps the closest hit not on an excluded body
pub struct GroundRayCast<'a> {
    own_bodies: &'a [BodyHandle],
    closest: Option<RayHit>,
}

impl<'a> GroundRayCast<'a> {
    /// Callback ignoring hits on any of `own_bodies`
    pub fn new(own_bodies: &'a [BodyHandle]) -> Self {
        Self {
            own_bodies,
            closest: None,
        }
    }

    /// Handle one reported intersection
    ///
    /// Nothing can be closer than a hit at the ray origin, so that is the
    /// only case where the query stops early.
    pub fn report(&mut self, hit: &RayHit) -> RayCastControl {
        let own = hit.body.is_some_and(|body| self.own_bodies.contains(&body));
        if own {
            return RayCastControl::Continue;
        }

        if self.closest.map_or(true, |closest| hit.fraction < closest.fraction) {
            self.closest = Some(*hit);
        }

        if hit.fraction <= 0.0 {
            RayCastControl::Stop
        } else {
            RayCastControl::Continue
        }
    }

    /// Closest accepted hit, if any
    pub fn closest(&self) -> Option<&RayHit> {
        self.closest.as_ref()
    }

    /// Probe the ground below `anchor`
    ///
    /// The ray runs from the anchor body's centre past the lowest point of
    /// `anchor` and `own_bodies` by `tolerance + reach`. A failing query is
    /// logged and treated as no ground, which simply leaves the state machine
    /// where it is.
    pub fn probe(
        world: &PhysicsWorld,
        anchor: BodyHandle,
        own_bodies: &[BodyHandle],
        tolerance: f32,
        reach: f32,
    ) -> GroundContact {
        let bottom = std::iter::once(anchor)
            .chain(own_bodies.iter().copied())
            .map(|body| world.lowest_point(body))
            .try_fold(f32::INFINITY, |lowest, y| y.map(|y| lowest.min(y)));

        let (origin, extent_below) = match (world.pose(anchor), bottom) {
            (Ok(pose), Ok(bottom)) => (Point2::from(pose.translation), (pose.translation.y - bottom).max(0.0)),
            (Err(e), _) | (_, Err(e)) => {
                log::warn!("Ground probe skipped: {e}");
                return GroundContact::none();
            }
        };

        let mut callback = GroundRayCast::new(own_bodies);
        let max_distance = extent_below + tolerance + reach;
        if let Err(e) = world.ray_cast(origin, -UP, max_distance, |hit| callback.report(hit)) {
            log::warn!("Ground probe treated as no hit: {e}");
            return GroundContact::none();
        }

        callback.closest().map_or_else(GroundContact::none, |hit| GroundContact {
            hit: true,
            distance: (hit.distance - extent_below).max(0.0),
            normal: hit.normal,
            point: hit.point,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::construct::ShapeDesc;
    use crate::foundation::math::Pose2;
    use crate::physics::{BodyKind, FixtureHandle};
    use approx::assert_relative_eq;

    fn fake_hit(body: u32, fraction: f32) -> (BodyHandle, RayHit) {
        let body = BodyHandle::from_raw_parts(body, 0);
        let hit = RayHit {
            fixture: FixtureHandle::invalid(),
            body: Some(body),
            point: Point2::origin(),
            normal: UP,
            fraction,
            distance: fraction * 10.0,
        };
        (body, hit)
    }

    #[test]
    fn test_keeps_closest_regardless_of_order() {
        let (_, far) = fake_hit(1, 0.8);
        let (near_body, near) = fake_hit(2, 0.3);
        let (_, middle) = fake_hit(3, 0.5);

        let mut callback = GroundRayCast::new(&[]);
        for hit in [far, near, middle] {
            assert_eq!(callback.report(&hit), RayCastControl::Continue);
        }

        assert_eq!(callback.closest().and_then(|hit| hit.body), Some(near_body));
    }

    #[test]
    fn test_skips_own_bodies() {
        let (own, self_hit) = fake_hit(1, 0.0);
        let (ground, ground_hit) = fake_hit(2, 0.6);

        let own_bodies = [own];
        let mut callback = GroundRayCast::new(&own_bodies);
        assert_eq!(callback.report(&self_hit), RayCastControl::Continue);
        assert_eq!(callback.report(&ground_hit), RayCastControl::Continue);

        assert_eq!(callback.closest().and_then(|hit| hit.body), Some(ground));
    }

    #[test]
    fn test_stops_on_hit_at_origin() {
        let (_, touching) = fake_hit(1, 0.0);

        let mut callback = GroundRayCast::new(&[]);
        assert_eq!(callback.report(&touching), RayCastControl::Stop);
    }

    #[test]
    fn test_probe_measures_gap_below_body() {
        let mut world = PhysicsWorld::default();
        world
            .create_body(&ShapeDesc::cuboid(10.0, 1.0), Pose2::from_translation(0.0, -1.0), BodyKind::Fixed)
            .unwrap();
        let body = world
            .create_body(&ShapeDesc::cuboid(0.5, 0.5), Pose2::from_translation(0.0, 1.0), BodyKind::Dynamic)
            .unwrap();
        world.step(1.0e-4);

        let y = world.pose(body).unwrap().translation.y;
        let contact = GroundRayCast::probe(&world, body, &[body], 0.1, 2.0);

        assert!(contact.hit);
        assert_relative_eq!(contact.distance, y - 0.5, epsilon = 1e-3);
        assert_relative_eq!(contact.normal, UP, epsilon = 1e-3);
        assert!(!contact.within(0.1));
        assert!(contact.within(1.0));
    }

    #[test]
    fn test_gap_measured_from_lowest_own_body() {
        let mut world = PhysicsWorld::new(Vec2::zeros());
        world
            .create_body(&ShapeDesc::cuboid(10.0, 1.0), Pose2::from_translation(0.0, -1.0), BodyKind::Fixed)
            .unwrap();
        let anchor = world
            .create_body(&ShapeDesc::ball(0.5), Pose2::from_translation(0.0, 3.0), BodyKind::Dynamic)
            .unwrap();
        let foot = world
            .create_body(&ShapeDesc::cuboid(0.5, 0.5), Pose2::from_translation(2.0, 1.0), BodyKind::Dynamic)
            .unwrap();
        world.step(1.0e-4);

        let alone = GroundRayCast::probe(&world, anchor, &[anchor], 0.1, 3.0);
        let with_foot = GroundRayCast::probe(&world, anchor, &[anchor, foot], 0.1, 3.0);

        assert!(alone.hit && with_foot.hit);
        assert_relative_eq!(alone.distance, 2.5, epsilon = 1e-3);
        assert_relative_eq!(with_foot.distance, 0.5, epsilon = 1e-3);
    }

    #[test]
    fn test_probe_out_of_reach_is_no_hit() {
        let mut world = PhysicsWorld::default();
        world
            .create_body(&ShapeDesc::cuboid(10.0, 1.0), Pose2::from_translation(0.0, -1.0), BodyKind::Fixed)
            .unwrap();
        let body = world
            .create_body(&ShapeDesc::cuboid(0.5, 0.5), Pose2::from_translation(0.0, 20.0), BodyKind::Dynamic)
            .unwrap();
        world.step(1.0e-4);

        let contact = GroundRayCast::probe(&world, body, &[body], 0.1, 2.0);
        assert_eq!(contact, GroundContact::none());
    }

    #[test]
    fn test_probe_of_removed_body_is_no_hit() {
        let mut world = PhysicsWorld::default();
        let body = world
            .create_body(&ShapeDesc::ball(0.5), Pose2::identity(), BodyKind::Dynamic)
            .unwrap();
        world.destroy_body(body).unwrap();

        assert!(!GroundRayCast::probe(&world, body, &[body], 0.1, 2.0).hit);
    }
}
