//! Rigid-body world backed by `rapier2d`
//!
//! `PhysicsPipeline::step` needs mutable access to every set at once, so they
//! all live together here. The query pipeline is refreshed by the step, which
//! means ray casts issued after [`PhysicsWorld::step`] see this frame's
//! geometry.

use rapier2d::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::construct::{Geometry, JointParams, ShapeDesc, MIN_JOINT_LENGTH};
use crate::foundation::math::{utils, Point2, Pose2, Vec2};
use super::ray::{RayCastControl, RayHit};

/// Handle of a body owned by the world
pub type BodyHandle = RigidBodyHandle;

/// Handle of a collider (fixture) owned by the world
pub type FixtureHandle = ColliderHandle;

/// Handle of a joint owned by the world
pub type JointHandle = ImpulseJointHandle;

/// How a body moves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BodyKind {
    /// Moved by forces, gravity and contacts
    #[default]
    Dynamic,
    /// Never moves (ground, walls)
    Fixed,
}

/// Errors reported by the physics boundary
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PhysicsError {
    /// The shape could not be turned into a collider
    #[error("Degenerate shape: {0}")]
    DegenerateShape(String),

    /// The body handle is not (or no longer) in the world
    #[error("Unknown body {0:?}")]
    UnknownBody(BodyHandle),

    /// The joint handle is not (or no longer) in the world
    #[error("Unknown joint {0:?}")]
    UnknownJoint(JointHandle),

    /// Ray origin, direction or length cannot describe a segment
    #[error("Degenerate ray: {0}")]
    DegenerateRay(String),

    /// Joint anchors too close together to give the spring a direction
    #[error("Degenerate joint: anchors {0} apart")]
    DegenerateJoint(f32),
}

/// The physics world
///
/// Sole owner of body, collider and joint memory. Entities only keep handles.
pub struct PhysicsWorld {
    gravity: Vector<Real>,
    integration_parameters: IntegrationParameters,
    physics_pipeline: PhysicsPipeline,
    island_manager: IslandManager,
    broad_phase: BroadPhase,
    narrow_phase: NarrowPhase,
    rigid_body_set: RigidBodySet,
    collider_set: ColliderSet,
    impulse_joint_set: ImpulseJointSet,
    multibody_joint_set: MultibodyJointSet,
    ccd_solver: CCDSolver,
    query_pipeline: QueryPipeline,
}

impl PhysicsWorld {
    /// Create an empty world with the given gravity
    pub fn new(gravity: Vec2) -> Self {
        Self {
            gravity,
            integration_parameters: IntegrationParameters::default(),
            physics_pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: BroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            rigid_body_set: RigidBodySet::new(),
            collider_set: ColliderSet::new(),
            impulse_joint_set: ImpulseJointSet::new(),
            multibody_joint_set: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
        }
    }

    /// Gravity applied to dynamic bodies
    pub fn gravity(&self) -> Vec2 {
        self.gravity
    }

    /// Create a body with one collider built from `shape`
    pub fn create_body(
        &mut self,
        shape: &ShapeDesc,
        pose: Pose2,
        kind: BodyKind,
    ) -> Result<BodyHandle, PhysicsError> {
        if !pose.is_finite() {
            return Err(PhysicsError::DegenerateShape(format!("non-finite pose {pose:?}")));
        }

        let collider = Self::collider_for(shape)?;
        let builder = match kind {
            BodyKind::Dynamic => RigidBodyBuilder::dynamic(),
            BodyKind::Fixed => RigidBodyBuilder::fixed(),
        };
        let body = builder
            .translation(pose.translation)
            .rotation(pose.angle)
            .build();

        let handle = self.rigid_body_set.insert(body);
        self.collider_set
            .insert_with_parent(collider, handle, &mut self.rigid_body_set);

        log::trace!("Created {kind:?} body {handle:?} at {:?}", pose.translation);
        Ok(handle)
    }

    fn collider_for(shape: &ShapeDesc) -> Result<Collider, PhysicsError> {
        shape
            .validate()
            .map_err(|e| PhysicsError::DegenerateShape(e.to_string()))?;

        let builder = match &shape.geometry {
            Geometry::Cuboid { half_extents } => ColliderBuilder::cuboid(half_extents.x, half_extents.y),
            Geometry::Ball { radius } => ColliderBuilder::ball(*radius),
            Geometry::ConvexPolygon { points } => ColliderBuilder::convex_hull(points).ok_or_else(|| {
                PhysicsError::DegenerateShape(format!("no convex hull for {} points", points.len()))
            })?,
        };

        Ok(builder
            .position(shape.offset.to_isometry())
            .density(shape.material.density)
            .friction(shape.material.friction)
            .restitution(shape.material.restitution)
            .build())
    }

    /// Link two bodies with a distance spring between local anchors
    ///
    /// The rest length is the distance between the anchors as the bodies
    /// stand now. Stiffness and damping are per unit of mass, so a link
    /// behaves the same whatever the shapes weigh. The linked bodies do not
    /// collide with each other.
    pub fn create_joint(
        &mut self,
        body_a: BodyHandle,
        body_b: BodyHandle,
        anchor_a: Point2,
        anchor_b: Point2,
        params: JointParams,
    ) -> Result<JointHandle, PhysicsError> {
        let world_a = self.body(body_a)?.position() * anchor_a;
        let world_b = self.body(body_b)?.position() * anchor_b;
        let rest_length = (world_b - world_a).norm();
        if !rest_length.is_finite() || rest_length < MIN_JOINT_LENGTH {
            return Err(PhysicsError::DegenerateJoint(rest_length));
        }

        let joint = SpringJointBuilder::new(rest_length, params.stiffness, params.damping)
            .local_anchor1(anchor_a)
            .local_anchor2(anchor_b)
            .spring_model(MotorModel::AccelerationBased)
            .contacts_enabled(false)
            .build();

        let handle = self.impulse_joint_set.insert(body_a, body_b, joint, true);
        log::trace!("Created joint {handle:?} with rest length {rest_length}");
        Ok(handle)
    }

    /// Length a joint's spring pulls back to
    pub fn joint_rest_length(&self, handle: JointHandle) -> Result<f32, PhysicsError> {
        self.impulse_joint_set
            .get(handle)
            .and_then(|joint| joint.data.motor(JointAxis::X))
            .map(|motor| motor.target_pos)
            .ok_or(PhysicsError::UnknownJoint(handle))
    }

    /// Retune a joint's spring, keeping its rest length
    pub fn set_joint_params(&mut self, handle: JointHandle, params: JointParams) -> Result<(), PhysicsError> {
        let joint = self
            .impulse_joint_set
            .get_mut(handle)
            .ok_or(PhysicsError::UnknownJoint(handle))?;
        let rest_length = joint.data.motor(JointAxis::X).map_or(0.0, |motor| motor.target_pos);
        joint
            .data
            .set_motor_position(JointAxis::X, rest_length, params.stiffness, params.damping);

        // Wake both ends so the new spring takes effect
        let (body_a, body_b) = (joint.body1, joint.body2);
        for body in [body_a, body_b] {
            if let Some(body) = self.rigid_body_set.get_mut(body) {
                body.wake_up(true);
            }
        }
        Ok(())
    }

    /// Remove a body together with its colliders and joints
    pub fn destroy_body(&mut self, handle: BodyHandle) -> Result<(), PhysicsError> {
        self.rigid_body_set
            .remove(
                handle,
                &mut self.island_manager,
                &mut self.collider_set,
                &mut self.impulse_joint_set,
                &mut self.multibody_joint_set,
                true,
            )
            .map(|_| ())
            .ok_or(PhysicsError::UnknownBody(handle))
    }

    /// Whether the body is still in the world
    pub fn contains_body(&self, handle: BodyHandle) -> bool {
        self.rigid_body_set.contains(handle)
    }

    /// Number of bodies in the world
    pub fn body_count(&self) -> usize {
        self.rigid_body_set.len()
    }

    /// Number of joints in the world
    pub fn joint_count(&self) -> usize {
        self.impulse_joint_set.len()
    }

    fn body(&self, handle: BodyHandle) -> Result<&RigidBody, PhysicsError> {
        self.rigid_body_set.get(handle).ok_or(PhysicsError::UnknownBody(handle))
    }

    fn body_mut(&mut self, handle: BodyHandle) -> Result<&mut RigidBody, PhysicsError> {
        self.rigid_body_set
            .get_mut(handle)
            .ok_or(PhysicsError::UnknownBody(handle))
    }

    /// Apply an impulse at the center of mass
    pub fn apply_impulse(&mut self, handle: BodyHandle, impulse: Vec2) -> Result<(), PhysicsError> {
        self.body_mut(handle)?.apply_impulse(impulse, true);
        Ok(())
    }

    /// Add a force for the next step
    pub fn add_force(&mut self, handle: BodyHandle, force: Vec2) -> Result<(), PhysicsError> {
        self.body_mut(handle)?.add_force(force, true);
        Ok(())
    }

    /// Overwrite a body's linear velocity
    pub fn set_linear_velocity(&mut self, handle: BodyHandle, velocity: Vec2) -> Result<(), PhysicsError> {
        self.body_mut(handle)?.set_linvel(velocity, true);
        Ok(())
    }

    /// Linear velocity of a body
    pub fn linear_velocity(&self, handle: BodyHandle) -> Result<Vec2, PhysicsError> {
        Ok(*self.body(handle)?.linvel())
    }

    /// Mass of a body
    ///
    /// Fixed bodies still report the mass of their colliders; nothing moves
    /// them regardless.
    pub fn mass(&self, handle: BodyHandle) -> Result<f32, PhysicsError> {
        Ok(self.body(handle)?.mass())
    }

    /// World pose of a body
    pub fn pose(&self, handle: BodyHandle) -> Result<Pose2, PhysicsError> {
        Ok(Pose2::from_isometry(self.body(handle)?.position()))
    }

    /// Distance from the body origin down to the bottom of its colliders
    pub fn extent_below(&self, handle: BodyHandle) -> Result<f32, PhysicsError> {
        let origin_y = self.body(handle)?.translation().y;
        Ok((origin_y - self.lowest_point(handle)?).max(0.0))
    }

    /// World height of the bottom of a body's colliders
    ///
    /// A body without colliders reports its own origin.
    pub fn lowest_point(&self, handle: BodyHandle) -> Result<f32, PhysicsError> {
        let body = self.body(handle)?;

        Ok(body
            .colliders()
            .iter()
            .filter_map(|collider| self.collider_set.get(*collider))
            .map(|collider| collider.compute_aabb().mins.y)
            .fold(body.translation().y, f32::min))
    }

    /// Advance the simulation by `dt` seconds
    pub fn step(&mut self, dt: f32) {
        self.integration_parameters.dt = dt;

        self.physics_pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.rigid_body_set,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            &mut self.ccd_solver,
            Some(&mut self.query_pipeline),
            &(),
            &(),
        );
    }

    /// Cast a ray and report every intersected fixture to `callback`
    ///
    /// Hits arrive in no particular order. The callback decides after each
    /// one whether the query continues.
    pub fn ray_cast<F>(
        &self,
        origin: Point2,
        direction: Vec2,
        max_distance: f32,
        mut callback: F,
    ) -> Result<(), PhysicsError>
    where
        F: FnMut(&RayHit) -> RayCastControl,
    {
        if !utils::is_finite(&origin.coords) || !utils::is_finite(&direction) {
            return Err(PhysicsError::DegenerateRay(format!(
                "non-finite ray {origin:?} -> {direction:?}"
            )));
        }
        if !max_distance.is_finite() || max_distance <= 0.0 {
            return Err(PhysicsError::DegenerateRay(format!("cast length {max_distance}")));
        }
        let direction = direction
            .try_normalize(f32::EPSILON)
            .ok_or_else(|| PhysicsError::DegenerateRay("zero-length direction".to_string()))?;

        let ray = Ray::new(origin, direction);
        self.query_pipeline.intersections_with_ray(
            &self.rigid_body_set,
            &self.collider_set,
            &ray,
            max_distance,
            true,
            QueryFilter::default(),
            |fixture, intersection| {
                let hit = RayHit {
                    fixture,
                    body: self.collider_set.get(fixture).and_then(Collider::parent),
                    point: ray.point_at(intersection.toi),
                    normal: intersection.normal,
                    fraction: intersection.toi / max_distance,
                    distance: intersection.toi,
                };
                callback(&hit) == RayCastControl::Continue
            },
        );

        Ok(())
    }
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new(Vec2::new(0.0, -10.0))
    }
}
