//! Entities: a construct, the bodies built from it, and a locomotion state
//!
//! The physics world owns body memory. An entity only keeps handles, so it is
//! the session's job to release them when the entity goes away.

pub mod ground;
pub mod state;

pub use ground::{GroundContact, GroundRayCast};
pub use state::{Airborne, EntityState, Grounded, LocomotionMode, Observation};

use slotmap::new_key_type;

use crate::construct::{Construct, JointParams};
use crate::core::LocomotionConfig;
use crate::error::SessionError;
use crate::input::CommandSet;
use crate::physics::{BodyHandle, JointHandle, PhysicsError, PhysicsWorld};
use crate::render::{Color, RenderData};

new_key_type! {
    /// Stable entity identifier; stale handles never alias a newer entity
    pub struct EntityHandle;
}

/// A simulated entity
#[derive(Debug)]
pub struct Entity {
    name: String,
    construct: Construct,
    bodies: Vec<BodyHandle>,
    joints: Vec<JointHandle>,
    state: EntityState,
    behavior: bool,
    color: Color,
    contact: GroundContact,
}

impl Entity {
    /// Wrap bodies and joints already created from `construct`
    ///
    /// `bodies` follows the construct's shape order and `joints` its joint
    /// order.
    pub(crate) fn new(
        name: impl Into<String>,
        construct: Construct,
        bodies: Vec<BodyHandle>,
        joints: Vec<JointHandle>,
        state: EntityState,
        behavior: bool,
        color: Color,
    ) -> Self {
        Self {
            name: name.into(),
            construct,
            bodies,
            joints,
            state,
            behavior,
            color,
            contact: GroundContact::none(),
        }
    }

    /// Entity name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Shape data the entity was built from
    pub fn construct(&self) -> &Construct {
        &self.construct
    }

    /// Every body of the entity, in construct order
    pub fn bodies(&self) -> &[BodyHandle] {
        &self.bodies
    }

    /// Body driven by locomotion and probed for ground
    pub fn anchor_body(&self) -> BodyHandle {
        self.bodies[self.construct.anchor()]
    }

    /// Web joints, in construct order
    pub fn joints(&self) -> &[JointHandle] {
        &self.joints
    }

    /// Current locomotion state
    pub fn state(&self) -> &EntityState {
        &self.state
    }

    /// Whether locomotion drives this entity
    pub fn has_behavior(&self) -> bool {
        self.behavior
    }

    /// Render colour
    pub fn color(&self) -> Color {
        self.color
    }

    /// Set the render colour
    pub fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    /// Ground probe result of the last frame
    pub fn last_contact(&self) -> &GroundContact {
        &self.contact
    }

    /// Apply this frame's commands to the anchor body
    ///
    /// Entities without behaviour are never driven.
    pub fn drive(
        &mut self,
        world: &mut PhysicsWorld,
        commands: &CommandSet,
        config: &LocomotionConfig,
        dt: f32,
    ) -> Result<(), PhysicsError> {
        if !self.behavior {
            return Ok(());
        }
        let anchor = self.anchor_body();
        self.state.drive(world, anchor, commands, config, dt)
    }

    /// Probe for ground below the anchor body, ignoring all of this entity's bodies
    pub fn probe(&self, world: &PhysicsWorld, config: &LocomotionConfig) -> GroundContact {
        GroundRayCast::probe(
            world,
            self.anchor_body(),
            &self.bodies,
            config.ground_tolerance,
            config.probe_reach,
        )
    }

    /// The state this entity should hold after this frame
    ///
    /// Pure with respect to the entity: the result is applied later by
    /// [`Entity::commit`], once every entity of the frame has been evaluated.
    pub fn update(&self, observation: &Observation, config: &LocomotionConfig, dt: f32) -> EntityState {
        if !self.behavior {
            return self.state;
        }
        let mut state = self.state;
        state.update(observation, config, dt).unwrap_or(state)
    }

    /// Swap in the state computed by [`Entity::update`]
    ///
    /// Returns whether the locomotion mode changed.
    pub fn commit(&mut self, next: EntityState, contact: GroundContact, frame: u64) -> bool {
        self.contact = contact;
        let changed = next.mode() != self.state.mode();
        if changed {
            self.state.exit(&self.name, frame);
            next.enter(&self.name, frame);
        }
        self.state = next;
        changed
    }

    /// Retune a web joint, both in the world and in the construct
    pub fn tune_joint(&mut self, world: &mut PhysicsWorld, index: usize, params: JointParams) -> crate::Result<()> {
        let joint = self.joints.get(index).copied().ok_or(SessionError::JointIndex {
            index,
            count: self.joints.len(),
        })?;
        params.validate()?;

        world.set_joint_params(joint, params)?;
        if let Construct::Web(web) = &mut self.construct {
            web.set_joint_params(index, params);
        }
        Ok(())
    }

    /// Snapshot of shapes and joints at their current world poses
    pub fn render_data(&self, handle: EntityHandle, world: &PhysicsWorld) -> Result<RenderData, PhysicsError> {
        let shapes = self
            .construct
            .shapes()
            .into_iter()
            .zip(&self.bodies)
            .map(|((shape, _), body)| Ok((shape.clone(), world.pose(*body)?.combine(&shape.offset))))
            .collect::<Result<Vec<_>, PhysicsError>>()?;

        let joints = self
            .construct
            .joints()
            .iter()
            .map(|joint| {
                let pose_a = world.pose(self.bodies[joint.a])?;
                let pose_b = world.pose(self.bodies[joint.b])?;
                Ok((pose_a.transform_point(&joint.anchor_a), pose_b.transform_point(&joint.anchor_b)))
            })
            .collect::<Result<Vec<_>, PhysicsError>>()?;

        Ok(RenderData {
            entity: handle,
            name: self.name.clone(),
            color: self.color,
            shapes,
            joints,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::construct::{ShapeDesc, Web, WebJoint};
    use crate::foundation::math::{Point2, Pose2, Vec2};
    use crate::physics::BodyKind;
    use approx::assert_relative_eq;

    fn single(world: &mut PhysicsWorld, behavior: bool) -> Entity {
        let construct = Construct::dynamic(ShapeDesc::cuboid(0.5, 0.5)).unwrap();
        let body = world
            .create_body(&ShapeDesc::cuboid(0.5, 0.5), Pose2::from_translation(0.0, 3.0), BodyKind::Dynamic)
            .unwrap();
        Entity::new(
            "box",
            construct,
            vec![body],
            Vec::new(),
            EntityState::initial(LocomotionMode::Airborne),
            behavior,
            Color::default(),
        )
    }

    fn landed() -> Observation {
        Observation {
            contact: GroundContact {
                hit: true,
                distance: 0.0,
                normal: Vec2::new(0.0, 1.0),
                point: Point2::origin(),
            },
            velocity: Vec2::zeros(),
        }
    }

    #[test]
    fn test_update_does_not_touch_entity_until_commit() {
        let mut world = PhysicsWorld::default();
        let mut entity = single(&mut world, true);
        let config = LocomotionConfig::default();

        let next = entity.update(&landed(), &config, 0.016);
        assert_eq!(next.mode(), LocomotionMode::Grounded);
        assert_eq!(entity.state().mode(), LocomotionMode::Airborne);

        assert!(entity.commit(next, landed().contact, 1));
        assert_eq!(entity.state().mode(), LocomotionMode::Grounded);
        assert!(entity.last_contact().hit);
        assert!(!entity.commit(next, landed().contact, 2));
    }

    #[test]
    fn test_props_keep_their_state() {
        let mut world = PhysicsWorld::default();
        let entity = single(&mut world, false);
        let config = LocomotionConfig::default();

        assert_eq!(entity.update(&landed(), &config, 0.016), *entity.state());
    }

    #[test]
    fn test_render_data_follows_body() {
        let mut world = PhysicsWorld::default();
        let entity = single(&mut world, true);

        let data = entity.render_data(EntityHandle::default(), &world).unwrap();
        assert_eq!(data.name, "box");
        assert_eq!(data.shapes.len(), 1);
        assert_relative_eq!(data.shapes[0].1.translation, Vec2::new(0.0, 3.0));
        assert!(data.joints.is_empty());
    }

    #[test]
    fn test_tune_joint_checks_index() {
        let mut world = PhysicsWorld::default();
        let web = Web::builder()
            .with_shape(ShapeDesc::ball(0.5), Pose2::identity())
            .with_shape(ShapeDesc::ball(0.5), Pose2::from_translation(1.0, 0.0))
            .with_joint(WebJoint::new(0, 1))
            .build()
            .unwrap();
        let a = world.create_body(&ShapeDesc::ball(0.5), Pose2::identity(), BodyKind::Dynamic).unwrap();
        let b = world
            .create_body(&ShapeDesc::ball(0.5), Pose2::from_translation(1.0, 0.0), BodyKind::Dynamic)
            .unwrap();
        let joint = world
            .create_joint(a, b, Point2::origin(), Point2::origin(), JointParams::default())
            .unwrap();
        let mut entity = Entity::new(
            "web",
            Construct::Web(web),
            vec![a, b],
            vec![joint],
            EntityState::initial(LocomotionMode::Airborne),
            true,
            Color::default(),
        );

        let params = JointParams::new(80.0, 4.0);
        entity.tune_joint(&mut world, 0, params).unwrap();
        assert_eq!(entity.construct().joints()[0].params, params);

        assert!(matches!(
            entity.tune_joint(&mut world, 1, params),
            Err(SessionError::JointIndex { index: 1, count: 1 })
        ));
        assert!(matches!(
            entity.tune_joint(&mut world, 0, JointParams::new(f32::NAN, 0.0)),
            Err(SessionError::Construct(_))
        ));
    }
}
