//! The simulated scene: physics world, entities and this frame's commands
//!
//! Systems receive the scene mutably one at a time. Entity lifetime is managed
//! through [`GameSession`](crate::GameSession), which is the only caller of
//! [`Scene::spawn`] and [`Scene::destroy`] outside tests.

use slotmap::SlotMap;

use crate::construct::Construct;
use crate::core::SessionConfig;
use crate::entity::{Entity, EntityHandle, EntityState};
use crate::error::{Result, SessionError};
use crate::foundation::math::Pose2;
use crate::input::FrameCommands;
use crate::physics::{BodyHandle, PhysicsError, PhysicsWorld};
use crate::render::Color;

/// World, entities and per-frame commands
pub struct Scene {
    world: PhysicsWorld,
    entities: SlotMap<EntityHandle, Entity>,
    commands: FrameCommands,
    config: SessionConfig,
    frame: u64,
    spawned: usize,
}

impl Scene {
    /// Empty scene
    pub fn new(config: SessionConfig) -> Self {
        Self {
            world: PhysicsWorld::new(config.gravity),
            entities: SlotMap::with_key(),
            commands: FrameCommands::default(),
            config,
            frame: 0,
            spawned: 0,
        }
    }

    /// The physics world
    pub fn world(&self) -> &PhysicsWorld {
        &self.world
    }

    /// Session configuration
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Frames run so far
    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub(crate) fn begin_frame(&mut self) -> u64 {
        self.frame += 1;
        self.frame
    }

    /// Entity by handle
    pub fn entity(&self, handle: EntityHandle) -> Option<&Entity> {
        self.entities.get(handle)
    }

    pub(crate) fn entity_mut(&mut self, handle: EntityHandle) -> Result<(&mut Entity, &mut PhysicsWorld)> {
        let entity = self
            .entities
            .get_mut(handle)
            .ok_or(SessionError::InvalidHandle(handle))?;
        Ok((entity, &mut self.world))
    }

    /// Whether the handle refers to a live entity
    pub fn contains(&self, handle: EntityHandle) -> bool {
        self.entities.contains_key(handle)
    }

    /// All live entities
    pub fn entities(&self) -> impl Iterator<Item = (EntityHandle, &Entity)> {
        self.entities.iter()
    }

    /// Number of live entities
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Whether the scene has no entities
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Commands waiting for the physics system this frame
    pub fn commands(&self) -> &FrameCommands {
        &self.commands
    }

    pub(crate) fn set_commands(&mut self, commands: FrameCommands) {
        self.commands = commands;
    }

    /// Take this frame's commands, leaving none behind for the next frame
    pub(crate) fn take_commands(&mut self) -> FrameCommands {
        std::mem::take(&mut self.commands)
    }

    pub(crate) fn simulation_parts(
        &mut self,
    ) -> (&mut PhysicsWorld, &mut SlotMap<EntityHandle, Entity>, &SessionConfig) {
        (&mut self.world, &mut self.entities, &self.config)
    }

    /// Build bodies and joints for `construct` and register the entity
    ///
    /// Nothing is left in the world if any body or joint fails.
    pub(crate) fn spawn(
        &mut self,
        name: &str,
        construct: Construct,
        pose: Pose2,
        behavior: bool,
    ) -> Result<EntityHandle> {
        let mut bodies: Vec<BodyHandle> = Vec::with_capacity(construct.shape_count());
        let built = self.build_parts(&construct, pose, &mut bodies);

        let joints = match built {
            Ok(joints) => joints,
            Err(e) => {
                for body in bodies {
                    if let Err(cleanup) = self.world.destroy_body(body) {
                        log::warn!("Cleanup after failed spawn of '{name}': {cleanup}");
                    }
                }
                return Err(e.into());
            }
        };

        let state = EntityState::initial(self.config.locomotion.initial_state);
        let color = Color::from_palette(self.spawned);
        self.spawned += 1;

        let entity = Entity::new(name, construct, bodies, joints, state, behavior, color);
        let handle = self.entities.insert(entity);
        log::debug!("Spawned '{name}' as {handle:?} ({:?})", state.mode());
        Ok(handle)
    }

    fn build_parts(
        &mut self,
        construct: &Construct,
        pose: Pose2,
        bodies: &mut Vec<BodyHandle>,
    ) -> std::result::Result<Vec<crate::physics::JointHandle>, PhysicsError> {
        let kind = construct.kind();
        for (shape, placement) in construct.shapes() {
            bodies.push(self.world.create_body(shape, pose.combine(&placement), kind)?);
        }

        construct
            .joints()
            .iter()
            .map(|joint| {
                self.world.create_joint(
                    bodies[joint.a],
                    bodies[joint.b],
                    joint.anchor_a,
                    joint.anchor_b,
                    joint.params,
                )
            })
            .collect()
    }

    /// Remove an entity and release its bodies (and with them its joints)
    pub(crate) fn destroy(&mut self, handle: EntityHandle) -> Result<Entity> {
        let entity = self
            .entities
            .remove(handle)
            .ok_or(SessionError::InvalidHandle(handle))?;

        for body in entity.bodies() {
            if let Err(e) = self.world.destroy_body(*body) {
                log::warn!("Releasing body of '{}': {e}", entity.name());
            }
        }

        log::debug!("Destroyed '{}' ({handle:?})", entity.name());
        Ok(entity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::construct::{ShapeDesc, Web, WebJoint};

    #[test]
    fn test_spawn_creates_one_body_per_shape() {
        let mut scene = Scene::new(SessionConfig::default());
        let web = Web::builder()
            .with_shape(ShapeDesc::cuboid(0.5, 0.5), Pose2::identity())
            .with_shape(ShapeDesc::cuboid(0.5, 0.5), Pose2::from_translation(1.5, 0.0))
            .with_shape(ShapeDesc::cuboid(0.5, 0.5), Pose2::from_translation(3.0, 0.0))
            .with_joint(WebJoint::new(0, 1))
            .with_joint(WebJoint::new(1, 2))
            .build()
            .unwrap();

        let handle = scene
            .spawn("web", Construct::Web(web), Pose2::from_translation(0.0, 5.0), true)
            .unwrap();

        let entity = scene.entity(handle).unwrap();
        assert_eq!(entity.bodies().len(), 3);
        assert_eq!(entity.joints().len(), 2);
        assert_eq!(scene.world().body_count(), 3);
        assert_eq!(scene.world().joint_count(), 2);
    }

    #[test]
    fn test_failed_spawn_leaves_nothing_behind() {
        let mut scene = Scene::new(SessionConfig::default());
        // The second body lands at an infinite position and is rejected
        let web = Web::builder()
            .with_shape(ShapeDesc::ball(0.5), Pose2::identity())
            .with_shape(ShapeDesc::ball(0.5), Pose2::from_translation(f32::MAX, 0.0))
            .build()
            .unwrap();

        let result = scene.spawn("broken", Construct::Web(web), Pose2::from_translation(f32::MAX, 0.0), true);
        assert!(matches!(result, Err(SessionError::Physics(PhysicsError::DegenerateShape(_)))));
        assert_eq!(scene.world().body_count(), 0);
        assert!(scene.is_empty());
    }

    #[test]
    fn test_destroy_releases_bodies() {
        let mut scene = Scene::new(SessionConfig::default());
        let handle = scene
            .spawn("box", Construct::dynamic(ShapeDesc::ball(0.5)).unwrap(), Pose2::identity(), true)
            .unwrap();
        let body = scene.entity(handle).unwrap().anchor_body();

        scene.destroy(handle).unwrap();
        assert!(!scene.world().contains_body(body));
        assert!(!scene.contains(handle));
        assert!(matches!(scene.destroy(handle), Err(SessionError::InvalidHandle(_))));
    }

    #[test]
    fn test_palette_colors_rotate() {
        let mut scene = Scene::new(SessionConfig::default());
        let construct = Construct::dynamic(ShapeDesc::ball(0.5)).unwrap();
        let first = scene.spawn("a", construct.clone(), Pose2::identity(), false).unwrap();
        let second = scene.spawn("b", construct, Pose2::from_translation(2.0, 0.0), false).unwrap();

        assert_eq!(scene.entity(first).unwrap().color(), Color::from_palette(0));
        assert_eq!(scene.entity(second).unwrap().color(), Color::from_palette(1));
    }
}
