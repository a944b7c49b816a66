//! Physics system
//!
//! Per frame:
//!
//! 1. take this frame's commands and let every entity's state drive its body
//! 2. step the world once
//! 3. probe the ground for every entity with behaviour
//! 4. evaluate every state against its probe, then commit all transitions
//!
//! Steps 3 and 4 are separate passes, so every transition sees the complete
//! geometry of this frame. No entity changes state unless every observation
//! succeeded.

use crate::core::LocomotionConfig;
use crate::entity::{Entity, EntityHandle, EntityState, GroundContact, Observation};
use crate::error::{Result, SessionError};
use crate::input::CommandSet;
use crate::physics::PhysicsWorld;
use crate::scene::Scene;

use slotmap::SlotMap;

/// Steps the world and runs the locomotion state machines
#[derive(Debug, Default)]
pub struct PhysicsSystem {
    pending: Vec<(EntityHandle, EntityState, GroundContact)>,
}

impl PhysicsSystem {
    /// Create the system
    pub fn new() -> Self {
        Self::default()
    }

    /// Run one frame of simulation
    pub fn update(&mut self, scene: &mut Scene, dt: f32) -> Result<()> {
        let commands = scene.take_commands();
        let frame = scene.frame();
        let (world, entities, config) = scene.simulation_parts();
        let locomotion = &config.locomotion;
        let idle = CommandSet::new();

        for (handle, entity) in entities.iter_mut() {
            let set = commands.get(handle).unwrap_or(&idle);
            entity
                .drive(world, set, locomotion, dt)
                .map_err(|source| SessionError::MissingBody { entity: handle, source })?;
        }

        world.step(dt);

        let contacts = probe_all(world, entities, locomotion);

        self.pending.clear();
        for (handle, contact) in contacts {
            let entity = entities.get(handle).ok_or(SessionError::InvalidHandle(handle))?;
            let velocity = world
                .linear_velocity(entity.anchor_body())
                .map_err(|source| SessionError::MissingBody { entity: handle, source })?;
            let next = entity.update(&Observation { contact, velocity }, locomotion, dt);
            self.pending.push((handle, next, contact));
        }

        let mut transitions = 0;
        for (handle, next, contact) in self.pending.drain(..) {
            if let Some(entity) = entities.get_mut(handle) {
                if entity.commit(next, contact, frame) {
                    transitions += 1;
                }
            }
        }

        log::trace!("[frame {frame}] physics step done, {transitions} transitions");
        Ok(())
    }
}

#[cfg(not(feature = "parallel"))]
fn probe_all(
    world: &PhysicsWorld,
    entities: &SlotMap<EntityHandle, Entity>,
    config: &LocomotionConfig,
) -> Vec<(EntityHandle, GroundContact)> {
    entities
        .iter()
        .filter(|(_, entity)| entity.has_behavior())
        .map(|(handle, entity)| (handle, entity.probe(world, config)))
        .collect()
}

/// Probes run on the rayon pool; `collect` is the barrier before any
/// transition logic.
#[cfg(feature = "parallel")]
fn probe_all(
    world: &PhysicsWorld,
    entities: &SlotMap<EntityHandle, Entity>,
    config: &LocomotionConfig,
) -> Vec<(EntityHandle, GroundContact)> {
    use rayon::prelude::*;

    let driven: Vec<(EntityHandle, &Entity)> = entities
        .iter()
        .filter(|(_, entity)| entity.has_behavior())
        .collect();

    driven
        .par_iter()
        .map(|(handle, entity)| (*handle, entity.probe(world, config)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::construct::{Construct, ShapeDesc};
    use crate::core::SessionConfig;
    use crate::entity::LocomotionMode;
    use crate::foundation::math::Pose2;
    use crate::input::{Action, Command, FrameCommands};

    fn scene_with_ground() -> Scene {
        let mut scene = Scene::new(SessionConfig::default());
        scene
            .spawn(
                "ground",
                Construct::fixed(ShapeDesc::cuboid(20.0, 1.0)).unwrap(),
                Pose2::from_translation(0.0, -1.0),
                false,
            )
            .unwrap();
        scene
    }

    #[test]
    fn test_commands_are_consumed_by_the_step() {
        let mut scene = scene_with_ground();
        let hero = scene
            .spawn(
                "hero",
                Construct::dynamic(ShapeDesc::cuboid(0.5, 0.5)).unwrap(),
                Pose2::from_translation(0.0, 3.0),
                true,
            )
            .unwrap();

        let mut commands = FrameCommands::default();
        commands.push(hero, &CommandSet::new().with(Action::MoveHorizontal, Command::Axis(1.0)));
        scene.set_commands(commands);

        let mut system = PhysicsSystem::new();
        system.update(&mut scene, 1.0 / 60.0).unwrap();

        assert!(scene.commands().is_empty());
        let velocity = scene.world().linear_velocity(scene.entity(hero).unwrap().anchor_body()).unwrap();
        assert!(velocity.x > 0.0);
    }

    #[test]
    fn test_props_are_never_probed() {
        let mut scene = scene_with_ground();
        let crate_box = scene
            .spawn(
                "crate",
                Construct::dynamic(ShapeDesc::cuboid(0.5, 0.5)).unwrap(),
                Pose2::from_translation(0.0, 0.5),
                false,
            )
            .unwrap();

        let mut system = PhysicsSystem::new();
        for _ in 0..30 {
            system.update(&mut scene, 1.0 / 60.0).unwrap();
        }

        let entity = scene.entity(crate_box).unwrap();
        assert_eq!(entity.state().mode(), LocomotionMode::Airborne);
        assert!(!entity.last_contact().hit);
    }
}
