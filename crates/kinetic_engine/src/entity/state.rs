//! Locomotion states
//!
//! Every entity holds exactly one [`EntityState`]. A state drives the anchor
//! body before the world steps and decides, from what the world looks like
//! after the step, whether it hands over to the other state. Transitions
//! replace the state wholesale; data only carries over within a variant.

use serde::{Deserialize, Serialize};

use crate::core::LocomotionConfig;
use crate::foundation::math::Vec2;
use crate::input::{Action, CommandSet};
use crate::physics::{BodyHandle, PhysicsError, PhysicsWorld};
use super::ground::GroundContact;

/// Which locomotion state is active, without its data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LocomotionMode {
    /// Standing on something
    Grounded,
    /// Falling or jumping
    Airborne,
}

/// What the world reported for an entity after this frame's step
#[derive(Debug, Clone, Copy)]
pub struct Observation {
    /// Ground probe result
    pub contact: GroundContact,
    /// Velocity of the anchor body
    pub velocity: Vec2,
}

/// Data of the grounded state
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Grounded {
    /// Normal of the surface under the entity
    pub ground_normal: Vec2,
    /// The jump impulse was applied this frame
    pub jump_requested: bool,
}

impl Grounded {
    fn new(ground_normal: Vec2) -> Self {
        Self {
            ground_normal,
            jump_requested: false,
        }
    }

    fn drive(
        &mut self,
        world: &mut PhysicsWorld,
        body: BodyHandle,
        commands: &CommandSet,
        config: &LocomotionConfig,
    ) -> Result<(), PhysicsError> {
        let axis = commands.axis(Action::MoveHorizontal);
        if axis != 0.0 {
            let velocity = world.linear_velocity(body)?;
            world.set_linear_velocity(body, Vec2::new(axis * config.move_speed, velocity.y))?;
        }

        if commands.button(Action::Jump) {
            let impulse = world.mass(body)? * config.jump_power;
            world.apply_impulse(body, Vec2::new(0.0, impulse))?;
            self.jump_requested = true;
        }

        Ok(())
    }

    fn update(&mut self, observation: &Observation, config: &LocomotionConfig) -> Option<EntityState> {
        if self.jump_requested || !observation.contact.within(config.ground_tolerance) {
            return Some(EntityState::Airborne(Airborne::new()));
        }

        self.ground_normal = observation.contact.normal;
        None
    }
}

/// Data of the airborne state
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Airborne {
    /// Seconds since the entity left the ground
    pub time_airborne: f32,
}

impl Airborne {
    fn new() -> Self {
        Self::default()
    }

    fn drive(
        &mut self,
        world: &mut PhysicsWorld,
        body: BodyHandle,
        commands: &CommandSet,
        config: &LocomotionConfig,
        dt: f32,
    ) -> Result<(), PhysicsError> {
        let axis = commands.axis(Action::MoveHorizontal);
        if axis == 0.0 {
            return Ok(());
        }

        let mass = world.mass(body)?;
        world.apply_impulse(body, Vec2::new(mass * axis * config.air_acceleration * dt, 0.0))?;

        let velocity = world.linear_velocity(body)?;
        let limit = config.max_horizontal_speed;
        if velocity.x.abs() > limit {
            world.set_linear_velocity(body, Vec2::new(velocity.x.clamp(-limit, limit), velocity.y))?;
        }

        Ok(())
    }

    fn update(&mut self, observation: &Observation, config: &LocomotionConfig, dt: f32) -> Option<EntityState> {
        self.time_airborne += dt;

        let landed = observation.contact.within(config.ground_tolerance)
            && observation.velocity.y.abs() <= config.landing_speed;
        landed.then(|| EntityState::Grounded(Grounded::new(observation.contact.normal)))
    }
}

/// The active locomotion state of an entity
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EntityState {
    /// On the ground
    Grounded(Grounded),
    /// In the air
    Airborne(Airborne),
}

impl EntityState {
    /// Fresh state for the given mode
    pub fn initial(mode: LocomotionMode) -> Self {
        match mode {
            LocomotionMode::Grounded => EntityState::Grounded(Grounded::new(crate::foundation::math::UP)),
            LocomotionMode::Airborne => EntityState::Airborne(Airborne::new()),
        }
    }

    /// Which variant is active
    pub fn mode(&self) -> LocomotionMode {
        match self {
            EntityState::Grounded(_) => LocomotionMode::Grounded,
            EntityState::Airborne(_) => LocomotionMode::Airborne,
        }
    }

    /// Apply this frame's commands to the anchor body, before the world steps
    pub fn drive(
        &mut self,
        world: &mut PhysicsWorld,
        body: BodyHandle,
        commands: &CommandSet,
        config: &LocomotionConfig,
        dt: f32,
    ) -> Result<(), PhysicsError> {
        match self {
            EntityState::Grounded(grounded) => grounded.drive(world, body, commands, config),
            EntityState::Airborne(airborne) => airborne.drive(world, body, commands, config, dt),
        }
    }

    /// Evaluate the exit condition against this frame's observation
    ///
    /// Returns the state to switch to, if any. Only the current state's own
    /// exit condition is checked, so at most one transition happens per call.
    pub fn update(
        &mut self,
        observation: &Observation,
        config: &LocomotionConfig,
        dt: f32,
    ) -> Option<EntityState> {
        match self {
            EntityState::Grounded(grounded) => grounded.update(observation, config),
            EntityState::Airborne(airborne) => airborne.update(observation, config, dt),
        }
    }

    pub(crate) fn enter(&self, entity: &str, frame: u64) {
        log::debug!("[frame {frame}] {entity} entered {:?}", self.mode());
    }

    pub(crate) fn exit(&self, entity: &str, frame: u64) {
        if let EntityState::Airborne(airborne) = self {
            log::trace!("[frame {frame}] {entity} was airborne for {:.3}s", airborne.time_airborne);
        }
        log::debug!("[frame {frame}] {entity} left {:?}", self.mode());
    }
}
