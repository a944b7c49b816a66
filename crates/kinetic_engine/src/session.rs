//! # Game Session
//!
//! Owns the scene and the system pipeline and is the only way to create or
//! destroy entities or advance time.
//!
//! ```rust,no_run
//! use kinetic_engine::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut session = GameSession::new(SessionConfig::default(), ScriptedInput::new(), HeadlessSink::new())?;
//!
//!     session.spawn_prop(
//!         "ground",
//!         Construct::fixed(ShapeDesc::cuboid(25.0, 5.0))?,
//!         Pose2::from_translation(0.0, -10.0),
//!     )?;
//!     let hero = session.spawn("hero", Construct::dynamic(ShapeDesc::cuboid(1.5, 1.5))?, Pose2::from_translation(5.0, 5.0))?;
//!
//!     let controller = session.add_controller(Controller::new(BindingConfig::default().build()?))?;
//!     session.possess(controller, hero)?;
//!
//!     for _ in 0..120 {
//!         session.run_frame(1.0 / 60.0)?;
//!     }
//!     println!("hero is {:?}", session.state_of(hero)?.mode());
//!     Ok(())
//! }
//! ```

use crate::construct::{Construct, JointParams};
use crate::core::SessionConfig;
use crate::entity::{Entity, EntityHandle, EntityState};
use crate::error::{Result, SessionError};
use crate::foundation::math::Pose2;
use crate::foundation::time::FixedStep;
use crate::input::{CommandSource, Controller, InputSource};
use crate::render::{Color, RenderSink};
use crate::scene::Scene;
use crate::systems::{self, GraphicsSystem, InputSystem, PhysicsSystem, System, SystemPhase};

/// A running simulation
pub struct GameSession {
    scene: Scene,
    systems: Vec<System>,
    clock: FixedStep,
}

impl GameSession {
    /// Build a session; fails if the configuration is invalid
    pub fn new(
        config: SessionConfig,
        input: impl InputSource + 'static,
        sink: impl RenderSink + 'static,
    ) -> Result<Self> {
        config.validate().map_err(|e| {
            log::error!("Invalid session configuration: {e}");
            e
        })?;

        let systems = vec![
            System::Input(InputSystem::new(Box::new(input))),
            System::Physics(PhysicsSystem::new()),
            System::Graphics(GraphicsSystem::new(Box::new(sink))),
        ];
        systems::check_order(&systems)?;

        log::info!(
            "Session created: gravity {:?}, fixed dt {:.4}s, initial state {:?}",
            config.gravity,
            config.fixed_dt,
            config.locomotion.initial_state
        );

        Ok(Self {
            clock: FixedStep::new(config.fixed_dt, config.max_steps_per_advance),
            scene: Scene::new(config),
            systems,
        })
    }

    /// Spawn an entity driven by locomotion
    pub fn spawn(&mut self, name: &str, construct: Construct, pose: Pose2) -> Result<EntityHandle> {
        self.scene.spawn(name, construct, pose, true)
    }

    /// Spawn an entity without locomotion (ground, walls, crates)
    pub fn spawn_prop(&mut self, name: &str, construct: Construct, pose: Pose2) -> Result<EntityHandle> {
        self.scene.spawn(name, construct, pose, false)
    }

    /// Remove an entity, release its bodies and stop anything commanding it
    pub fn destroy(&mut self, handle: EntityHandle) -> Result<()> {
        self.scene.destroy(handle).map_err(|e| {
            log::warn!("destroy: {e}");
            e
        })?;
        if let Some(input) = self.input_system_mut() {
            input.release(handle);
        }
        Ok(())
    }

    /// Entity by handle
    pub fn entity(&self, handle: EntityHandle) -> Result<&Entity> {
        self.scene.entity(handle).ok_or(SessionError::InvalidHandle(handle))
    }

    /// Current locomotion state of an entity
    pub fn state_of(&self, handle: EntityHandle) -> Result<&EntityState> {
        self.entity(handle).map(Entity::state)
    }

    /// Change an entity's render colour
    pub fn set_render_color(&mut self, handle: EntityHandle, color: Color) -> Result<()> {
        let (entity, _) = self.scene.entity_mut(handle)?;
        entity.set_color(color);
        Ok(())
    }

    /// Retune one joint of a web entity
    pub fn tune_joint(&mut self, handle: EntityHandle, index: usize, params: JointParams) -> Result<()> {
        let (entity, world) = self.scene.entity_mut(handle)?;
        entity.tune_joint(world, index, params)
    }

    /// Register a controller, returning its index
    pub fn add_controller(&mut self, controller: Controller) -> Result<usize> {
        self.input_system_mut()
            .map(|input| input.add_controller(controller))
            .ok_or(SessionError::MissingSystem(SystemPhase::Input))
    }

    /// Make a controller drive an entity
    pub fn possess(&mut self, controller: usize, handle: EntityHandle) -> Result<()> {
        if !self.scene.contains(handle) {
            return Err(SessionError::InvalidHandle(handle));
        }
        let slot = self
            .input_system_mut()
            .and_then(|input| input.controller_mut(controller))
            .ok_or(SessionError::UnknownController(controller))?;
        slot.possess(handle);
        Ok(())
    }

    /// Register a scripted command source
    pub fn add_command_source(&mut self, source: impl CommandSource + 'static) -> Result<()> {
        let input = self
            .input_system_mut()
            .ok_or(SessionError::MissingSystem(SystemPhase::Input))?;
        input.add_command_source(Box::new(source));
        Ok(())
    }

    fn input_system_mut(&mut self) -> Option<&mut InputSystem> {
        self.systems.iter_mut().find_map(|system| match system {
            System::Input(input) => Some(input),
            _ => None,
        })
    }

    /// Run Input, Physics and Graphics once with the given delta
    pub fn run_frame(&mut self, dt: f32) -> Result<()> {
        if !dt.is_finite() || dt <= 0.0 {
            return Err(SessionError::InvalidDelta(dt));
        }

        let frame = self.scene.begin_frame();
        for system in &mut self.systems {
            system.update(&mut self.scene, dt).map_err(|e| {
                log::error!("[frame {frame}] {:?} system failed: {e}", system.phase());
                e
            })?;
        }
        Ok(())
    }

    /// Feed wall-clock time and run as many fixed steps as fit
    ///
    /// Returns the number of frames run. Leftover time carries over; see
    /// [`GameSession::alpha`].
    pub fn advance(&mut self, elapsed: f32) -> Result<u32> {
        if !elapsed.is_finite() || elapsed < 0.0 {
            return Err(SessionError::InvalidDelta(elapsed));
        }

        self.clock.accumulate(elapsed);
        let mut frames = 0;
        while self.clock.next_step() {
            self.run_frame(self.clock.step())?;
            frames += 1;
        }
        Ok(frames)
    }

    /// Fraction of a fixed step waiting in the accumulator, for interpolation
    pub fn alpha(&self) -> f32 {
        self.clock.alpha()
    }

    /// Frames run so far
    pub fn frame(&self) -> u64 {
        self.scene.frame()
    }

    /// The scene, read-only
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Number of live entities
    pub fn entity_count(&self) -> usize {
        self.scene.len()
    }
}
