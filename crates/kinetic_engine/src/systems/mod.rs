//! # Frame Systems
//!
//! A frame runs three systems in a fixed order:
//!
//! 1. **Input** turns the device snapshot into this frame's commands
//! 2. **Physics** drives entities, steps the world, probes for ground and
//!    commits locomotion transitions
//! 3. **Graphics** collects render data and hands it to the sink
//!
//! The order is a correctness requirement: physics consumes what input
//! produced this frame, and graphics reads the poses physics settled on.

pub mod graphics_system;
pub mod input_system;
pub mod physics_system;

pub use graphics_system::GraphicsSystem;
pub use input_system::InputSystem;
pub use physics_system::PhysicsSystem;

use crate::error::{Result, SessionError};
use crate::scene::Scene;

/// System execution phases with explicit ordering
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SystemPhase {
    /// Device snapshot to commands
    Input = 0,
    /// Commands, world step, ground probes, state transitions
    Physics = 1,
    /// Render data submission (read-only)
    Graphics = 2,
}

/// The order every session runs its systems in
pub const PIPELINE: [SystemPhase; 3] = [SystemPhase::Input, SystemPhase::Physics, SystemPhase::Graphics];

/// One pipeline stage
pub enum System {
    /// Input stage
    Input(InputSystem),
    /// Physics stage
    Physics(PhysicsSystem),
    /// Graphics stage
    Graphics(GraphicsSystem),
}

impl System {
    /// Which phase the system runs in
    pub fn phase(&self) -> SystemPhase {
        match self {
            System::Input(_) => SystemPhase::Input,
            System::Physics(_) => SystemPhase::Physics,
            System::Graphics(_) => SystemPhase::Graphics,
        }
    }

    /// Run the system for one frame
    pub fn update(&mut self, scene: &mut Scene, dt: f32) -> Result<()> {
        match self {
            System::Input(system) => system.update(scene, dt),
            System::Physics(system) => system.update(scene, dt),
            System::Graphics(system) => system.update(scene, dt),
        }
    }
}

impl std::fmt::Debug for System {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("System").field(&self.phase()).finish()
    }
}

/// Check that `systems` is exactly one system per phase, in pipeline order
pub fn check_order(systems: &[System]) -> Result<()> {
    let phases: Vec<SystemPhase> = systems.iter().map(System::phase).collect();
    if phases == PIPELINE {
        Ok(())
    } else {
        Err(SessionError::SystemOrder(phases))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::ScriptedInput;
    use crate::render::HeadlessSink;

    fn input() -> System {
        System::Input(InputSystem::new(Box::new(ScriptedInput::new())))
    }

    fn graphics() -> System {
        System::Graphics(GraphicsSystem::new(Box::new(HeadlessSink::new())))
    }

    #[test]
    fn test_phase_ordering() {
        assert!(SystemPhase::Input < SystemPhase::Physics);
        assert!(SystemPhase::Physics < SystemPhase::Graphics);
    }

    #[test]
    fn test_pipeline_order_is_enforced() {
        let ordered = vec![input(), System::Physics(PhysicsSystem::new()), graphics()];
        assert!(check_order(&ordered).is_ok());

        let swapped = vec![System::Physics(PhysicsSystem::new()), input(), graphics()];
        assert!(matches!(check_order(&swapped), Err(SessionError::SystemOrder(_))));

        let missing = vec![input(), graphics()];
        assert!(check_order(&missing).is_err());
    }
}
