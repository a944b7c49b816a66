//! Input system: device snapshot to per-entity commands

use crate::entity::EntityHandle;
use crate::error::Result;
use crate::input::{CommandSource, Controller, FrameCommands, InputSnapshot, InputSource};
use crate::scene::Scene;

/// Polls the input source and fills the scene's commands for this frame
pub struct InputSystem {
    source: Box<dyn InputSource>,
    controllers: Vec<Controller>,
    command_sources: Vec<Box<dyn CommandSource>>,
    previous: InputSnapshot,
}

impl InputSystem {
    /// Input system reading from `source`
    pub fn new(source: Box<dyn InputSource>) -> Self {
        Self {
            source,
            controllers: Vec::new(),
            command_sources: Vec::new(),
            previous: InputSnapshot::default(),
        }
    }

    /// Register a controller, returning its index
    pub fn add_controller(&mut self, controller: Controller) -> usize {
        self.controllers.push(controller);
        self.controllers.len() - 1
    }

    /// Controller by index
    pub fn controller(&self, index: usize) -> Option<&Controller> {
        self.controllers.get(index)
    }

    /// Mutable controller by index
    pub fn controller_mut(&mut self, index: usize) -> Option<&mut Controller> {
        self.controllers.get_mut(index)
    }

    /// Register a scripted command source
    pub fn add_command_source(&mut self, source: Box<dyn CommandSource>) {
        self.command_sources.push(source);
    }

    /// Forget a destroyed entity everywhere commands could come from
    pub fn release(&mut self, entity: EntityHandle) {
        for controller in &mut self.controllers {
            if controller.possessed() == Some(entity) {
                controller.release();
            }
        }
        for source in &mut self.command_sources {
            source.release(entity);
        }
    }

    /// Replace the scene's commands with this frame's
    pub fn update(&mut self, scene: &mut Scene, _dt: f32) -> Result<()> {
        let snapshot = self.source.snapshot();
        let mut commands = FrameCommands::default();

        for controller in &self.controllers {
            let Some(entity) = controller.possessed() else {
                continue;
            };
            if scene.contains(entity) {
                commands.push(entity, &controller.translate(&snapshot, &self.previous));
            }
        }

        for source in &mut self.command_sources {
            for (entity, set) in source.issue(scene.frame()) {
                if scene.contains(entity) {
                    commands.push(entity, &set);
                } else {
                    log::debug!("Dropping commands for unknown entity {entity:?}");
                }
            }
        }

        scene.set_commands(commands);
        self.previous = snapshot;
        Ok(())
    }
}
