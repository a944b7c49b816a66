//! Controllers: a binding table plus the entity it currently drives

use crate::entity::EntityHandle;
use super::bindings::Bindings;
use super::command::CommandSet;
use super::device::InputSnapshot;

/// Turns device snapshots into commands for one possessed entity
#[derive(Debug, Clone)]
pub struct Controller {
    bindings: Bindings,
    possessed: Option<EntityHandle>,
}

impl Controller {
    /// Create a controller that drives nothing yet
    pub fn new(bindings: Bindings) -> Self {
        Self {
            bindings,
            possessed: None,
        }
    }

    /// Start driving `entity`
    pub fn possess(&mut self, entity: EntityHandle) {
        self.possessed = Some(entity);
    }

    /// Stop driving anything
    pub fn release(&mut self) -> Option<EntityHandle> {
        self.possessed.take()
    }

    /// The entity being driven
    pub fn possessed(&self) -> Option<EntityHandle> {
        self.possessed
    }

    /// The binding table
    pub fn bindings(&self) -> &Bindings {
        &self.bindings
    }

    /// Commands for this frame; see [`Bindings::translate`]
    pub fn translate(&self, snapshot: &InputSnapshot, previous: &InputSnapshot) -> CommandSet {
        self.bindings.translate(snapshot, previous)
    }
}
