//! Session error types

use thiserror::Error;

use crate::config::ConfigError;
use crate::construct::ConstructError;
use crate::entity::EntityHandle;
use crate::input::BindingError;
use crate::physics::PhysicsError;
use crate::systems::SystemPhase;

/// Errors reported by [`GameSession`](crate::GameSession) operations
#[derive(Error, Debug)]
pub enum SessionError {
    /// The entity handle is unknown or was destroyed
    #[error("Invalid entity handle {0:?}")]
    InvalidHandle(EntityHandle),

    /// Frames must advance time
    #[error("Frame delta must be positive and finite, got {0}")]
    InvalidDelta(f32),

    /// An entity lost a body it still refers to
    #[error("Entity {entity:?} refers to a missing body: {source}")]
    MissingBody {
        /// Affected entity
        entity: EntityHandle,
        /// What the physics world reported
        source: PhysicsError,
    },

    /// Web joint index out of range for the entity
    #[error("Joint {index} is out of range for an entity with {count} joints")]
    JointIndex {
        /// Requested joint
        index: usize,
        /// Joints the entity has
        count: usize,
    },

    /// No controller was registered under this index
    #[error("No controller with index {0}")]
    UnknownController(usize),

    /// The system list is missing a phase or is out of order
    #[error("Invalid system order: {0:?}")]
    SystemOrder(Vec<SystemPhase>),

    /// The pipeline has no system for this phase
    #[error("No {0:?} system in the pipeline")]
    MissingSystem(SystemPhase),

    /// Bad construct
    #[error("Construct error: {0}")]
    Construct(#[from] ConstructError),

    /// Bad binding table
    #[error("Binding error: {0}")]
    Binding(#[from] BindingError),

    /// Bad configuration
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Physics boundary failure not tied to an entity
    #[error("Physics error: {0}")]
    Physics(#[from] PhysicsError),
}

/// Result type for session operations
pub type Result<T> = std::result::Result<T, SessionError>;
