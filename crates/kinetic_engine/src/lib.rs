//! # Kinetic Engine
//!
//! The entity simulation core of a small 2D real-time game engine.
//!
//! ## Features
//!
//! - **Constructs**: single shapes or webs of shapes linked by springs
//! - **Locomotion**: a Grounded/Airborne state machine per entity, driven by
//!   ground ray casts against the physics world
//! - **Input**: key and axis bindings translated into per-frame commands
//! - **Frame Pipeline**: Input, Physics and Graphics systems run in a fixed
//!   order by a [`GameSession`]
//!
//! Rigid-body dynamics come from `rapier2d`; rendering and device polling stay
//! outside the crate behind [`RenderSink`](render::RenderSink) and
//! [`InputSource`](input::InputSource).
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use kinetic_engine::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     logging::init();
//!
//!     let config = SessionConfig::load_from_file("session.toml")?;
//!     let mut session = GameSession::new(config, ScriptedInput::new(), HeadlessSink::new())?;
//!     let hero = session.spawn("hero", Construct::dynamic(ShapeDesc::ball(0.5))?, Pose2::from_translation(0.0, 4.0))?;
//!
//!     while session.frame() < 600 {
//!         session.advance(1.0 / 60.0)?;
//!     }
//!     logging::info!("hero ended {:?}", session.state_of(hero)?.mode());
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod config;
pub mod construct;
pub mod core;
pub mod entity;
pub mod foundation;
pub mod input;
pub mod physics;
pub mod render;
pub mod systems;

mod error;
mod scene;
mod session;

#[cfg(test)]
mod tests;

pub use error::{Result, SessionError};
pub use scene::Scene;
pub use session::GameSession;

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        GameSession, Scene, SessionError,
        config::{Config, ConfigError},
        construct::{Construct, ConstructError, JointParams, Material, ShapeDesc, SingleShape, SoftBox, Web, WebJoint},
        core::{LocomotionConfig, SessionConfig},
        entity::{EntityHandle, EntityState, GroundContact, LocomotionMode},
        foundation::{
            logging,
            math::{Point2, Pose2, Vec2},
            time::Stopwatch,
        },
        input::{
            Action, AxisBinding, BindingConfig, Command, CommandSet, CommandSource, Controller, InputSnapshot,
            InputSource, KeyBinding, KeyCode, ScriptedCommands, ScriptedInput,
        },
        physics::{BodyKind, PhysicsWorld},
        render::{Color, HeadlessSink, RenderData, RenderSink},
    };
}
