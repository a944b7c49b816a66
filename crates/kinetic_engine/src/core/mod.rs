//! # Core Engine Module
//!
//! Shared configuration for the simulation core.
//!
//! - **SessionConfig**: gravity, fixed time step, catch-up limits
//! - **LocomotionConfig**: the tunables of the Grounded/Airborne state machine

pub mod config;

pub use config::{LocomotionConfig, SessionConfig};
