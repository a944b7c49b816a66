//! Foundation module - Core utilities and types
//!
//! This module provides fundamental utilities used throughout the engine:
//! - 2D math types
//! - Fixed-step frame timing
//! - Logging utilities

pub mod math;
pub mod time;
pub mod logging;
