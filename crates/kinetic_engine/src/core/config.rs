//! # Session Configuration
//!
//! Tunables for a game session. Everything here is loaded once when the
//! session is built and is read-only afterwards.
//!
//! ## Configuration Categories
//!
//! - **Session Config**: world gravity, fixed step length, catch-up limits
//! - **Locomotion Config**: movement speeds, jump strength, ground detection

use serde::{Deserialize, Serialize};

use crate::config::{Config, ConfigError};
use crate::entity::LocomotionMode;
use crate::foundation::math::{utils, Vec2};

/// # Locomotion Configuration
///
/// Parameters of the Grounded/Airborne state machine and of the ground probe
/// that drives it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LocomotionConfig {
    /// Horizontal speed set while grounded, in units per second
    pub move_speed: f32,
    /// Horizontal acceleration available while airborne
    pub air_acceleration: f32,
    /// Jump impulse per unit of body mass
    pub jump_power: f32,
    /// Horizontal speed cap applied while airborne
    pub max_horizontal_speed: f32,
    /// Gap below the body that still counts as touching the ground
    pub ground_tolerance: f32,
    /// Extra ray length past the tolerance, used to report the ground distance
    pub probe_reach: f32,
    /// Largest vertical speed at which an airborne body may land
    pub landing_speed: f32,
    /// State assigned to entities at spawn
    pub initial_state: LocomotionMode,
}

impl Default for LocomotionConfig {
    fn default() -> Self {
        Self {
            move_speed: 12.0,
            air_acceleration: 18.0,
            jump_power: 12.0,
            max_horizontal_speed: 15.0,
            ground_tolerance: 0.1,
            probe_reach: 2.0,
            landing_speed: 2.0,
            initial_state: LocomotionMode::Airborne,
        }
    }
}

impl LocomotionConfig {
    /// Set the grounded move speed
    pub fn with_move_speed(mut self, speed: f32) -> Self {
        self.move_speed = speed;
        self
    }

    /// Set the airborne horizontal acceleration
    pub fn with_air_acceleration(mut self, acceleration: f32) -> Self {
        self.air_acceleration = acceleration;
        self
    }

    /// Set the jump impulse per unit mass
    pub fn with_jump_power(mut self, power: f32) -> Self {
        self.jump_power = power;
        self
    }

    /// Set ground tolerance and landing speed threshold
    pub fn with_ground_detection(mut self, tolerance: f32, landing_speed: f32) -> Self {
        self.ground_tolerance = tolerance;
        self.landing_speed = landing_speed;
        self
    }

    /// Set the state entities start in
    pub fn with_initial_state(mut self, mode: LocomotionMode) -> Self {
        self.initial_state = mode;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("move_speed", self.move_speed),
            ("max_horizontal_speed", self.max_horizontal_speed),
            ("ground_tolerance", self.ground_tolerance),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::Invalid(format!("{name} must be positive, got {value}")));
            }
        }

        let non_negative = [
            ("air_acceleration", self.air_acceleration),
            ("jump_power", self.jump_power),
            ("probe_reach", self.probe_reach),
            ("landing_speed", self.landing_speed),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Invalid(format!("{name} must be non-negative, got {value}")));
            }
        }

        Ok(())
    }
}

/// # Session Configuration
///
/// World-level settings for a [`GameSession`](crate::GameSession).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Gravity applied to every dynamic body
    pub gravity: Vec2,
    /// Length of one simulation step in seconds
    pub fixed_dt: f32,
    /// Upper bound on steps run by a single `advance` call
    pub max_steps_per_advance: u32,
    /// Locomotion tunables
    pub locomotion: LocomotionConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            gravity: Vec2::new(0.0, -10.0),
            fixed_dt: 1.0 / 60.0,
            max_steps_per_advance: 5,
            locomotion: LocomotionConfig::default(),
        }
    }
}

impl Config for SessionConfig {}

impl SessionConfig {
    /// Set gravity
    pub fn with_gravity(mut self, gravity: Vec2) -> Self {
        self.gravity = gravity;
        self
    }

    /// Set the fixed step length
    pub fn with_fixed_dt(mut self, dt: f32) -> Self {
        self.fixed_dt = dt;
        self
    }

    /// Set the locomotion tunables
    pub fn with_locomotion(mut self, locomotion: LocomotionConfig) -> Self {
        self.locomotion = locomotion;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !utils::is_finite(&self.gravity) {
            return Err(ConfigError::Invalid("gravity must be finite".to_string()));
        }

        if !self.fixed_dt.is_finite() || self.fixed_dt <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "fixed_dt must be positive, got {}",
                self.fixed_dt
            )));
        }

        if self.max_steps_per_advance == 0 {
            return Err(ConfigError::Invalid("max_steps_per_advance must be at least 1".to_string()));
        }

        self.locomotion.validate()
    }
}
