//! # Input Bindings
//!
//! Static tables mapping physical keys and analog axes to logical actions.
//! Bindings are loaded once (see [`BindingConfig`]) and validated into an
//! immutable [`Bindings`] table.
//!
//! ## Combination rules
//!
//! Several inputs may feed the same action:
//!
//! - **Axis actions**: every key pair contributes `-1`/`+1` while its key is
//!   held, every analog axis contributes its value. The sum is clamped to
//!   `[-1, 1]`, so two keys for the same direction saturate at the single-key
//!   magnitude.
//! - **Button actions**: all bound keys are ORed.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::Config;
use super::command::{Action, ActionKind, Command, CommandSet};
use super::device::{AnalogAxis, InputSnapshot, KeyCode};

/// Binding table errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BindingError {
    /// A key binding targets an axis action or an axis binding a button action
    #[error("{action:?} is a {actual:?} action but was bound as {expected:?}")]
    KindMismatch {
        /// Bound action
        action: Action,
        /// Kind the binding produces
        expected: ActionKind,
        /// Kind the action carries
        actual: ActionKind,
    },

    /// An axis binding with no keys and no analog axes
    #[error("Axis binding for {0:?} has no inputs")]
    EmptyAxis(Action),

    /// The same key pushes an axis both ways
    #[error("{0:?} is bound as both ends of an axis")]
    ConflictingAxisKeys(KeyCode),
}

/// When a key binding fires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum KeyTrigger {
    /// Only on the frame the key goes down
    #[default]
    Pressed,
    /// Every frame the key is held
    Held,
}

/// A key driving a button action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyBinding {
    /// Physical key
    pub key: KeyCode,
    /// Logical action
    pub action: Action,
    /// Edge or level trigger
    #[serde(default)]
    pub trigger: KeyTrigger,
}

impl KeyBinding {
    /// Binding that fires when `key` goes down
    pub fn pressed(key: KeyCode, action: Action) -> Self {
        Self {
            key,
            action,
            trigger: KeyTrigger::Pressed,
        }
    }

    /// Binding that fires while `key` is held
    pub fn held(key: KeyCode, action: Action) -> Self {
        Self {
            key,
            action,
            trigger: KeyTrigger::Held,
        }
    }

    fn evaluate(&self, snapshot: &InputSnapshot, previous: &InputSnapshot) -> bool {
        match self.trigger {
            KeyTrigger::Pressed => snapshot.just_pressed(self.key, previous),
            KeyTrigger::Held => snapshot.is_held(self.key),
        }
    }
}

/// Two keys pushing one axis in opposite directions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxisKeys {
    /// Key contributing `-1`
    pub negative: KeyCode,
    /// Key contributing `+1`
    pub positive: KeyCode,
}

impl AxisKeys {
    /// Create a key pair
    pub fn new(negative: KeyCode, positive: KeyCode) -> Self {
        Self { negative, positive }
    }

    fn value(&self, snapshot: &InputSnapshot) -> f32 {
        let mut value = 0.0;
        if snapshot.is_held(self.negative) {
            value -= 1.0;
        }
        if snapshot.is_held(self.positive) {
            value += 1.0;
        }
        value
    }
}

/// Inputs driving one axis action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisBinding {
    /// Logical action
    pub action: Action,
    /// Key pairs
    #[serde(default)]
    pub key_pairs: Vec<AxisKeys>,
    /// Analog axes
    #[serde(default)]
    pub analog: Vec<AnalogAxis>,
}

impl AxisBinding {
    /// Binding with no inputs yet
    pub fn new(action: Action) -> Self {
        Self {
            action,
            key_pairs: Vec::new(),
            analog: Vec::new(),
        }
    }

    /// Add a key pair
    pub fn with_keys(mut self, negative: KeyCode, positive: KeyCode) -> Self {
        self.key_pairs.push(AxisKeys::new(negative, positive));
        self
    }

    /// Add an analog axis
    pub fn with_analog(mut self, axis: AnalogAxis) -> Self {
        self.analog.push(axis);
        self
    }

    fn value(&self, snapshot: &InputSnapshot) -> f32 {
        let keys: f32 = self.key_pairs.iter().map(|pair| pair.value(snapshot)).sum();
        let analog: f32 = self.analog.iter().map(|axis| snapshot.axis(*axis)).sum();
        (keys + analog).clamp(-1.0, 1.0)
    }
}

/// Serialized binding tables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BindingConfig {
    /// Button bindings
    pub keys: Vec<KeyBinding>,
    /// Axis bindings
    pub axes: Vec<AxisBinding>,
}

impl Default for BindingConfig {
    fn default() -> Self {
        Self {
            keys: vec![
                KeyBinding::pressed(KeyCode::Space, Action::Jump),
                KeyBinding::pressed(KeyCode::W, Action::Jump),
            ],
            axes: vec![AxisBinding::new(Action::MoveHorizontal)
                .with_keys(KeyCode::A, KeyCode::D)
                .with_keys(KeyCode::Left, KeyCode::Right)
                .with_analog(AnalogAxis::LeftStickX)],
        }
    }
}

impl Config for BindingConfig {}

impl BindingConfig {
    /// Empty tables
    pub fn empty() -> Self {
        Self {
            keys: Vec::new(),
            axes: Vec::new(),
        }
    }

    /// Add a key binding
    pub fn with_key(mut self, binding: KeyBinding) -> Self {
        self.keys.push(binding);
        self
    }

    /// Add an axis binding
    pub fn with_axis(mut self, binding: AxisBinding) -> Self {
        self.axes.push(binding);
        self
    }

    /// Validate into an immutable table
    pub fn build(self) -> Result<Bindings, BindingError> {
        for binding in &self.keys {
            check_kind(binding.action, ActionKind::Button)?;
        }

        for binding in &self.axes {
            check_kind(binding.action, ActionKind::Axis)?;
            if binding.key_pairs.is_empty() && binding.analog.is_empty() {
                return Err(BindingError::EmptyAxis(binding.action));
            }
            if let Some(pair) = binding.key_pairs.iter().find(|pair| pair.negative == pair.positive) {
                return Err(BindingError::ConflictingAxisKeys(pair.negative));
            }
        }

        Ok(Bindings {
            keys: self.keys,
            axes: self.axes,
        })
    }
}

fn check_kind(action: Action, expected: ActionKind) -> Result<(), BindingError> {
    let actual = action.kind();
    if actual == expected {
        Ok(())
    } else {
        Err(BindingError::KindMismatch { action, expected, actual })
    }
}

/// Validated, read-only binding table
#[derive(Debug, Clone, PartialEq)]
pub struct Bindings {
    keys: Vec<KeyBinding>,
    axes: Vec<AxisBinding>,
}

impl Bindings {
    /// Key bindings
    pub fn keys(&self) -> &[KeyBinding] {
        &self.keys
    }

    /// Axis bindings
    pub fn axes(&self) -> &[AxisBinding] {
        &self.axes
    }

    /// Translate a snapshot into commands
    ///
    /// `previous` is last frame's snapshot and is only used for
    /// [`KeyTrigger::Pressed`] edge detection. Keys without a binding are
    /// ignored.
    pub fn translate(&self, snapshot: &InputSnapshot, previous: &InputSnapshot) -> CommandSet {
        let mut commands = CommandSet::new();

        for binding in &self.axes {
            commands.insert(binding.action, Command::Axis(binding.value(snapshot)));
        }
        for binding in &self.keys {
            commands.insert(binding.action, Command::Button(binding.evaluate(snapshot, previous)));
        }

        commands
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn bindings() -> Bindings {
        BindingConfig::default().build().unwrap()
    }

    #[test]
    fn test_two_keys_same_direction_saturate() {
        let snapshot = InputSnapshot::new().with_key(KeyCode::D).with_key(KeyCode::Right);
        let commands = bindings().translate(&snapshot, &InputSnapshot::new());

        assert_relative_eq!(commands.axis(Action::MoveHorizontal), 1.0);
    }

    #[test]
    fn test_opposite_keys_cancel() {
        let snapshot = InputSnapshot::new().with_key(KeyCode::A).with_key(KeyCode::Right);
        let commands = bindings().translate(&snapshot, &InputSnapshot::new());

        assert_relative_eq!(commands.axis(Action::MoveHorizontal), 0.0);
    }

    #[test]
    fn test_analog_adds_to_keys() {
        let snapshot = InputSnapshot::new()
            .with_key(KeyCode::A)
            .with_axis(AnalogAxis::LeftStickX, 0.25);
        let commands = bindings().translate(&snapshot, &InputSnapshot::new());

        assert_relative_eq!(commands.axis(Action::MoveHorizontal), -0.75);
    }

    #[test]
    fn test_pressed_fires_once() {
        let bindings = bindings();
        let idle = InputSnapshot::new();
        let space = InputSnapshot::new().with_key(KeyCode::Space);

        assert!(bindings.translate(&space, &idle).button(Action::Jump));
        assert!(!bindings.translate(&space, &space).button(Action::Jump));
    }

    #[test]
    fn test_held_fires_every_frame() {
        let bindings = BindingConfig::empty()
            .with_key(KeyBinding::held(KeyCode::Space, Action::Jump))
            .build()
            .unwrap();
        let space = InputSnapshot::new().with_key(KeyCode::Space);

        assert!(bindings.translate(&space, &space).button(Action::Jump));
    }

    #[test]
    fn test_unbound_keys_are_ignored() {
        let snapshot = InputSnapshot::new().with_key(KeyCode::Q).with_key(KeyCode::Escape);
        let commands = bindings().translate(&snapshot, &InputSnapshot::new());

        assert_relative_eq!(commands.axis(Action::MoveHorizontal), 0.0);
        assert!(!commands.button(Action::Jump));
    }

    #[test]
    fn test_invalid_tables_are_rejected() {
        let wrong_kind = BindingConfig::empty().with_key(KeyBinding::pressed(KeyCode::D, Action::MoveHorizontal));
        assert!(matches!(wrong_kind.build(), Err(BindingError::KindMismatch { .. })));

        let empty_axis = BindingConfig::empty().with_axis(AxisBinding::new(Action::MoveHorizontal));
        assert_eq!(empty_axis.build(), Err(BindingError::EmptyAxis(Action::MoveHorizontal)));

        let conflicting = BindingConfig::empty()
            .with_axis(AxisBinding::new(Action::MoveHorizontal).with_keys(KeyCode::D, KeyCode::D));
        assert_eq!(conflicting.build(), Err(BindingError::ConflictingAxisKeys(KeyCode::D)));

        let axis_as_button = BindingConfig::empty().with_axis(AxisBinding::new(Action::Jump).with_keys(KeyCode::A, KeyCode::D));
        assert!(axis_as_button.build().is_err());
    }

    #[test]
    fn test_binding_config_toml_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bindings.toml");

        let config = BindingConfig::default();
        config.save_to_file(&path).unwrap();
        let loaded = BindingConfig::load_from_file(&path).unwrap();

        assert_eq!(loaded, config);
        assert!(loaded.build().is_ok());
    }
}
