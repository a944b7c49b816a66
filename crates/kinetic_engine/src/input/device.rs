//! Normalized device state
//!
//! Hardware polling happens outside the core. What arrives here is one
//! [`InputSnapshot`] per frame: the keys held down and the analog axis values.

use std::collections::{HashMap, HashSet, VecDeque};

use serde::{Deserialize, Serialize};

/// Physical keys the bindings can refer to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[allow(missing_docs)]
pub enum KeyCode {
    A, B, C, D, E, F, G, H, I, J, K, L, M,
    N, O, P, Q, R, S, T, U, V, W, X, Y, Z,
    Left, Right, Up, Down,
    Space, Enter, Escape, LeftShift, LeftControl,
}

/// Analog axes the bindings can refer to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnalogAxis {
    /// Horizontal left stick, right is positive
    LeftStickX,
    /// Vertical left stick, up is positive
    LeftStickY,
}

/// Device state for one frame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputSnapshot {
    /// Keys currently held down
    pub held: HashSet<KeyCode>,
    /// Analog axis values in `[-1, 1]`
    pub axes: HashMap<AnalogAxis, f32>,
}

impl InputSnapshot {
    /// Snapshot with nothing pressed
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: mark a key as held
    pub fn with_key(mut self, key: KeyCode) -> Self {
        self.held.insert(key);
        self
    }

    /// Builder: set an analog axis value
    pub fn with_axis(mut self, axis: AnalogAxis, value: f32) -> Self {
        self.axes.insert(axis, value);
        self
    }

    /// Whether the key is held down
    pub fn is_held(&self, key: KeyCode) -> bool {
        self.held.contains(&key)
    }

    /// Whether the key went down since `previous`
    pub fn just_pressed(&self, key: KeyCode, previous: &InputSnapshot) -> bool {
        self.is_held(key) && !previous.is_held(key)
    }

    /// Axis value clamped to `[-1, 1]`; missing or non-finite values read as zero
    pub fn axis(&self, axis: AnalogAxis) -> f32 {
        self.axes
            .get(&axis)
            .copied()
            .filter(|value| value.is_finite())
            .map_or(0.0, |value| value.clamp(-1.0, 1.0))
    }
}

/// Where the input system gets its per-frame snapshot from
pub trait InputSource {
    /// Poll the device state for this frame
    fn snapshot(&mut self) -> InputSnapshot;
}

/// Plays back a queue of snapshots, then reports an idle device
#[derive(Debug, Clone, Default)]
pub struct ScriptedInput {
    queue: VecDeque<InputSnapshot>,
}

impl ScriptedInput {
    /// Create an empty script
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `snapshot` for the next `frames` frames
    pub fn hold(mut self, frames: usize, snapshot: InputSnapshot) -> Self {
        self.push(frames, snapshot);
        self
    }

    /// Queue `snapshot` for the next `frames` frames
    pub fn push(&mut self, frames: usize, snapshot: InputSnapshot) {
        self.queue.extend(std::iter::repeat(snapshot).take(frames));
    }

    /// Snapshots left
    pub fn remaining(&self) -> usize {
        self.queue.len()
    }
}

impl InputSource for ScriptedInput {
    fn snapshot(&mut self) -> InputSnapshot {
        self.queue.pop_front().unwrap_or_default()
    }
}

impl<S: InputSource + ?Sized> InputSource for std::rc::Rc<std::cell::RefCell<S>> {
    fn snapshot(&mut self) -> InputSnapshot {
        self.borrow_mut().snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edge_detection() {
        let up = InputSnapshot::new();
        let down = InputSnapshot::new().with_key(KeyCode::Space);

        assert!(down.just_pressed(KeyCode::Space, &up));
        assert!(!down.just_pressed(KeyCode::Space, &down));
        assert!(!up.just_pressed(KeyCode::Space, &down));
    }

    #[test]
    fn test_axis_values_are_sanitized() {
        let snapshot = InputSnapshot::new()
            .with_axis(AnalogAxis::LeftStickX, 3.0)
            .with_axis(AnalogAxis::LeftStickY, f32::NAN);

        assert_eq!(snapshot.axis(AnalogAxis::LeftStickX), 1.0);
        assert_eq!(snapshot.axis(AnalogAxis::LeftStickY), 0.0);
    }

    #[test]
    fn test_scripted_input_runs_dry() {
        let mut input = ScriptedInput::new().hold(2, InputSnapshot::new().with_key(KeyCode::D));

        assert!(input.snapshot().is_held(KeyCode::D));
        assert!(input.snapshot().is_held(KeyCode::D));
        assert_eq!(input.snapshot(), InputSnapshot::new());
        assert_eq!(input.remaining(), 0);
    }
}
