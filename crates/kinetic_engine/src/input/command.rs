//! Logical actions and the commands produced for them
//!
//! Commands say what an entity should do this frame, not which key asked for
//! it. They live for exactly one frame.

use std::collections::{BTreeMap, HashMap, VecDeque};

use serde::{Deserialize, Serialize};

use crate::entity::EntityHandle;

/// What kind of value an action carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionKind {
    /// Signed magnitude in `[-1, 1]`
    Axis,
    /// On or off
    Button,
}

/// Logical actions an entity understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Action {
    /// Horizontal movement, negative is left
    MoveHorizontal,
    /// Jump trigger
    Jump,
}

impl Action {
    /// Value kind carried by the action
    pub fn kind(self) -> ActionKind {
        match self {
            Action::MoveHorizontal => ActionKind::Axis,
            Action::Jump => ActionKind::Button,
        }
    }
}

/// Value of one action for one frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Command {
    /// Axis magnitude in `[-1, 1]`
    Axis(f32),
    /// Button state
    Button(bool),
}

impl Command {
    /// Combine two commands for the same action
    ///
    /// Axes add and saturate at `[-1, 1]`; buttons are ORed. Mismatched kinds
    /// keep `self`.
    pub fn combine(self, other: Command) -> Command {
        match (self, other) {
            (Command::Axis(a), Command::Axis(b)) => Command::Axis((a + b).clamp(-1.0, 1.0)),
            (Command::Button(a), Command::Button(b)) => Command::Button(a || b),
            (kept, _) => kept,
        }
    }
}

/// Commands for one entity in one frame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommandSet {
    commands: BTreeMap<Action, Command>,
}

impl CommandSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a command, combining with any existing one for the action
    pub fn insert(&mut self, action: Action, command: Command) {
        self.commands
            .entry(action)
            .and_modify(|existing| *existing = existing.combine(command))
            .or_insert(command);
    }

    /// Builder form of [`CommandSet::insert`]
    pub fn with(mut self, action: Action, command: Command) -> Self {
        self.insert(action, command);
        self
    }

    /// Merge another set into this one
    pub fn merge(&mut self, other: &CommandSet) {
        for (action, command) in &other.commands {
            self.insert(*action, *command);
        }
    }

    /// Axis value of an action, zero when absent
    pub fn axis(&self, action: Action) -> f32 {
        match self.commands.get(&action) {
            Some(Command::Axis(value)) => *value,
            _ => 0.0,
        }
    }

    /// Button state of an action, false when absent
    pub fn button(&self, action: Action) -> bool {
        matches!(self.commands.get(&action), Some(Command::Button(true)))
    }

    /// Raw command for an action
    pub fn get(&self, action: Action) -> Option<Command> {
        self.commands.get(&action).copied()
    }

    /// Whether no action was commanded
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

/// Commands for every entity in one frame
#[derive(Debug, Clone, Default)]
pub struct FrameCommands {
    sets: HashMap<EntityHandle, CommandSet>,
}

impl FrameCommands {
    /// Add commands for an entity, merging with what it already has
    pub fn push(&mut self, entity: EntityHandle, commands: &CommandSet) {
        self.sets.entry(entity).or_default().merge(commands);
    }

    /// Commands for an entity this frame
    pub fn get(&self, entity: EntityHandle) -> Option<&CommandSet> {
        self.sets.get(&entity)
    }

    /// Number of entities with commands
    pub fn len(&self) -> usize {
        self.sets.len()
    }

    /// Whether nothing was commanded this frame
    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }
}

/// Anything besides a controller that issues commands, e.g. scripted behaviour
pub trait CommandSource {
    /// Commands to issue for `frame`
    fn issue(&mut self, frame: u64) -> Vec<(EntityHandle, CommandSet)>;

    /// The entity was destroyed; stop commanding it
    fn release(&mut self, entity: EntityHandle);
}

/// Plays back a fixed list of per-frame commands for one entity
#[derive(Debug, Clone)]
pub struct ScriptedCommands {
    entity: Option<EntityHandle>,
    script: Vec<CommandSet>,
    queue: VecDeque<CommandSet>,
    looping: bool,
}

impl ScriptedCommands {
    /// Empty script driving `entity`
    pub fn new(entity: EntityHandle) -> Self {
        Self {
            entity: Some(entity),
            script: Vec::new(),
            queue: VecDeque::new(),
            looping: false,
        }
    }

    /// Issue `commands` for the next `frames` frames
    pub fn hold(mut self, frames: usize, commands: CommandSet) -> Self {
        for _ in 0..frames {
            self.script.push(commands.clone());
            self.queue.push_back(commands.clone());
        }
        self
    }

    /// Restart the script when it runs out
    pub fn looping(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }

    /// Frames left before the script ends
    pub fn remaining(&self) -> usize {
        self.queue.len()
    }
}

impl CommandSource for ScriptedCommands {
    fn issue(&mut self, _frame: u64) -> Vec<(EntityHandle, CommandSet)> {
        let Some(entity) = self.entity else {
            return Vec::new();
        };

        if self.queue.is_empty() && self.looping {
            self.queue.extend(self.script.iter().cloned());
        }

        self.queue
            .pop_front()
            .map(|commands| vec![(entity, commands)])
            .unwrap_or_default()
    }

    fn release(&mut self, entity: EntityHandle) {
        if self.entity == Some(entity) {
            self.entity = None;
            self.queue.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_axis_commands_saturate() {
        let mut set = CommandSet::new();
        set.insert(Action::MoveHorizontal, Command::Axis(1.0));
        set.insert(Action::MoveHorizontal, Command::Axis(1.0));
        assert_relative_eq!(set.axis(Action::MoveHorizontal), 1.0);

        set.insert(Action::MoveHorizontal, Command::Axis(-1.5));
        assert_relative_eq!(set.axis(Action::MoveHorizontal), -0.5);
    }

    #[test]
    fn test_buttons_are_ored() {
        let set = CommandSet::new()
            .with(Action::Jump, Command::Button(false))
            .with(Action::Jump, Command::Button(true))
            .with(Action::Jump, Command::Button(false));
        assert!(set.button(Action::Jump));
    }

    #[test]
    fn test_missing_actions_read_as_idle() {
        let set = CommandSet::new();
        assert_eq!(set.axis(Action::MoveHorizontal), 0.0);
        assert!(!set.button(Action::Jump));
        assert!(set.is_empty());
    }

    #[test]
    fn test_frame_commands_merge_per_entity() {
        let entity = EntityHandle::default();
        let mut frame = FrameCommands::default();
        frame.push(entity, &CommandSet::new().with(Action::MoveHorizontal, Command::Axis(0.5)));
        frame.push(entity, &CommandSet::new().with(Action::Jump, Command::Button(true)));

        assert_eq!(frame.len(), 1);
        let set = frame.get(entity).unwrap();
        assert_relative_eq!(set.axis(Action::MoveHorizontal), 0.5);
        assert!(set.button(Action::Jump));
    }

    #[test]
    fn test_scripted_commands_play_back_and_loop() {
        let entity = EntityHandle::default();
        let jump = CommandSet::new().with(Action::Jump, Command::Button(true));
        let mut script = ScriptedCommands::new(entity)
            .hold(2, jump.clone())
            .hold(1, CommandSet::new())
            .looping(true);

        assert_eq!(script.issue(0), vec![(entity, jump.clone())]);
        assert_eq!(script.issue(1), vec![(entity, jump.clone())]);
        assert_eq!(script.issue(2), vec![(entity, CommandSet::new())]);
        assert_eq!(script.issue(3), vec![(entity, jump)]);

        script.release(entity);
        assert!(script.issue(4).is_empty());
    }
}
