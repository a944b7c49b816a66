//! Input to command translation
//!
//! Raw device state comes in as an [`InputSnapshot`]; [`Controller`]s apply
//! their [`Bindings`] to it and produce [`CommandSet`]s for the entity they
//! possess. Other [`CommandSource`]s (scripted behaviour) issue commands the
//! same way.

pub mod bindings;
pub mod command;
pub mod controller;
pub mod device;

pub use bindings::{AxisBinding, AxisKeys, BindingConfig, BindingError, Bindings, KeyBinding, KeyTrigger};
pub use command::{Action, ActionKind, Command, CommandSet, CommandSource, FrameCommands, ScriptedCommands};
pub use controller::Controller;
pub use device::{AnalogAxis, InputSnapshot, InputSource, KeyCode, ScriptedInput};
