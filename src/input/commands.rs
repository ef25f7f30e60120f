//! # Command Definitions
//!
//! Logical buttons reported by the input-decoding collaborator.

use serde::{Deserialize, Serialize};

/// Logical buttons, independent of keyboard or gamepad layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Button {
    Left,
    Right,
    Up,
    Down,
    /// Jump, or climb while held on a ladder
    Action1,
    /// Place the carried entity
    Action2,
}

impl Button {
    /// Unit direction contributed by a held direction button.
    pub fn direction(self) -> Option<(i32, i32)> {
        match self {
            Button::Left => Some((-1, 0)),
            Button::Right => Some((1, 0)),
            Button::Up => Some((0, -1)),
            Button::Down => Some((0, 1)),
            Button::Action1 | Button::Action2 => None,
        }
    }
}

/// Press or release of a [`Button`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ButtonEvent {
    Pressed(Button),
    Released(Button),
}
