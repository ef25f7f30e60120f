//! # Input Module
//!
//! Turns raw button events into the player commands the scene understands.

pub mod commands;

pub use commands::*;

use crate::Position;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Commands accepted by [`GameState::apply_input`](crate::GameState::apply_input).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerInput {
    /// Movement vector; replaces the previous one
    Move(Position),
    /// Begin a jump, or climb while on a ladder
    JumpPressed,
    /// End the jump early
    JumpReleased,
    /// Release the carried entity into the text
    Place,
}

/// Tracks held buttons and translates button events to player input.
///
/// Direction changes emit a fresh movement vector. Holding a button down
/// never repeats its command, so place fires once per press.
#[derive(Debug, Default, Clone)]
pub struct InputHandler {
    held: HashSet<Button>,
}

impl InputHandler {
    /// Creates an input handler with nothing held.
    ///
    /// # Examples
    ///
    /// ```
    /// use letterfall::{Button, ButtonEvent, InputHandler, PlayerInput};
    ///
    /// let mut handler = InputHandler::new();
    /// let inputs = handler.handle(ButtonEvent::Pressed(Button::Action2));
    /// assert_eq!(inputs, vec![PlayerInput::Place]);
    /// ```
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_held(&self, button: Button) -> bool {
        self.held.contains(&button)
    }

    /// Sum of the held direction buttons.
    pub fn movement(&self) -> Position {
        self.held
            .iter()
            .filter_map(|b| b.direction())
            .fold(Position::origin(), |acc, (dx, dy)| {
                acc + Position::new(dx, dy)
            })
    }

    /// Processes one button event and returns the resulting inputs.
    pub fn handle(&mut self, event: ButtonEvent) -> Vec<PlayerInput> {
        match event {
            ButtonEvent::Pressed(button) => {
                if !self.held.insert(button) {
                    return Vec::new();
                }
                match button {
                    Button::Action1 => vec![PlayerInput::JumpPressed],
                    Button::Action2 => vec![PlayerInput::Place],
                    _ => vec![PlayerInput::Move(self.movement())],
                }
            }
            ButtonEvent::Released(button) => {
                if !self.held.remove(&button) {
                    return Vec::new();
                }
                match button {
                    Button::Action1 => vec![PlayerInput::JumpReleased],
                    Button::Action2 => Vec::new(),
                    _ => vec![PlayerInput::Move(self.movement())],
                }
            }
        }
    }
}
