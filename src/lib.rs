//! # Letterfall
//!
//! A small platformer whose level is a live text buffer.
//!
//! ## Architecture Overview
//!
//! The core revolves around three tightly coupled mechanisms:
//!
//! - **Stochastic timers**: per-frame Poisson triggers that decide when letters,
//!   creatures and hazards spawn
//! - **Text map**: a tile grid of character codes supporting line and character
//!   insertion/deletion, with synchronous change notification
//! - **Carry state machine**: the player's single carry slot, which turns a carried
//!   letter or creature into a text edit on "place"
//!
//! Rendering, audio and input decoding are external collaborators. They read the
//! text map, drain [`GameEvent`]s and feed [`PlayerInput`]s respectively.

pub mod game;
pub mod generation;
pub mod input;
pub mod utils;

// Core module re-exports
pub use game::*;
pub use generation::*;
pub use input::*;
pub use utils::*;

/// Core error type for the Letterfall engine.
#[derive(thiserror::Error, Debug)]
pub enum LetterfallError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// A grid coordinate fell outside the grid
    #[error("Cell ({x}, {y}) is outside the {width}x{height} grid")]
    OutOfBounds {
        x: i32,
        y: i32,
        width: usize,
        height: usize,
    },

    /// Text does not fit on the row it was written to
    #[error("Text of length {len} at column {x} overflows a row of width {width}")]
    TextOverflow { x: i32, len: usize, width: usize },

    /// Grid dimensions are unusable
    #[error("Invalid grid: {0}")]
    InvalidGrid(String),

    /// Timer rate outside [0, 1]
    #[error("Invalid rate {0}: must be within [0, 1]")]
    InvalidRate(f64),

    /// Simulation clock moved backwards
    #[error("Clock went backwards: last poll at {last}, now {current}")]
    ClockWentBackwards { last: f64, current: f64 },

    /// Configuration is invalid
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Game state is invalid
    #[error("Invalid game state: {0}")]
    InvalidState(String),
}

/// Result type used throughout the Letterfall codebase.
pub type LetterfallResult<T> = Result<T, LetterfallError>;

/// Version information for the game.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Game configuration constants.
pub mod config {
    /// Default text map width in cells
    pub const DEFAULT_TEXT_WIDTH: usize = 32;

    /// Default text map height in cells
    pub const DEFAULT_TEXT_HEIGHT: usize = 24;

    /// Size of one text cell in world units
    pub const TEXT_TILESIZE: i32 = 10;

    /// Default ladder map width in cells
    pub const DEFAULT_LADDER_WIDTH: usize = 40;

    /// Default ladder map height in cells
    pub const DEFAULT_LADDER_HEIGHT: usize = 30;

    /// Size of one ladder cell in world units
    pub const LADDER_TILESIZE: i32 = 8;

    /// Height of the player's collider in world units; text cells must be at
    /// least this large
    pub const PLAYER_SIZE: i32 = 8;

    /// Cell value marking a ladder rung
    pub const LADDER_CELL: i32 = 1;

    /// Frames per second of the simulation clock
    pub const TARGET_FPS: u32 = 30;

    /// Seconds a placement confirmation glyph stays on screen
    pub const PARTICLE_LIFETIME: f64 = 1.0;

    /// Seconds a wandering creature lives before expiring
    pub const CREATURE_LIFETIME: f64 = 10.0;

    /// Lowest character code a falling letter may carry
    pub const MIN_LETTER_CODE: i32 = 33;

    /// One past the highest character code a falling letter may carry
    pub const MAX_LETTER_CODE: i32 = 127;
}
