//! # Utilities Module
//!
//! Timing utilities shared by the spawning systems.

pub mod timer;

pub use timer::*;
