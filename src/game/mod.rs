//! # Game Module
//!
//! Core game state, grid storage and entity systems.
//!
//! This module contains the fundamental building blocks of Letterfall:
//! - Tile grids and the editable text map built on them
//! - Collision policy predicates and the minimal platformer physics
//! - Entity records and the player's carry state machine
//! - Scene state that drives one simulation frame at a time

pub mod entities;
pub mod physics;
pub mod player;
pub mod state;
pub mod textmap;
pub mod tilemap;

pub use entities::*;
pub use physics::*;
pub use player::*;
pub use state::*;
pub use textmap::*;
pub use tilemap::*;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Represents a 2D coordinate, either a world point or a grid cell.
///
/// # Examples
///
/// ```
/// use letterfall::Position;
///
/// let pos = Position::new(10, 5);
/// assert_eq!(pos.x, 10);
/// assert_eq!(pos.y, 5);
/// assert_eq!(pos + Position::new(1, 1), Position::new(11, 6));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    /// Creates a new position with the given coordinates.
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Returns the origin position (0, 0).
    pub fn origin() -> Self {
        Self::new(0, 0)
    }

    /// Multiplies both components by `factor`.
    pub fn scale(self, factor: i32) -> Self {
        Self::new(self.x * factor, self.y * factor)
    }

    /// Returns the sign of each component.
    pub fn signum(self) -> Self {
        Self::new(self.x.signum(), self.y.signum())
    }

    /// Returns true if both components are zero.
    pub fn is_zero(self) -> bool {
        self.x == 0 && self.y == 0
    }
}

impl std::ops::Add for Position {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y)
    }
}

impl std::ops::Sub for Position {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y)
    }
}

/// Axis-aligned rectangle in world units.
///
/// The right and bottom edges are exclusive, so two rectangles that merely
/// touch do not overlap.
///
/// # Examples
///
/// ```
/// use letterfall::Rect;
///
/// let a = Rect::new(0, 0, 10, 10);
/// assert!(a.overlaps(&Rect::new(5, 5, 10, 10)));
/// assert!(!a.overlaps(&Rect::new(10, 0, 10, 10)));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Exclusive right edge.
    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    /// Exclusive bottom edge.
    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }

    /// Center point, rounded toward the top-left.
    pub fn center(&self) -> Position {
        Position::new(self.x + self.width / 2, self.y + self.height / 2)
    }

    /// Returns this rectangle translated by `delta`.
    pub fn translate(&self, delta: Position) -> Self {
        Self::new(self.x + delta.x, self.y + delta.y, self.width, self.height)
    }

    /// Grows (or with negative values, shrinks) the rectangle on each side.
    pub fn inflate(&self, dx: i32, dy: i32) -> Self {
        Self::new(
            self.x - dx,
            self.y - dy,
            self.width + dx * 2,
            self.height + dy * 2,
        )
    }

    /// Checks whether two rectangles share any area.
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    /// Checks whether `other` lies entirely inside this rectangle.
    pub fn contains_rect(&self, other: &Rect) -> bool {
        self.x <= other.x
            && self.y <= other.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }
}

/// Unique identifier for game entities.
pub type EntityId = Uuid;

/// Creates a new unique entity ID.
pub fn new_entity_id() -> EntityId {
    Uuid::new_v4()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_arithmetic() {
        let pos1 = Position::new(5, 10);
        let pos2 = Position::new(3, 2);
        assert_eq!(pos1 + pos2, Position::new(8, 12));
        assert_eq!(pos1 - pos2, Position::new(2, 8));
        assert_eq!(pos2.scale(2), Position::new(6, 4));
        assert_eq!(Position::new(-7, 0).signum(), Position::new(-1, 0));
    }

    #[test]
    fn test_rect_overlap_excludes_touching_edges() {
        let a = Rect::new(0, 0, 10, 10);
        assert!(a.overlaps(&Rect::new(9, 9, 2, 2)));
        assert!(!a.overlaps(&Rect::new(10, 0, 5, 5)));
        assert!(!a.overlaps(&Rect::new(0, 10, 5, 5)));
        assert!(!a.overlaps(&Rect::new(-5, 0, 5, 5)));
    }

    #[test]
    fn test_rect_inflate_and_center() {
        let skin = Rect::new(-4, -4, 8, 8);
        assert_eq!(skin.inflate(-1, 0), Rect::new(-3, -4, 6, 8));
        assert_eq!(Rect::new(10, 20, 10, 10).center(), Position::new(15, 25));
        assert!(Rect::new(0, 0, 10, 10).contains_rect(&Rect::new(2, 2, 8, 8)));
        assert!(!Rect::new(0, 0, 10, 10).contains_rect(&Rect::new(2, 2, 9, 8)));
    }

    #[test]
    fn test_entity_id_uniqueness() {
        let id1 = new_entity_id();
        let id2 = new_entity_id();
        assert_ne!(id1, id2);
    }
}
