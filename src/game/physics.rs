//! # Physics
//!
//! Collision policy predicates and the minimal platformer motion that consumes
//! them.
//!
//! The policy is three pure predicates over a single cell value. They are the
//! only information the motion code gets about what a cell *is*; it never looks
//! at entity identity.

use crate::{Position, Rect, TileMap};
use serde::{Deserialize, Serialize};

/// Cell classification used by movement and ladder checks.
#[derive(Debug, Clone, Copy)]
pub struct CollisionPolicy {
    /// Blocks horizontal and vertical movement
    pub is_obstacle: fn(i32) -> bool,
    /// Ladder cells: climbing allowed, gravity suspended
    pub is_grabbable: fn(i32) -> bool,
    /// Landing surface for falling entities
    pub is_stoppable: fn(i32) -> bool,
}

impl CollisionPolicy {
    /// Glyphs are solid; spaces and empty cells are background.
    pub fn text_platformer() -> Self {
        Self {
            is_obstacle: |c| c > 32,
            is_grabbable: |c| c == 1,
            is_stoppable: |c| c != 0 && c != 32,
        }
    }

    /// Every non-empty cell is solid.
    pub fn solid_blocks() -> Self {
        Self {
            is_obstacle: |c| c > 0,
            is_grabbable: |c| c == 1,
            is_stoppable: |c| c > 0,
        }
    }

    pub fn from_preset(preset: PolicyPreset) -> Self {
        match preset {
            PolicyPreset::TextPlatformer => Self::text_platformer(),
            PolicyPreset::SolidBlocks => Self::solid_blocks(),
        }
    }
}

impl Default for CollisionPolicy {
    fn default() -> Self {
        Self::text_platformer()
    }
}

/// Serializable selector for a [`CollisionPolicy`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PolicyPreset {
    #[default]
    TextPlatformer,
    SolidBlocks,
}

/// Tunables for gravity and jumping, in world units per frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhysicsConfig {
    /// Added to vertical velocity every airborne frame
    pub gravity: i32,
    /// Upward speed held while a jump is rising
    pub jump_speed: i32,
    /// Last frame index (from take-off) that still rises
    pub jump_frames: u32,
    /// Per-axis speed cap
    pub max_speed: Position,
    /// Multiplier applied to the player's input vector
    pub walk_speed: i32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: 1,
            jump_speed: 3,
            jump_frames: 5,
            max_speed: Position::new(4, 4),
            walk_speed: 2,
        }
    }
}

impl PhysicsConfig {
    /// Vertical velocity for the next frame given the current one and the
    /// frames elapsed since take-off.
    pub fn jump_velocity(&self, vy: i32, t: u32) -> i32 {
        if t <= self.jump_frames {
            -self.jump_speed
        } else {
            (vy + self.gravity).min(self.max_speed.y)
        }
    }
}

/// Outcome of [`Terrain::move_if_possible`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MoveResult {
    /// Distance actually travelled
    pub delta: Position,
    pub blocked_x: bool,
    pub blocked_y: bool,
}

/// A tile map viewed through a collision policy, optionally fenced in.
#[derive(Debug, Clone, Copy)]
pub struct Terrain<'a> {
    map: &'a TileMap,
    policy: &'a CollisionPolicy,
    fence: Option<Rect>,
}

impl<'a> Terrain<'a> {
    pub fn new(map: &'a TileMap, policy: &'a CollisionPolicy) -> Self {
        Self {
            map,
            policy,
            fence: None,
        }
    }

    /// Confines movement to `fence`.
    pub fn with_fence(mut self, fence: Rect) -> Self {
        self.fence = Some(fence);
        self
    }

    /// Checks whether a one-unit `step` from `rect` is blocked.
    ///
    /// Only cells the step newly enters can block it, so an entity already
    /// overlapping solid content (after an edit, say) can still move out.
    pub fn is_blocked(&self, rect: &Rect, step: Position) -> bool {
        let next = rect.translate(step);
        if let Some(fence) = self.fence {
            if !fence.contains_rect(&next) {
                return true;
            }
        }

        let ts = self.map.tilesize();
        let strip = match (step.x.signum(), step.y.signum()) {
            (1, 0) if rect.right().div_euclid(ts) != (rect.right() - 1).div_euclid(ts) => {
                Rect::new(rect.right(), rect.y, 1, rect.height)
            }
            (-1, 0) if (rect.x - 1).div_euclid(ts) != rect.x.div_euclid(ts) => {
                Rect::new(rect.x - 1, rect.y, 1, rect.height)
            }
            (0, 1) if rect.bottom().div_euclid(ts) != (rect.bottom() - 1).div_euclid(ts) => {
                Rect::new(rect.x, rect.bottom(), rect.width, 1)
            }
            (0, -1) if (rect.y - 1).div_euclid(ts) != rect.y.div_euclid(ts) => {
                Rect::new(rect.x, rect.y - 1, rect.width, 1)
            }
            _ => return false,
        };

        let obstacle = self.policy.is_obstacle;
        if step.y > 0 {
            let stoppable = self.policy.is_stoppable;
            self.map
                .find_tile(|c| obstacle(c) || stoppable(c), &strip)
                .is_some()
        } else {
            self.map.find_tile(obstacle, &strip).is_some()
        }
    }

    /// Checks whether `rect` is resting on something.
    pub fn is_grounded(&self, rect: &Rect) -> bool {
        self.is_blocked(rect, Position::new(0, 1))
    }

    /// Checks whether any obstacle cell overlaps `rect`.
    pub fn overlaps_obstacle(&self, rect: &Rect) -> bool {
        self.map.find_tile(self.policy.is_obstacle, rect).is_some()
    }

    /// Moves `rect` by `v`, one unit at a time, horizontal axis first, stopping
    /// each axis at the first blocked step.
    pub fn move_if_possible(&self, rect: Rect, v: Position) -> MoveResult {
        let mut result = MoveResult::default();
        let mut current = rect;

        let step_x = Position::new(v.x.signum(), 0);
        for _ in 0..v.x.abs() {
            if self.is_blocked(&current, step_x) {
                result.blocked_x = true;
                break;
            }
            current = current.translate(step_x);
        }

        let step_y = Position::new(0, v.y.signum());
        for _ in 0..v.y.abs() {
            if self.is_blocked(&current, step_y) {
                result.blocked_y = true;
                break;
            }
            current = current.translate(step_y);
        }

        result.delta = Position::new(current.x - rect.x, current.y - rect.y);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn floor_map() -> TileMap {
        // 8x6 cells of 10 units, a row of glyphs on row 4.
        let mut map = TileMap::new(10, 8, 6).unwrap();
        for x in 0..8 {
            map.set(x, 4, 'x' as i32).unwrap();
        }
        map
    }

    #[test]
    fn test_text_platformer_predicates() {
        let policy = CollisionPolicy::text_platformer();
        assert!((policy.is_obstacle)('A' as i32));
        assert!(!(policy.is_obstacle)(32));
        assert!(!(policy.is_obstacle)(0));
        assert!((policy.is_grabbable)(1));
        assert!(!(policy.is_grabbable)(2));
        assert!((policy.is_stoppable)(1));
        assert!(!(policy.is_stoppable)(32));
        assert!(!(policy.is_stoppable)(0));
    }

    #[test]
    fn test_solid_blocks_predicates() {
        let policy = CollisionPolicy::from_preset(PolicyPreset::SolidBlocks);
        assert!((policy.is_obstacle)(1));
        assert!((policy.is_obstacle)(32));
        assert!(!(policy.is_obstacle)(0));
    }

    #[test]
    fn test_jump_velocity_curve() {
        let physics = PhysicsConfig::default();
        for t in 0..=5 {
            assert_eq!(physics.jump_velocity(0, t), -3);
        }
        assert_eq!(physics.jump_velocity(-3, 6), -2);
        assert_eq!(physics.jump_velocity(4, 9), 4);
    }

    #[test]
    fn test_falling_stops_on_glyph_row() {
        let map = floor_map();
        let policy = CollisionPolicy::text_platformer();
        let terrain = Terrain::new(&map, &policy);

        // Collider bottom at 36, glyph row starts at 40.
        let rect = Rect::new(12, 28, 6, 8);
        let result = terrain.move_if_possible(rect, Position::new(0, 10));
        assert_eq!(result.delta, Position::new(0, 4));
        assert!(result.blocked_y);
        assert!(terrain.is_grounded(&rect.translate(result.delta)));
    }

    #[test]
    fn test_entity_inside_solid_can_leave() {
        let map = floor_map();
        let policy = CollisionPolicy::text_platformer();
        let terrain = Terrain::new(&map, &policy);

        let buried = Rect::new(12, 41, 6, 8);
        assert!(terrain.overlaps_obstacle(&buried));
        let result = terrain.move_if_possible(buried, Position::new(0, -4));
        assert_eq!(result.delta, Position::new(0, -4));
    }

    #[test]
    fn test_fence_clamps_movement() {
        let map = TileMap::new(10, 8, 6).unwrap();
        let policy = CollisionPolicy::text_platformer();
        let terrain = Terrain::new(&map, &policy).with_fence(map.bounds());

        let rect = Rect::new(2, 10, 6, 8);
        let result = terrain.move_if_possible(rect, Position::new(-4, 0));
        assert_eq!(result.delta, Position::new(-2, 0));
        assert!(result.blocked_x);
    }

    #[test]
    fn test_horizontal_wall_blocks() {
        let mut map = TileMap::new(10, 8, 6).unwrap();
        map.set(3, 1, '|' as i32).unwrap();
        let policy = CollisionPolicy::text_platformer();
        let terrain = Terrain::new(&map, &policy);

        let rect = Rect::new(21, 11, 6, 8);
        let result = terrain.move_if_possible(rect, Position::new(4, 0));
        assert_eq!(result.delta, Position::new(3, 0));
        assert!(result.blocked_x);
    }
}
