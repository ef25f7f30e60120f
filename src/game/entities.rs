//! # Entities
//!
//! Falling letters, wandering creatures, flying hazards and placement
//! particles, modelled as one record with an explicit kind discriminant.

use crate::{
    config, new_entity_id, CollisionPolicy, EntityId, PhysicsConfig, Position, Rect, Terrain,
    TileMap,
};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Ground creatures that edit a single character when placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CreatureKind {
    /// Opens a gap at the placement cell
    Inserter,
    /// Removes the character at the placement cell
    Deleter,
}

/// Flying hazards that edit a whole line on contact with the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HazardKind {
    LineInserter,
    LineDeleter,
}

/// What an entity is, together with its kind-specific payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    /// A falling character code
    Letter { code: i32 },
    Creature(CreatureKind),
    Hazard(HazardKind),
    /// Short-lived confirmation glyph shown where a letter was placed
    Particle { code: i32 },
}

impl EntityKind {
    /// Whether the player may pick this entity up.
    pub fn is_liftable(&self) -> bool {
        matches!(self, EntityKind::Letter { .. } | EntityKind::Creature(_))
    }

    /// Seconds after which the entity expires on its own.
    pub fn lifetime(&self) -> Option<f64> {
        match self {
            EntityKind::Creature(_) => Some(config::CREATURE_LIFETIME),
            EntityKind::Particle { .. } => Some(config::PARTICLE_LIFETIME),
            EntityKind::Letter { .. } | EntityKind::Hazard(_) => None,
        }
    }

    /// Glyph used to draw the entity.
    pub fn glyph(&self) -> char {
        match self {
            EntityKind::Letter { code } | EntityKind::Particle { code } => u32::try_from(*code)
                .ok()
                .and_then(char::from_u32)
                .unwrap_or('?'),
            EntityKind::Creature(CreatureKind::Inserter) => '>',
            EntityKind::Creature(CreatureKind::Deleter) => '<',
            EntityKind::Hazard(HazardKind::LineInserter) => '+',
            EntityKind::Hazard(HazardKind::LineDeleter) => '-',
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            EntityKind::Letter { .. } => "letter",
            EntityKind::Creature(CreatureKind::Inserter) => "inserter",
            EntityKind::Creature(CreatureKind::Deleter) => "deleter",
            EntityKind::Hazard(HazardKind::LineInserter) => "line inserter",
            EntityKind::Hazard(HazardKind::LineDeleter) => "line deleter",
            EntityKind::Particle { .. } => "particle",
        }
    }
}

/// Lifecycle of an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityState {
    /// Simulated normally
    Active,
    /// Held by the player; tracks the player instead of moving on its own
    Carried,
    /// Out of play; removed at the end of the frame
    Stopped,
}

/// A non-player entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub kind: EntityKind,
    /// Center point in world units
    pub position: Position,
    /// Collision bounds relative to `position`
    pub collider: Rect,
    /// Units per frame
    pub velocity: Position,
    /// Seconds since spawn
    pub age: f64,
    pub state: EntityState,
    /// Frame on which the entity entered the scene
    pub born_frame: u64,
}

impl Entity {
    /// Creates an active entity with the default 8x8 collider and the kind's
    /// default velocity.
    ///
    /// # Examples
    ///
    /// ```
    /// use letterfall::{Entity, EntityKind, Position};
    ///
    /// let letter = Entity::new(EntityKind::Letter { code: 'A' as i32 }, Position::new(50, 0));
    /// assert!(letter.is_active());
    /// assert_eq!(letter.velocity, Position::new(0, 1));
    /// ```
    pub fn new(kind: EntityKind, position: Position) -> Self {
        let velocity = match kind {
            EntityKind::Letter { .. } => Position::new(0, 1),
            EntityKind::Creature(_) => Position::new(1, 0),
            EntityKind::Hazard(_) => Position::new(2, 0),
            EntityKind::Particle { .. } => Position::origin(),
        };
        Self {
            id: new_entity_id(),
            kind,
            position,
            collider: Rect::new(-4, -4, 8, 8),
            velocity,
            age: 0.0,
            state: EntityState::Active,
            born_frame: 0,
        }
    }

    pub fn with_velocity(mut self, velocity: Position) -> Self {
        self.velocity = velocity;
        self
    }

    /// Collision bounds in world units.
    pub fn bounds(&self) -> Rect {
        self.collider.translate(self.position)
    }

    pub fn is_active(&self) -> bool {
        self.state == EntityState::Active
    }

    pub fn is_carried(&self) -> bool {
        self.state == EntityState::Carried
    }

    pub fn is_stopped(&self) -> bool {
        self.state == EntityState::Stopped
    }

    /// Takes the entity out of play for good.
    pub fn stop(&mut self) {
        self.state = EntityState::Stopped;
    }

    /// Checks whether the entity has outlived its lifetime or left `area`.
    ///
    /// Particles never expire by position; carried entities never expire.
    pub fn is_expired(&self, area: &Rect) -> bool {
        if self.is_carried() {
            return false;
        }
        if let Some(lifetime) = self.kind.lifetime() {
            if self.age >= lifetime {
                return true;
            }
        }
        !matches!(self.kind, EntityKind::Particle { .. }) && !self.bounds().overlaps(area)
    }

    /// Advances an active entity by one frame of `dt` seconds.
    ///
    /// Letters and hazards move straight through the text; creatures walk on it,
    /// turning back when blocked or at random.
    pub fn update<R: Rng + ?Sized>(
        &mut self,
        dt: f64,
        text: &TileMap,
        policy: &CollisionPolicy,
        physics: &PhysicsConfig,
        turn_chance: f64,
        rng: &mut R,
    ) {
        self.age += dt;
        if !self.is_active() {
            return;
        }

        match self.kind {
            EntityKind::Letter { .. } | EntityKind::Hazard(_) => {
                self.position = self.position + self.velocity;
            }
            EntityKind::Creature(_) => {
                let terrain = Terrain::new(text, policy);
                let bounds = self.bounds();
                self.velocity.y = if terrain.is_grounded(&bounds) {
                    0
                } else {
                    (self.velocity.y + physics.gravity).min(physics.max_speed.y)
                };
                let moved = terrain.move_if_possible(bounds, self.velocity);
                self.position = self.position + moved.delta;
                if moved.blocked_x || rng.gen_bool(turn_chance) {
                    self.velocity.x = -self.velocity.x;
                }
            }
            EntityKind::Particle { .. } => {}
        }
    }
}
