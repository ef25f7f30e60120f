//! # Player
//!
//! The player actor: platformer motion plus the single-slot carry state
//! machine that turns carried letters and creatures into text edits.

use crate::{
    config, CollisionPolicy, CreatureKind, Entity, EntityId, EntityKind, EntityState, LetterfallError,
    LetterfallResult, PhysicsConfig, Position, Rect, Terrain, TextMap, TileMap,
};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Offset from the player's position at which a carried entity is held.
pub const CARRY_OFFSET: Position = Position { x: 0, y: -8 };

/// Contents of the player's carry slot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CarryState {
    #[default]
    Empty,
    Carrying(EntityId),
}

/// Result of touching a liftable entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickUp {
    /// Nothing changed: not liftable, not active, or already held
    Ignored,
    /// The entity is now carried; `released` was dropped to make room
    Lifted { released: Option<EntityId> },
}

/// What a completed place command did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    pub entity: EntityId,
    pub kind: EntityKind,
    /// Text cell targeted by the placement
    pub cell: Position,
    /// Whether the text map was edited
    pub edited: bool,
    /// Whether a line was inserted first to make room at the bottom
    pub line_inserted: bool,
}

/// Vertical motion state for gravity and jumps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
struct Motion {
    vy: i32,
    /// Frames since take-off while a jump is in progress
    jump_time: Option<u32>,
}

/// The player-controlled actor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    /// Center point in world units
    pub position: Position,
    /// Collision bounds relative to `position`
    pub collider: Rect,
    /// Last direction requested by input
    pub user_move: Position,
    motion: Motion,
    carry: CarryState,
}

impl Player {
    /// Creates a player centered on `position` with an empty carry slot.
    pub fn new(position: Position) -> Self {
        Self {
            position,
            collider: Rect::new(
                -config::PLAYER_SIZE / 2,
                -config::PLAYER_SIZE / 2,
                config::PLAYER_SIZE,
                config::PLAYER_SIZE,
            )
            .inflate(-1, 0),
            user_move: Position::origin(),
            motion: Motion::default(),
            carry: CarryState::Empty,
        }
    }

    /// Collision bounds in world units.
    pub fn bounds(&self) -> Rect {
        self.collider.translate(self.position)
    }

    pub fn carry_state(&self) -> CarryState {
        self.carry
    }

    pub fn carried(&self) -> Option<EntityId> {
        match self.carry {
            CarryState::Empty => None,
            CarryState::Carrying(id) => Some(id),
        }
    }

    pub fn is_jumping(&self) -> bool {
        self.motion.jump_time.is_some()
    }

    /// Records the requested movement direction.
    pub fn set_move(&mut self, direction: Position) {
        self.user_move = direction.signum();
    }

    /// Starts a jump if the player is standing on something or holding a
    /// ladder. Returns true if a jump began.
    pub fn start_jump(&mut self, supported: bool) -> bool {
        if !supported || self.is_jumping() {
            return false;
        }
        self.motion.jump_time = Some(0);
        true
    }

    /// Ends any rising jump; gravity takes over next frame.
    pub fn end_jump(&mut self) {
        self.motion.jump_time = None;
    }

    /// Checks whether the player overlaps a ladder cell.
    pub fn has_ladder(&self, ladders: &TileMap, policy: &CollisionPolicy) -> bool {
        ladders
            .find_tile(policy.is_grabbable, &self.bounds())
            .is_some()
    }

    /// Checks whether the player may start a jump.
    pub fn is_supported(&self, text: &TileMap, ladders: &TileMap, policy: &CollisionPolicy) -> bool {
        let terrain = Terrain::new(text, policy).with_fence(text.bounds());
        self.has_ladder(ladders, policy) || terrain.is_grounded(&self.bounds())
    }

    /// Advances the player by one frame.
    ///
    /// Gravity and jumping move the player first; the input vector, scaled by
    /// the walk speed, is applied second. Without a ladder the input cannot
    /// push upward; on a ladder gravity is suspended.
    pub fn update(
        &mut self,
        text: &TileMap,
        ladders: &TileMap,
        policy: &CollisionPolicy,
        physics: &PhysicsConfig,
    ) {
        let terrain = Terrain::new(text, policy).with_fence(text.bounds());
        let on_ladder = self.has_ladder(ladders, policy);

        if on_ladder && !self.is_jumping() {
            self.motion.vy = 0;
        } else {
            let grounded = terrain.is_grounded(&self.bounds());
            let vy = match self.motion.jump_time {
                Some(t) => {
                    self.motion.jump_time = Some(t + 1);
                    physics.jump_velocity(self.motion.vy, t)
                }
                None if grounded => 0,
                None => (self.motion.vy + physics.gravity).min(physics.max_speed.y),
            };
            let moved = terrain.move_if_possible(self.bounds(), Position::new(0, vy));
            self.position = self.position + moved.delta;
            self.motion.vy = if moved.blocked_y { 0 } else { vy };
            if moved.blocked_y && vy < 0 {
                self.end_jump();
            }
            if let Some(t) = self.motion.jump_time {
                if t > physics.jump_frames && terrain.is_grounded(&self.bounds()) {
                    self.end_jump();
                }
            }
        }

        let mut v = self.user_move.scale(physics.walk_speed);
        if !on_ladder {
            v.y = v.y.max(0);
        }
        let moved = terrain.move_if_possible(self.bounds(), v);
        self.position = self.position + moved.delta;
    }

    /// Attaches a touched entity to the carry slot.
    ///
    /// Only active letters and creatures can be lifted. If something is already
    /// carried it is stopped before the new entity takes its place, so the slot
    /// never holds more than one live reference.
    pub fn pick_up(&mut self, id: EntityId, entities: &mut HashMap<EntityId, Entity>) -> PickUp {
        if self.carried() == Some(id) {
            return PickUp::Ignored;
        }
        match entities.get(&id) {
            Some(entity) if entity.kind.is_liftable() && entity.is_active() => {}
            _ => return PickUp::Ignored,
        }

        let released = self.carried();
        if let Some(old) = released {
            if let Some(previous) = entities.get_mut(&old) {
                previous.stop();
            }
            debug!("Dropped {} to pick up {}", old, id);
        }

        if let Some(entity) = entities.get_mut(&id) {
            entity.state = EntityState::Carried;
            entity.position = self.position + CARRY_OFFSET;
        }
        self.carry = CarryState::Carrying(id);
        PickUp::Lifted { released }
    }

    /// Text cell a placement targets: the player's column, on the first row at
    /// or below the player's row whose cell does not overlap the player.
    ///
    /// The row may lie past the bottom of the map.
    pub fn placement_cell(&self, text: &TileMap) -> Position {
        let bounds = self.bounds();
        let mut cell = text.coord_to_map(self.position);
        while text.map_to_coord(cell).overlaps(&bounds) {
            cell.y += 1;
        }
        cell
    }

    /// Releases the carried entity into the text.
    ///
    /// Letters are written at the placement cell; if that cell is on or past the
    /// last row, a line is inserted at the bottom first and the player moves up
    /// one row with the text. Inserters and deleters open or close a gap at the
    /// placement cell. With an empty slot nothing happens.
    pub fn place(
        &mut self,
        text: &mut TextMap,
        entities: &mut HashMap<EntityId, Entity>,
    ) -> LetterfallResult<Option<Placement>> {
        let id = match self.carry {
            CarryState::Empty => return Ok(None),
            CarryState::Carrying(id) => id,
        };
        let kind = match entities.get(&id) {
            Some(entity) => entity.kind,
            None => {
                self.carry = CarryState::Empty;
                return Err(LetterfallError::InvalidState(format!(
                    "carried entity {} is no longer in the scene",
                    id
                )));
            }
        };

        let mut cell = self.placement_cell(text);
        let bottom = text.height() as i32 - 1;
        let mut line_inserted = false;

        let edited = match kind {
            EntityKind::Letter { code } => {
                if cell.y >= bottom {
                    text.insert_line(bottom)?;
                    // Rides up with the text, but never past the top edge.
                    let lift = text.tilesize().min(self.bounds().y.max(0));
                    if lift < text.tilesize() {
                        warn!("Player pinned at the top while placing on the last row");
                    }
                    self.position.y -= lift;
                    cell.y = bottom;
                    line_inserted = true;
                }
                text.place(cell.x, cell.y, code)?;
                true
            }
            EntityKind::Creature(creature) => {
                if text.in_bounds(cell.x, cell.y) {
                    match creature {
                        CreatureKind::Inserter => text.insert_char(cell.x, cell.y)?,
                        CreatureKind::Deleter => text.delete_char(cell.x, cell.y)?,
                    }
                    true
                } else {
                    warn!(
                        "Dropped {} outside the text at {:?}",
                        kind.name(),
                        cell
                    );
                    false
                }
            }
            EntityKind::Hazard(_) | EntityKind::Particle { .. } => {
                return Err(LetterfallError::InvalidState(format!(
                    "a {} cannot be carried",
                    kind.name()
                )));
            }
        };

        if let Some(entity) = entities.get_mut(&id) {
            entity.stop();
        }
        self.carry = CarryState::Empty;
        debug!("Placed {} at {:?}", kind.name(), cell);

        Ok(Some(Placement {
            entity: id,
            kind,
            cell,
            edited,
            line_inserted,
        }))
    }

    /// Moves the player up one row at a time until it no longer overlaps
    /// obstacle cells, stopping at the top of the map. Returns the rows moved.
    pub fn nudge_out_of_obstacles(&mut self, text: &TileMap, policy: &CollisionPolicy) -> i32 {
        let terrain = Terrain::new(text, policy);
        let mut rows = 0;
        while terrain.overlaps_obstacle(&self.bounds()) {
            if self.bounds().y - text.tilesize() < 0 {
                warn!("Player is buried at the top of the text");
                break;
            }
            self.position.y -= text.tilesize();
            rows += 1;
        }
        rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scene() -> (TextMap, HashMap<EntityId, Entity>) {
        (TextMap::new(10, 16, 12).unwrap(), HashMap::new())
    }

    fn add(entities: &mut HashMap<EntityId, Entity>, kind: EntityKind) -> EntityId {
        let entity = Entity::new(kind, Position::new(50, 50));
        let id = entity.id;
        entities.insert(id, entity);
        id
    }

    #[test]
    fn test_pick_up_letter() {
        let (_, mut entities) = scene();
        let mut player = Player::new(Position::new(55, 55));
        let letter = add(&mut entities, EntityKind::Letter { code: 65 });

        assert_eq!(
            player.pick_up(letter, &mut entities),
            PickUp::Lifted { released: None }
        );
        assert_eq!(player.carry_state(), CarryState::Carrying(letter));
        assert!(entities[&letter].is_carried());
        assert_eq!(entities[&letter].position, Position::new(55, 47));
    }

    #[test]
    fn test_pick_up_replaces_and_stops_previous() {
        let (_, mut entities) = scene();
        let mut player = Player::new(Position::new(55, 55));
        let first = add(&mut entities, EntityKind::Letter { code: 65 });
        let second = add(&mut entities, EntityKind::Creature(CreatureKind::Inserter));

        player.pick_up(first, &mut entities);
        assert_eq!(
            player.pick_up(second, &mut entities),
            PickUp::Lifted {
                released: Some(first)
            }
        );
        assert_eq!(player.carried(), Some(second));
        assert!(entities[&first].is_stopped());
        assert!(entities[&second].is_carried());
    }

    #[test]
    fn test_pick_up_ignores_unliftable_and_held() {
        let (_, mut entities) = scene();
        let mut player = Player::new(Position::new(55, 55));
        let hazard = add(&mut entities, EntityKind::Hazard(crate::HazardKind::LineDeleter));
        let letter = add(&mut entities, EntityKind::Letter { code: 66 });

        assert_eq!(player.pick_up(hazard, &mut entities), PickUp::Ignored);
        assert_eq!(player.carry_state(), CarryState::Empty);

        player.pick_up(letter, &mut entities);
        assert_eq!(player.pick_up(letter, &mut entities), PickUp::Ignored);
        assert!(entities[&letter].is_carried());

        // Someone else's entity, already carried, is off limits.
        let mut other = Player::new(Position::new(5, 5));
        assert_eq!(other.pick_up(letter, &mut entities), PickUp::Ignored);
        assert_eq!(other.carry_state(), CarryState::Empty);
    }

    #[test]
    fn test_place_with_empty_slot_is_noop() {
        let (mut text, mut entities) = scene();
        let count = std::rc::Rc::new(std::cell::Cell::new(0));
        let handle = std::rc::Rc::clone(&count);
        text.subscribe(move |_| handle.set(handle.get() + 1));

        let mut player = Player::new(Position::new(55, 55));
        assert_eq!(player.place(&mut text, &mut entities).unwrap(), None);
        assert_eq!(count.get(), 0);
        assert!(text.get_text().iter().all(|line| line.is_empty()));
    }

    #[test]
    fn test_placement_cell_is_below_player() {
        let (text, _) = scene();
        // Collider 52..60 sits inside row 5.
        let player = Player::new(Position::new(55, 56));
        assert_eq!(player.placement_cell(&text), Position::new(5, 6));

        // Collider 57..65 straddles rows 5 and 6.
        let straddling = Player::new(Position::new(55, 61));
        assert_eq!(straddling.placement_cell(&text), Position::new(5, 7));
    }

    #[test]
    fn test_place_letter_writes_below_player() {
        let (mut text, mut entities) = scene();
        let mut player = Player::new(Position::new(35, 55));
        let letter = add(&mut entities, EntityKind::Letter { code: 'Q' as i32 });
        player.pick_up(letter, &mut entities);

        let placement = player.place(&mut text, &mut entities).unwrap().unwrap();
        assert_eq!(placement.cell, Position::new(3, 6));
        assert!(placement.edited);
        assert!(!placement.line_inserted);
        assert_eq!(text.get(3, 6).unwrap(), 'Q' as i32);
        assert_eq!(player.carry_state(), CarryState::Empty);
        assert!(entities[&letter].is_stopped());
    }

    #[test]
    fn test_last_row_placement_keeps_player_inside_single_row_map() {
        let mut text = TextMap::new(10, 16, 1).unwrap();
        let mut entities = HashMap::new();
        let mut player = Player::new(Position::new(5, 5));
        let letter = add(&mut entities, EntityKind::Letter { code: 'A' as i32 });
        player.pick_up(letter, &mut entities);

        let placement = player.place(&mut text, &mut entities).unwrap().unwrap();
        assert!(placement.line_inserted);
        assert_eq!(placement.cell, Position::new(0, 0));
        assert_eq!(text.get(0, 0).unwrap(), 'A' as i32);
        // Lifted only as far as the top edge.
        assert_eq!(player.position, Position::new(5, 4));
        assert!(text.bounds().contains_rect(&player.bounds()));
    }

    #[test]
    fn test_place_creatures_edit_characters() {
        let (mut text, mut entities) = scene();
        text.put_text(0, 6, "abcdef").unwrap();
        let mut player = Player::new(Position::new(25, 55));

        let inserter = add(&mut entities, EntityKind::Creature(CreatureKind::Inserter));
        player.pick_up(inserter, &mut entities);
        player.place(&mut text, &mut entities).unwrap();
        assert_eq!(text.get_line(6).unwrap(), "abcdef");
        assert_eq!(text.get(2, 6).unwrap(), 0);
        assert_eq!(text.get(3, 6).unwrap(), 'c' as i32);

        let deleter = add(&mut entities, EntityKind::Creature(CreatureKind::Deleter));
        player.pick_up(deleter, &mut entities);
        player.place(&mut text, &mut entities).unwrap();
        let deleter2 = add(&mut entities, EntityKind::Creature(CreatureKind::Deleter));
        player.pick_up(deleter2, &mut entities);
        player.place(&mut text, &mut entities).unwrap();
        assert_eq!(text.get_line(6).unwrap(), "abdef");
        assert!(entities[&inserter].is_stopped());
        assert!(entities[&deleter].is_stopped());
    }

    #[test]
    fn test_place_creature_below_map_releases_without_edit() {
        let (mut text, mut entities) = scene();
        let mut player = Player::new(Position::new(25, 115));
        let deleter = add(&mut entities, EntityKind::Creature(CreatureKind::Deleter));
        player.pick_up(deleter, &mut entities);

        let placement = player.place(&mut text, &mut entities).unwrap().unwrap();
        assert!(!placement.edited);
        assert_eq!(placement.cell, Position::new(2, 12));
        assert_eq!(player.carry_state(), CarryState::Empty);
        assert!(entities[&deleter].is_stopped());
    }

    #[test]
    fn test_nudge_out_of_obstacles() {
        let (mut text, _) = scene();
        text.put_text(0, 5, "#####").unwrap();
        text.put_text(0, 4, "#####").unwrap();
        let policy = CollisionPolicy::default();

        let mut player = Player::new(Position::new(25, 55));
        assert_eq!(player.nudge_out_of_obstacles(&text, &policy), 2);
        assert_eq!(player.position, Position::new(25, 35));

        let mut clear = Player::new(Position::new(95, 55));
        assert_eq!(clear.nudge_out_of_obstacles(&text, &policy), 0);
    }

    #[test]
    fn test_jump_requires_support() {
        let mut player = Player::new(Position::new(55, 55));
        assert!(!player.start_jump(false));
        assert!(player.start_jump(true));
        assert!(!player.start_jump(true));
        player.end_jump();
        assert!(!player.is_jumping());
    }

    #[test]
    fn test_player_falls_until_landing_on_text() {
        let mut text = TileMap::new(10, 16, 12).unwrap();
        for x in 0..16 {
            text.set(x, 8, '_' as i32).unwrap();
        }
        let ladders = TileMap::new(8, 20, 15).unwrap();
        let policy = CollisionPolicy::default();
        let physics = PhysicsConfig::default();

        let mut player = Player::new(Position::new(55, 15));
        for _ in 0..60 {
            player.update(&text, &ladders, &policy, &physics);
        }
        // Feet rest on the top edge of row 8.
        assert_eq!(player.bounds().bottom(), 80);
        assert!(player.is_supported(&text, &ladders, &policy));
    }

    #[test]
    fn test_ladder_allows_climbing() {
        let text = TileMap::new(10, 16, 12).unwrap();
        let mut ladders = TileMap::new(8, 20, 15).unwrap();
        for y in 0..15 {
            ladders.set(6, y, 1).unwrap();
        }
        let policy = CollisionPolicy::default();
        let physics = PhysicsConfig::default();

        let mut player = Player::new(Position::new(52, 60));
        player.set_move(Position::new(0, -5));
        player.update(&text, &ladders, &policy, &physics);
        assert_eq!(player.position, Position::new(52, 58));
    }
}
