//! # Game State Module
//!
//! Scene configuration and the per-frame simulation loop.
//!
//! [`GameState`] owns the text map, the ladder map, the player, every live
//! entity and the spawn director. One call to [`GameState::tick`] runs a full
//! frame in a fixed order: spawns, movement, player collisions, expiry.
//! Entities spawned during a frame cannot collide with the player until the
//! following frame.

use crate::generation::utils::create_rng;
use crate::{
    config, default_program, CollisionPolicy, Entity, EntityId, EntityKind, Generator, HazardKind,
    LadderLayoutGenerator, LadderPattern, LetterfallError, LetterfallResult, PhysicsConfig,
    PickUp, Placement, Player, PlayerInput, PolicyPreset, Position, Rect, SpawnConfig,
    SpawnDirector, TextLayoutGenerator, TextLine, TextMap, TileMap, CARRY_OFFSET,
};
use log::{debug, info, warn};
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Everything needed to build a scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneConfig {
    /// Random seed for spawning and creature behaviour
    pub seed: u64,
    /// Simulation frames per second
    pub fps: u32,
    pub text_width: usize,
    pub text_height: usize,
    pub text_tilesize: i32,
    pub ladder_width: usize,
    pub ladder_height: usize,
    pub ladder_tilesize: i32,
    /// `None` builds a scene without ladders
    pub ladder_pattern: Option<LadderPattern>,
    /// Text written into the map at scene start
    pub initial_text: Vec<TextLine>,
    pub policy: PolicyPreset,
    pub physics: PhysicsConfig,
    pub spawn: SpawnConfig,
}

impl SceneConfig {
    /// Creates the default scene: a short program on a 32x24 text map with
    /// staggered ladders.
    ///
    /// # Examples
    ///
    /// ```
    /// use letterfall::SceneConfig;
    ///
    /// let config = SceneConfig::new(42);
    /// assert_eq!(config.seed, 42);
    /// assert!(config.validate().is_ok());
    /// ```
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            fps: config::TARGET_FPS,
            text_width: config::DEFAULT_TEXT_WIDTH,
            text_height: config::DEFAULT_TEXT_HEIGHT,
            text_tilesize: config::TEXT_TILESIZE,
            ladder_width: config::DEFAULT_LADDER_WIDTH,
            ladder_height: config::DEFAULT_LADDER_HEIGHT,
            ladder_tilesize: config::LADDER_TILESIZE,
            ladder_pattern: Some(LadderPattern::default()),
            initial_text: default_program(),
            policy: PolicyPreset::TextPlatformer,
            physics: PhysicsConfig::default(),
            spawn: SpawnConfig::new(),
        }
    }

    /// A quiet 16x12 scene with no text, no ladders and no spawning.
    pub fn for_testing(seed: u64) -> Self {
        Self {
            text_width: 16,
            text_height: 12,
            ladder_width: 20,
            ladder_height: 15,
            ladder_pattern: None,
            initial_text: Vec::new(),
            spawn: SpawnConfig::for_testing(),
            ..Self::new(seed)
        }
    }

    /// Parses a configuration from JSON and validates it.
    pub fn from_json_str(json: &str) -> LetterfallResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads a JSON configuration file.
    pub fn load_from_file(path: impl AsRef<Path>) -> LetterfallResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Serializes the configuration to pretty-printed JSON.
    pub fn to_json(&self) -> LetterfallResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Seconds per frame.
    pub fn frame_time(&self) -> f64 {
        1.0 / self.fps as f64
    }

    pub fn validate(&self) -> LetterfallResult<()> {
        if self.fps == 0 {
            return Err(LetterfallError::InvalidConfig(
                "fps must be positive".to_string(),
            ));
        }
        if self.text_width == 0 || self.text_height == 0 || self.text_tilesize <= 0 {
            return Err(LetterfallError::InvalidConfig(format!(
                "text map {}x{} with tile size {} is empty",
                self.text_width, self.text_height, self.text_tilesize
            )));
        }
        if self.ladder_width == 0 || self.ladder_height == 0 || self.ladder_tilesize <= 0 {
            return Err(LetterfallError::InvalidConfig(format!(
                "ladder map {}x{} with tile size {} is empty",
                self.ladder_width, self.ladder_height, self.ladder_tilesize
            )));
        }
        if self.text_tilesize < config::PLAYER_SIZE {
            return Err(LetterfallError::InvalidConfig(format!(
                "text tile size {} is smaller than the player ({})",
                self.text_tilesize,
                config::PLAYER_SIZE
            )));
        }
        if self.text_height < 2 {
            return Err(LetterfallError::InvalidConfig(
                "text map needs at least two rows".to_string(),
            ));
        }
        for (name, cells, tilesize) in [
            ("text width", self.text_width, self.text_tilesize),
            ("text height", self.text_height, self.text_tilesize),
            ("ladder width", self.ladder_width, self.ladder_tilesize),
            ("ladder height", self.ladder_height, self.ladder_tilesize),
        ] {
            let extent = i32::try_from(cells)
                .ok()
                .and_then(|cells| cells.checked_mul(tilesize));
            if extent.is_none() {
                return Err(LetterfallError::InvalidConfig(format!(
                    "{} of {} cells at size {} overflows world coordinates",
                    name, cells, tilesize
                )));
            }
        }
        if let Some(pattern) = self.ladder_pattern {
            if pattern.spacing <= 0 || pattern.period <= 0 {
                return Err(LetterfallError::InvalidConfig(
                    "ladder spacing and period must be positive".to_string(),
                ));
            }
        }
        self.spawn.validate()
    }
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self::new(42)
    }
}

/// Discrete happenings reported to the render/audio collaborators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    Spawned {
        entity_id: EntityId,
        kind: EntityKind,
    },
    PickedUp {
        entity_id: EntityId,
        kind: EntityKind,
    },
    /// A carried entity was dropped to make room for another
    Released {
        entity_id: EntityId,
    },
    Placed(Placement),
    HazardImpact {
        entity_id: EntityId,
        kind: HazardKind,
        row: i32,
        /// Rows the player was pushed up to get clear of the text
        nudged: i32,
    },
    Expired {
        entity_id: EntityId,
        kind: EntityKind,
    },
    Jumped,
}

impl GameEvent {
    /// Sound cue the audio collaborator should play, if any.
    pub fn sound_cue(&self) -> Option<&'static str> {
        match self {
            GameEvent::PickedUp { .. } => Some("pick"),
            GameEvent::Placed(_) => Some("place"),
            GameEvent::HazardImpact { .. } => Some("hazard"),
            GameEvent::Jumped => Some("jump"),
            GameEvent::Spawned { .. } => Some("spawn"),
            GameEvent::Released { .. } | GameEvent::Expired { .. } => None,
        }
    }
}

/// Running totals for a scene.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameStatistics {
    pub entities_spawned: u32,
    pub pickups: u32,
    pub letters_placed: u32,
    pub chars_inserted: u32,
    pub chars_deleted: u32,
    pub lines_inserted: u32,
    pub lines_deleted: u32,
    pub entities_expired: u32,
    pub jumps: u32,
}

impl GameStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Updates statistics based on a game event.
    pub fn update_from_event(&mut self, event: &GameEvent) {
        match event {
            GameEvent::Spawned { .. } => self.entities_spawned += 1,
            GameEvent::PickedUp { .. } => self.pickups += 1,
            GameEvent::Placed(placement) if placement.edited => match placement.kind {
                EntityKind::Letter { .. } => {
                    self.letters_placed += 1;
                    if placement.line_inserted {
                        self.lines_inserted += 1;
                    }
                }
                EntityKind::Creature(crate::CreatureKind::Inserter) => self.chars_inserted += 1,
                EntityKind::Creature(crate::CreatureKind::Deleter) => self.chars_deleted += 1,
                _ => {}
            },
            GameEvent::HazardImpact { kind, .. } => match kind {
                HazardKind::LineInserter => self.lines_inserted += 1,
                HazardKind::LineDeleter => self.lines_deleted += 1,
            },
            GameEvent::Expired { .. } => self.entities_expired += 1,
            GameEvent::Jumped => self.jumps += 1,
            _ => {}
        }
    }
}

/// A running scene.
#[derive(Debug)]
pub struct GameState {
    pub config: SceneConfig,
    /// The editable level
    pub text: TextMap,
    pub ladders: TileMap,
    pub policy: CollisionPolicy,
    pub player: Player,
    /// Every non-player entity, indexed by ID
    pub entities: HashMap<EntityId, Entity>,
    pub spawner: SpawnDirector,
    /// Frames simulated so far
    pub frame: u64,
    /// Simulation clock in seconds
    pub time: f64,
    pub statistics: GameStatistics,
    events: Vec<GameEvent>,
    /// Insertion order of entities, for deterministic iteration
    order: Vec<EntityId>,
    rng: StdRng,
}

impl GameState {
    /// Builds a scene from its configuration.
    ///
    /// # Examples
    ///
    /// ```
    /// use letterfall::{GameState, SceneConfig};
    ///
    /// let state = GameState::new(SceneConfig::new(7)).unwrap();
    /// assert_eq!(state.frame, 0);
    /// assert_eq!(state.text.get_line(12).unwrap(), "}");
    /// ```
    pub fn new(config: SceneConfig) -> LetterfallResult<Self> {
        config.validate()?;
        let mut rng = create_rng(&config);

        let text = TextLayoutGenerator.generate(&config, &mut rng)?;
        let ladders = LadderLayoutGenerator.generate(&config, &mut rng)?;
        let spawner = SpawnDirector::new(&config.spawn)?;
        let start = text.map_to_coord(Position::origin()).center();

        info!(
            "Scene ready: {}x{} text, seed {}",
            text.width(),
            text.height(),
            config.seed
        );

        Ok(Self {
            policy: CollisionPolicy::from_preset(config.policy),
            player: Player::new(start),
            text,
            ladders,
            entities: HashMap::new(),
            spawner,
            frame: 0,
            time: 0.0,
            statistics: GameStatistics::new(),
            events: Vec::new(),
            order: Vec::new(),
            rng,
            config,
        })
    }

    /// World area entities live in.
    pub fn area(&self) -> Rect {
        self.text.bounds()
    }

    /// Adds an entity to the scene. It can collide with the player from the
    /// next frame on.
    pub fn add_entity(&mut self, mut entity: Entity) -> EntityId {
        let id = entity.id;
        entity.born_frame = self.frame;
        self.entities.insert(id, entity);
        self.order.push(id);
        id
    }

    pub fn get_entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    fn emit(&mut self, event: GameEvent) {
        self.statistics.update_from_event(&event);
        self.events.push(event);
    }

    /// Takes all events queued since the last drain.
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Applies one command from the input collaborator.
    pub fn apply_input(&mut self, input: PlayerInput) -> LetterfallResult<()> {
        match input {
            PlayerInput::Move(direction) => self.player.set_move(direction),
            PlayerInput::JumpPressed => {
                let supported = self
                    .player
                    .is_supported(&self.text, &self.ladders, &self.policy);
                if self.player.start_jump(supported) {
                    self.emit(GameEvent::Jumped);
                }
            }
            PlayerInput::JumpReleased => self.player.end_jump(),
            PlayerInput::Place => {
                self.place()?;
            }
        }
        Ok(())
    }

    /// Releases whatever the player carries into the text.
    ///
    /// Returns `None`, without touching the text, when nothing is carried.
    pub fn place(&mut self) -> LetterfallResult<Option<Placement>> {
        let placement = match self.player.place(&mut self.text, &mut self.entities)? {
            Some(placement) => placement,
            None => return Ok(None),
        };

        if let EntityKind::Letter { code } = placement.kind {
            let at = self.text.map_to_coord(placement.cell).center();
            self.add_entity(Entity::new(EntityKind::Particle { code }, at));
        }
        self.emit(GameEvent::Placed(placement));
        Ok(Some(placement))
    }

    /// Reacts to the player touching entity `id`.
    pub fn handle_player_collision(&mut self, id: EntityId) -> LetterfallResult<()> {
        let (kind, active) = match self.entities.get(&id) {
            Some(entity) => (entity.kind, entity.is_active()),
            None => return Ok(()),
        };

        match kind {
            EntityKind::Letter { .. } | EntityKind::Creature(_) => {
                if let PickUp::Lifted { released } = self.player.pick_up(id, &mut self.entities) {
                    if let Some(released) = released {
                        self.emit(GameEvent::Released {
                            entity_id: released,
                        });
                    }
                    debug!("Picked up {}", kind.name());
                    self.emit(GameEvent::PickedUp {
                        entity_id: id,
                        kind,
                    });
                }
            }
            EntityKind::Hazard(hazard) if active => {
                let row = self.text.coord_to_map(self.player.position).y;
                match hazard {
                    HazardKind::LineInserter => self.text.insert_line(row)?,
                    HazardKind::LineDeleter => self.text.delete_line(row)?,
                }
                if let Some(entity) = self.entities.get_mut(&id) {
                    entity.stop();
                }
                let nudged = self.player.nudge_out_of_obstacles(&self.text, &self.policy);
                debug!("Hit by {} on row {}", kind.name(), row);
                self.emit(GameEvent::HazardImpact {
                    entity_id: id,
                    kind: hazard,
                    row,
                    nudged,
                });
            }
            EntityKind::Hazard(_) | EntityKind::Particle { .. } => {}
        }
        Ok(())
    }

    /// Runs one frame of `dt` seconds.
    pub fn tick(&mut self, dt: f64) -> LetterfallResult<()> {
        if dt.is_nan() || dt < 0.0 {
            return Err(LetterfallError::ClockWentBackwards {
                last: self.time,
                current: self.time + dt,
            });
        }
        self.frame += 1;
        self.time += dt;

        // Spawns
        let area = self.area();
        let spawned = self.spawner.update(self.time, area, &mut self.rng)?;
        for entity in spawned {
            let (entity_id, kind) = (entity.id, entity.kind);
            self.add_entity(entity);
            self.emit(GameEvent::Spawned { entity_id, kind });
        }

        // Movement
        self.player
            .update(&self.text, &self.ladders, &self.policy, &self.config.physics);
        let turn_chance = self.config.spawn.creature_turn_chance;
        for id in &self.order {
            if let Some(entity) = self.entities.get_mut(id) {
                entity.update(
                    dt,
                    &self.text,
                    &self.policy,
                    &self.config.physics,
                    turn_chance,
                    &mut self.rng,
                );
            }
        }
        if let Some(carried) = self.player.carried() {
            if let Some(entity) = self.entities.get_mut(&carried) {
                entity.position = self.player.position + CARRY_OFFSET;
            }
        }

        // Collisions
        let player_bounds = self.player.bounds();
        let touching: Vec<EntityId> = self
            .order
            .iter()
            .filter_map(|id| self.entities.get(id))
            .filter(|e| e.is_active() && e.born_frame < self.frame)
            .filter(|e| e.bounds().overlaps(&player_bounds))
            .map(|e| e.id)
            .collect();
        // A failed collision still lets the frame finish its cleanup.
        let mut outcome = Ok(());
        for id in touching {
            if let Err(e) = self.handle_player_collision(id) {
                warn!("Collision with {} failed: {}", id, e);
                if outcome.is_ok() {
                    outcome = Err(e);
                }
            }
        }

        // Expiry
        let expired: Vec<(EntityId, EntityKind)> = self
            .order
            .iter()
            .filter_map(|id| self.entities.get(id))
            .filter(|e| !e.is_stopped() && e.is_expired(&area))
            .map(|e| (e.id, e.kind))
            .collect();
        for (entity_id, kind) in expired {
            if let Some(entity) = self.entities.get_mut(&entity_id) {
                entity.stop();
            }
            self.emit(GameEvent::Expired { entity_id, kind });
        }

        let entities = &mut self.entities;
        entities.retain(|_, e| !e.is_stopped());
        self.order.retain(|id| entities.contains_key(id));
        outcome
    }

    /// Runs one frame at the configured frame rate.
    pub fn step(&mut self) -> LetterfallResult<()> {
        self.tick(self.config.frame_time())
    }

    /// Player's cell on the text map.
    pub fn player_cell(&self) -> Position {
        self.text.coord_to_map(self.player.position)
    }
}
