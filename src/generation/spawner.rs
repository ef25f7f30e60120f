//! # Spawn Director
//!
//! One stochastic timer per spawn category, polled once per frame.

use crate::{
    config, CreatureKind, Entity, EntityKind, HazardKind, LetterfallResult, Position, Rect,
    SpawnConfig, StochasticTimer,
};
use log::debug;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Families of spawned entities, each driven by its own timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpawnCategory {
    /// Letters drop in from the top edge
    Letter,
    /// Creatures appear anywhere and fall onto the text
    Creature,
    /// Hazards appear anywhere and fly sideways
    Hazard,
}

impl SpawnCategory {
    pub fn all() -> [SpawnCategory; 3] {
        [
            SpawnCategory::Letter,
            SpawnCategory::Creature,
            SpawnCategory::Hazard,
        ]
    }
}

/// Issues new entities when category timers fire.
#[derive(Debug, Clone)]
pub struct SpawnDirector {
    config: SpawnConfig,
    timers: Vec<(SpawnCategory, StochasticTimer)>,
}

impl SpawnDirector {
    /// Creates a director with one timer per category.
    pub fn new(config: &SpawnConfig) -> LetterfallResult<Self> {
        config.validate()?;
        let timers = SpawnCategory::all()
            .into_iter()
            .map(|category| {
                let rate = match category {
                    SpawnCategory::Letter => config.letter_rate,
                    SpawnCategory::Creature => config.creature_rate,
                    SpawnCategory::Hazard => config.hazard_rate,
                };
                StochasticTimer::new(rate).map(|timer| (category, timer))
            })
            .collect::<LetterfallResult<Vec<_>>>()?;

        Ok(Self {
            config: config.clone(),
            timers,
        })
    }

    pub fn config(&self) -> &SpawnConfig {
        &self.config
    }

    /// Timer driving `category`.
    pub fn timer(&self, category: SpawnCategory) -> Option<&StochasticTimer> {
        self.timers
            .iter()
            .find(|(c, _)| *c == category)
            .map(|(_, timer)| timer)
    }

    /// Restarts every timer window.
    pub fn reset(&mut self) {
        for (_, timer) in self.timers.iter_mut() {
            timer.reset();
        }
    }

    /// Polls every timer at simulation time `now` and returns the entities to
    /// add, in category order. Categories whose timer does not fire spawn
    /// nothing.
    pub fn update<R: Rng + ?Sized>(
        &mut self,
        now: f64,
        area: Rect,
        rng: &mut R,
    ) -> LetterfallResult<Vec<Entity>> {
        let mut spawned = Vec::new();
        let mut fired = Vec::new();
        for (category, timer) in self.timers.iter_mut() {
            if timer.poll(now, rng)? {
                fired.push(*category);
            }
        }
        for category in fired {
            let entity = self.spawn(category, area, rng);
            debug!(
                "Spawned {} at {:?}",
                entity.kind.name(),
                entity.position
            );
            spawned.push(entity);
        }
        Ok(spawned)
    }

    /// Builds one entity of `category` at a position chosen by the category's
    /// placement rule.
    pub fn spawn<R: Rng + ?Sized>(&self, category: SpawnCategory, area: Rect, rng: &mut R) -> Entity {
        let x = self.spawn_x(area, rng);
        match category {
            SpawnCategory::Letter => {
                let code = rng.gen_range(config::MIN_LETTER_CODE..config::MAX_LETTER_CODE);
                Entity::new(EntityKind::Letter { code }, Position::new(x, area.y))
            }
            SpawnCategory::Creature => {
                let kind = if rng.gen_bool(0.5) {
                    CreatureKind::Inserter
                } else {
                    CreatureKind::Deleter
                };
                let direction = if rng.gen_bool(0.5) { 1 } else { -1 };
                Entity::new(EntityKind::Creature(kind), Position::new(x, self.spawn_y(area, rng)))
                    .with_velocity(Position::new(direction * self.config.creature_speed, 0))
            }
            SpawnCategory::Hazard => {
                let kind = if rng.gen_bool(0.5) {
                    HazardKind::LineInserter
                } else {
                    HazardKind::LineDeleter
                };
                let direction = if rng.gen_bool(0.5) { 1 } else { -1 };
                Entity::new(EntityKind::Hazard(kind), Position::new(x, self.spawn_y(area, rng)))
                    .with_velocity(Position::new(direction * self.config.hazard_speed, 0))
            }
        }
    }

    /// Uniform x within the area, keeping `margin` clear on the left and twice
    /// that on the right.
    fn spawn_x<R: Rng + ?Sized>(&self, area: Rect, rng: &mut R) -> i32 {
        let low = area.x + self.config.margin;
        let high = area.right() - self.config.margin * 2;
        if high > low {
            rng.gen_range(low..high)
        } else {
            area.center().x
        }
    }

    fn spawn_y<R: Rng + ?Sized>(&self, area: Rect, rng: &mut R) -> i32 {
        if area.height > 0 {
            rng.gen_range(area.y..area.bottom())
        } else {
            area.y
        }
    }
}
