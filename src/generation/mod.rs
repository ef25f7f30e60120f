//! # Generation Module
//!
//! Scene layout generation and runtime spawning.
//!
//! Layout generators build the initial text and ladder maps once per scene.
//! The spawn director runs every frame and decides, through stochastic timers,
//! when new letters, creatures and hazards enter the scene.

pub mod layout;
pub mod spawner;

pub use layout::*;
pub use spawner::*;

use crate::{LetterfallError, LetterfallResult, SceneConfig};
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

/// Spawn rates and placement parameters.
///
/// Rates are per-second probabilities in `[0, 1]` fed to a
/// [`StochasticTimer`](crate::StochasticTimer) per category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpawnConfig {
    /// Falling letters
    pub letter_rate: f64,
    /// Wandering inserter/deleter creatures
    pub creature_rate: f64,
    /// Flying line hazards
    pub hazard_rate: f64,
    /// Horizontal margin kept clear of spawns, in world units
    pub margin: i32,
    /// Per-frame chance a creature turns around
    pub creature_turn_chance: f64,
    /// Creature walking speed, units per frame
    pub creature_speed: i32,
    /// Hazard flying speed, units per frame
    pub hazard_speed: i32,
}

impl SpawnConfig {
    /// Creates the default spawn configuration.
    ///
    /// # Examples
    ///
    /// ```
    /// use letterfall::SpawnConfig;
    ///
    /// let config = SpawnConfig::new();
    /// assert!(config.validate().is_ok());
    /// assert!(config.letter_rate > config.hazard_rate);
    /// ```
    pub fn new() -> Self {
        Self {
            letter_rate: 0.95,
            creature_rate: 0.1,
            hazard_rate: 0.03,
            margin: 8,
            creature_turn_chance: 0.02,
            creature_speed: 1,
            hazard_speed: 2,
        }
    }

    /// A configuration that never spawns anything.
    pub fn for_testing() -> Self {
        Self {
            letter_rate: 0.0,
            creature_rate: 0.0,
            hazard_rate: 0.0,
            creature_turn_chance: 0.0,
            ..Self::new()
        }
    }

    /// Checks that rates and probabilities lie in `[0, 1]` and speeds are sane.
    pub fn validate(&self) -> LetterfallResult<()> {
        for (name, value) in [
            ("letter_rate", self.letter_rate),
            ("creature_rate", self.creature_rate),
            ("hazard_rate", self.hazard_rate),
            ("creature_turn_chance", self.creature_turn_chance),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(LetterfallError::InvalidConfig(format!(
                    "{} must be within [0, 1], got {}",
                    name, value
                )));
            }
        }
        if self.margin < 0 {
            return Err(LetterfallError::InvalidConfig(format!(
                "margin must not be negative, got {}",
                self.margin
            )));
        }
        if self.creature_speed <= 0 || self.hazard_speed <= 0 {
            return Err(LetterfallError::InvalidConfig(
                "creature and hazard speeds must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Trait for scene layout generators.
pub trait Generator<T> {
    /// Generates content using the scene configuration and random number generator.
    fn generate(&self, config: &SceneConfig, rng: &mut StdRng) -> LetterfallResult<T>;

    /// Validates that the generated content meets requirements.
    fn validate(&self, content: &T, config: &SceneConfig) -> LetterfallResult<()>;

    /// Gets the generator type name for logging and debugging.
    fn generator_type(&self) -> &'static str;
}

/// Utility functions for generation.
pub mod utils {
    use super::*;
    use rand::SeedableRng;

    /// Creates a seeded random number generator from the scene config.
    pub fn create_rng(config: &SceneConfig) -> StdRng {
        StdRng::seed_from_u64(config.seed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spawn_config_defaults_are_valid() {
        assert!(SpawnConfig::new().validate().is_ok());
        assert!(SpawnConfig::for_testing().validate().is_ok());
        assert_eq!(SpawnConfig::default(), SpawnConfig::new());
    }

    #[test]
    fn test_spawn_config_rejects_bad_values() {
        let mut config = SpawnConfig::new();
        config.hazard_rate = 1.2;
        assert!(matches!(
            config.validate(),
            Err(LetterfallError::InvalidConfig(_))
        ));

        let mut config = SpawnConfig::new();
        config.creature_turn_chance = -0.5;
        assert!(config.validate().is_err());

        let mut config = SpawnConfig::new();
        config.hazard_speed = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_utils_rng_is_seeded() {
        use rand::Rng;

        let config = SceneConfig::for_testing(12345);
        let a: u64 = utils::create_rng(&config).gen();
        let b: u64 = utils::create_rng(&config).gen();
        assert_eq!(a, b);
    }
}
