//! # Scene Layout
//!
//! Generators for the initial text map and the ladder map.

use crate::{config, Generator, LetterfallError, LetterfallResult, SceneConfig, TextMap, TileMap};
use log::debug;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

/// A line of text written into the map when the scene starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextLine {
    pub x: i32,
    pub y: i32,
    pub text: String,
}

impl TextLine {
    pub fn new(x: i32, y: i32, text: impl Into<String>) -> Self {
        Self {
            x,
            y,
            text: text.into(),
        }
    }
}

/// The program every default scene starts with.
pub fn default_program() -> Vec<TextLine> {
    vec![
        TextLine::new(0, 10, "function main() {"),
        TextLine::new(0, 11, "  print(\"Hello, world!\");"),
        TextLine::new(0, 12, "}"),
    ]
}

/// Repeating ladder layout.
///
/// Column `x` holds a ladder in row `y` when `x % spacing == offset` and
/// `(x + y) % period <= span`, giving staggered ladder segments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LadderPattern {
    pub spacing: i32,
    pub offset: i32,
    pub period: i32,
    pub span: i32,
}

impl LadderPattern {
    pub fn is_ladder(&self, x: i32, y: i32) -> bool {
        x % self.spacing == self.offset && (x + y) % self.period <= self.span
    }
}

impl Default for LadderPattern {
    fn default() -> Self {
        Self {
            spacing: 5,
            offset: 2,
            period: 10,
            span: 5,
        }
    }
}

/// Builds the text map and writes the configured initial text into it.
pub struct TextLayoutGenerator;

impl Generator<TextMap> for TextLayoutGenerator {
    fn generate(&self, config: &SceneConfig, _rng: &mut StdRng) -> LetterfallResult<TextMap> {
        let mut text = TextMap::new(config.text_tilesize, config.text_width, config.text_height)?;
        for line in &config.initial_text {
            text.put_text(line.x, line.y, &line.text)?;
        }
        self.validate(&text, config)?;
        debug!(
            "{} built a {}x{} text map",
            self.generator_type(),
            text.width(),
            text.height()
        );
        Ok(text)
    }

    fn validate(&self, content: &TextMap, config: &SceneConfig) -> LetterfallResult<()> {
        for line in &config.initial_text {
            let written = content.get_line(line.y)?;
            if !written.contains(line.text.trim()) {
                return Err(LetterfallError::InvalidState(format!(
                    "initial line {} was overwritten",
                    line.y
                )));
            }
        }
        Ok(())
    }

    fn generator_type(&self) -> &'static str {
        "TextLayoutGenerator"
    }
}

/// Builds the ladder map from a [`LadderPattern`].
pub struct LadderLayoutGenerator;

impl Generator<TileMap> for LadderLayoutGenerator {
    fn generate(&self, config: &SceneConfig, _rng: &mut StdRng) -> LetterfallResult<TileMap> {
        let mut ladders =
            TileMap::new(config.ladder_tilesize, config.ladder_width, config.ladder_height)?;
        if let Some(pattern) = config.ladder_pattern {
            for y in 0..ladders.height() as i32 {
                for x in 0..ladders.width() as i32 {
                    if pattern.is_ladder(x, y) {
                        ladders.set(x, y, config::LADDER_CELL)?;
                    }
                }
            }
        }
        self.validate(&ladders, config)?;
        Ok(ladders)
    }

    fn validate(&self, content: &TileMap, config: &SceneConfig) -> LetterfallResult<()> {
        if config.ladder_pattern.is_some()
            && content.find_tile(|c| c == config::LADDER_CELL, &content.bounds()).is_none()
        {
            return Err(LetterfallError::InvalidState(
                "ladder pattern produced no ladders".to_string(),
            ));
        }
        Ok(())
    }

    fn generator_type(&self) -> &'static str {
        "LadderLayoutGenerator"
    }
}
