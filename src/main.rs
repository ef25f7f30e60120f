//! # Letterfall Headless Driver
//!
//! Builds a scene, lets a seeded autopilot play it for a number of frames and
//! prints the resulting text buffer.

use clap::Parser;
use letterfall::{
    GameEvent, GameState, LetterfallError, LetterfallResult, PlayerInput, Position, SceneConfig,
};
use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
#[cfg(feature = "dev-tools")]
use tracing::Level;

/// Command line arguments for the Letterfall driver.
#[derive(Parser, Debug)]
#[command(name = "letterfall")]
#[command(about = "Catch falling letters and type them into the level")]
#[command(version)]
struct Args {
    /// Random seed for spawning and the autopilot
    #[arg(short, long)]
    seed: Option<u64>,

    /// Number of frames to simulate
    #[arg(short, long, default_value_t = 900)]
    frames: u64,

    /// JSON scene configuration file
    #[arg(short, long)]
    config: Option<std::path::PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> LetterfallResult<()> {
    let args = Args::parse();

    initialize_logging(&args.log_level)?;

    info!("Starting Letterfall v{}", letterfall::VERSION);

    let mut config = match &args.config {
        Some(path) => SceneConfig::load_from_file(path)?,
        None => SceneConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }

    let mut state = GameState::new(config)?;
    let mut autopilot = Autopilot::new(state.config.seed);

    for _ in 0..args.frames {
        for input in autopilot.decide(&state) {
            state.apply_input(input)?;
        }
        state.step()?;
        for event in state.drain_events() {
            log_event(&event);
        }
    }

    info!(
        "Simulated {} frames ({:.1}s)",
        state.frame, state.time
    );
    println!("{:#?}", state.statistics);
    for line in state.text.get_text() {
        println!("|{}", line);
    }
    Ok(())
}

/// Initializes the logging system based on the specified log level.
fn initialize_logging(log_level: &str) -> LetterfallResult<()> {
    #[cfg(feature = "dev-tools")]
    {
        let level = match log_level.to_lowercase().as_str() {
            "error" => Level::ERROR,
            "warn" => Level::WARN,
            "info" => Level::INFO,
            "debug" => Level::DEBUG,
            "trace" => Level::TRACE,
            _ => Level::INFO,
        };

        tracing_subscriber::fmt()
            .with_max_level(level)
            .with_target(false)
            .try_init()
            .map_err(|e| LetterfallError::InvalidConfig(e.to_string()))?;
    }

    #[cfg(not(feature = "dev-tools"))]
    {
        let level = log_level
            .parse::<log::LevelFilter>()
            .map_err(|_| LetterfallError::InvalidConfig(format!("unknown log level {}", log_level)))?;

        env_logger::Builder::new()
            .filter_level(level)
            .format_target(false)
            .try_init()
            .map_err(|e| LetterfallError::InvalidConfig(e.to_string()))?;
    }

    Ok(())
}

fn log_event(event: &GameEvent) {
    match event {
        GameEvent::Placed(placement) => info!(
            "Placed {} at {:?}",
            placement.kind.name(),
            placement.cell
        ),
        GameEvent::HazardImpact { kind, row, .. } => info!("{:?} hit row {}", kind, row),
        other => debug!("{:?}", other),
    }
    if let Some(cue) = event.sound_cue() {
        debug!("cue: {}", cue);
    }
}

/// Random-walking player stand-in.
struct Autopilot {
    rng: StdRng,
    direction: i32,
    jumping: bool,
}

impl Autopilot {
    fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed.wrapping_add(1)),
            direction: 1,
            jumping: false,
        }
    }

    fn decide(&mut self, state: &GameState) -> Vec<PlayerInput> {
        let mut inputs = Vec::new();

        if self.rng.gen_bool(0.05) {
            self.direction = self.rng.gen_range(-1..=1);
            inputs.push(PlayerInput::Move(Position::new(self.direction, 0)));
        } else if state.frame == 0 {
            inputs.push(PlayerInput::Move(Position::new(self.direction, 0)));
        }

        if self.jumping {
            if self.rng.gen_bool(0.2) {
                self.jumping = false;
                inputs.push(PlayerInput::JumpReleased);
            }
        } else if self.rng.gen_bool(0.03) {
            self.jumping = true;
            inputs.push(PlayerInput::JumpPressed);
        }

        if state.player.carried().is_some() && self.rng.gen_bool(0.1) {
            inputs.push(PlayerInput::Place);
        }
        inputs
    }
}
