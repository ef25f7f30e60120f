//! Integration test to ensure a scene can be configured and run without errors.

use letterfall::{
    GameState, LetterfallError, LetterfallResult, PlayerInput, Position, SceneConfig,
};
use std::io::Write;

#[test]
fn test_basic_startup() -> LetterfallResult<()> {
    let mut state = GameState::new(SceneConfig::default())?;

    assert_eq!(state.frame, 0);
    assert_eq!(state.text.width(), 32);
    assert_eq!(state.text.height(), 24);
    assert_eq!(state.player.position, Position::new(5, 5));
    assert_eq!(state.text.get_line(10)?, "function main() {");

    for _ in 0..300 {
        state.step()?;
    }
    assert_eq!(state.frame, 300);
    assert!((state.time - 10.0).abs() < 1e-6);
    assert!(state.statistics.entities_spawned > 0);
    Ok(())
}

#[test]
fn test_player_walks_when_told() -> LetterfallResult<()> {
    let mut state = GameState::new(SceneConfig::for_testing(1))?;
    state.apply_input(PlayerInput::Move(Position::new(1, 0)))?;
    for _ in 0..10 {
        state.step()?;
    }
    // Two units per frame to the right.
    assert_eq!(state.player.position.x, 25);

    state.apply_input(PlayerInput::Move(Position::origin()))?;
    state.step()?;
    assert_eq!(state.player.position.x, 25);
    Ok(())
}

#[test]
fn test_config_loads_from_file() -> LetterfallResult<()> {
    let mut config = SceneConfig::for_testing(77);
    config.text_width = 20;
    let mut file = tempfile::NamedTempFile::new()?;
    file.write_all(config.to_json()?.as_bytes())?;

    let loaded = SceneConfig::load_from_file(file.path())?;
    assert_eq!(loaded, config);

    let state = GameState::new(loaded)?;
    assert_eq!(state.text.width(), 20);
    Ok(())
}

#[test]
fn test_invalid_config_files_are_rejected() -> LetterfallResult<()> {
    let dir = tempfile::tempdir()?;

    let missing = dir.path().join("missing.json");
    assert!(matches!(
        SceneConfig::load_from_file(&missing),
        Err(LetterfallError::Io(_))
    ));

    let mut config = SceneConfig::new(1);
    config.spawn.letter_rate = 3.0;
    let bad = dir.path().join("bad.json");
    std::fs::write(&bad, config.to_json()?)?;
    assert!(matches!(
        SceneConfig::load_from_file(&bad),
        Err(LetterfallError::InvalidConfig(_))
    ));
    Ok(())
}
