//! Integration tests for the player's carry slot driving text edits.

use letterfall::{
    CarryState, CreatureKind, Entity, EntityKind, GameEvent, GameState, HazardKind,
    LetterfallResult, PlayerInput, Position, SceneConfig,
};

fn quiet_scene() -> LetterfallResult<GameState> {
    GameState::new(SceneConfig::for_testing(2024))
}

/// Puts an entity in the player's hands.
fn hand_to_player(state: &mut GameState, kind: EntityKind) -> LetterfallResult<letterfall::EntityId> {
    let id = state.add_entity(Entity::new(kind, state.player.position));
    state.handle_player_collision(id)?;
    Ok(id)
}

#[test]
fn test_letter_placed_on_last_row_inserts_a_line() -> LetterfallResult<()> {
    let mut state = quiet_scene()?;
    state.text.put_text(0, 11, "floor")?;
    state.player.position = Position::new(25, 115);
    assert_eq!(state.player_cell(), Position::new(2, 11));

    hand_to_player(&mut state, EntityKind::Letter { code: 'A' as i32 })?;
    let placement = state.place()?.expect("a letter was carried");

    assert!(placement.line_inserted);
    assert_eq!(placement.cell, Position::new(2, 11));
    assert_eq!(state.player_cell(), Position::new(2, 10));
    assert_eq!(state.text.get_line(10)?, "floor");
    assert_eq!(state.text.get_line(11)?, "A");
    assert_eq!(state.text.get(2, 11)?, 'A' as i32);
    assert_eq!(state.player.carry_state(), CarryState::Empty);
    Ok(())
}

#[test]
fn test_carry_slot_holds_at_most_one_entity() -> LetterfallResult<()> {
    let mut state = quiet_scene()?;
    let mut ids = Vec::new();
    for code in 'a'..='e' {
        ids.push(hand_to_player(&mut state, EntityKind::Letter { code: code as i32 })?);
        let carried: Vec<_> = state.entities.values().filter(|e| e.is_carried()).collect();
        assert_eq!(carried.len(), 1);
        assert_eq!(Some(carried[0].id), state.player.carried());
    }
    assert_eq!(state.player.carried(), ids.last().copied());

    state.step()?;
    // Every replaced entity is gone once the frame ends.
    assert_eq!(state.entities.len(), 1);
    let released = state
        .drain_events()
        .into_iter()
        .filter(|e| matches!(e, GameEvent::Released { .. }))
        .count();
    assert_eq!(released, 4);
    Ok(())
}

#[test]
fn test_place_with_empty_hands_changes_nothing() -> LetterfallResult<()> {
    let mut state = GameState::new(SceneConfig {
        spawn: letterfall::SpawnConfig::for_testing(),
        ..SceneConfig::new(3)
    })?;
    let before = state.text.get_text();

    state.apply_input(PlayerInput::Place)?;
    assert_eq!(state.text.get_text(), before);
    assert_eq!(state.statistics.letters_placed, 0);
    Ok(())
}

#[test]
fn test_inserter_creature_opens_gap_below_player() -> LetterfallResult<()> {
    let mut state = quiet_scene()?;
    state.text.put_text(0, 6, "fn mn()")?;
    state.player.position = Position::new(45, 55);

    hand_to_player(&mut state, EntityKind::Creature(CreatureKind::Inserter))?;
    state.apply_input(PlayerInput::Place)?;
    state.text.place(4, 6, 'a' as i32)?;

    assert_eq!(state.text.get_line(6)?, "fn man()");
    assert_eq!(state.statistics.chars_inserted, 1);
    Ok(())
}

#[test]
fn test_hazard_flies_into_player_and_edits_their_row() -> LetterfallResult<()> {
    let mut state = quiet_scene()?;
    state.text.put_text(0, 2, "cloud")?;
    state.text.put_text(0, 6, "ground")?;
    state.player.position = Position::new(35, 55);

    // Approaches from the left at two units per frame.
    let hazard = state.add_entity(Entity::new(
        EntityKind::Hazard(HazardKind::LineInserter),
        Position::new(5, 55),
    ));
    let mut impacted = false;
    for _ in 0..20 {
        state.step()?;
        if state
            .drain_events()
            .iter()
            .any(|e| matches!(e, GameEvent::HazardImpact { .. }))
        {
            impacted = true;
            break;
        }
    }

    assert!(impacted);
    assert!(state.get_entity(hazard).is_none());
    // Rows above the player scroll up; the ground stays put.
    assert_eq!(state.text.get_line(1)?, "cloud");
    assert_eq!(state.text.get_line(2)?, "");
    assert_eq!(state.text.get_line(5)?, "");
    assert_eq!(state.text.get_line(6)?, "ground");
    // Settled one unit lower, feet on the ground row.
    assert_eq!(state.player.position, Position::new(35, 56));
    Ok(())
}
