use bevy::prelude::*;

use super::*;
use crate::characters::{CharacterEntry, CharacterRegistry};
use crate::motor::{CharacterMotor, Direction};

fn entities(count: usize) -> Vec<Entity> {
    let mut world = World::new();
    (0..count).map(|_| world.spawn_empty().id()).collect()
}

fn entry(entity: Entity, x: f32, has_ai: bool) -> CharacterEntry {
    CharacterEntry {
        entity,
        feet: Vec3::new(x, 0.0, 0.0),
        height: 1.8,
        radius: 0.3,
        side: None,
        has_ai,
        is_player: !has_ai,
        alive: true,
    }
}

/// An AI at the origin and a player at `player_x`.
fn duel(player_x: f32) -> (Vec<Entity>, CharacterRegistry) {
    let ids = entities(3);
    let mut registry = CharacterRegistry::default();
    registry.register(entry(ids[0], 0.0, true));
    registry.register(entry(ids[1], player_x, false));
    (ids, registry)
}

// ----------------------------------------------------------------------------
// Patrol
// ----------------------------------------------------------------------------

#[test]
fn test_patrol_walks_to_bound_and_turns() {
    let ids = entities(1);
    let mut registry = CharacterRegistry::default();
    registry.register(entry(ids[0], 0.0, true));

    let mut ai = AiController::new(AiSettings {
        patrol_left: 1.0,
        patrol_right: 1.0,
        ..default()
    });
    let mut motor = CharacterMotor::default();

    ai.update(ids[0], &mut motor, &registry, 0.1);
    assert_eq!(motor.direction(), Direction::Right);
    assert_eq!(motor.input.movement, 1.0);

    motor.input.movement = 0.0;
    registry.register(entry(ids[0], 1.5, true));
    ai.update(ids[0], &mut motor, &registry, 0.1);
    assert_eq!(motor.input.movement, 0.0);

    ai.update(ids[0], &mut motor, &registry, 0.1);
    assert_eq!(motor.direction(), Direction::Left);
    assert_eq!(motor.input.movement, -1.0);
}

#[test]
fn test_zero_patrol_range_stands_still() {
    let ids = entities(1);
    let mut registry = CharacterRegistry::default();
    registry.register(entry(ids[0], 0.0, true));

    let mut ai = AiController::new(AiSettings::default());
    let mut motor = CharacterMotor::default();

    for _ in 0..5 {
        ai.update(ids[0], &mut motor, &registry, 0.1);
    }
    assert_eq!(motor.input.movement, 0.0);
    assert_eq!(motor.direction(), Direction::Right);
}

#[test]
fn test_notices_nearest_enemy() {
    let (ids, mut registry) = duel(1.5);
    registry.register(entry(ids[2], -1.0, false));

    let mut ai = AiController::new(AiSettings::default());
    let mut motor = CharacterMotor::default();
    ai.update(ids[0], &mut motor, &registry, 0.1);

    assert_eq!(ai.state(), AiState::Attack);
    assert_eq!(ai.target(), Some(ids[2]));
}

#[test]
fn test_ignores_allies_and_distant_enemies() {
    let ids = entities(3);
    let mut registry = CharacterRegistry::default();
    registry.register(entry(ids[0], 0.0, true));
    registry.register(entry(ids[1], 0.5, true));
    registry.register(entry(ids[2], 5.0, false));

    let mut ai = AiController::new(AiSettings::default());
    let mut motor = CharacterMotor::default();
    ai.update(ids[0], &mut motor, &registry, 0.1);

    assert_eq!(ai.state(), AiState::Patrol);
    assert_eq!(ai.target(), None);
}

// ----------------------------------------------------------------------------
// Attack
// ----------------------------------------------------------------------------

#[test]
fn test_attacks_after_wait_when_in_range() {
    let (ids, registry) = duel(0.5);
    let mut ai = AiController::new(AiSettings::default());
    let mut motor = CharacterMotor::default();
    ai.attack(Some(ids[1]));

    for _ in 0..4 {
        ai.update(ids[0], &mut motor, &registry, 0.25);
        assert!(!motor.wants_attack());
    }
    ai.update(ids[0], &mut motor, &registry, 0.25);
    assert!(motor.wants_attack());
}

#[test]
fn test_friend_in_between_blocks_attack() {
    let (ids, mut registry) = duel(0.5);
    registry.register(entry(ids[2], 0.25, true));

    let mut ai = AiController::new(AiSettings::default());
    let mut motor = CharacterMotor::default();
    ai.attack(Some(ids[1]));

    for _ in 0..10 {
        ai.update(ids[0], &mut motor, &registry, 0.25);
    }
    assert!(!motor.wants_attack());
}

#[test]
fn test_closes_distance_toward_target() {
    let (ids, registry) = duel(-3.0);
    let mut ai = AiController::new(AiSettings::default());
    let mut motor = CharacterMotor::default();
    ai.attack(Some(ids[1]));

    ai.update(ids[0], &mut motor, &registry, 0.1);

    assert_eq!(motor.direction(), Direction::Left);
    assert_eq!(motor.input.movement, -1.0);
    assert!(!motor.wants_attack());
}

#[test]
fn test_keeps_minimum_distance() {
    let (ids, registry) = duel(0.6);
    let mut ai = AiController::new(AiSettings::default());
    let mut motor = CharacterMotor::default();
    ai.attack(Some(ids[1]));

    ai.update(ids[0], &mut motor, &registry, 0.1);
    assert_eq!(motor.input.movement, 0.0);
}

#[test]
fn test_forgets_distant_target() {
    let (ids, registry) = duel(20.0);
    let mut ai = AiController::new(AiSettings::default());
    let mut motor = CharacterMotor::default();
    ai.attack(Some(ids[1]));

    ai.update(ids[0], &mut motor, &registry, 0.1);
    assert_eq!(ai.state(), AiState::Patrol);
    assert_eq!(ai.target(), None);
}

#[test]
fn test_calms_down_when_target_dies() {
    let (ids, mut registry) = duel(0.5);
    let mut ai = AiController::new(AiSettings {
        auto_notice: false,
        ..default()
    });
    let mut motor = CharacterMotor::default();
    ai.attack(Some(ids[1]));

    registry.register(CharacterEntry {
        alive: false,
        ..entry(ids[1], 0.5, false)
    });
    ai.update(ids[0], &mut motor, &registry, 0.1);

    assert_eq!(ai.state(), AiState::Patrol);
    assert!(!motor.wants_attack());
}

#[test]
fn test_attack_none_calms_down() {
    let ids = entities(1);
    let mut ai = AiController::new(AiSettings::default());
    ai.attack(Some(ids[0]));
    ai.attack(None);
    assert_eq!(ai.state(), AiState::Patrol);
}

// ----------------------------------------------------------------------------
// Falls
// ----------------------------------------------------------------------------

#[test]
fn test_auto_stand_up_when_knocked_out() {
    let (ids, registry) = duel(0.5);
    let mut ai = AiController::new(AiSettings::default());
    let mut motor = CharacterMotor::default();
    motor.knock_out(false);

    ai.update(ids[0], &mut motor, &registry, 0.1);
    assert!(motor.wants_stand_up);
    assert_eq!(ai.state(), AiState::Patrol);
}
