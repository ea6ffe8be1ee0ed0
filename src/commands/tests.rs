use bevy::prelude::*;

use super::*;
use crate::ai::{AiController, AiSettings, AiState};
use crate::combat::CharacterHealth;
use crate::motor::{CharacterMotor, Direction};

#[test]
fn test_damage_kills_at_zero_health() {
    let mut motor = CharacterMotor::default();
    let mut health = CharacterHealth::default();

    let outcome = CommandKind::Damage(40.0).apply(&mut motor, Some(&mut health), None);
    assert_eq!(outcome, CommandOutcome::Applied);
    assert!(motor.is_alive());

    let outcome = CommandKind::Damage(60.0).apply(&mut motor, Some(&mut health), None);
    assert_eq!(outcome, CommandOutcome::Died);
    assert!(!motor.is_alive());
    assert!(motor.is_falling());
}

#[test]
fn test_damage_without_health_is_ignored() {
    let mut motor = CharacterMotor::default();
    let outcome = CommandKind::Damage(500.0).apply(&mut motor, None, None);
    assert_eq!(outcome, CommandOutcome::Ignored);
    assert!(motor.is_alive());
}

#[test]
fn test_heal_is_capped() {
    let mut motor = CharacterMotor::default();
    let mut health = CharacterHealth {
        health: 70.0,
        ..default()
    };
    CommandKind::Heal(50.0).apply(&mut motor, Some(&mut health), None);
    assert_eq!(health.health, 100.0);
}

#[test]
fn test_kill_drains_health_once() {
    let mut motor = CharacterMotor::default();
    let mut health = CharacterHealth::default();

    assert_eq!(
        CommandKind::Kill.apply(&mut motor, Some(&mut health), None),
        CommandOutcome::Died
    );
    assert!(health.is_dead());
    assert_eq!(
        CommandKind::Kill.apply(&mut motor, Some(&mut health), None),
        CommandOutcome::Applied
    );
}

#[test]
fn test_intents_reach_the_motor() {
    let mut motor = CharacterMotor::default();

    CommandKind::Move(0.5).apply(&mut motor, None, None);
    CommandKind::Climb(-2.0).apply(&mut motor, None, None);
    CommandKind::Jump.apply(&mut motor, None, None);
    CommandKind::Attack.apply(&mut motor, None, None);
    CommandKind::Face(Direction::Inside).apply(&mut motor, None, None);

    assert_eq!(motor.input.movement, 0.5);
    assert_eq!(motor.input.climb, -1.0);
    assert!(motor.input.jump);
    assert!(motor.wants_attack());
    assert_eq!(motor.direction(), Direction::Inside);
}

#[test]
fn test_speed_up_and_reset() {
    let mut motor = CharacterMotor::default();
    CommandKind::SpeedUp {
        scale: 2.0,
        duration: 3.0,
    }
    .apply(&mut motor, None, None);
    assert_eq!(motor.speed_multiplier(), 2.0);

    CommandKind::ResetSpeed.apply(&mut motor, None, None);
    assert_eq!(motor.speed_multiplier(), 1.0);
}

#[test]
fn test_knock_out_and_stand_up() {
    let mut motor = CharacterMotor::default();
    CommandKind::KnockOut { temporary: false }.apply(&mut motor, None, None);
    assert!(motor.is_falling());

    CommandKind::StandUp.apply(&mut motor, None, None);
    assert!(motor.wants_stand_up);
}

#[test]
fn test_dash_command_starts_dash() {
    let mut motor = CharacterMotor::default();
    CommandKind::Dash {
        distance: 3.0,
        strong: true,
    }
    .apply(&mut motor, None, None);
    assert!(motor.is_dashing());
    assert!(motor.dash().is_some_and(|dash| dash.strong));
}

#[test]
fn test_ai_commands_need_a_controller() {
    let mut world = World::new();
    let target = world.spawn_empty().id();
    let mut motor = CharacterMotor::default();

    assert_eq!(
        CommandKind::AiAttack(target).apply(&mut motor, None, None),
        CommandOutcome::Ignored
    );

    let mut ai = AiController::new(AiSettings::default());
    CommandKind::AiAttack(target).apply(&mut motor, None, Some(&mut ai));
    assert_eq!(ai.state(), AiState::Attack);
    assert_eq!(ai.target(), Some(target));

    CommandKind::AiCalmDown.apply(&mut motor, None, Some(&mut ai));
    assert_eq!(ai.state(), AiState::Patrol);
    assert_eq!(ai.target(), None);
}
