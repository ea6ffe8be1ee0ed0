//! Commands domain: synchronous entry points for level scripts and other rules layers.

use bevy::ecs::message::Message;
use bevy::prelude::*;

use crate::ai::AiController;
use crate::combat::CharacterHealth;
use crate::motor::{CharacterMotor, Direction};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CommandKind {
    Damage(f32),
    Heal(f32),
    KnockOut { temporary: bool },
    StandUp,
    Kill,
    Move(f32),
    Climb(f32),
    Jump,
    Attack,
    Face(Direction),
    SpeedUp { scale: f32, duration: f32 },
    ResetSpeed,
    Dash { distance: f32, strong: bool },
    AiAttack(Entity),
    AiCalmDown,
}

/// A command addressed to one character.
#[derive(Debug, Clone, Copy)]
pub struct CharacterCommand {
    pub character: Entity,
    pub kind: CommandKind,
}

impl Message for CharacterCommand {}

/// What applying a command changed beyond the character itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    Applied,
    Died,
    /// The character lacks the component the command needs.
    Ignored,
}

impl CommandKind {
    pub fn apply(
        self,
        motor: &mut CharacterMotor,
        health: Option<&mut CharacterHealth>,
        ai: Option<&mut AiController>,
    ) -> CommandOutcome {
        match self {
            CommandKind::Damage(amount) => match health {
                Some(health) => {
                    if health.deal(amount) {
                        motor.die();
                        CommandOutcome::Died
                    } else {
                        motor.on_hit();
                        CommandOutcome::Applied
                    }
                }
                None => CommandOutcome::Ignored,
            },
            CommandKind::Heal(amount) => match health {
                Some(health) => {
                    health.heal(amount);
                    CommandOutcome::Applied
                }
                None => CommandOutcome::Ignored,
            },
            CommandKind::Kill => {
                if !motor.is_alive() {
                    return CommandOutcome::Applied;
                }
                if let Some(health) = health {
                    health.health = 0.0;
                }
                motor.die();
                CommandOutcome::Died
            }
            CommandKind::KnockOut { temporary } => {
                motor.knock_out(temporary);
                CommandOutcome::Applied
            }
            CommandKind::StandUp => {
                motor.stand_up();
                CommandOutcome::Applied
            }
            CommandKind::Move(value) => {
                motor.input_movement(value);
                CommandOutcome::Applied
            }
            CommandKind::Climb(value) => {
                motor.input_climb(value);
                CommandOutcome::Applied
            }
            CommandKind::Jump => {
                motor.input_jump();
                CommandOutcome::Applied
            }
            CommandKind::Attack => {
                motor.input_attack();
                CommandOutcome::Applied
            }
            CommandKind::Face(direction) => {
                motor.input_direction(direction);
                CommandOutcome::Applied
            }
            CommandKind::SpeedUp { scale, duration } => {
                motor.speed_up(scale, duration);
                CommandOutcome::Applied
            }
            CommandKind::ResetSpeed => {
                motor.reset_speed();
                CommandOutcome::Applied
            }
            CommandKind::Dash { distance, strong } => {
                motor.perform_dash(distance, strong);
                CommandOutcome::Applied
            }
            CommandKind::AiAttack(target) => match ai {
                Some(ai) => {
                    ai.attack(Some(target));
                    CommandOutcome::Applied
                }
                None => CommandOutcome::Ignored,
            },
            CommandKind::AiCalmDown => match ai {
                Some(ai) => {
                    ai.calm_down();
                    CommandOutcome::Applied
                }
                None => CommandOutcome::Ignored,
            },
        }
    }
}
