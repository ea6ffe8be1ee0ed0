//! Input domain: keyboard sampling for the player character.

use bevy::prelude::*;

use crate::core::SimSet;
use crate::motor::{CharacterMotor, Direction};

mod systems;


/// Distance of a player dash, in meters.
pub const DASH_DISTANCE: f32 = 3.0;

/// One frame of player intent, sampled from the keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PlayerIntent {
    pub direction: Option<Direction>,
    pub movement: f32,
    pub climb: f32,
    pub jump: bool,
    pub attack: bool,
    pub dash: bool,
}

impl PlayerIntent {
    /// A/D or arrows walk left and right. W/S climb, or walk into and out of the screen
    /// while Shift is held on the ground.
    pub fn from_keys(keyboard: &ButtonInput<KeyCode>, grounded: bool) -> Self {
        let mut intent = PlayerIntent::default();

        let mut x = 0.0;
        if keyboard.pressed(KeyCode::KeyA) || keyboard.pressed(KeyCode::ArrowLeft) {
            x -= 1.0;
        }
        if keyboard.pressed(KeyCode::KeyD) || keyboard.pressed(KeyCode::ArrowRight) {
            x += 1.0;
        }

        let mut y = 0.0;
        if keyboard.pressed(KeyCode::KeyS) || keyboard.pressed(KeyCode::ArrowDown) {
            y -= 1.0;
        }
        if keyboard.pressed(KeyCode::KeyW) || keyboard.pressed(KeyCode::ArrowUp) {
            y += 1.0;
        }

        let depth = grounded && keyboard.any_pressed([KeyCode::ShiftLeft, KeyCode::ShiftRight]);

        if depth && y != 0.0 {
            intent.direction = Some(if y > 0.0 {
                Direction::Inside
            } else {
                Direction::Outside
            });
            intent.movement = y;
        } else {
            if x != 0.0 {
                intent.direction = Some(if x > 0.0 { Direction::Right } else { Direction::Left });
            }
            intent.movement = x;
            intent.climb = y;
        }

        intent.jump = keyboard.pressed(KeyCode::Space);
        intent.attack = keyboard.just_pressed(KeyCode::KeyJ);
        intent.dash = keyboard.just_pressed(KeyCode::KeyK);
        intent
    }

    pub fn apply(&self, motor: &mut CharacterMotor) {
        if let Some(direction) = self.direction {
            motor.input_direction(direction);
        }
        motor.input_movement(self.movement);
        motor.input_climb(self.climb);
        if self.jump {
            motor.input_jump();
        }
        if self.attack {
            motor.input_attack();
        }
        if self.dash {
            motor.perform_dash(DASH_DISTANCE, false);
        }
    }
}

pub struct InputPlugin;

impl Plugin for InputPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, systems::read_player_input.in_set(SimSet::Intent));
    }
}
