//! Input domain: feeds the keyboard into player motors.

use bevy::prelude::*;

use crate::characters::Player;
use crate::motor::CharacterMotor;

use super::PlayerIntent;

pub(crate) fn read_player_input(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut players: Query<&mut CharacterMotor, With<Player>>,
) {
    for mut motor in &mut players {
        let intent = PlayerIntent::from_keys(&keyboard, motor.is_grounded());
        intent.apply(&mut motor);
    }
}
