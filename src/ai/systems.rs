//! AI domain: drives AI controllers once per frame.

use bevy::prelude::*;

use crate::characters::CharacterRegistry;
use crate::motor::CharacterMotor;

use super::controller::AiController;

pub(crate) fn update_ai(
    time: Res<Time>,
    registry: Res<CharacterRegistry>,
    mut query: Query<(Entity, &mut AiController, &mut CharacterMotor)>,
) {
    let dt = time.delta_secs();

    for (entity, mut ai, mut motor) in &mut query {
        ai.update(entity, &mut motor, &registry, dt);
    }
}
