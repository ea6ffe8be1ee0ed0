//! Characters domain: keeps the registry in step with the world.

use bevy::prelude::*;

use crate::ai::AiController;
use crate::motor::{CharacterBody, CharacterMotor};

use super::registry::{CharacterEntry, CharacterRegistry, CharacterSide, Player};

type EntryItem = (
    Entity,
    &'static CharacterMotor,
    &'static CharacterBody,
    &'static Transform,
    Option<&'static CharacterSide>,
    Has<AiController>,
    Has<Player>,
);

pub(crate) fn sync_registry(
    mut registry: ResMut<CharacterRegistry>,
    characters: Query<EntryItem>,
    mut removed: RemovedComponents<CharacterMotor>,
) {
    for entity in removed.read() {
        if registry.unregister(entity).is_some() {
            info!("Unregistered character {:?}", entity);
        }
    }

    for (entity, motor, body, transform, side, has_ai, is_player) in &characters {
        let entry = CharacterEntry {
            entity,
            feet: body.feet(transform.translation),
            height: body.height,
            radius: body.radius,
            side: side.map(|s| s.0),
            has_ai,
            is_player,
            alive: motor.is_alive(),
        };

        if registry.register(entry) {
            info!(
                "Registered character {:?} (side: {:?}, ai: {}, player: {})",
                entity, entry.side, has_ai, is_player
            );
        }
    }
}
