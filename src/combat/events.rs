//! Combat domain: combat-related messages.

use bevy::ecs::message::Message;
use bevy::prelude::*;

use super::weapon::Hit;

/// A weapon connected with a character.
#[derive(Debug, Clone, Copy)]
pub struct HitMessage {
    pub hit: Hit,
}

impl Message for HitMessage {}

/// Health of `entity` reached zero.
#[derive(Debug)]
pub struct CharacterDied {
    pub entity: Entity,
}

impl Message for CharacterDied {}
