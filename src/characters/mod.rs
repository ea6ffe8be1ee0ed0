//! Characters domain: spawning, and the registry of characters for side and visibility
//! queries.
//!
//! The registry is a resource rebuilt from the world each frame before AI runs, so queries
//! always see the positions the motors ended the previous frame with.

use bevy::prelude::*;

use crate::core::SimSet;

pub mod registry;
pub mod spawn;
mod systems;

#[cfg(test)]
mod tests;

pub use registry::{CameraView, CharacterEntry, CharacterRegistry, CharacterSide, Player};
pub use spawn::{CharacterBundle, animator_for, spawn_character};

pub(crate) use systems::sync_registry;

pub struct CharactersPlugin;

impl Plugin for CharactersPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<CharacterRegistry>()
            .add_systems(Update, sync_registry.in_set(SimSet::Intent));
    }
}
