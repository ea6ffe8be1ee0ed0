//! AI domain: patrol/attack controllers that steer characters through the same intents a
//! player uses.

use bevy::prelude::*;

use crate::characters::sync_registry;
use crate::core::SimSet;

pub mod controller;
mod systems;

pub(crate) use systems::update_ai;

#[cfg(test)]
mod tests;

pub use controller::{AiController, AiSettings, AiState};

pub struct AiPlugin;

impl Plugin for AiPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            systems::update_ai
                .in_set(SimSet::Intent)
                .after(sync_registry),
        );
    }
}
