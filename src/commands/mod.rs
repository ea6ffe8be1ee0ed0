//! Commands domain: the command surface exposed to scripted triggers.

use bevy::prelude::*;

use crate::core::SimSet;

pub mod command;
mod systems;

#[cfg(test)]
mod tests;

pub use command::{CharacterCommand, CommandKind, CommandOutcome};

pub struct CommandsPlugin;

impl Plugin for CommandsPlugin {
    fn build(&self, app: &mut App) {
        app.add_message::<CharacterCommand>().add_systems(
            Update,
            systems::apply_commands
                .in_set(SimSet::Intent)
                .after(crate::ai::update_ai),
        );
    }
}
