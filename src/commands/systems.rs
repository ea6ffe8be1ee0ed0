//! Commands domain: applies queued commands before the motors run.

use bevy::ecs::message::{MessageReader, MessageWriter};
use bevy::prelude::*;

use crate::ai::AiController;
use crate::combat::{CharacterDied, CharacterHealth};
use crate::motor::CharacterMotor;

use super::command::{CharacterCommand, CommandOutcome};

pub(crate) fn apply_commands(
    mut commands: MessageReader<CharacterCommand>,
    mut deaths: MessageWriter<CharacterDied>,
    mut characters: Query<(
        &mut CharacterMotor,
        Option<&mut CharacterHealth>,
        Option<&mut AiController>,
    )>,
) {
    for command in commands.read() {
        let Ok((mut motor, health, ai)) = characters.get_mut(command.character) else {
            warn!("Command {:?} for unknown character {:?}", command.kind, command.character);
            continue;
        };

        match command
            .kind
            .apply(&mut motor, health.map(Mut::into_inner), ai.map(Mut::into_inner))
        {
            CommandOutcome::Died => {
                deaths.write(CharacterDied {
                    entity: command.character,
                });
            }
            CommandOutcome::Ignored => {
                debug!("Command {:?} ignored by {:?}", command.kind, command.character);
            }
            CommandOutcome::Applied => {}
        }
    }
}
