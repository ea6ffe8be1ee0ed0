//! 2.5D platformer characters: a physics-driven motor with edge and rope climbing, melee
//! combat, a simple AI, and the Bevy plugins that wire them to Avian physics.

use bevy::app::PluginGroupBuilder;
use bevy::prelude::*;

pub mod ai;
pub mod animation;
pub mod characters;
pub mod combat;
pub mod commands;
pub mod content;
pub mod core;
#[cfg(feature = "dev-tools")]
pub mod debug;
pub mod ik;
pub mod input;
pub mod motor;
pub mod settings;
pub mod world;

/// Every character plugin in dependency order. Physics and rendering are added by the app.
pub struct PlatformerPlugins;

impl PluginGroup for PlatformerPlugins {
    fn build(self) -> PluginGroupBuilder {
        let group = PluginGroupBuilder::start::<Self>()
            .add(crate::core::CorePlugin)
            .add(content::ContentPlugin)
            .add(world::WorldPlugin)
            .add(animation::AnimationPlugin)
            .add(motor::MotorPlugin)
            .add(combat::CombatPlugin)
            .add(characters::CharactersPlugin)
            .add(ai::AiPlugin)
            .add(commands::CommandsPlugin)
            .add(input::InputPlugin);

        #[cfg(feature = "dev-tools")]
        let group = group.add(debug::DebugPlugin);

        group
    }
}
