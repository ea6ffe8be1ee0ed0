//! Debug domain: gizmo overlays and hotkeys for fast iteration.
//!
//! Features:
//! - F1/F2/F3 toggle world, character and skeleton overlays
//! - Ctrl+K / Ctrl+T knock the player out permanently or temporarily
//! - Ctrl+R stands the player up, Ctrl+H heals, Ctrl+F speeds the player up

use bevy::prelude::*;

use crate::core::SimSet;

pub mod state;
mod systems;

pub use state::DebugState;

pub struct DebugPlugin;

impl Plugin for DebugPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<DebugState>()
            .add_systems(
                Update,
                (systems::toggle_overlays, systems::handle_debug_hotkeys)
                    .chain()
                    .before(SimSet::Intent),
            )
            .add_systems(
                PostUpdate,
                (
                    systems::draw_world.run_if(|state: Res<DebugState>| state.show_world),
                    systems::draw_characters.run_if(|state: Res<DebugState>| state.show_characters),
                    systems::draw_skeletons.run_if(|state: Res<DebugState>| state.show_skeletons),
                )
                    .after(SimSet::Combat),
            );
    }
}
