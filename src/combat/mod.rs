//! Combat domain: weapons, hit windows, health and hit resolution.

use bevy::prelude::*;

use crate::core::SimSet;

pub mod events;
pub mod health;
mod systems;
pub mod weapon;

#[cfg(test)]
mod tests;

pub use events::{CharacterDied, HitMessage};
pub use health::CharacterHealth;
pub use systems::probe_weapon;
pub use weapon::{Attack, Hit, Strike, Weapon};

pub struct CombatPlugin;

impl Plugin for CombatPlugin {
    fn build(&self, app: &mut App) {
        app.add_message::<HitMessage>()
            .add_message::<CharacterDied>()
            .add_systems(
                PostUpdate,
                (
                    systems::detect_weapon_hits,
                    systems::apply_hits,
                    systems::regenerate_health,
                    systems::sync_deaths,
                    systems::log_deaths,
                )
                    .chain()
                    .in_set(SimSet::Combat),
            );
    }
}
