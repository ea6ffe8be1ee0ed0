//! Core domain: schedule ordering, shared math and time dilation.

use bevy::prelude::*;

pub mod math;
pub mod time;


pub use math::*;
pub use time::{CharacterTime, HitPause};

/// Ordering of the character simulation within a frame.
///
/// `Intent` runs in `Update` (player and AI write inputs), `Fixed` in `FixedUpdate`
/// (movement integration), and `Animate` → `Late` → `Combat` in `PostUpdate`.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimSet {
    Intent,
    Fixed,
    Animate,
    Late,
    Combat,
}

pub struct CorePlugin;

impl Plugin for CorePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<HitPause>()
            .configure_sets(Update, SimSet::Intent)
            .configure_sets(FixedUpdate, SimSet::Fixed)
            .configure_sets(
                PostUpdate,
                (SimSet::Animate, SimSet::Late, SimSet::Combat).chain(),
            )
            .add_systems(PreUpdate, time::apply_hit_pause);
    }
}
