//! Debug domain: state for debug tooling.

use bevy::prelude::*;

/// Resource tracking debug mode state
#[derive(Resource, Debug)]
pub struct DebugState {
    /// Draw ropes, edges and hazard volumes
    pub show_world: bool,
    /// Draw character capsules, facing and grab state
    pub show_characters: bool,
    /// Draw the IK rig of every animated character
    pub show_skeletons: bool,
}

impl Default for DebugState {
    fn default() -> Self {
        Self {
            show_world: true,
            show_characters: true,
            show_skeletons: false,
        }
    }
}
