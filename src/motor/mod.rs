//! Motor domain: the 2.5D character motor.
//!
//! A motor is plain data driven in two phases. The fixed phase integrates velocity, gravity,
//! turning and hang adherence; the late phase probes the world, resolves grabs, jumps and
//! attacks, and feeds the animator. Both phases take the body snapshot and their
//! collaborators explicitly, so the whole state machine runs without an `App`.

use bevy::prelude::*;

use crate::core::SimSet;

pub mod body;
pub mod character;
mod combo;
pub mod events;
mod fixed;
mod late;
mod limbs;
mod rope;
pub mod state;
mod systems;

#[cfg(test)]
mod tests;

pub use body::{BodyState, CharacterBody, MotorEnv};
pub use character::{CharacterMotor, DEFAULT_ANGLE};
pub use events::{MotorEvent, MotorListener, MotorMessage};
pub use state::{
    CombatState, DashState, Direction, EdgeGrab, FallState, LimbState, Locomotion, LocomotionMode,
    MotorTimers, RopeGrab, WallContact,
};

pub struct MotorPlugin;

impl Plugin for MotorPlugin {
    fn build(&self, app: &mut App) {
        app.add_message::<MotorMessage>()
            .add_systems(
                FixedUpdate,
                systems::motor_fixed_update
                    .in_set(SimSet::Fixed)
                    .after(crate::world::step_ropes),
            )
            .add_systems(
                PostUpdate,
                (
                    systems::apply_hazards,
                    systems::motor_late_update,
                    systems::sync_collision_layers,
                )
                    .chain()
                    .in_set(SimSet::Late),
            );
    }
}
