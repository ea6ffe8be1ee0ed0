//! Animation domain: the narrow contract between the motor and clip playback.
//!
//! The motor writes typed parameters every late tick and reads back which named state
//! each layer is in. It never drives blending itself.

use bevy::prelude::*;

use crate::core::SimSet;
use crate::ik::Skeleton;

pub mod state_animator;


pub use state_animator::{Clip, Condition, Source, StateAnimator, Transition};

/// Well-known state names the motor gates on.
pub mod states {
    pub const LOCOMOTION: &str = "Locomotion";
    pub const KNOCK_OUT: &str = "Knock Out";
    pub const FALLEN: &str = "Fallen";
    pub const STANDING: &str = "Standing";
    pub const CLIMB: &str = "Climb";
    pub const EDGE_HANG: &str = "Edge Hang";
    pub const ROPE_HANG: &str = "Rope Hang";
    pub const GET_HIT: &str = "Get Hit";
    pub const EMPTY: &str = "Empty";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnimLayer {
    /// Full-body locomotion, falls, climbing and combo attacks.
    Base,
    /// Hit reactions and single attacks layered over locomotion.
    UpperBody,
}

impl AnimLayer {
    pub(crate) fn index(self) -> usize {
        match self {
            AnimLayer::Base => 0,
            AnimLayer::UpperBody => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnimFloat {
    Walk,
    JumpLeg,
    Climb,
    Turn,
    Swing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnimBool {
    IsJumping,
    IsGrounded,
    IsPushing,
    IsHangingOnEdge,
    IsHangingOnRope,
    IsEdgeJumping,
    KnockOut,
    KeepFalling,
    WasJustHit,
    IsSliding,
    IsEdgeClimbing,
    IsOnWall,
    IsRopeClimbing,
    ComboBreak,
    SecondJump,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnimTrigger {
    StartCombo,
    ContinueCombo,
    LateComboStart,
    Attack,
}

/// Playback info of one state on a layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StateInfo<'a> {
    pub name: &'a str,
    /// Elapsed time divided by clip length; exceeds 1 for looping clips.
    pub normalized_time: f32,
    /// Clip length in seconds.
    pub length: f32,
}

impl StateInfo<'_> {
    pub fn is(&self, name: &str) -> bool {
        self.name == name
    }
}

pub trait Animator {
    fn set_float(&mut self, param: AnimFloat, value: f32);
    fn set_bool(&mut self, param: AnimBool, value: bool);
    fn set_trigger(&mut self, trigger: AnimTrigger);
    /// Playback speed multiplier.
    fn set_speed(&mut self, speed: f32);

    fn current_state(&self, layer: AnimLayer) -> StateInfo<'_>;
    /// State being blended into, if a transition is in progress.
    fn next_state(&self, layer: AnimLayer) -> Option<StateInfo<'_>>;

    fn skeleton(&self) -> Option<&Skeleton> {
        None
    }

    fn skeleton_mut(&mut self) -> Option<&mut Skeleton> {
        None
    }

    /// True if `name` is the current or the next state of `layer`.
    fn is_in(&self, layer: AnimLayer, name: &str) -> bool {
        self.current_state(layer).is(name) || self.next_state(layer).is_some_and(|s| s.is(name))
    }
}

pub struct AnimationPlugin;

impl Plugin for AnimationPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(PostUpdate, advance_animators.in_set(SimSet::Animate));
    }
}

/// Advances clip playback and resets the rig to the rest pose of the current body transform.
fn advance_animators(
    time: Res<Time>,
    mut animators: Query<(
        &mut StateAnimator,
        &Transform,
        &crate::motor::CharacterBody,
        Option<&crate::core::CharacterTime>,
    )>,
) {
    let dt = time.delta_secs();

    for (mut animator, transform, body, character_time) in &mut animators {
        let dt = character_time.map_or(dt, |t| t.scaled(dt));
        animator.advance(dt);
        animator.set_pose(body.feet(transform.translation), transform.rotation, body.height);
    }
}
