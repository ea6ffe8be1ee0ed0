//! Motor domain: facing, locomotion modes and grab payloads.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::core::{yaw_dir, yaw_right};
use crate::world::{EdgeId, RopeId, SegmentRef};

/// Four-way facing relative to the camera.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Direction {
    #[default]
    Right,
    Left,
    /// Away from the camera.
    Inside,
    /// Toward the camera.
    Outside,
}

impl Direction {
    pub fn opposite(self) -> Self {
        match self {
            Direction::Right => Direction::Left,
            Direction::Left => Direction::Right,
            Direction::Inside => Direction::Outside,
            Direction::Outside => Direction::Inside,
        }
    }

    /// Right and Left move along the camera's lateral axis.
    pub fn is_lateral(self) -> bool {
        matches!(self, Direction::Right | Direction::Left)
    }

    /// Sign of movement input that walks toward this direction.
    pub fn sign(self) -> f32 {
        match self {
            Direction::Right | Direction::Inside => 1.0,
            Direction::Left | Direction::Outside => -1.0,
        }
    }

    /// Yaw of the walk direction for a camera angle.
    pub fn walk_angle(self, angle: f32) -> f32 {
        match self {
            Direction::Right => angle,
            Direction::Inside => angle + 90.0,
            Direction::Outside => angle - 90.0,
            Direction::Left => angle - 180.0,
        }
    }

    /// World axis that movement input runs along; positive input moves along it.
    pub fn axis(self, angle: f32) -> Vec3 {
        if self.is_lateral() {
            yaw_dir(angle)
        } else {
            yaw_right(angle)
        }
    }

    /// World axis that is zeroed while moving in this direction.
    pub fn cross_axis(self, angle: f32) -> Vec3 {
        if self.is_lateral() {
            yaw_right(angle)
        } else {
            yaw_dir(angle)
        }
    }
}

/// Top-level mode, as reported to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LocomotionMode {
    Normal,
    Dashing,
    EdgeHanging,
    EdgeClimbing,
    RopeHanging,
    RopeClimbing,
    Falling,
    StandingUp,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DashState {
    pub distance: f32,
    /// Normalized progress, 0 to 1.
    pub delta: f32,
    pub covered: f32,
    pub strong: bool,
    /// Characters already knocked by this dash.
    pub hits: Vec<Entity>,
}

impl DashState {
    pub fn new(distance: f32, strong: bool) -> Self {
        Self {
            distance,
            delta: 0.0,
            covered: 0.0,
            strong,
            hits: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeGrab {
    pub edge: EdgeId,
    pub climbing: bool,
    /// The climb clip has started playing.
    pub climb_seen: bool,
    /// Latched once the character faces into the edge while hanging.
    pub was_hanging: bool,
    /// Feet in the edge's local frame, so a moving edge carries the body.
    pub local_feet: Vec3,
    pub last_feet: Vec3,
}

impl EdgeGrab {
    pub fn new(edge: EdgeId, local_feet: Vec3, feet: Vec3) -> Self {
        Self {
            edge,
            climbing: false,
            climb_seen: false,
            was_hanging: false,
            local_feet,
            last_feet: feet,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RopeGrab {
    pub hand: SegmentRef,
    /// Hand grab point in the hand segment's local frame.
    pub local_hand: Vec3,
    pub hip: Option<SegmentRef>,
    pub leg: Option<SegmentRef>,
}

impl RopeGrab {
    pub fn rope(&self) -> RopeId {
        self.hand.rope
    }

    /// Segment that receives swing impulses: leg first, then hip, then hand.
    pub fn swing_segment(&self) -> SegmentRef {
        self.leg.or(self.hip).unwrap_or(self.hand)
    }
}

/// Mutually exclusive locomotion. Illegal pairs such as dashing on a rope cannot exist.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Locomotion {
    #[default]
    Free,
    Dashing(DashState),
    Edge(EdgeGrab),
    Rope(RopeGrab),
}

/// Knock-out lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FallState {
    #[default]
    Upright,
    /// Knocked over, the "Knock Out" pose has not been reached yet.
    Falling { temporary: bool },
    /// On the ground and invincible, waiting for a stand-up request.
    Recovering { temporary: bool },
    StandingUp,
}

impl FallState {
    pub fn is_falling(self) -> bool {
        !matches!(self, FallState::Upright)
    }

    pub fn is_temporary(self) -> bool {
        matches!(
            self,
            FallState::Falling { temporary: true } | FallState::Recovering { temporary: true }
        )
    }
}

/// Last obstacle struck by a forward probe.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WallContact {
    pub collider: Entity,
    /// Points away from the wall.
    pub normal: Vec3,
}

/// Per-frame intents. Setters are last-write-wins; the late phase clears them.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MotorInput {
    pub movement: f32,
    pub climb: f32,
    pub jump: bool,
}

/// Countdown and warm-up timers, in seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotorTimers {
    pub jump: f32,
    pub wall_jump: f32,
    pub second_jump: f32,
    pub post_dash_gravity: f32,
    pub no_movement: f32,
    pub grounded: f32,
    pub invincibility: f32,
    pub hang: f32,
    pub free_rope: f32,
    pub foot: f32,
    pub slide: f32,
    pub land: f32,
    /// Delay before the airborne leg pose follows the run cycle again.
    pub jump_leg: f32,
    pub speed: f32,
}

impl Default for MotorTimers {
    fn default() -> Self {
        Self {
            jump: 0.0,
            wall_jump: 0.0,
            second_jump: 0.0,
            post_dash_gravity: 0.0,
            no_movement: 1.0,
            grounded: 1.0,
            invincibility: 0.0,
            hang: 0.0,
            free_rope: 0.0,
            foot: 0.0,
            slide: 0.0,
            land: 0.0,
            jump_leg: 0.0,
            speed: 0.0,
        }
    }
}

/// Combo and hit-reaction bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CombatState {
    pub wants_attack: bool,
    pub wants_break_combo: bool,
    /// Index of the playing combo step; `None` outside a combo.
    pub combo: Option<usize>,
    /// A single upper-body attack is playing.
    pub single: bool,
    /// The combo's first clip has been entered at least once.
    pub reached_combo: bool,
    /// The current swing has opened its hit window.
    pub has_started: bool,
    pub getting_hit: bool,
    pub was_just_hit: bool,
}

/// Blended IK weights and smoothed target offsets.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LimbState {
    pub left_arm: f32,
    pub right_arm: f32,
    pub head: f32,
    pub hips: f32,
    /// Target offsets from the animated joints, smoothed to avoid popping.
    pub left_hand_offset: Vec3,
    pub right_hand_offset: Vec3,
    pub head_offset: Vec3,
    pub hips_offset: Vec3,
}
