//! Settings domain: tuning records for locomotion, climbing and IK.
//!
//! Every record deserializes with `#[serde(default)]`, so profile files only need to
//! name the values they change.

use serde::{Deserialize, Serialize};


/// Ground locomotion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WalkSettings {
    /// Maximum walking speed.
    pub speed: f32,
    pub acceleration: f32,
    pub deceleration: f32,
    /// Rate at which the facing yaw chases the walk angle.
    pub turn_speed: f32,
    /// Extra reach of the obstacle probes beyond the capsule radius.
    pub obstacle_threshold: f32,
    /// Extra reach of the push probe beyond the capsule radius.
    pub push_threshold: f32,
}

impl Default for WalkSettings {
    fn default() -> Self {
        Self {
            speed: 5.0,
            acceleration: 10.0,
            deceleration: 20.0,
            turn_speed: 7.0,
            obstacle_threshold: 0.1,
            push_threshold: 0.05,
        }
    }
}

/// Airborne control, jumping and gravity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AirSettings {
    pub speed: f32,
    pub acceleration: f32,
    pub deceleration: f32,
    pub ground_jump_strength: f32,
    pub air_jump_strength: f32,
    pub gravity: f32,
    /// Distance below the feet at which the character still counts as grounded.
    pub ground_threshold: f32,
}

impl Default for AirSettings {
    fn default() -> Self {
        Self {
            speed: 4.0,
            acceleration: 5.0,
            deceleration: 5.0,
            ground_jump_strength: 10.0,
            air_jump_strength: 10.0,
            gravity: 20.0,
            ground_threshold: 0.2,
        }
    }
}

/// Wall contact while airborne.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WallSettings {
    /// Horizontal push away from the wall on a wall jump.
    pub jump_strength: f32,
    /// Time after a wall jump during which air control is suspended.
    pub jump_time: f32,
    /// Gravity used while sliding down a wall.
    pub gravity: f32,
    pub threshold: f32,
    /// Minimum surface inclination, in degrees, for a hit to count as a wall.
    pub min_angle: f32,
}

impl Default for WallSettings {
    fn default() -> Self {
        Self {
            jump_strength: 5.0,
            jump_time: 0.5,
            gravity: 5.0,
            threshold: 0.05,
            min_angle: 80.0,
        }
    }
}

/// Slope classification, all angles in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlopeSettings {
    pub min_slope_angle: f32,
    pub max_slope_angle: f32,
    pub max_walk_angle: f32,
    pub slide_speed: f32,
}

impl Default for SlopeSettings {
    fn default() -> Self {
        Self {
            min_slope_angle: 25.0,
            max_slope_angle: 60.0,
            max_walk_angle: 35.0,
            slide_speed: 4.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashSettings {
    pub speed: f32,
    /// Force along the dasher's forward applied to characters knocked by a strong dash.
    pub push_forward: f32,
    /// Upward force applied to characters knocked by a strong dash.
    pub push_up: f32,
    /// Airborne time after a dash during which gravity is suspended.
    pub no_gravity_time: f32,
}

impl Default for DashSettings {
    fn default() -> Self {
        Self {
            speed: 15.0,
            push_forward: 200.0,
            push_up: 200.0,
            no_gravity_time: 0.35,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClimbSettings {
    /// Hang line offset relative to the top of an edge.
    pub edge_height: f32,
    pub swing_speed: f32,
    pub rope_climb_speed: f32,
    /// Cap on the rope velocity inherited by a rope jump.
    pub rope_jump_strength: f32,
    /// Time after leaving a rope during which the same rope cannot be grabbed again.
    pub rope_ignore_time: f32,
}

impl Default for ClimbSettings {
    fn default() -> Self {
        Self {
            edge_height: 0.0,
            swing_speed: 40.0,
            rope_climb_speed: 2.0,
            rope_jump_strength: 10.0,
            rope_ignore_time: 1.0,
        }
    }
}

/// Solver quality and per-chain toggles for procedural limb placement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IkSettings {
    pub left_arm_iterations: u32,
    pub right_arm_iterations: u32,
    pub upper_body_iterations: u32,
    pub arms: bool,
    pub head: bool,
    pub hips: bool,
}

impl Default for IkSettings {
    fn default() -> Self {
        Self {
            left_arm_iterations: 2,
            right_arm_iterations: 2,
            upper_body_iterations: 2,
            arms: true,
            head: true,
            hips: true,
        }
    }
}

/// All motor tuning for one character.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MotorSettings {
    pub walk: WalkSettings,
    pub air: AirSettings,
    pub wall: WallSettings,
    pub slope: SlopeSettings,
    pub dash: DashSettings,
    pub climbing: ClimbSettings,
    pub ik: IkSettings,
}

impl MotorSettings {
    /// Names of fields holding values that must be strictly positive but are not.
    pub fn non_positive_fields(&self) -> Vec<&'static str> {
        let checks = [
            ("walk.speed", self.walk.speed),
            ("walk.acceleration", self.walk.acceleration),
            ("walk.turn_speed", self.walk.turn_speed),
            ("air.speed", self.air.speed),
            ("air.gravity", self.air.gravity),
            ("dash.speed", self.dash.speed),
            ("wall.jump_time", self.wall.jump_time),
        ];

        checks
            .into_iter()
            .filter(|(_, value)| *value <= 0.0)
            .map(|(name, _)| name)
            .collect()
    }
}
