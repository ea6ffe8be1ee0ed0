//! Motor domain: the character motor component, its commands and queries.

use bevy::prelude::*;

use crate::core::{EPSILON, delta_angle, yaw_dir, yaw_right};
use crate::settings::MotorSettings;
use crate::world::{EdgeId, RopeId, SegmentRef};

use super::state::{
    CombatState, DashState, Direction, EdgeGrab, FallState, LimbState, Locomotion,
    LocomotionMode, MotorInput, MotorTimers, RopeGrab, WallContact,
};

/// Default camera angle: lateral movement runs along world +X.
pub const DEFAULT_ANGLE: f32 = 90.0;

/// Seconds of invincibility granted once a knock-out reaches the ground.
pub(crate) const RECOVERY_INVINCIBILITY: f32 = 1.0;

#[derive(Component, Debug, Clone)]
pub struct CharacterMotor {
    pub settings: MotorSettings,
    /// Whether fall volumes can knock this character over.
    pub can_be_made_to_fall: bool,

    pub(crate) direction: Direction,
    pub(crate) angle: f32,
    pub(crate) next_angle: f32,
    pub(crate) yaw: f32,
    pub(crate) alive: bool,

    pub(crate) grounded: bool,
    pub(crate) on_slope: bool,
    pub(crate) walkable: bool,
    pub(crate) sliding: bool,
    pub(crate) pushing: bool,
    pub(crate) wall_sliding: bool,
    pub(crate) on_wall: bool,
    pub(crate) wall: Option<WallContact>,
    pub(crate) obstacle: Option<Entity>,

    pub(crate) locomotion: Locomotion,
    pub(crate) hanging_on_edge: bool,
    pub(crate) fall: FallState,
    pub(crate) wants_stand_up: bool,

    pub(crate) jumping: bool,
    pub(crate) edge_jumping: bool,
    pub(crate) second_jumping: bool,
    pub(crate) can_second_jump: bool,

    pub(crate) edge_contact: Option<EdgeId>,
    pub(crate) rope_contacts: Vec<SegmentRef>,
    /// Rope left by a rope jump, ignored until the free-rope timer runs out.
    pub(crate) free_rope: Option<RopeId>,
    pub(crate) rope_angle: f32,
    pub(crate) rope_climb: f32,

    pub(crate) speed_up: f32,
    pub(crate) input: MotorInput,
    pub(crate) movement: f32,
    pub(crate) previous_jump: bool,
    pub(crate) wants_jump: bool,
    pub(crate) current_foot: f32,

    pub(crate) combat: CombatState,
    pub(crate) timers: MotorTimers,
    pub(crate) limbs: LimbState,
}

impl Default for CharacterMotor {
    fn default() -> Self {
        Self::new(MotorSettings::default())
    }
}

impl CharacterMotor {
    pub fn new(settings: MotorSettings) -> Self {
        Self {
            settings,
            can_be_made_to_fall: true,
            direction: Direction::Right,
            angle: DEFAULT_ANGLE,
            next_angle: DEFAULT_ANGLE,
            yaw: Direction::Right.walk_angle(DEFAULT_ANGLE),
            alive: true,
            grounded: false,
            on_slope: false,
            walkable: false,
            sliding: false,
            pushing: false,
            wall_sliding: false,
            on_wall: false,
            wall: None,
            obstacle: None,
            locomotion: Locomotion::Free,
            hanging_on_edge: false,
            fall: FallState::Upright,
            wants_stand_up: false,
            jumping: false,
            edge_jumping: false,
            second_jumping: false,
            can_second_jump: false,
            edge_contact: None,
            rope_contacts: Vec::new(),
            free_rope: None,
            rope_angle: 0.0,
            rope_climb: 0.0,
            speed_up: 1.0,
            input: MotorInput::default(),
            movement: 0.0,
            previous_jump: false,
            wants_jump: false,
            current_foot: 0.0,
            combat: CombatState::default(),
            timers: MotorTimers::default(),
            limbs: LimbState::default(),
        }
    }

    /// Starts facing `direction` under the camera `angle`, already turned.
    pub fn facing(mut self, direction: Direction, angle: f32) -> Self {
        self.direction = direction;
        self.angle = angle;
        self.next_angle = angle;
        self.yaw = direction.walk_angle(angle);
        self
    }

    // ---------------------------------------------------------------------
    // Intents
    // ---------------------------------------------------------------------

    /// Movement along the direction's axis, in `[-1, 1]`.
    pub fn input_movement(&mut self, value: f32) {
        self.input.movement = value.clamp(-1.0, 1.0);
    }

    /// Climb intent on ropes, in `[-1, 1]`.
    pub fn input_climb(&mut self, value: f32) {
        self.input.climb = value.clamp(-1.0, 1.0);
    }

    /// Held jump button. A jump fires on the press edge only.
    pub fn input_jump(&mut self) {
        self.input.jump = true;
    }

    pub fn input_attack(&mut self) {
        self.combat.wants_attack = true;
    }

    pub fn input_direction(&mut self, direction: Direction) {
        self.direction = direction;
    }

    /// Turns the camera frame the character walks in. Clears any pending next angle.
    pub fn set_angle(&mut self, angle: f32) {
        self.angle = angle;
        self.next_angle = angle;
    }

    /// Angle the camera will turn to if the character keeps walking.
    pub fn input_next_angle(&mut self, angle: f32) {
        self.next_angle = angle;
    }

    pub fn cancel_next_angle(&mut self) {
        self.next_angle = self.angle;
    }

    // ---------------------------------------------------------------------
    // Commands
    // ---------------------------------------------------------------------

    /// Dashes `distance` forward along the walk axis. Ignored for non-positive
    /// distances and while falling or hanging.
    pub fn perform_dash(&mut self, distance: f32, strong: bool) {
        if distance <= EPSILON || self.fall.is_falling() {
            return;
        }
        if !self.has_free_hands() {
            return;
        }
        debug!("Dash {:.2}m (strong: {})", distance, strong);
        self.locomotion = Locomotion::Dashing(DashState::new(distance, strong));
    }

    pub fn cancel_dash(&mut self) {
        if matches!(self.locomotion, Locomotion::Dashing(_)) {
            self.locomotion = Locomotion::Free;
        }
    }

    /// Temporarily multiplies speeds, accelerations and turning.
    pub fn speed_up(&mut self, scale: f32, duration: f32) {
        self.speed_up = scale.max(0.0);
        self.timers.speed = duration.max(0.0);
    }

    pub fn reset_speed(&mut self) {
        self.speed_up = 1.0;
        self.timers.speed = 0.0;
    }

    /// Knocks the character over. No effect while invincible.
    pub fn knock_out(&mut self, temporary: bool) {
        if self.is_invincible() {
            return;
        }
        let temporary = temporary && self.alive;

        self.fall = match self.fall {
            FallState::Upright => {
                debug!("Knock out (temporary: {})", temporary);
                self.locomotion = Locomotion::Free;
                self.edge_contact = None;
                self.hanging_on_edge = false;
                self.rope_angle = 0.0;
                FallState::Falling { temporary }
            }
            FallState::Falling { .. } => FallState::Falling { temporary },
            FallState::Recovering { .. } => FallState::Recovering { temporary },
            FallState::StandingUp if !temporary => FallState::Recovering { temporary: false },
            FallState::StandingUp => FallState::StandingUp,
        };
    }

    /// Requests standing up from a knock-out. Dead characters stay down.
    pub fn stand_up(&mut self) {
        if self.alive {
            self.wants_stand_up = true;
        }
    }

    /// Permanent knock-out.
    pub fn die(&mut self) {
        if !self.alive {
            return;
        }
        debug!("Motor died");
        self.alive = false;
        self.wants_stand_up = false;
        self.timers.invincibility = 0.0;
        self.knock_out(false);
    }

    /// Latches a hit reaction for the next late update.
    pub fn on_hit(&mut self) {
        if !self.combat.getting_hit {
            self.combat.was_just_hit = true;
        }
    }

    // ---------------------------------------------------------------------
    // Queries
    // ---------------------------------------------------------------------

    pub fn mode(&self) -> LocomotionMode {
        match self.fall {
            FallState::Falling { .. } | FallState::Recovering { .. } => {
                return LocomotionMode::Falling;
            }
            FallState::StandingUp => return LocomotionMode::StandingUp,
            FallState::Upright => {}
        }

        match &self.locomotion {
            Locomotion::Free => LocomotionMode::Normal,
            Locomotion::Dashing(_) => LocomotionMode::Dashing,
            Locomotion::Edge(grab) if grab.climbing => LocomotionMode::EdgeClimbing,
            Locomotion::Edge(_) if self.hanging_on_edge => LocomotionMode::EdgeHanging,
            Locomotion::Edge(_) => LocomotionMode::Normal,
            Locomotion::Rope(_) if self.is_rope_climbing() => LocomotionMode::RopeClimbing,
            Locomotion::Rope(_) => LocomotionMode::RopeHanging,
        }
    }

    pub fn locomotion(&self) -> &Locomotion {
        &self.locomotion
    }

    pub fn fall_state(&self) -> FallState {
        self.fall
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn angle(&self) -> f32 {
        self.angle
    }

    pub fn next_angle(&self) -> f32 {
        self.next_angle
    }

    /// Current facing yaw in degrees.
    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn walk_angle(&self) -> f32 {
        self.direction.walk_angle(self.angle)
    }

    /// Camera-relative lateral axis, pointing right on screen.
    pub fn camera_right(&self) -> Vec3 {
        yaw_dir(self.angle)
    }

    /// Camera-relative depth axis, pointing into the screen.
    pub fn in_out(&self) -> Vec3 {
        yaw_right(self.angle)
    }

    /// World axis movement input runs along.
    pub fn walk_axis(&self) -> Vec3 {
        self.direction.axis(self.angle)
    }

    pub fn forward(&self) -> Vec3 {
        yaw_dir(self.yaw)
    }

    /// 1 while facing the walk direction, fading to 0 as the facing turns past 90 degrees.
    pub fn direction_strength(&self) -> f32 {
        let out_of_180 = delta_angle(self.yaw, self.walk_angle()).abs() / 180.0;
        let out_of_last_90 = (out_of_180 - 0.5).clamp(0.0, 1.0) * 2.0;
        (1.0 - out_of_last_90).clamp(0.0, 1.0)
    }

    pub fn is_facing_walk_direction(&self) -> bool {
        self.direction_strength() > 0.5
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    pub fn is_grounded(&self) -> bool {
        self.grounded
    }

    pub fn is_on_slope(&self) -> bool {
        self.on_slope
    }

    pub fn is_on_walkable_surface(&self) -> bool {
        self.walkable
    }

    pub fn is_sliding(&self) -> bool {
        self.sliding
    }

    pub fn is_wall_sliding(&self) -> bool {
        self.wall_sliding
    }

    pub fn is_pushing(&self) -> bool {
        self.pushing
    }

    pub fn is_on_wall(&self) -> bool {
        self.on_wall
    }

    pub fn wall(&self) -> Option<WallContact> {
        self.wall
    }

    pub fn is_blocked(&self) -> bool {
        self.obstacle.is_some()
    }

    pub fn obstacle(&self) -> Option<Entity> {
        self.obstacle
    }

    pub fn is_jumping(&self) -> bool {
        self.jumping
    }

    pub fn is_second_jumping(&self) -> bool {
        self.second_jumping
    }

    pub fn is_dashing(&self) -> bool {
        matches!(self.locomotion, Locomotion::Dashing(_))
    }

    pub fn dash(&self) -> Option<&DashState> {
        match &self.locomotion {
            Locomotion::Dashing(dash) => Some(dash),
            _ => None,
        }
    }

    pub fn edge_grab(&self) -> Option<EdgeGrab> {
        match self.locomotion {
            Locomotion::Edge(grab) => Some(grab),
            _ => None,
        }
    }

    pub fn rope_grab(&self) -> Option<RopeGrab> {
        match self.locomotion {
            Locomotion::Rope(grab) => Some(grab),
            _ => None,
        }
    }

    pub fn is_hanging_on_edge(&self) -> bool {
        self.hanging_on_edge
    }

    pub fn is_edge_climbing(&self) -> bool {
        self.edge_grab().is_some_and(|g| g.climbing)
    }

    pub fn is_edge_jumping(&self) -> bool {
        self.edge_jumping
    }

    pub fn is_hanging_on_rope(&self) -> bool {
        self.rope_grab().is_some()
    }

    pub fn is_rope_climbing(&self) -> bool {
        self.is_hanging_on_rope() && self.rope_climb.abs() > 0.5
    }

    pub fn rope_climb(&self) -> f32 {
        self.rope_climb
    }

    pub fn rope_angle(&self) -> f32 {
        self.rope_angle
    }

    pub fn is_falling(&self) -> bool {
        self.fall.is_falling()
    }

    pub fn is_standing_up(&self) -> bool {
        self.fall == FallState::StandingUp
    }

    /// Knocked-out or dead bodies only collide with level geometry.
    pub fn uses_fallen_layer(&self) -> bool {
        !self.alive || (self.fall.is_falling() && !self.fall.is_temporary())
    }

    pub fn is_invincible(&self) -> bool {
        self.timers.invincibility > EPSILON
    }

    pub fn is_getting_hit(&self) -> bool {
        self.combat.getting_hit
    }

    /// True while a combo or a single attack is playing.
    pub fn is_attacking(&self) -> bool {
        self.combat.combo.is_some() || self.combat.single
    }

    pub fn combo_index(&self) -> Option<usize> {
        self.combat.combo
    }

    pub fn wants_attack(&self) -> bool {
        self.combat.wants_attack
    }

    /// Movement intents only steer living characters that are on their feet.
    pub fn accepts_movement(&self) -> bool {
        self.alive && !self.fall.is_falling()
    }

    /// Alive, upright and with both hands free.
    pub fn can_attack(&self) -> bool {
        self.alive && !self.fall.is_falling() && self.has_free_hands()
    }

    /// False while hanging from or climbing an edge, or holding a rope.
    pub fn has_free_hands(&self) -> bool {
        match self.locomotion {
            Locomotion::Edge(grab) => !grab.climbing && !self.hanging_on_edge,
            Locomotion::Rope(_) => false,
            Locomotion::Free | Locomotion::Dashing(_) => true,
        }
    }

    pub fn speed_multiplier(&self) -> f32 {
        self.speed_up
    }

    pub fn movement(&self) -> f32 {
        self.movement
    }

    pub fn limbs(&self) -> &LimbState {
        &self.limbs
    }

    pub fn timers(&self) -> &MotorTimers {
        &self.timers
    }
}
