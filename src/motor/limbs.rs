//! Motor domain: animation parameters, footsteps and procedural limb placement.

use bevy::prelude::*;

use crate::animation::{AnimBool, AnimFloat, AnimLayer};
use crate::core::{EPSILON, closest_point_on_line, countdown, delta_angle, horizontal, lerp, lerp_vec};
use crate::ik::{Joint, LEFT_ARM, RIGHT_ARM, UPPER_BODY, Skeleton};
use crate::world::Climbables;

use super::body::{BodyState, MotorEnv};
use super::character::CharacterMotor;
use super::state::{Direction, FallState, Locomotion, RopeGrab};

const FOOT_DELAY: f32 = 0.3;
/// Airborne time before the leg pose follows the run cycle again after landing.
const JUMP_LEG_DELAY: f32 = 0.5;
/// Rope tilt, in degrees, at which the swing parameter saturates.
const FULL_SWING_ANGLE: f32 = 30.0;
/// Weights below this are treated as off.
const MIN_INTENSITY: f32 = 0.01;

/// Where the limbs want to be this tick, relative to their animated positions.
#[derive(Debug, Clone, Copy, Default)]
struct LimbTargets {
    left_hand: Option<Vec3>,
    right_hand: Option<Vec3>,
    head: Option<Vec3>,
    hips: Option<Vec3>,
}

impl CharacterMotor {
    pub(crate) fn update_animator(&mut self, body: &BodyState, env: &mut MotorEnv<'_>, dt: f32) {
        let animator = &mut *env.animator;

        let cycle = animator
            .current_state(AnimLayer::Base)
            .normalized_time
            .rem_euclid(1.0);
        let stride = if (0.2..0.7).contains(&cycle) { -1.0 } else { 1.0 };
        let mut foot = stride * self.input.movement;
        if self.direction == Direction::Left {
            foot = -foot;
        }

        if self.grounded {
            if self.timers.jump_leg > 0.0 {
                countdown(&mut self.timers.jump_leg, dt);
            } else {
                animator.set_float(AnimFloat::JumpLeg, foot);
            }

            if foot != self.current_foot {
                let moving = horizontal(body.velocity).length() > 1.0;
                if moving && !self.sliding && self.walkable && self.timers.foot <= EPSILON {
                    let joint = if foot < 0.0 { Joint::LeftFoot } else { Joint::RightFoot };
                    let position = animator
                        .skeleton()
                        .map_or(body.feet, |skeleton| skeleton.joint(joint));
                    env.listener.on_step(position);
                    self.timers.foot = FOOT_DELAY;
                }
                self.current_foot = foot;
            }
        } else {
            self.timers.jump_leg = JUMP_LEG_DELAY;
        }

        let hanging_on_edge = self.hanging_on_edge
            && self.edge_grab().is_some_and(|grab| {
                env.climbables.edge(grab.edge).is_some_and(|edge| {
                    let hang_y = edge.top() + self.settings.climbing.edge_height - body.height;
                    (hang_y - body.feet.y).abs() < body.height * 0.5
                })
            });
        let on_rope = self.is_hanging_on_rope();

        animator.set_float(AnimFloat::Walk, self.movement.abs() * self.direction_strength());
        animator.set_bool(AnimBool::IsJumping, self.jumping);
        animator.set_bool(AnimBool::IsGrounded, self.grounded);
        animator.set_bool(AnimBool::IsPushing, self.pushing);
        animator.set_bool(AnimBool::IsHangingOnEdge, hanging_on_edge);
        animator.set_bool(AnimBool::IsHangingOnRope, on_rope);
        animator.set_bool(AnimBool::IsEdgeJumping, self.edge_jumping);
        animator.set_bool(AnimBool::KnockOut, matches!(self.fall, FallState::Falling { .. }));
        animator.set_bool(
            AnimBool::KeepFalling,
            !self.alive || (self.fall.is_falling() && self.fall != FallState::StandingUp),
        );
        animator.set_bool(AnimBool::WasJustHit, self.combat.was_just_hit);
        animator.set_bool(AnimBool::IsSliding, self.sliding);
        animator.set_bool(AnimBool::IsEdgeClimbing, self.is_edge_climbing());
        animator.set_bool(AnimBool::IsOnWall, self.on_wall);
        animator.set_bool(AnimBool::IsRopeClimbing, on_rope && self.rope_climb.abs() > 0.1);
        animator.set_float(AnimFloat::Climb, self.rope_climb);
        animator.set_float(AnimFloat::Turn, delta_angle(self.yaw, self.walk_angle()) / 180.0);
        animator.set_bool(AnimBool::ComboBreak, self.combat.wants_break_combo);
        animator.set_bool(AnimBool::SecondJump, self.second_jumping);
        animator.set_speed(self.speed_up);

        if on_rope {
            animator.set_float(AnimFloat::Swing, self.rope_swing());
        }
    }

    fn rope_swing(&self) -> f32 {
        (self.rope_angle / FULL_SWING_ANGLE).clamp(-1.0, 1.0)
    }

    /// Blends limb weights toward the current mode and bends the rig toward the grab points.
    pub(crate) fn update_ik(&mut self, body: &BodyState, env: &mut MotorEnv<'_>, dt: f32) {
        let mut arms = 0.0;
        let mut head = 0.0;
        let mut hips = 0.0;

        if self.is_hanging_on_rope() {
            hips = 1.0;
            let climb = self.rope_climb.abs().powi(4);
            arms = 1.0 - climb * (1.0 - self.rope_swing().abs());
            head = arms;
        }
        if self.hanging_on_edge && !self.is_edge_climbing() {
            arms = 1.0;
        }

        let limbs = &mut self.limbs;
        limbs.left_arm = lerp(limbs.left_arm, arms, dt * 10.0);
        limbs.right_arm = lerp(limbs.right_arm, arms, dt * 10.0);
        limbs.head = lerp(limbs.head, head, dt * 10.0);
        limbs.hips = lerp(limbs.hips, hips, dt * 10.0);

        let Some(skeleton) = env.animator.skeleton_mut() else {
            return;
        };

        let targets = self.limb_targets(body, env.climbables, skeleton);
        let limbs = &mut self.limbs;
        let smooth = |offset: &mut Vec3, target: Option<Vec3>, joint: Joint| {
            let wanted = target.map_or(Vec3::ZERO, |t| t - skeleton.joint(joint));
            *offset = lerp_vec(*offset, wanted, dt * 4.0);
        };
        smooth(&mut limbs.left_hand_offset, targets.left_hand, Joint::LeftHand);
        smooth(&mut limbs.right_hand_offset, targets.right_hand, Joint::RightHand);
        smooth(&mut limbs.head_offset, targets.head, Joint::Head);
        smooth(&mut limbs.hips_offset, targets.hips, Joint::Hips);

        let limbs = self.limbs;
        let ik = self.settings.ik;

        if ik.hips && limbs.hips > MIN_INTENSITY {
            let distance = limbs.hips_offset.length();
            let t = (limbs.hips * (distance * 4.0 + dt * 4.0)).clamp(0.0, 1.0);
            skeleton.shift(limbs.hips_offset * t);
        }

        if ik.head && limbs.head > MIN_INTENSITY {
            let target = skeleton.joint(Joint::Head) + limbs.head_offset;
            skeleton.solve(&UPPER_BODY, target, limbs.head, ik.upper_body_iterations);
        }

        if ik.arms {
            if limbs.left_arm > MIN_INTENSITY {
                let target = skeleton.joint(Joint::LeftHand) + limbs.left_hand_offset;
                skeleton.solve(&LEFT_ARM, target, limbs.left_arm, ik.left_arm_iterations);
            }
            if limbs.right_arm > MIN_INTENSITY {
                let target = skeleton.joint(Joint::RightHand) + limbs.right_hand_offset;
                skeleton.solve(&RIGHT_ARM, target, limbs.right_arm, ik.right_arm_iterations);
            }
        }
    }

    fn limb_targets(&self, body: &BodyState, climbables: &Climbables, skeleton: &Skeleton) -> LimbTargets {
        match self.locomotion {
            Locomotion::Edge(grab) if self.hanging_on_edge => climbables
                .edge(grab.edge)
                .map(|edge| LimbTargets {
                    left_hand: Some(edge.left_point()),
                    right_hand: Some(edge.right_point()),
                    ..default()
                })
                .unwrap_or_default(),
            Locomotion::Rope(grab) => self.rope_targets(grab, body, climbables, skeleton),
            _ => LimbTargets::default(),
        }
    }

    fn rope_targets(
        &self,
        grab: RopeGrab,
        body: &BodyState,
        climbables: &Climbables,
        skeleton: &Skeleton,
    ) -> LimbTargets {
        let Some(segment) = climbables.segment(grab.hand) else {
            return LimbTargets::default();
        };

        let up = segment.up();
        let forward = segment.forward;
        let side = if self.direction == Direction::Right { -1.0 } else { 1.0 };
        let hand = segment.to_world(grab.local_hand);

        let grip = hand - forward * side * 0.15;
        let across = up.cross(forward);

        let hip_offset = if self.is_rope_climbing() { 0.05 } else { 0.25 };
        let hips = match grab.hip.and_then(|hip| climbables.segment(hip)) {
            Some(hip_segment) => {
                let on_rope =
                    closest_point_on_line(hip_segment.bottom, hip_segment.top, body.hip_point());
                on_rope + hip_segment.forward * side * hip_offset
            }
            None => hand + (body.hip_point() - body.hand_point()) - up * 0.2 + forward * side * hip_offset,
        };

        let neck_length = skeleton.joint(Joint::Head).distance(skeleton.joint(Joint::Hips));
        let head_guess = hand + forward * side * 0.3 + up * (body.height * 0.2);
        let head = (head_guess - hips)
            .try_normalize()
            .map(|direction| hips + direction * neck_length);

        LimbTargets {
            left_hand: Some(grip - up * 0.1 + across * 0.03),
            right_hand: Some(grip + up * 0.1 - across * 0.03),
            head,
            hips: Some(hips),
        }
    }
}
