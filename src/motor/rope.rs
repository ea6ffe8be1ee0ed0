//! Motor domain: rope grab resolution and hanging.
//!
//! Hand, hip and leg each resolve to the first touching segment whose span along its own
//! axis contains that body point. Only the hand grab holds the character; hip and leg
//! grabs shape the swing and the pose.

use bevy::prelude::*;

use crate::core::{EPSILON, lerp, lerp_vec};
use crate::world::{Climbables, SegmentRef};

use super::body::{BodyState, MotorEnv};
use super::character::CharacterMotor;
use super::state::{Direction, Locomotion, RopeGrab};

/// Keeps a climbing hand this far inside the end segments of a rope.
const END_MARGIN: f32 = 0.05;

impl CharacterMotor {
    /// First contact segment spanning the height of `point`.
    pub(crate) fn ideal_segment(&self, climbables: &Climbables, point: Vec3) -> Option<SegmentRef> {
        self.rope_contacts.iter().copied().find(|&segment| {
            climbables
                .segment(segment)
                .is_some_and(|s| s.spans_height(point))
        })
    }

    pub(crate) fn update_rope(&mut self, body: &mut BodyState, env: &mut MotorEnv<'_>, dt: f32) {
        self.rope_contacts = env.climbables.rope_contacts(&body.capsule());

        let climbables = &*env.climbables;
        let hand = self.ideal_segment(climbables, body.hand_point());
        let hip = self.ideal_segment(climbables, body.hip_point());
        let leg = self.ideal_segment(climbables, body.leg_point());

        let held = self.rope_grab();
        let may_hold = matches!(self.locomotion, Locomotion::Free | Locomotion::Rope(_))
            && !self.fall.is_falling();
        let can_change = may_hold && hand.is_some() && (self.is_rope_climbing() || held.is_none());

        if let Some(new_hand) = hand.filter(|_| can_change) {
            let ignored = self.timers.free_rope > EPSILON
                && self.free_rope == Some(new_hand.rope)
                && held.is_none_or(|grab| grab.rope() != new_hand.rope);

            if !ignored {
                self.grab_segment(new_hand, held, body, climbables);
            }
        }

        let Locomotion::Rope(mut grab) = self.locomotion else {
            self.rope_angle = 0.0;
            return;
        };

        if hand.is_none() {
            self.release_rope(grab);
            return;
        }

        if can_change || grab.leg.is_none() {
            grab.leg = leg;
        }
        if can_change {
            grab.hip = hip;
        }

        self.timers.wall_jump = 0.0;
        self.rope_angle = lerp(self.rope_angle, self.current_rope_angle(climbables, grab.hand), dt * 10.0);

        let Some(segment) = climbables.segment(grab.hand) else {
            warn!("Held rope segment {:?} no longer exists", grab.hand);
            self.release_rope(grab);
            return;
        };

        if self.rope_climb.abs() > EPSILON {
            let shift = self.rope_up() * self.rope_climb * self.settings.climbing.rope_climb_speed * dt;
            grab.local_hand += segment.rotation().inverse() * shift;
            grab.local_hand.y = self.clamp_to_rope_ends(climbables, grab.hand, grab.local_hand.y, segment.length());
        }

        let point = segment.to_world(grab.local_hand);
        let depth = self.in_out();
        let mut ideal = point + depth * (body.feet.dot(depth) - point.dot(depth));

        let offset = if self.is_rope_climbing() { 0.15 } else { 0.3 };
        if self.direction == Direction::Left {
            ideal += self.rope_forward() * offset;
        } else {
            ideal -= self.rope_forward() * offset;
        }
        ideal += body.feet - body.hand_point();

        let follow = dt * 30.0 * (self.timers.hang * 2.0 + 0.1).clamp(0.0, 1.0);
        body.feet = lerp_vec(body.feet, ideal, follow);
        body.velocity = Vec3::ZERO;

        if self.is_rope_climbing() && !self.rope_contacts.contains(&grab.hand) {
            self.release_rope(grab);
            return;
        }

        self.locomotion = Locomotion::Rope(grab);
    }

    /// Switches the hand to `segment`, keeping the world point it already holds.
    fn grab_segment(
        &mut self,
        segment: SegmentRef,
        held: Option<RopeGrab>,
        body: &BodyState,
        climbables: &Climbables,
    ) {
        let Some(target) = climbables.segment(segment) else {
            return;
        };

        let point = held
            .and_then(|grab| {
                climbables
                    .segment(grab.hand)
                    .map(|s| s.to_world(grab.local_hand))
            })
            .unwrap_or(body.hand_point());

        if held.is_none() {
            debug!("Grabbed rope {:?} at segment {}", segment.rope, segment.index);
        }

        self.locomotion = Locomotion::Rope(RopeGrab {
            hand: segment,
            local_hand: target.to_local(point),
            hip: held.and_then(|grab| grab.hip),
            leg: held.and_then(|grab| grab.leg),
        });
    }

    /// Lets go of the rope; the same rope is ignored until the free-rope timer expires.
    pub(crate) fn release_rope(&mut self, grab: RopeGrab) {
        debug!("Released rope {:?}", grab.rope());
        self.free_rope = Some(grab.rope());
        self.timers.free_rope = self.settings.climbing.rope_ignore_time;
        self.locomotion = Locomotion::Free;
        self.rope_angle = 0.0;
    }

    fn clamp_to_rope_ends(&self, climbables: &Climbables, segment: SegmentRef, y: f32, length: f32) -> f32 {
        let half = (length * 0.5 - END_MARGIN).max(0.0);
        let has_above = segment.index > 0;
        let has_below = climbables
            .rope(segment.rope)
            .is_some_and(|rope| segment.index + 1 < rope.segment_count());

        let y = if has_above { y } else { y.min(half) };
        if has_below { y } else { y.max(-half) }
    }

    /// Tilt of the held rope in the camera plane, in degrees. Positive leans the rope
    /// top toward the camera's left.
    pub(crate) fn current_rope_angle(&self, climbables: &Climbables, hand: SegmentRef) -> f32 {
        let Some(rope) = climbables.rope(hand.rope) else {
            return 0.0;
        };
        let offset = rope.offset_to_root(hand.index);
        let along = offset.dot(self.camera_right());
        let up = offset.dot(Vec3::Y);

        if along.abs() < EPSILON && up.abs() < EPSILON {
            return 0.0;
        }
        (-along).atan2(up).to_degrees()
    }
}
