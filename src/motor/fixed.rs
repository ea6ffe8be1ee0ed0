//! Motor domain: fixed-timestep integration (movement, gravity, turning, edge adherence).

use bevy::prelude::*;

use crate::animation::{AnimLayer, states};
use crate::core::{EPSILON, delta_angle, lerp, lerp_vec, smoothstep, yaw_dir};
use crate::world::{ColliderKind, Edge, QueryFilter};

use super::body::{BodyState, MotorEnv};
use super::character::CharacterMotor;
use super::state::{Direction, Locomotion};

/// Extra reach of the strong-dash overlap beyond the capsule radius.
const DASH_HIT_MARGIN: f32 = 0.5;
/// Yaw difference past which turning keeps a fixed rotation sense.
const TURN_WRAP_ANGLE: f32 = 160.0;

impl CharacterMotor {
    /// One physics tick. Writes the body velocity and, while hanging or climbing,
    /// the feet position directly.
    pub fn fixed_update(&mut self, body: &mut BodyState, env: &mut MotorEnv<'_>, dt: f32) {
        self.refresh_edge_hang(body, env);
        self.apply_movement(body, env, dt);
        self.apply_gravity(body, env, dt);
        self.apply_turn(dt);
        self.apply_edge(body, env, dt);
    }

    /// Recomputes whether the grabbed edge actually holds the character.
    pub(crate) fn refresh_edge_hang(&mut self, body: &BodyState, env: &MotorEnv<'_>) {
        let forward = self.forward();
        let Locomotion::Edge(grab) = &mut self.locomotion else {
            self.hanging_on_edge = false;
            return;
        };
        let Some(edge) = env.climbables.edge(grab.edge) else {
            self.hanging_on_edge = false;
            return;
        };

        self.hanging_on_edge = if edge.top() < body.feet.y + 0.5 && !grab.climbing {
            false
        } else if !grab.was_hanging && body.velocity.y > 0.0 {
            false
        } else {
            grab.was_hanging = forward.dot(edge.right()) > 0.0;
            grab.was_hanging
        };
    }

    fn apply_movement(&mut self, body: &mut BodyState, env: &mut MotorEnv<'_>, dt: f32) {
        if self.is_dashing() {
            self.apply_dash(body, env, dt);
            return;
        }

        if self.hanging_on_edge {
            self.request_edge_climb(env);
            return;
        }

        if let Locomotion::Rope(grab) = self.locomotion {
            body.velocity = Vec3::ZERO;
            let impulse = self.rope_forward() * self.movement * dt * self.settings.climbing.swing_speed;
            let segment = grab.swing_segment();
            if let Some(rope) = env.climbables.rope_mut(segment.rope) {
                rope.apply_velocity(segment.index, impulse);
            }
            return;
        }

        self.apply_free_movement(body, dt);
    }

    fn apply_dash(&mut self, body: &mut BodyState, env: &mut MotorEnv<'_>, dt: f32) {
        let walk = yaw_dir(self.walk_angle());
        let forward = self.forward();
        let settings = self.settings.dash;
        let Locomotion::Dashing(dash) = &mut self.locomotion else {
            return;
        };

        dash.delta = (dash.delta + dt * settings.speed / dash.distance).min(1.0);
        let distance = smoothstep(dash.delta) * dash.distance;
        let offset = distance - dash.covered;

        if dt > EPSILON {
            body.velocity = walk * offset / dt;
        }
        dash.covered = distance;

        if dash.strong {
            let filter = QueryFilter::solids_excluding(body.entity);
            let overlaps =
                env.geometry
                    .overlap_sphere(body.center(), body.radius + DASH_HIT_MARGIN, &filter);
            for overlap in overlaps {
                if overlap.kind != ColliderKind::Character || dash.hits.contains(&overlap.collider) {
                    continue;
                }
                let impulse = (forward * settings.push_forward + Vec3::Y * settings.push_up) * dt;
                env.listener.on_dash_impact(overlap.collider, impulse);
                dash.hits.push(overlap.collider);
            }
        }

        self.timers.post_dash_gravity = settings.no_gravity_time;

        if dash.delta >= 1.0 {
            self.locomotion = Locomotion::Free;
        }
    }

    fn request_edge_climb(&mut self, env: &MotorEnv<'_>) {
        if self.timers.hang <= 0.5 || self.edge_jumping || self.movement.abs() <= 0.5 {
            return;
        }
        let push = self.walk_axis() * self.movement;
        let Locomotion::Edge(grab) = &mut self.locomotion else {
            return;
        };
        let Some(edge) = env.climbables.edge(grab.edge) else {
            return;
        };

        if push.dot(edge.right()) > 0.5 && !grab.climbing {
            debug!("Edge climb started");
            grab.climbing = true;
        }
    }

    fn apply_free_movement(&mut self, body: &mut BodyState, dt: f32) {
        let axis = self.walk_axis();
        let along = body.velocity.dot(axis);

        let (speed, acceleration, deceleration) = if self.grounded {
            let walk = &self.settings.walk;
            (walk.speed, walk.acceleration, walk.deceleration)
        } else {
            let air = &self.settings.air;
            (air.speed, air.acceleration, air.deceleration)
        };
        let speed = speed * self.speed_up;
        let acceleration = acceleration * self.speed_up;

        // Down or dead bodies only slow down
        let movement = if self.accepts_movement() { self.movement } else { 0.0 };

        let mut can_move = !self.grounded || self.walkable;
        if self.sliding && movement * self.direction.sign() > 0.5 {
            can_move = true;
        }

        // Air control is suspended for a moment after a wall jump
        if !self.grounded && self.timers.wall_jump > EPSILON {
            return;
        }

        let along = if movement.abs() > EPSILON && can_move {
            lerp(
                along,
                movement * speed * self.direction_strength(),
                dt * acceleration,
            )
        } else if self.timers.no_movement > 0.1 && self.grounded {
            lerp(along, 0.0, dt * 30.0)
        } else {
            lerp(along, 0.0, dt * deceleration)
        };

        body.velocity = axis * along + Vec3::Y * body.velocity.y;
    }

    fn apply_gravity(&mut self, body: &mut BodyState, env: &MotorEnv<'_>, dt: f32) {
        if !self.alive {
            body.velocity.y -= self.settings.air.gravity * dt;
            return;
        }

        match self.locomotion {
            Locomotion::Edge(grab) if grab.climbing => {
                body.velocity = Vec3::ZERO;
                return;
            }
            Locomotion::Edge(grab) if self.hanging_on_edge => {
                if let Some(edge) = env.climbables.edge(grab.edge) {
                    self.hold_hang_line(body, edge, dt);
                }
                return;
            }
            Locomotion::Rope(_) => return,
            _ => {}
        }

        if !self.grounded && self.timers.post_dash_gravity > EPSILON {
            return;
        }

        let gravity = if self.on_wall && body.velocity.y < 0.0 {
            self.settings.wall.gravity
        } else {
            self.settings.air.gravity
        };

        if self.timers.no_movement < 0.1
            || !self.grounded
            || self.on_slope
            || self.timers.grounded < 0.2
        {
            // Stronger pull while standing keeps the body glued to slopes
            let scale = if self.grounded && self.timers.jump < 0.1 {
                if self.is_dashing() { 10.0 } else { 2.0 }
            } else {
                1.0
            };
            body.velocity.y -= gravity * scale * dt;
        }
    }

    /// Falls onto the hang line under an edge and stays there.
    fn hold_hang_line(&self, body: &mut BodyState, edge: &Edge, dt: f32) {
        body.velocity.y -= self.settings.air.gravity * dt;

        let min_y = edge.top() + self.settings.climbing.edge_height - body.height;
        if body.feet.y < min_y + 0.1 {
            body.velocity = lerp_vec(body.velocity, Vec3::ZERO, dt * 30.0);
        }
        if body.feet.y <= min_y {
            body.feet.y = min_y;
            body.velocity.y = body.velocity.y.max(0.0);
        }
    }

    fn apply_turn(&mut self, dt: f32) {
        if self.fall.is_falling() {
            return;
        }

        let mut delta = delta_angle(self.yaw, self.walk_angle());
        if delta.abs() > TURN_WRAP_ANGLE {
            match self.direction {
                Direction::Left | Direction::Outside | Direction::Inside if delta < 0.0 => {
                    delta += 360.0;
                }
                Direction::Right if delta > 0.0 => delta -= 360.0,
                _ => {}
            }
        }

        let t = (dt * self.settings.walk.turn_speed * self.speed_up).clamp(0.0, 1.0);
        self.yaw = delta_angle(0.0, self.yaw + delta * t);
    }

    fn apply_edge(&mut self, body: &mut BodyState, env: &MotorEnv<'_>, dt: f32) {
        let hanging = self.hanging_on_edge;
        let Locomotion::Edge(grab) = self.locomotion else {
            return;
        };
        let Some(edge) = env.climbables.edge(grab.edge) else {
            return;
        };

        if grab.climbing {
            let current = env.animator.current_state(AnimLayer::Base);
            if current.is(states::CLIMB) && current.length > EPSILON {
                body.feet += (Vec3::Y * body.height * 1.6 + edge.right()) * dt / current.length;
            }
        } else if hanging {
            self.edge_jumping = false;

            let anchor = edge.hang_anchor(body.radius, body.height, self.settings.climbing.edge_height);
            let target = lerp_vec(body.feet, anchor, dt * 10.0);
            body.feet = Vec3::new(target.x, target.y.max(body.feet.y), target.z);
        }
    }

    /// Swing direction of a held rope, tilted by the current rope angle.
    pub(crate) fn rope_forward(&self) -> Vec3 {
        let (sin, cos) = self.rope_angle.to_radians().sin_cos();
        self.camera_right() * cos + Vec3::Y * sin
    }

    /// Long axis of a held rope, tilted by the current rope angle.
    pub(crate) fn rope_up(&self) -> Vec3 {
        let (sin, cos) = self.rope_angle.to_radians().sin_cos();
        Vec3::Y * cos - self.camera_right() * sin
    }
}
