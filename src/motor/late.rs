//! Motor domain: the variable-rate pass. Senses the surroundings, resolves grabs,
//! the fall lifecycle and jumps, then advances every timer.

use bevy::prelude::*;

use crate::animation::{AnimLayer, Animator, states};
use crate::core::{EPSILON, count_up, countdown, horizontal, lerp, slope_angle, yaw_dir};
use crate::world::{ColliderKind, Climbables, EdgeId, GeometryQuery, QueryFilter};

use super::body::{BodyState, MotorEnv};
use super::character::{CharacterMotor, RECOVERY_INVINCIBILITY};
use super::events::MotorListener;
use super::state::{EdgeGrab, FallState, Locomotion, MotorInput, WallContact};

/// Seconds after landing before another land event may fire.
const LAND_DELAY: f32 = 0.2;
const JUMP_COOLDOWN: f32 = 0.25;
const SECOND_JUMP_WINDOW: f32 = 0.4;

impl CharacterMotor {
    /// One presentation-rate tick. `dt` is already scaled by any per-character time.
    pub fn late_update(&mut self, body: &mut BodyState, env: &mut MotorEnv<'_>, dt: f32) {
        if !self.alive && !self.fall.is_falling() {
            self.knock_out(false);
        }

        self.update_ground(body, env.geometry, env.listener);
        self.update_wall_and_obstacle(body, env.geometry);
        self.update_push(body, env.geometry);
        self.update_fall(&*env.animator);
        countdown(&mut self.timers.invincibility, dt);
        self.update_getting_hit(env);
        self.update_weapons(body, env, dt);
        self.update_edge(body, env);
        self.update_rope(body, env, dt);
        self.update_slide(body, env.listener);
        self.update_animator(body, env, dt);
        self.update_ik(body, env, dt);
        self.apply_jump(body, env.climbables);

        countdown(&mut self.timers.speed, dt);
        if self.timers.speed <= EPSILON {
            self.speed_up = 1.0;
        }

        if self.sliding {
            self.input.movement = self.direction.sign();
        }

        if self.combat.combo.is_some() && self.input.movement.abs() > 0.5 {
            self.combat.wants_break_combo = true;
        }

        self.movement = if self.accepts_movement() {
            self.input.movement
        } else {
            0.0
        };
        self.wants_jump = self.input.jump && !self.previous_jump;
        self.previous_jump = self.input.jump;

        self.update_rope_climb(env.climbables, dt);
        self.advance_timers(dt);

        self.input = MotorInput::default();
    }

    // ---------------------------------------------------------------------
    // Sensing
    // ---------------------------------------------------------------------

    fn update_ground(
        &mut self,
        body: &BodyState,
        geometry: &dyn GeometryQuery,
        listener: &mut dyn MotorListener,
    ) {
        let was_grounded = self.grounded;

        self.on_slope = false;
        self.walkable = false;
        self.sliding = false;
        self.grounded = false;

        let filter = QueryFilter::solids_excluding(body.entity);
        let distance = self.settings.air.ground_threshold + 0.1;
        let forward = self.forward();

        for hit in geometry.ray_cast(body.feet + Vec3::Y * 0.1, Vec3::NEG_Y, distance, &filter) {
            // Nobody gets to balance on somebody's head
            if hit.kind == ColliderKind::Character {
                self.input_movement(self.direction.sign());
                continue;
            }

            let slope = slope_angle(hit.normal);
            if slope < self.settings.slope.max_walk_angle {
                self.walkable = true;
            }

            if self.is_slide_angle(slope) && forward.dot(hit.normal) > 0.0 {
                let origin = body.feet + Vec3::Y * 0.1 + forward * 0.1;
                let confirmed = geometry
                    .ray_cast(origin, Vec3::NEG_Y, distance, &filter)
                    .into_iter()
                    .filter(|secondary| secondary.kind != ColliderKind::Character)
                    .any(|secondary| self.is_slide_angle(slope_angle(secondary.normal)));

                if confirmed {
                    self.on_slope = true;
                    self.sliding = true;
                }
            }

            if !was_grounded && self.timers.land <= EPSILON {
                debug!("Landed at {:.2} m/s", -body.velocity.y);
                listener.on_land(-body.velocity.y);
                self.timers.land = LAND_DELAY;
            }

            self.grounded = true;
        }

        if self.grounded {
            self.can_second_jump = true;
        }
    }

    fn is_slide_angle(&self, slope: f32) -> bool {
        slope > self.settings.slope.min_slope_angle && slope < self.settings.slope.max_slope_angle
    }

    /// Probes toward `yaw` at a fraction of the body's half height for a steep surface.
    fn find_obstacle(
        &self,
        body: &BodyState,
        geometry: &dyn GeometryQuery,
        yaw: f32,
        height: f32,
        threshold: f32,
    ) -> Option<WallContact> {
        let direction = yaw_dir(yaw);
        let origin = body.feet + Vec3::Y * body.height * 0.5 * height;
        let filter = QueryFilter {
            exclude: Some(body.entity),
            ..QueryFilter::level_only()
        };

        geometry
            .ray_cast(origin, direction, threshold + body.radius, &filter)
            .into_iter()
            .find(|hit| slope_angle(hit.normal) > self.settings.wall.min_angle)
            .map(|hit| WallContact {
                collider: hit.collider,
                normal: -direction,
            })
    }

    fn update_wall_and_obstacle(&mut self, body: &BodyState, geometry: &dyn GeometryQuery) {
        let walk_angle = self.walk_angle();

        if self.grounded {
            let threshold = self.settings.walk.obstacle_threshold;
            let obstacle = self
                .find_obstacle(body, geometry, walk_angle, 0.3, threshold)
                .or_else(|| self.find_obstacle(body, geometry, walk_angle, 0.9, threshold));

            self.obstacle = obstacle.map(|o| o.collider);
            self.wall = None;
        } else {
            let threshold = self.settings.wall.threshold;
            let mut wall = self.find_obstacle(body, geometry, walk_angle, 0.5, threshold);
            let mut is_back = false;

            if wall.is_none() && self.input.movement.abs() < 0.5 {
                wall = self.find_obstacle(body, geometry, walk_angle - 180.0, 0.5, threshold);
                is_back = wall.is_some();
            }

            let jump_time = self.settings.wall.jump_time;
            if wall.is_some() && self.timers.wall_jump > 0.0 && self.timers.wall_jump < jump_time - 0.1 {
                self.timers.wall_jump = 0.0;

                if is_back && self.edge_contact.is_none() {
                    self.direction = self.direction.opposite();
                }
            }

            self.obstacle = wall.map(|w| w.collider);
            self.wall = wall;
        }

        let holds_something = matches!(self.locomotion, Locomotion::Edge(_) | Locomotion::Rope(_));
        self.on_wall = !self.grounded
            && self.edge_contact.is_none()
            && !holds_something
            && self.wall.is_some_and(|w| self.forward().dot(w.normal) < 0.0);

        self.wall_sliding = self.on_wall && !self.hanging_on_edge && body.velocity.y < -1.0;
    }

    fn update_push(&mut self, body: &BodyState, geometry: &dyn GeometryQuery) {
        let origin = body.feet + Vec3::Y * body.height * 0.25;
        let distance = self.settings.walk.push_threshold + body.radius;
        let filter = QueryFilter::solids_excluding(body.entity);

        self.pushing = geometry
            .ray_cast(origin, yaw_dir(self.walk_angle()), distance, &filter)
            .iter()
            .any(|hit| hit.kind == ColliderKind::Pushable);
    }

    // ---------------------------------------------------------------------
    // Fall lifecycle
    // ---------------------------------------------------------------------

    pub(crate) fn update_fall(&mut self, animator: &dyn Animator) {
        if self.fall.is_temporary() {
            self.stand_up();
        }

        self.fall = match self.fall {
            FallState::Upright => {
                self.wants_stand_up = false;
                FallState::Upright
            }
            FallState::Falling { temporary } => {
                if animator.is_in(AnimLayer::Base, states::KNOCK_OUT) {
                    debug!("Knock out pose reached");
                    FallState::Recovering { temporary }
                } else {
                    FallState::Falling { temporary }
                }
            }
            FallState::Recovering { temporary } => {
                if !self.is_invincible() {
                    self.timers.invincibility = RECOVERY_INVINCIBILITY;
                }
                if self.wants_stand_up && self.grounded {
                    self.wants_stand_up = false;
                    FallState::StandingUp
                } else {
                    FallState::Recovering { temporary }
                }
            }
            FallState::StandingUp => {
                let standing = animator.is_in(AnimLayer::Base, states::STANDING);
                let still_down = animator.is_in(AnimLayer::Base, states::KNOCK_OUT)
                    || animator.is_in(AnimLayer::Base, states::FALLEN);

                if standing || !still_down {
                    debug!("Stood up");
                    FallState::Upright
                } else {
                    FallState::StandingUp
                }
            }
        };
    }

    // ---------------------------------------------------------------------
    // Edges
    // ---------------------------------------------------------------------

    fn update_edge(&mut self, body: &mut BodyState, env: &mut MotorEnv<'_>) {
        self.edge_contact = env.climbables.edge_contact(&body.capsule());

        let Locomotion::Edge(mut grab) = self.locomotion else {
            if let Some(id) = self.edge_contact {
                self.try_grab_edge(id, body, env.climbables);
            }
            return;
        };

        let Some(edge) = env.climbables.edge(grab.edge) else {
            warn!("Held edge {:?} no longer exists", grab.edge);
            self.release_edge();
            return;
        };

        if self.hanging_on_edge || grab.climbing {
            body.feet += edge.to_world(grab.local_feet) - grab.last_feet;
        }

        if grab.climbing {
            let in_climb = env.animator.is_in(AnimLayer::Base, states::CLIMB);
            if in_climb {
                grab.climb_seen = true;
            } else if grab.climb_seen {
                debug!("Edge climb finished");
                self.release_edge();
                return;
            }
        } else if self.edge_contact != Some(grab.edge) {
            self.release_edge();
            return;
        }

        grab.local_feet = edge.to_local(body.feet);
        grab.last_feet = body.feet;
        self.locomotion = Locomotion::Edge(grab);
    }

    fn try_grab_edge(&mut self, id: EdgeId, body: &BodyState, climbables: &Climbables) {
        if !matches!(self.locomotion, Locomotion::Free)
            || self.fall.is_falling()
            || self.timers.jump >= 0.1
        {
            return;
        }
        let Some(edge) = climbables.edge(id) else {
            return;
        };

        debug!("Touching edge {:?}", id);
        self.locomotion = Locomotion::Edge(EdgeGrab::new(id, edge.to_local(body.feet), body.feet));
    }

    pub(crate) fn release_edge(&mut self) {
        if matches!(self.locomotion, Locomotion::Edge(_)) {
            self.locomotion = Locomotion::Free;
        }
        self.hanging_on_edge = false;
        self.edge_jumping = false;
    }

    fn update_slide(&mut self, body: &BodyState, listener: &mut dyn MotorListener) {
        if !(self.sliding || self.wall_sliding) || self.timers.slide > EPSILON {
            return;
        }

        let lift = if self.wall_sliding { Vec3::Y * 0.5 } else { Vec3::ZERO };
        listener.on_slide(body.feet + lift);
        self.timers.slide = 0.2;
    }

    // ---------------------------------------------------------------------
    // Jumping
    // ---------------------------------------------------------------------

    fn apply_jump(&mut self, body: &mut BodyState, climbables: &Climbables) {
        if self.grounded || body.velocity.y < 0.0 {
            self.edge_jumping = false;
        }

        if !self.wants_jump || self.fall.is_falling() {
            return;
        }

        let on_rope = self.is_hanging_on_rope();
        if !self.grounded
            && !self.can_second_jump
            && !self.hanging_on_edge
            && !on_rope
            && !self.on_wall
        {
            return;
        }

        if self.timers.jump > EPSILON {
            return;
        }

        self.cancel_dash();
        self.timers.post_dash_gravity = 0.0;

        if self.combat.combo.is_some() {
            self.combat.wants_break_combo = true;
        }

        self.timers.jump = JUMP_COOLDOWN;

        let mut velocity = body.velocity;
        velocity.y = if self.grounded {
            self.settings.air.ground_jump_strength
        } else {
            self.settings.air.air_jump_strength
        };

        if let Some(wall) = self.wall.filter(|_| self.on_wall) {
            velocity += wall.normal * self.settings.wall.jump_strength;
            self.timers.wall_jump = self.settings.wall.jump_time;

            if wall.normal.dot(self.forward()) < 0.0 {
                self.direction = self.direction.opposite();
            }
            debug!("Wall jump");
        } else if self.hanging_on_edge {
            if !self.is_edge_climbing() {
                self.edge_jumping = true;
            }
            debug!("Edge jump");
        } else if let Locomotion::Rope(grab) = self.locomotion {
            let swing = climbables
                .segment(grab.hand)
                .map_or(Vec3::ZERO, |segment| segment.velocity);
            velocity += swing.clamp_length_max(self.settings.climbing.rope_jump_strength);

            self.free_rope = Some(grab.rope());
            self.locomotion = Locomotion::Free;
            debug!("Rope jump");
        } else if !self.grounded && self.can_second_jump {
            self.second_jumping = true;
            self.timers.second_jump = SECOND_JUMP_WINDOW;
            self.can_second_jump = false;
            debug!("Second jump");
        }

        body.velocity = velocity;
        let edge_jumping = self.edge_jumping;
        self.release_edge();
        self.edge_jumping = edge_jumping;

        self.wants_jump = false;
        self.jumping = true;
    }

    // ---------------------------------------------------------------------
    // Ropes and timers
    // ---------------------------------------------------------------------

    /// Climbing eases in only while the rope hangs still.
    fn update_rope_climb(&mut self, climbables: &mut Climbables, dt: f32) {
        let Locomotion::Rope(grab) = self.locomotion else {
            self.rope_climb = 0.0;
            return;
        };
        let Some(rope) = climbables.rope_mut(grab.rope()) else {
            self.rope_climb = 0.0;
            return;
        };

        let swing = grab.swing_segment();
        let speed = rope
            .segment(swing.index)
            .map_or(0.0, |segment| horizontal(segment.velocity).length());
        let reach = horizontal(rope.offset_to_root(grab.hand.index)).length();

        self.rope_climb = if speed > 1.2 || reach > 1.0 {
            lerp(self.rope_climb, 0.0, dt)
        } else {
            lerp(self.rope_climb, self.input.climb, dt * 5.0)
        };

        if self.input.climb.abs() > 0.5 {
            rope.calm(grab.hand.index, dt);
        }
    }

    fn advance_timers(&mut self, dt: f32) {
        let timers = &mut self.timers;

        if timers.second_jump > 0.0 {
            countdown(&mut timers.second_jump, dt);
            if timers.second_jump <= 0.0 {
                self.second_jumping = false;
            }
        }

        countdown(&mut timers.post_dash_gravity, dt);
        countdown(&mut timers.wall_jump, dt);

        let on_rope = matches!(self.locomotion, Locomotion::Rope(_));
        if on_rope {
            timers.free_rope = self.settings.climbing.rope_ignore_time;
        } else {
            countdown(&mut timers.free_rope, dt);
        }

        if !self.hanging_on_edge && !on_rope {
            timers.hang = 0.0;
        } else {
            count_up(&mut timers.hang, dt, 1.0);
        }

        if self.input.movement.abs() > EPSILON {
            timers.no_movement = 0.0;
        } else {
            count_up(&mut timers.no_movement, dt, 1.0);
        }

        if !self.grounded {
            timers.grounded = 0.0;
        } else {
            count_up(&mut timers.grounded, dt, 1.0);
        }

        countdown(&mut timers.jump, dt);
        if timers.jump < 0.1 {
            self.jumping = false;
        }

        countdown(&mut timers.foot, dt);
        countdown(&mut timers.slide, dt);
        countdown(&mut timers.land, dt);
    }
}
