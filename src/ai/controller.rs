//! AI domain: patrol and attack decisions, fed through the motor's input surface.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::characters::{CharacterEntry, CharacterRegistry};
use crate::core::{EPSILON, horizontal};
use crate::motor::{CharacterMotor, Direction};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AiState {
    #[default]
    Patrol,
    Attack,
}

/// Tuning for an AI-driven character. Distances between characters are measured between
/// body surfaces, so radii are added on top of these values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiSettings {
    /// Distance left of the patrol center.
    pub patrol_left: f32,
    /// Distance right of the patrol center.
    pub patrol_right: f32,
    /// Closest the AI walks up to its target.
    pub min_enemy_distance: f32,
    pub attack_distance: f32,
    /// Seconds between attack attempts.
    pub attack_wait: f32,
    /// Restart the attack countdown whenever the AI is hit.
    pub reset_attack_on_hit: bool,
    /// Attack enemies that come within `notice_distance` while patrolling.
    pub auto_notice: bool,
    pub notice_distance: f32,
    pub auto_stand_up: bool,
    /// Targets further than this are forgotten.
    pub forget_distance: f32,
}

impl Default for AiSettings {
    fn default() -> Self {
        Self {
            patrol_left: 0.0,
            patrol_right: 0.0,
            min_enemy_distance: 0.1,
            attack_distance: 0.3,
            attack_wait: 1.0,
            reset_attack_on_hit: true,
            auto_notice: true,
            notice_distance: 2.0,
            auto_stand_up: true,
            forget_distance: 15.0,
        }
    }
}

#[derive(Component, Debug, Clone, Default)]
pub struct AiController {
    pub settings: AiSettings,
    state: AiState,
    target: Option<Entity>,
    /// Patrol center, remembered on the first update.
    center: Option<Vec3>,
    patrol_sign: f32,
    attack_countdown: f32,
}

impl AiController {
    pub fn new(settings: AiSettings) -> Self {
        Self {
            settings,
            patrol_sign: 1.0,
            ..default()
        }
    }

    pub fn state(&self) -> AiState {
        self.state
    }

    pub fn target(&self) -> Option<Entity> {
        self.target
    }

    /// Starts attacking `target`, or calms down when there is none.
    pub fn attack(&mut self, target: Option<Entity>) {
        match target {
            Some(target) => {
                if self.target != Some(target) {
                    debug!("AI attacking {:?}", target);
                }
                self.state = AiState::Attack;
                self.target = Some(target);
            }
            None => self.calm_down(),
        }
    }

    pub fn calm_down(&mut self) {
        self.state = AiState::Patrol;
        self.target = None;
    }

    /// Re-centers the patrol on `position`.
    pub fn set_center(&mut self, position: Vec3) {
        self.center = Some(position);
    }

    /// Runs one decision step for `me`, writing intents into `motor`.
    pub fn update(
        &mut self,
        me: Entity,
        motor: &mut CharacterMotor,
        registry: &CharacterRegistry,
        dt: f32,
    ) {
        if motor.is_falling() {
            if self.settings.auto_stand_up {
                motor.stand_up();
            }
            return;
        }

        let Some(me) = registry.get(me).copied() else {
            return;
        };
        let center = *self.center.get_or_insert(me.feet);
        if self.patrol_sign == 0.0 {
            self.patrol_sign = 1.0;
        }

        let target = match self.target {
            Some(entity) => match registry.get(entity) {
                Some(entry) if entry.alive => Some(*entry),
                Some(_) => {
                    debug!("AI target {:?} is dead", entity);
                    self.calm_down();
                    None
                }
                None => {
                    warn!("AI target {:?} is no longer registered", entity);
                    self.calm_down();
                    None
                }
            },
            None => None,
        };

        let (facing_enemy, friend_in_between) = match &target {
            Some(target) => Self::line_of_attack(&me, target, motor, registry),
            None => (false, false),
        };

        if self.attack_countdown > EPSILON && target.is_some() {
            if self.settings.reset_attack_on_hit && motor.is_getting_hit() {
                self.attack_countdown = self.settings.attack_wait;
            }
            self.attack_countdown -= dt;

            if self.attack_countdown < EPSILON && facing_enemy && !friend_in_between {
                motor.input_attack();
                self.attack_countdown = self.settings.attack_wait;
            }
        } else {
            self.attack_countdown = 0.0;
        }

        let axis = motor.camera_right();
        let current = axis.dot(me.feet);

        match (self.state, target) {
            (AiState::Attack, Some(target)) => {
                self.pursue(&me, &target, axis, current, friend_in_between, motor)
            }
            (AiState::Attack, None) => self.calm_down(),
            (AiState::Patrol, _) => {
                if self.settings.auto_notice {
                    self.notice(&me, registry);
                }
                self.patrol(center, axis, current, motor);
            }
        }
    }

    /// Whether the AI faces its target, and whether a same-side character stands between them.
    fn line_of_attack(
        me: &CharacterEntry,
        target: &CharacterEntry,
        motor: &CharacterMotor,
        registry: &CharacterRegistry,
    ) -> (bool, bool) {
        let forward = motor.forward();
        let enemy_dot = forward.dot(target.feet - me.feet);
        if enemy_dot <= 0.0 {
            return (false, false);
        }

        let friend = registry
            .all()
            .filter(|other| other.entity != me.entity && other.is_same_side(me))
            .any(|other| {
                let dot = forward.dot(other.feet - me.feet);
                dot > 0.0 && dot < enemy_dot
            });

        (true, friend)
    }

    /// Picks the nearest opposing character within the notice distance.
    fn notice(&mut self, me: &CharacterEntry, registry: &CharacterRegistry) {
        let noticed = registry
            .all()
            .filter(|other| other.entity != me.entity && !other.is_same_side(me))
            .map(|other| (other.entity, other.feet.distance(me.feet)))
            .filter(|(_, distance)| *distance < self.settings.notice_distance)
            .min_by(|a, b| a.1.total_cmp(&b.1));

        if let Some((entity, _)) = noticed {
            self.attack(Some(entity));
        }
    }

    fn patrol(&mut self, center: Vec3, axis: Vec3, current: f32, motor: &mut CharacterMotor) {
        let right = axis.dot(center) + self.settings.patrol_right;
        let left = axis.dot(center) - self.settings.patrol_left;
        if right - left <= EPSILON {
            return;
        }

        if self.patrol_sign > 0.0 {
            motor.input_direction(Direction::Right);
            if current < right {
                Self::walk_or_jump(1.0, motor);
            } else {
                self.patrol_sign = -1.0;
            }
        } else {
            motor.input_direction(Direction::Left);
            if current > left {
                Self::walk_or_jump(-1.0, motor);
            } else {
                self.patrol_sign = 1.0;
            }
        }
    }

    fn pursue(
        &mut self,
        me: &CharacterEntry,
        target: &CharacterEntry,
        axis: Vec3,
        current: f32,
        friend_in_between: bool,
        motor: &mut CharacterMotor,
    ) {
        let radii = me.radius + target.radius;
        let attack_distance = self.settings.attack_distance + radii;
        let min_distance = self.settings.min_enemy_distance + radii;

        if me.feet.distance(target.feet) < attack_distance && self.attack_countdown < EPSILON {
            self.attack_countdown = self.settings.attack_wait;
        }

        let enemy = axis.dot(target.feet);
        let enemy_distance = horizontal(target.feet - me.feet).length();

        if enemy_distance > self.settings.forget_distance {
            debug!("AI forgot {:?}", target.entity);
            self.calm_down();
            return;
        }

        if enemy_distance > me.radius {
            let facing = if enemy >= current {
                Direction::Right
            } else {
                Direction::Left
            };
            motor.input_direction(facing);
        }

        if enemy_distance > min_distance && !friend_in_between {
            let value = if current < enemy + EPSILON { 1.0 } else { -1.0 };
            if !motor.is_blocked() || !motor.is_facing_walk_direction() {
                motor.input_movement(value);
            } else if motor.obstacle() != Some(target.entity) {
                motor.input_jump();
            }
        }
    }

    fn walk_or_jump(value: f32, motor: &mut CharacterMotor) {
        if !motor.is_blocked() || !motor.is_facing_walk_direction() {
            motor.input_movement(value);
        } else {
            motor.input_jump();
        }
    }
}
