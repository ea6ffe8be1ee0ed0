//! Motor domain: body dimensions and the per-tick kinematic snapshot.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::animation::Animator;
use crate::combat::Weapon;
use crate::world::{BodyCapsule, Climbables, GeometryQuery};

use super::events::MotorListener;

/// Capsule dimensions of a character. The entity's translation is the capsule center.
#[derive(Component, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CharacterBody {
    pub height: f32,
    pub radius: f32,
}

impl Default for CharacterBody {
    fn default() -> Self {
        Self {
            height: 1.8,
            radius: 0.3,
        }
    }
}

impl CharacterBody {
    pub fn feet(&self, center: Vec3) -> Vec3 {
        center - Vec3::Y * self.height * 0.5
    }

    pub fn center(&self, feet: Vec3) -> Vec3 {
        feet + Vec3::Y * self.height * 0.5
    }
}

/// Position and velocity the motor reads and writes during one update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyState {
    pub entity: Entity,
    pub feet: Vec3,
    pub velocity: Vec3,
    pub height: f32,
    pub radius: f32,
}

impl BodyState {
    pub fn new(entity: Entity, body: &CharacterBody, feet: Vec3) -> Self {
        Self {
            entity,
            feet,
            velocity: Vec3::ZERO,
            height: body.height,
            radius: body.radius,
        }
    }

    pub fn center(&self) -> Vec3 {
        self.feet + Vec3::Y * self.height * 0.5
    }

    pub fn head_point(&self) -> Vec3 {
        self.feet + Vec3::Y * self.height
    }

    pub fn hand_point(&self) -> Vec3 {
        self.feet + Vec3::Y * self.height * 0.8
    }

    pub fn hip_point(&self) -> Vec3 {
        self.feet + Vec3::Y * self.height * 0.4
    }

    pub fn leg_point(&self) -> Vec3 {
        self.feet + Vec3::Y * self.height * 0.2
    }

    pub fn capsule(&self) -> BodyCapsule {
        BodyCapsule::standing(self.feet, self.height, self.radius)
    }
}

/// Collaborators consulted by a motor update.
pub struct MotorEnv<'a> {
    pub geometry: &'a dyn GeometryQuery,
    pub climbables: &'a mut Climbables,
    pub animator: &'a mut dyn Animator,
    pub weapon: Option<&'a mut Weapon>,
    pub listener: &'a mut dyn MotorListener,
}
