//! Combat domain: character health.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::core::EPSILON;

#[derive(Component, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CharacterHealth {
    pub health: f32,
    /// Ceiling for regeneration and healing.
    pub max_health: f32,
    /// Health regained per second.
    pub regeneration: f32,
}

impl Default for CharacterHealth {
    fn default() -> Self {
        Self {
            health: 100.0,
            max_health: 100.0,
            regeneration: 0.0,
        }
    }
}

impl CharacterHealth {
    pub fn new(max_health: f32) -> Self {
        Self {
            health: max_health,
            max_health,
            ..default()
        }
    }

    /// Removes `amount` of health. Returns true only for the call that kills.
    pub fn deal(&mut self, amount: f32) -> bool {
        if self.is_dead() {
            return false;
        }
        self.health = (self.health - amount).clamp(0.0, self.max_health);
        self.is_dead()
    }

    pub fn heal(&mut self, amount: f32) {
        if self.is_dead() {
            return;
        }
        self.health = (self.health + amount).clamp(0.0, self.max_health);
    }

    pub fn regenerate(&mut self, dt: f32) {
        if self.regeneration.abs() > EPSILON {
            self.heal(self.regeneration * dt);
        }
    }

    pub fn is_dead(&self) -> bool {
        self.health <= EPSILON
    }

    pub fn fraction(&self) -> f32 {
        if self.max_health <= EPSILON {
            return 0.0;
        }
        (self.health / self.max_health).clamp(0.0, 1.0)
    }
}
