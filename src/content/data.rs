//! Data definitions for character profile files.
//!
//! These structs mirror assets/data/profiles.ron. Every section takes its defaults from
//! the runtime component it configures, so a profile only lists what it changes.

use serde::{Deserialize, Serialize};

use crate::ai::AiSettings;
use crate::combat::{Attack, CharacterHealth, Weapon};
use crate::motor::{CharacterBody, Direction};
use crate::settings::MotorSettings;

// ============================================================================
// Common wrapper for RON files with schema_version and items
// ============================================================================

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DataFile<T> {
    pub schema_version: u32,
    pub items: Vec<T>,
}

pub const SCHEMA_VERSION: u32 = 1;

// ============================================================================
// Profiles (profiles.ron)
// ============================================================================

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CharacterProfile {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub body: CharacterBody,
    #[serde(default)]
    pub motor: MotorSettings,
    #[serde(default)]
    pub weapon: Option<WeaponProfile>,
    #[serde(default)]
    pub health: CharacterHealth,
    /// Team id. Profiles without one are grouped by whether an AI drives them.
    #[serde(default)]
    pub side: Option<i32>,
    #[serde(default)]
    pub ai: Option<AiSettings>,
    #[serde(default = "default_true")]
    pub can_be_made_to_fall: bool,
    #[serde(default)]
    pub facing: Direction,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct WeaponProfile {
    pub combo: Vec<Attack>,
    /// Used in the air, while running and when there is no combo.
    pub attack: Attack,
    pub hitting_interrupts_attacks: bool,
    pub reach: f32,
    /// Length in seconds of every attack clip the weapon plays.
    pub clip_length: f32,
}

impl Default for WeaponProfile {
    fn default() -> Self {
        let weapon = Weapon::default();
        Self {
            combo: Vec::new(),
            attack: weapon.attack,
            hitting_interrupts_attacks: weapon.hitting_interrupts_attacks,
            reach: weapon.reach,
            clip_length: 0.6,
        }
    }
}

impl WeaponProfile {
    pub fn build(&self) -> Weapon {
        let mut weapon = Weapon::new(self.combo.clone(), self.attack.clone());
        weapon.hitting_interrupts_attacks = self.hitting_interrupts_attacks;
        weapon.reach = self.reach;
        weapon
    }

    /// Every attack the weapon can play, combo steps first.
    pub fn attacks(&self) -> impl Iterator<Item = &Attack> {
        self.combo.iter().chain(std::iter::once(&self.attack))
    }
}

impl CharacterProfile {
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            body: CharacterBody::default(),
            motor: MotorSettings::default(),
            weapon: None,
            health: CharacterHealth::default(),
            side: None,
            ai: None,
            can_be_made_to_fall: true,
            facing: Direction::Right,
        }
    }
}
