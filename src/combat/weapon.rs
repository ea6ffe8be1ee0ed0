//! Combat domain: attack descriptors and the per-swing hit window.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::core::{EPSILON, countdown, horizontal};

/// Timing and damage of a single swing. Fractions are relative to the clip length.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Attack {
    /// Animation state the attacker is expected to be in.
    pub state: String,
    pub alternate_state: Option<String>,
    /// Fraction of the clip at which the swing turns on.
    pub start: f32,
    /// Fraction of the clip, after the start, before hits register.
    pub hit_delay: f32,
    /// Length of the swing as a fraction of the clip.
    pub duration: f32,
    pub damage: f32,
    pub ignore_behind: bool,
    /// Distance the attacker dashes forward. Ignored when close to zero.
    pub dash: f32,
    /// A strong dash knocks over the characters it runs into.
    pub strong_dash: bool,
    /// Seconds of global pause after a landed hit.
    pub hit_pause: f32,
    pub hit_pause_delay: f32,
}

impl Default for Attack {
    fn default() -> Self {
        Self {
            state: "Attack".to_string(),
            alternate_state: None,
            start: 0.35,
            hit_delay: 0.0,
            duration: 0.6,
            damage: 50.0,
            ignore_behind: true,
            dash: 0.0,
            strong_dash: false,
            hit_pause: 0.1,
            hit_pause_delay: 0.05,
        }
    }
}

impl Attack {
    /// True if `name` is one of the states this attack plays in.
    pub fn plays_in(&self, name: &str) -> bool {
        self.state == name || self.alternate_state.as_deref() == Some(name)
    }
}

/// A landed hit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    pub attacker: Entity,
    pub target: Entity,
    pub position: Vec3,
    /// Points from the target toward the weapon.
    pub normal: Vec3,
    pub damage: f32,
    pub pause_duration: f32,
    pub pause_delay: f32,
}

/// Where a candidate target stands when the hit window is checked.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Strike {
    pub attacker_position: Vec3,
    pub weapon_position: Vec3,
    pub target: Entity,
    pub target_position: Vec3,
}

#[derive(Component, Debug, Clone)]
pub struct Weapon {
    pub combo: Vec<Attack>,
    /// Used in the air, while running and when there is no combo.
    pub attack: Attack,
    /// When false, hit reactions never cancel queued attacks.
    pub hitting_interrupts_attacks: bool,
    /// Radius of the overlap probe in front of the attacker.
    pub reach: f32,
    initiated: bool,
    timer: f32,
    time_scale: f32,
    swing: Option<Swing>,
}

#[derive(Debug, Clone)]
struct Swing {
    attacker: Entity,
    attack: Attack,
    forward: Vec3,
    hits: Vec<Entity>,
}

impl Default for Weapon {
    fn default() -> Self {
        Self {
            combo: Vec::new(),
            attack: Attack::default(),
            hitting_interrupts_attacks: true,
            reach: 0.6,
            initiated: false,
            timer: 0.0,
            time_scale: 1.0,
            swing: None,
        }
    }
}

impl Weapon {
    pub fn new(combo: Vec<Attack>, attack: Attack) -> Self {
        Self {
            combo,
            attack,
            ..default()
        }
    }

    /// Scales the hit window to the length of the clip that plays the swing.
    pub fn input_duration(&mut self, clip_length: f32) {
        if clip_length > EPSILON {
            self.time_scale = 1.0 / clip_length;
        }
    }

    /// Opens the hit window for a new swing.
    pub fn attack_by(&mut self, attacker: Entity, attack: Attack, forward: Vec3) {
        self.timer = attack.duration;
        self.swing = Some(Swing {
            attacker,
            attack,
            forward: horizontal(forward),
            hits: Vec::new(),
        });
    }

    /// Returns true only on the call that actually starts the attack.
    pub fn initiate(&mut self) -> bool {
        if self.initiated {
            return false;
        }
        self.initiated = true;
        true
    }

    /// Returns true only on the call that actually ends the attack.
    pub fn finish(&mut self) -> bool {
        if !self.initiated {
            return false;
        }
        self.timer = 0.0;
        self.initiated = false;
        true
    }

    pub fn is_initiated(&self) -> bool {
        self.initiated
    }

    pub fn timer(&self) -> f32 {
        self.timer
    }

    pub fn tick(&mut self, dt: f32) {
        countdown(&mut self.timer, dt * self.time_scale);
    }

    pub fn is_window_open(&self) -> bool {
        let Some(swing) = &self.swing else {
            return false;
        };
        self.timer > EPSILON && self.timer < swing.attack.duration - swing.attack.hit_delay
    }

    /// Attacker of the swing in progress, if its window is open.
    pub fn attacker(&self) -> Option<Entity> {
        self.is_window_open()
            .then(|| self.swing.as_ref().map(|s| s.attacker))
            .flatten()
    }

    /// Registers a touch of `strike.target`. The first valid target closes the window,
    /// so one swing deals damage at most once.
    pub fn damage_check(&mut self, strike: Strike) -> Option<Hit> {
        if !self.is_window_open() {
            return None;
        }
        let swing = self.swing.as_mut()?;

        if strike.target == swing.attacker || swing.hits.contains(&strike.target) {
            return None;
        }

        let offset = horizontal(strike.target_position - strike.attacker_position);
        if swing.attack.ignore_behind && offset.dot(swing.forward) < 0.0 {
            return None;
        }

        swing.hits.push(strike.target);

        let normal = (strike.weapon_position - strike.target_position)
            .try_normalize()
            .unwrap_or(Vec3::ZERO);

        let hit = Hit {
            attacker: swing.attacker,
            target: strike.target,
            position: strike.weapon_position,
            normal,
            damage: swing.attack.damage,
            pause_duration: swing.attack.hit_pause,
            pause_delay: swing.attack.hit_pause_delay,
        };

        self.timer = 0.0;
        Some(hit)
    }
}
