//! Motor domain: hit reactions and the combo / single attack sequencer.

use bevy::prelude::*;

use crate::animation::{AnimLayer, AnimTrigger, Animator, states};
use crate::combat::{Attack, Weapon};

use super::body::{BodyState, MotorEnv};
use super::character::CharacterMotor;
use super::events::MotorListener;

/// Until this fraction of the hit reaction has played, queued attacks are dropped.
const HIT_REACTION_LOCK: f32 = 0.7;

/// Where the attack's clip is on its layer.
#[derive(Debug, Clone, Copy)]
struct ClipProgress {
    is_current: bool,
    is_next: bool,
    normalized_time: f32,
    length: Option<f32>,
}

impl ClipProgress {
    fn of(animator: &dyn Animator, layer: AnimLayer, attack: &Attack) -> Self {
        let current = animator.current_state(layer);
        let next = animator.next_state(layer);
        let is_current = attack.plays_in(current.name);
        let is_next = next.is_some_and(|s| attack.plays_in(s.name));

        let length = if is_current {
            Some(current.length)
        } else if is_next {
            next.map(|s| s.length)
        } else {
            None
        };

        Self {
            is_current,
            is_next,
            normalized_time: current.normalized_time,
            length,
        }
    }

    fn is_playing(&self) -> bool {
        self.is_current || self.is_next
    }

    fn has_passed(&self, start: f32) -> bool {
        self.is_current && self.normalized_time > start
    }
}

impl CharacterMotor {
    pub(crate) fn update_getting_hit(&mut self, env: &MotorEnv<'_>) {
        let interrupts = env
            .weapon
            .as_deref()
            .is_none_or(|weapon| weapon.hitting_interrupts_attacks);

        let combat = &mut self.combat;
        if !interrupts && (combat.wants_attack || combat.combo.is_some()) {
            combat.was_just_hit = false;
            combat.getting_hit = false;
            return;
        }

        if !combat.was_just_hit && !combat.getting_hit {
            return;
        }

        let current = env.animator.current_state(AnimLayer::UpperBody);
        let in_current = current.is(states::GET_HIT);
        let in_next = env
            .animator
            .next_state(AnimLayer::UpperBody)
            .is_some_and(|s| s.is(states::GET_HIT));

        if in_current || in_next {
            combat.getting_hit = true;
            combat.was_just_hit = false;

            if in_current && current.normalized_time < HIT_REACTION_LOCK {
                combat.wants_attack = false;
            }
        } else if !combat.was_just_hit {
            combat.getting_hit = false;
        } else {
            combat.wants_attack = false;
        }
    }

    /// Three tiers: a combo in progress, then a single attack in progress, then idle.
    pub(crate) fn update_weapons(&mut self, body: &BodyState, env: &mut MotorEnv<'_>, dt: f32) {
        if self.fall.is_falling() || !self.alive {
            self.combat.wants_attack = false;
            return;
        }

        if !self.has_free_hands() {
            self.combat.wants_attack = false;
        }

        let Some(weapon) = env.weapon.as_deref_mut() else {
            return;
        };
        let animator = &mut *env.animator;
        let listener = &mut *env.listener;

        if !self.combat.wants_attack && self.combat.combo.is_none() && !self.combat.single {
            self.combat.has_started = false;
            if weapon.finish() {
                listener.on_finish_attack();
            }
            weapon.tick(dt);
            return;
        }

        let could_combo = self.input.movement.abs() < 0.5 && self.grounded && !weapon.combo.is_empty();

        if let Some(index) = self.combat.combo {
            self.combat.single = false;
            self.update_combo(index, body, weapon, animator, listener);
        } else if self.combat.single {
            self.update_single(could_combo, body, weapon, animator, listener);
        } else if self.combat.wants_attack {
            if could_combo {
                debug!("Combo started");
                animator.set_trigger(AnimTrigger::StartCombo);
                self.combat.combo = Some(0);
                self.combat.reached_combo = false;
            } else {
                debug!("Single attack started");
                animator.set_trigger(AnimTrigger::Attack);
                self.combat.single = true;
            }

            self.combat.wants_attack = false;
            self.combat.has_started = false;
            self.combat.wants_break_combo = false;

            if weapon.initiate() {
                listener.on_initiate_attack();
            }
        }

        weapon.tick(dt);
    }

    fn update_combo(
        &mut self,
        index: usize,
        body: &BodyState,
        weapon: &mut Weapon,
        animator: &mut dyn Animator,
        listener: &mut dyn MotorListener,
    ) {
        let Some(attack) = weapon.combo.get(index).cloned() else {
            self.end_combo(weapon, listener);
            return;
        };

        let progress = ClipProgress::of(&*animator, AnimLayer::Base, &attack);
        if let Some(length) = progress.length {
            weapon.input_duration(length);
        }

        if progress.is_playing() {
            self.combat.reached_combo = true;

            if self.combat.wants_break_combo {
                return;
            }

            if !self.combat.has_started && progress.has_passed(attack.start) {
                self.swing(attack, body, weapon, listener);
            }

            if self.combat.wants_attack {
                if self.combat.has_started && index + 1 < weapon.combo.len() {
                    debug!("Combo step {}", index + 1);
                    self.combat.has_started = false;
                    self.combat.combo = Some(index + 1);
                    animator.set_trigger(AnimTrigger::ContinueCombo);
                }
                self.combat.wants_attack = false;
            }
        } else if self.combat.reached_combo {
            // The step that was just continued from may still be blending out
            let in_previous = index
                .checked_sub(1)
                .and_then(|previous| weapon.combo.get(previous))
                .is_some_and(|previous| ClipProgress::of(&*animator, AnimLayer::Base, previous).is_playing());

            if !in_previous {
                self.end_combo(weapon, listener);
            }
        }
    }

    fn end_combo(&mut self, weapon: &mut Weapon, listener: &mut dyn MotorListener) {
        debug!("Combo ended");
        self.combat.combo = None;
        self.combat.wants_attack = false;
        self.combat.has_started = false;
        self.combat.wants_break_combo = false;
        if weapon.finish() {
            listener.on_finish_attack();
        }
    }

    fn update_single(
        &mut self,
        could_combo: bool,
        body: &BodyState,
        weapon: &mut Weapon,
        animator: &mut dyn Animator,
        listener: &mut dyn MotorListener,
    ) {
        let attack = weapon.attack.clone();
        let progress = ClipProgress::of(&*animator, AnimLayer::UpperBody, &attack);
        if let Some(length) = progress.length {
            weapon.input_duration(length);
        }

        if progress.is_playing() {
            if !self.combat.has_started && progress.has_passed(attack.start) {
                self.swing(attack, body, weapon, listener);
            }

            if self.combat.wants_attack && !self.combat.has_started {
                self.combat.wants_attack = false;
            }
            return;
        }

        self.combat.single = false;
        self.combat.has_started = false;

        if could_combo && self.combat.wants_attack {
            // A press during the single attack rolls straight into the second combo step
            debug!("Late combo start");
            animator.set_trigger(AnimTrigger::LateComboStart);
            self.combat.combo = Some(1.min(weapon.combo.len().saturating_sub(1)));
            self.combat.reached_combo = false;
            self.combat.wants_attack = false;
        } else if weapon.finish() {
            listener.on_finish_attack();
        }
    }

    /// Opens the weapon's hit window and lunges if the attack asks for it.
    fn swing(
        &mut self,
        attack: Attack,
        body: &BodyState,
        weapon: &mut Weapon,
        listener: &mut dyn MotorListener,
    ) {
        listener.on_attack(&attack);

        if attack.dash > crate::core::EPSILON {
            self.perform_dash(attack.dash, attack.strong_dash);
        }

        weapon.attack_by(body.entity, attack, self.forward());
        self.combat.has_started = true;
    }
}
