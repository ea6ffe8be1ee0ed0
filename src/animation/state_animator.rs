//! Animation domain: a rule-driven state machine standing in for clip playback.
//!
//! Each layer plays one clip at a time and blends into the next one over a fixed
//! duration. Transitions are evaluated in declaration order from the state being
//! entered (the next state while blending, otherwise the current one); the first
//! transition whose condition holds wins and consumes the triggers it names.

use std::collections::{HashMap, HashSet};

use bevy::prelude::*;

use super::{AnimBool, AnimFloat, AnimLayer, AnimTrigger, Animator, StateInfo, states};
use crate::ik::Skeleton;

#[derive(Debug, Clone, PartialEq)]
pub struct Clip {
    pub name: String,
    pub length: f32,
    pub looping: bool,
}

impl Clip {
    pub fn once(name: impl Into<String>, length: f32) -> Self {
        Self {
            name: name.into(),
            length: length.max(f32::EPSILON),
            looping: false,
        }
    }

    pub fn looping(name: impl Into<String>, length: f32) -> Self {
        Self {
            looping: true,
            ..Self::once(name, length)
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Trigger(AnimTrigger),
    Flag(AnimBool, bool),
    /// A non-looping source clip has played to its end.
    Finished,
    All(Vec<Condition>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Source {
    Any,
    State(String),
    AnyExcept(Vec<String>),
}

impl Source {
    fn matches(&self, state: &str) -> bool {
        match self {
            Source::Any => true,
            Source::State(name) => name == state,
            Source::AnyExcept(names) => names.iter().all(|n| n != state),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub layer: AnimLayer,
    pub from: Source,
    pub to: String,
    pub when: Condition,
    /// Blend duration in seconds; zero switches instantly.
    pub blend: f32,
}

#[derive(Debug, Clone, PartialEq)]
struct Blend {
    state: String,
    elapsed: f32,
    duration: f32,
}

#[derive(Debug, Clone, PartialEq)]
struct LayerPlayback {
    current: String,
    time: f32,
    next: Option<Blend>,
}

impl LayerPlayback {
    fn new(state: &str) -> Self {
        Self {
            current: state.to_string(),
            time: 0.0,
            next: None,
        }
    }

    /// Name and elapsed time of the state that transitions are evaluated from.
    fn source(&self) -> (&str, f32) {
        match &self.next {
            Some(blend) => (&blend.state, blend.elapsed),
            None => (&self.current, self.time),
        }
    }
}

#[derive(Component, Debug, Clone)]
pub struct StateAnimator {
    clips: HashMap<String, Clip>,
    transitions: Vec<Transition>,
    layers: [LayerPlayback; 2],
    floats: HashMap<AnimFloat, f32>,
    bools: HashMap<AnimBool, bool>,
    triggers: HashSet<AnimTrigger>,
    speed: f32,
    skeleton: Skeleton,
}

impl StateAnimator {
    pub fn new(base: Clip, upper_body: Clip) -> Self {
        let layers = [
            LayerPlayback::new(&base.name),
            LayerPlayback::new(&upper_body.name),
        ];
        let mut animator = Self {
            clips: HashMap::new(),
            transitions: Vec::new(),
            layers,
            floats: HashMap::new(),
            bools: HashMap::new(),
            triggers: HashSet::new(),
            speed: 1.0,
            skeleton: Skeleton::default(),
        };
        animator.add_clip(base);
        animator.add_clip(upper_body);
        animator
    }

    /// Graph for a humanoid with an optional combo chain and single attack.
    ///
    /// Combo clips chain on `ContinueCombo` once the playing step finishes; a single
    /// attack plays on the upper body layer.
    pub fn humanoid(combo: &[Clip], attack: Option<Clip>) -> Self {
        use AnimLayer::{Base, UpperBody};
        use states::*;

        let mut animator = Self::new(
            Clip::looping(LOCOMOTION, 1.0),
            Clip::looping(EMPTY, 1.0),
        );

        animator
            .add_clip(Clip::once(KNOCK_OUT, 0.8))
            .add_clip(Clip::looping(FALLEN, 1.0))
            .add_clip(Clip::once(STANDING, 0.8))
            .add_clip(Clip::once(CLIMB, 1.0))
            .add_clip(Clip::looping(EDGE_HANG, 1.0))
            .add_clip(Clip::looping(ROPE_HANG, 1.0))
            .add_clip(Clip::once(GET_HIT, 0.5));

        let flag = |param, value| Condition::Flag(param, value);
        let from = |name: &str| Source::State(name.to_string());

        animator
            .transition(
                Base,
                Source::AnyExcept(vec![KNOCK_OUT.into(), FALLEN.into(), STANDING.into()]),
                KNOCK_OUT,
                flag(AnimBool::KnockOut, true),
                0.1,
            )
            .transition(
                Base,
                from(KNOCK_OUT),
                STANDING,
                Condition::All(vec![Condition::Finished, flag(AnimBool::KeepFalling, false)]),
                0.1,
            )
            .transition(Base, from(KNOCK_OUT), FALLEN, Condition::Finished, 0.1)
            .transition(Base, from(FALLEN), STANDING, flag(AnimBool::KeepFalling, false), 0.1)
            .transition(Base, from(STANDING), LOCOMOTION, Condition::Finished, 0.1)
            .transition(Base, from(LOCOMOTION), CLIMB, flag(AnimBool::IsEdgeClimbing, true), 0.05)
            .transition(Base, from(EDGE_HANG), CLIMB, flag(AnimBool::IsEdgeClimbing, true), 0.05)
            .transition(Base, from(CLIMB), LOCOMOTION, flag(AnimBool::IsEdgeClimbing, false), 0.1)
            .transition(Base, from(CLIMB), LOCOMOTION, Condition::Finished, 0.1)
            .transition(Base, from(LOCOMOTION), EDGE_HANG, flag(AnimBool::IsHangingOnEdge, true), 0.1)
            .transition(Base, from(EDGE_HANG), LOCOMOTION, flag(AnimBool::IsHangingOnEdge, false), 0.1)
            .transition(Base, from(LOCOMOTION), ROPE_HANG, flag(AnimBool::IsHangingOnRope, true), 0.1)
            .transition(Base, from(ROPE_HANG), LOCOMOTION, flag(AnimBool::IsHangingOnRope, false), 0.1);

        if let Some(first) = combo.first() {
            animator.transition(
                Base,
                from(LOCOMOTION),
                &first.name,
                Condition::Trigger(AnimTrigger::StartCombo),
                0.05,
            );
        }
        if let Some(second) = combo.get(1) {
            animator.transition(
                Base,
                from(LOCOMOTION),
                &second.name,
                Condition::Trigger(AnimTrigger::LateComboStart),
                0.05,
            );
        }
        for (i, clip) in combo.iter().enumerate() {
            animator.add_clip(clip.clone());
            if let Some(next) = combo.get(i + 1) {
                animator.transition(
                    Base,
                    from(&clip.name),
                    &next.name,
                    Condition::All(vec![
                        Condition::Trigger(AnimTrigger::ContinueCombo),
                        Condition::Finished,
                    ]),
                    0.05,
                );
            }
            animator
                .transition(Base, from(&clip.name), LOCOMOTION, flag(AnimBool::ComboBreak, true), 0.1)
                .transition(Base, from(&clip.name), LOCOMOTION, Condition::Finished, 0.1);
        }

        animator.transition(
            UpperBody,
            Source::AnyExcept(vec![GET_HIT.into()]),
            GET_HIT,
            flag(AnimBool::WasJustHit, true),
            0.05,
        );
        animator.transition(UpperBody, from(GET_HIT), EMPTY, Condition::Finished, 0.1);

        if let Some(attack) = attack {
            animator
                .transition(
                    UpperBody,
                    from(EMPTY),
                    &attack.name,
                    Condition::Trigger(AnimTrigger::Attack),
                    0.05,
                )
                .transition(UpperBody, from(&attack.name), EMPTY, Condition::Finished, 0.1);
            animator.add_clip(attack);
        }

        animator
    }

    pub fn add_clip(&mut self, clip: Clip) -> &mut Self {
        self.clips.insert(clip.name.clone(), clip);
        self
    }

    pub fn transition(
        &mut self,
        layer: AnimLayer,
        from: Source,
        to: &str,
        when: Condition,
        blend: f32,
    ) -> &mut Self {
        self.transitions.push(Transition {
            layer,
            from,
            to: to.to_string(),
            when,
            blend: blend.max(0.0),
        });
        self
    }

    pub fn float(&self, param: AnimFloat) -> f32 {
        self.floats.get(&param).copied().unwrap_or(0.0)
    }

    pub fn flag(&self, param: AnimBool) -> bool {
        self.bools.get(&param).copied().unwrap_or(false)
    }

    pub fn has_trigger(&self, trigger: AnimTrigger) -> bool {
        self.triggers.contains(&trigger)
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    /// Resets the rig to the rest pose for a body standing at `feet`.
    pub fn set_pose(&mut self, feet: Vec3, rotation: Quat, height: f32) {
        self.skeleton = Skeleton::rest(feet, rotation, height);
    }

    /// Advances playback on every layer, then fires at most one transition per layer.
    pub fn advance(&mut self, dt: f32) {
        let dt = dt * self.speed;

        for layer in [AnimLayer::Base, AnimLayer::UpperBody] {
            let playback = &mut self.layers[layer.index()];
            playback.time += dt;

            if let Some(blend) = playback.next.as_mut() {
                blend.elapsed += dt;
                if blend.elapsed >= blend.duration {
                    playback.current = blend.state.clone();
                    playback.time = blend.elapsed;
                    playback.next = None;
                }
            }

            if let Some(index) = self.pick_transition(layer) {
                self.fire(layer, index);
            }
        }
    }

    fn clip_length(&self, state: &str) -> f32 {
        self.clips.get(state).map_or(1.0, |c| c.length)
    }

    fn holds(&self, condition: &Condition, state: &str, elapsed: f32) -> bool {
        match condition {
            Condition::Trigger(trigger) => self.triggers.contains(trigger),
            Condition::Flag(param, value) => self.flag(*param) == *value,
            Condition::Finished => self
                .clips
                .get(state)
                .is_some_and(|clip| !clip.looping && elapsed >= clip.length),
            Condition::All(conditions) => conditions.iter().all(|c| self.holds(c, state, elapsed)),
        }
    }

    fn pick_transition(&self, layer: AnimLayer) -> Option<usize> {
        let (state, elapsed) = self.layers[layer.index()].source();

        self.transitions.iter().position(|t| {
            t.layer == layer
                && t.to != state
                && t.from.matches(state)
                && self.holds(&t.when, state, elapsed)
        })
    }

    fn consume(&mut self, condition: &Condition) {
        match condition {
            Condition::Trigger(trigger) => {
                self.triggers.remove(trigger);
            }
            Condition::All(conditions) => conditions.iter().for_each(|c| self.consume(c)),
            Condition::Flag(..) | Condition::Finished => {}
        }
    }

    fn fire(&mut self, layer: AnimLayer, index: usize) {
        let transition = self.transitions[index].clone();
        self.consume(&transition.when);
        debug!(
            "Animator {:?}: -> {} (blend {:.2}s)",
            layer, transition.to, transition.blend
        );

        let playback = &mut self.layers[layer.index()];
        if let Some(blend) = playback.next.take() {
            playback.current = blend.state;
            playback.time = blend.elapsed;
        }

        if transition.blend <= 0.0 {
            playback.current = transition.to;
            playback.time = 0.0;
        } else {
            playback.next = Some(Blend {
                state: transition.to,
                elapsed: 0.0,
                duration: transition.blend,
            });
        }
    }
}

impl Animator for StateAnimator {
    fn set_float(&mut self, param: AnimFloat, value: f32) {
        self.floats.insert(param, value);
    }

    fn set_bool(&mut self, param: AnimBool, value: bool) {
        self.bools.insert(param, value);
    }

    fn set_trigger(&mut self, trigger: AnimTrigger) {
        self.triggers.insert(trigger);
    }

    fn set_speed(&mut self, speed: f32) {
        self.speed = speed.max(0.0);
    }

    fn current_state(&self, layer: AnimLayer) -> StateInfo<'_> {
        let playback = &self.layers[layer.index()];
        let length = self.clip_length(&playback.current);
        StateInfo {
            name: &playback.current,
            normalized_time: playback.time / length,
            length,
        }
    }

    fn next_state(&self, layer: AnimLayer) -> Option<StateInfo<'_>> {
        let blend = self.layers[layer.index()].next.as_ref()?;
        let length = self.clip_length(&blend.state);
        Some(StateInfo {
            name: &blend.state,
            normalized_time: blend.elapsed / length,
            length,
        })
    }

    fn skeleton(&self) -> Option<&Skeleton> {
        Some(&self.skeleton)
    }

    fn skeleton_mut(&mut self) -> Option<&mut Skeleton> {
        Some(&mut self.skeleton)
    }
}
