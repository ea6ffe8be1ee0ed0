//! Motor domain: ECS adapters that feed bodies through the motor phases.

use avian3d::prelude::*;
use bevy::ecs::message::MessageWriter;
use bevy::prelude::*;

use crate::animation::StateAnimator;
use crate::combat::{CharacterHealth, Weapon};
use crate::core::{CharacterTime, yaw_rotation};
use crate::world::{AvianGeometry, Climbables, GameLayer, Hazard, HazardKind};

use super::body::{BodyState, CharacterBody, MotorEnv};
use super::character::CharacterMotor;
use super::events::{MotorEvent, MotorMessage};

type MotorItem = (
    Entity,
    &'static mut CharacterMotor,
    &'static CharacterBody,
    &'static mut Transform,
    &'static mut LinearVelocity,
    &'static mut StateAnimator,
    Option<&'static mut Weapon>,
    Option<&'static CharacterTime>,
);

/// Which motor phase a pass runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Fixed,
    Late,
}

pub(crate) fn motor_fixed_update(
    time: Res<Time>,
    geometry: AvianGeometry,
    mut climbables: ResMut<Climbables>,
    mut characters: Query<MotorItem>,
    mut messages: MessageWriter<MotorMessage>,
) {
    run_phase(
        Phase::Fixed,
        time.delta_secs(),
        &geometry,
        &mut climbables,
        &mut characters,
        &mut messages,
    );
}

pub(crate) fn motor_late_update(
    time: Res<Time>,
    geometry: AvianGeometry,
    mut climbables: ResMut<Climbables>,
    mut characters: Query<MotorItem>,
    mut messages: MessageWriter<MotorMessage>,
) {
    run_phase(
        Phase::Late,
        time.delta_secs(),
        &geometry,
        &mut climbables,
        &mut characters,
        &mut messages,
    );
}

fn run_phase(
    phase: Phase,
    dt: f32,
    geometry: &AvianGeometry,
    climbables: &mut Climbables,
    characters: &mut Query<MotorItem>,
    messages: &mut MessageWriter<MotorMessage>,
) {
    let mut impacts = Vec::new();

    for (entity, mut motor, body, mut transform, mut velocity, mut animator, mut weapon, character_time) in
        characters.iter_mut()
    {
        // The fixed clock is shared; only the presentation pass honours per-character time
        let dt = match (phase, character_time) {
            (Phase::Late, Some(t)) => t.scaled(dt),
            _ => dt,
        };

        let mut state = BodyState::new(entity, body, body.feet(transform.translation));
        state.velocity = velocity.0;

        let mut events: Vec<MotorEvent> = Vec::new();
        let mut env = MotorEnv {
            geometry,
            climbables: &mut *climbables,
            animator: &mut *animator,
            weapon: weapon.as_deref_mut(),
            listener: &mut events,
        };

        match phase {
            Phase::Fixed => motor.fixed_update(&mut state, &mut env, dt),
            Phase::Late => motor.late_update(&mut state, &mut env, dt),
        }

        let center = body.center(state.feet);
        if transform.translation != center {
            transform.translation = center;
        }
        transform.rotation = yaw_rotation(motor.yaw());
        velocity.0 = state.velocity;

        for event in events {
            if let MotorEvent::DashImpact { target, impulse } = event {
                impacts.push((target, impulse));
            }
            messages.write(MotorMessage {
                character: entity,
                event,
            });
        }
    }

    for (target, impulse) in impacts {
        let Ok((_, mut motor, _, _, mut velocity, ..)) = characters.get_mut(target) else {
            continue;
        };
        debug!("Dash knocked {:?}", target);
        velocity.0 += impulse;
        motor.knock_out(true);
    }
}

/// Death volumes kill on contact; fall volumes knock over susceptible characters.
///
/// A death volume drains health where the character has some, leaving the death itself to
/// the combat pass so it is reported like any other.
pub(crate) fn apply_hazards(
    hazards: Query<(&Hazard, &GlobalTransform)>,
    mut characters: Query<(
        &mut CharacterMotor,
        &CharacterBody,
        &Transform,
        Option<&mut CharacterHealth>,
    )>,
) {
    for (mut motor, body, transform, mut health) in &mut characters {
        let center = transform.translation;
        let feet = body.feet(center);

        for (hazard, hazard_transform) in &hazards {
            let origin = hazard_transform.translation();
            if !hazard.contains(origin, center) && !hazard.contains(origin, feet) {
                continue;
            }

            match hazard.kind {
                HazardKind::Death => match health.as_deref_mut() {
                    Some(health) if !health.is_dead() => {
                        health.deal(health.health);
                    }
                    _ => motor.die(),
                },
                HazardKind::Fall if motor.can_be_made_to_fall => motor.knock_out(false),
                HazardKind::Fall => {}
            }
        }
    }
}

/// Knocked-out and dead bodies drop out of character collisions.
pub(crate) fn sync_collision_layers(
    mut characters: Query<(&CharacterMotor, &mut CollisionLayers), Changed<CharacterMotor>>,
) {
    for (motor, mut layers) in &mut characters {
        let wanted = if motor.uses_fallen_layer() {
            GameLayer::fallen()
        } else {
            GameLayer::character()
        };

        if *layers != wanted {
            *layers = wanted;
        }
    }
}
