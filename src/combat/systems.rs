//! Combat domain: weapon probes, hit resolution and regeneration.

use bevy::ecs::message::{MessageReader, MessageWriter};
use bevy::prelude::*;

use crate::core::HitPause;
use crate::motor::{CharacterBody, CharacterMotor};
use crate::world::{AvianGeometry, ColliderKind, GeometryQuery, QueryFilter};

use super::events::{CharacterDied, HitMessage};
use super::health::CharacterHealth;
use super::weapon::{Hit, Strike, Weapon};

/// Probes the sphere in front of an attacker and feeds every character inside it through
/// the weapon's hit window. `position_of` resolves a character's current center.
pub fn probe_weapon(
    weapon: &mut Weapon,
    attacker: Entity,
    center: Vec3,
    forward: Vec3,
    radius: f32,
    geometry: &dyn GeometryQuery,
    position_of: impl Fn(Entity) -> Option<Vec3>,
) -> Vec<Hit> {
    if !weapon.is_window_open() {
        return Vec::new();
    }

    let weapon_position = center + forward * (radius + weapon.reach * 0.5);
    let filter = QueryFilter::solids_excluding(attacker).with_characters();

    let mut overlaps = geometry.overlap_sphere(weapon_position, weapon.reach, &filter);
    overlaps.retain(|overlap| overlap.kind == ColliderKind::Character);
    // Nearest first, so the one hit a swing may land goes to the closest body
    overlaps.sort_by(|a, b| {
        let da = position_of(a.collider).map_or(f32::MAX, |p| p.distance_squared(center));
        let db = position_of(b.collider).map_or(f32::MAX, |p| p.distance_squared(center));
        da.total_cmp(&db)
    });

    overlaps
        .into_iter()
        .filter_map(|overlap| {
            let target_position = position_of(overlap.collider)?;
            weapon.damage_check(Strike {
                attacker_position: center,
                weapon_position,
                target: overlap.collider,
                target_position,
            })
        })
        .collect()
}

pub(crate) fn detect_weapon_hits(
    geometry: AvianGeometry,
    mut attackers: Query<(Entity, &CharacterMotor, &CharacterBody, &Transform, &mut Weapon)>,
    bodies: Query<&Transform, With<CharacterBody>>,
    mut hits: MessageWriter<HitMessage>,
) {
    for (entity, motor, body, transform, mut weapon) in &mut attackers {
        if !weapon.is_window_open() || !motor.is_alive() {
            continue;
        }

        let landed = probe_weapon(
            &mut weapon,
            entity,
            transform.translation,
            motor.forward(),
            body.radius,
            &geometry,
            |target| bodies.get(target).ok().map(|t| t.translation),
        );

        for hit in landed {
            debug!("Hit: {:?} -> {:?} for {}", hit.attacker, hit.target, hit.damage);
            hits.write(HitMessage { hit });
        }
    }
}

pub(crate) fn apply_hits(
    real: Res<Time<Real>>,
    mut pause: ResMut<HitPause>,
    mut hits: MessageReader<HitMessage>,
    mut deaths: MessageWriter<CharacterDied>,
    mut targets: Query<(&mut CharacterMotor, Option<&mut CharacterHealth>)>,
) {
    let now = real.elapsed_secs();

    for HitMessage { hit } in hits.read() {
        let Ok((mut motor, health)) = targets.get_mut(hit.target) else {
            continue;
        };
        if !motor.is_alive() {
            continue;
        }

        motor.on_hit();
        pause.request(now, hit.pause_duration, hit.pause_delay);

        if let Some(mut health) = health
            && health.deal(hit.damage)
        {
            motor.die();
            deaths.write(CharacterDied { entity: hit.target });
        }
    }
}

/// Kills characters whose health was drained outside of weapon hits.
pub(crate) fn sync_deaths(
    mut characters: Query<(Entity, &mut CharacterMotor, &CharacterHealth), Changed<CharacterHealth>>,
    mut deaths: MessageWriter<CharacterDied>,
) {
    for (entity, mut motor, health) in &mut characters {
        if health.is_dead() && motor.is_alive() {
            motor.die();
            deaths.write(CharacterDied { entity });
        }
    }
}

pub(crate) fn regenerate_health(time: Res<Time>, mut query: Query<&mut CharacterHealth>) {
    let dt = time.delta_secs();
    for mut health in &mut query {
        if health.regeneration != 0.0 && !health.is_dead() && health.health < health.max_health {
            health.regenerate(dt);
        }
    }
}

pub(crate) fn log_deaths(mut deaths: MessageReader<CharacterDied>) {
    for death in deaths.read() {
        info!("Character {:?} died", death.entity);
    }
}
