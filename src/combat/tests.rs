use bevy::prelude::*;
use proptest::prelude::*;

use super::*;
use crate::world::{ColliderKind, StaticGeometry};

fn entities(count: usize) -> Vec<Entity> {
    let mut world = World::new();
    (0..count).map(|_| world.spawn_empty().id()).collect()
}

fn strike(attacker: Entity, target: Entity, target_position: Vec3) -> Strike {
    Strike {
        attacker_position: Vec3::ZERO,
        weapon_position: Vec3::new(0.5, 0.0, 0.0),
        target,
        target_position,
    }
}

fn swinging(attacker: Entity, elapsed: f32) -> Weapon {
    let mut weapon = Weapon::default();
    weapon.attack_by(attacker, Attack::default(), Vec3::X);
    weapon.tick(elapsed);
    weapon
}

// ----------------------------------------------------------------------------
// Hit window
// ----------------------------------------------------------------------------

#[test]
fn test_hit_inside_window_deals_attack_damage() {
    let ids = entities(2);
    let mut weapon = swinging(ids[0], 0.59);

    let hit = weapon.damage_check(strike(ids[0], ids[1], Vec3::new(0.8, 0.0, 0.0)));

    let hit = hit.expect("hit should land inside the window");
    assert_eq!(hit.damage, 50.0);
    assert_eq!(hit.attacker, ids[0]);
    assert_eq!(hit.target, ids[1]);
    assert!((hit.pause_duration - 0.1).abs() < 1e-6);
    assert!((hit.pause_delay - 0.05).abs() < 1e-6);
}

#[test]
fn test_first_hit_closes_window_for_everyone() {
    let ids = entities(3);
    let mut weapon = swinging(ids[0], 0.1);

    assert!(weapon.damage_check(strike(ids[0], ids[1], Vec3::X)).is_some());
    assert!(!weapon.is_window_open());
    assert!(weapon.damage_check(strike(ids[0], ids[2], Vec3::X)).is_none());
    assert!(weapon.damage_check(strike(ids[0], ids[1], Vec3::X)).is_none());
}

#[test]
fn test_new_swing_reopens_window() {
    let ids = entities(2);
    let mut weapon = swinging(ids[0], 0.1);
    assert!(weapon.damage_check(strike(ids[0], ids[1], Vec3::X)).is_some());

    weapon.attack_by(ids[0], Attack::default(), Vec3::X);
    weapon.tick(0.1);
    assert!(weapon.damage_check(strike(ids[0], ids[1], Vec3::X)).is_some());
}

#[test]
fn test_attacker_never_hits_itself() {
    let ids = entities(1);
    let mut weapon = swinging(ids[0], 0.1);

    assert!(weapon.damage_check(strike(ids[0], ids[0], Vec3::X)).is_none());
    assert!(weapon.is_window_open());
}

#[test]
fn test_targets_behind_are_ignored() {
    let ids = entities(2);
    let mut weapon = swinging(ids[0], 0.1);
    assert!(weapon.damage_check(strike(ids[0], ids[1], -Vec3::X)).is_none());

    let mut weapon = Weapon::default();
    let attack = Attack {
        ignore_behind: false,
        ..default()
    };
    weapon.attack_by(ids[0], attack, Vec3::X);
    weapon.tick(0.1);
    assert!(weapon.damage_check(strike(ids[0], ids[1], -Vec3::X)).is_some());
}

#[test]
fn test_hit_delay_holds_window_shut() {
    let ids = entities(2);
    let mut weapon = Weapon::default();
    let attack = Attack {
        hit_delay: 0.2,
        ..default()
    };
    weapon.attack_by(ids[0], attack, Vec3::X);

    weapon.tick(0.1);
    assert!(weapon.damage_check(strike(ids[0], ids[1], Vec3::X)).is_none());

    weapon.tick(0.2);
    assert!(weapon.damage_check(strike(ids[0], ids[1], Vec3::X)).is_some());
}

#[test]
fn test_window_expires_after_duration() {
    let ids = entities(2);
    let mut weapon = swinging(ids[0], 0.61);
    assert!(!weapon.is_window_open());
    assert!(weapon.damage_check(strike(ids[0], ids[1], Vec3::X)).is_none());
}

#[test]
fn test_clip_length_scales_window() {
    let ids = entities(2);
    let mut weapon = Weapon::default();
    weapon.input_duration(2.0);
    weapon.attack_by(ids[0], Attack::default(), Vec3::X);

    // Half speed: a second of real time only uses half a second of window
    weapon.tick(1.0);
    assert!(weapon.is_window_open());
    assert!((weapon.timer() - 0.1).abs() < 1e-5);
}

#[test]
fn test_initiate_and_finish_fire_once() {
    let mut weapon = Weapon::default();
    assert!(!weapon.finish());
    assert!(weapon.initiate());
    assert!(!weapon.initiate());
    assert!(weapon.is_initiated());
    assert!(weapon.finish());
    assert!(!weapon.finish());
}

proptest! {
    #[test]
    fn prop_timer_never_negative(steps in prop::collection::vec(0.0f32..0.3, 1..40)) {
        let ids = entities(1);
        let mut weapon = Weapon::default();
        weapon.attack_by(ids[0], Attack::default(), Vec3::X);

        let mut previous = weapon.timer();
        for dt in steps {
            weapon.tick(dt);
            prop_assert!(weapon.timer() >= 0.0);
            prop_assert!(weapon.timer() <= previous);
            previous = weapon.timer();
        }
    }
}

// ----------------------------------------------------------------------------
// Weapon probe
// ----------------------------------------------------------------------------

#[test]
fn test_probe_hits_nearest_character_in_front() {
    let ids = entities(4);
    let (attacker, near, far, wall) = (ids[0], ids[1], ids[2], ids[3]);

    let mut geometry = StaticGeometry::new();
    geometry
        .add_ball(attacker, Vec3::ZERO, 0.3, ColliderKind::Character)
        .add_ball(near, Vec3::new(0.7, 0.0, 0.0), 0.3, ColliderKind::Character)
        .add_ball(far, Vec3::new(1.2, 0.0, 0.0), 0.3, ColliderKind::Character)
        .add_cuboid(
            wall,
            Vec3::new(0.9, 0.0, 0.0),
            Vec3::splat(0.1),
            Quat::IDENTITY,
            ColliderKind::Solid,
        );

    let positions = [(near, Vec3::new(0.7, 0.0, 0.0)), (far, Vec3::new(1.2, 0.0, 0.0))];
    let position_of = |entity: Entity| {
        positions
            .iter()
            .find(|(e, _)| *e == entity)
            .map(|(_, p)| *p)
    };

    let mut weapon = swinging(attacker, 0.1);
    let hits = probe_weapon(&mut weapon, attacker, Vec3::ZERO, Vec3::X, 0.3, &geometry, position_of);

    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].target, near);
    assert!(hits[0].normal.x < 0.0);
}

#[test]
fn test_probe_without_open_window_does_nothing() {
    let ids = entities(2);
    let mut geometry = StaticGeometry::new();
    geometry.add_ball(ids[1], Vec3::new(0.7, 0.0, 0.0), 0.3, ColliderKind::Character);

    let mut weapon = Weapon::default();
    let hits = probe_weapon(&mut weapon, ids[0], Vec3::ZERO, Vec3::X, 0.3, &geometry, |_| {
        Some(Vec3::new(0.7, 0.0, 0.0))
    });
    assert!(hits.is_empty());
}

// ----------------------------------------------------------------------------
// Health
// ----------------------------------------------------------------------------

#[test]
fn test_deal_reports_death_once() {
    let mut health = CharacterHealth::default();
    assert!(!health.deal(50.0));
    assert!(health.deal(60.0));
    assert_eq!(health.health, 0.0);
    assert!(health.is_dead());
    assert!(!health.deal(10.0));
}

#[test]
fn test_regeneration_caps_at_max() {
    let mut health = CharacterHealth {
        health: 90.0,
        regeneration: 5.0,
        ..default()
    };
    health.regenerate(1.0);
    assert_eq!(health.health, 95.0);
    health.regenerate(10.0);
    assert_eq!(health.health, 100.0);
    assert_eq!(health.fraction(), 1.0);
}

#[test]
fn test_dead_characters_do_not_regenerate() {
    let mut health = CharacterHealth {
        regeneration: 5.0,
        ..CharacterHealth::new(50.0)
    };
    health.deal(50.0);
    health.regenerate(1.0);
    assert!(health.is_dead());
}
