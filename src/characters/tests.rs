use bevy::prelude::*;

use super::*;
use crate::world::{ColliderKind, StaticGeometry};

fn entities(count: usize) -> Vec<Entity> {
    let mut world = World::new();
    (0..count).map(|_| world.spawn_empty().id()).collect()
}

fn entry(entity: Entity, feet: Vec3) -> CharacterEntry {
    CharacterEntry {
        entity,
        feet,
        height: 1.8,
        radius: 0.3,
        side: None,
        has_ai: true,
        is_player: false,
        alive: true,
    }
}

fn camera() -> CameraView {
    let eye = Vec3::new(0.0, 1.0, 10.0);
    let aspect = 16.0 / 9.0;
    let clip_from_view = Mat4::perspective_rh(60f32.to_radians(), aspect, 0.1, 100.0);
    let view_from_world = Mat4::look_at_rh(eye, Vec3::new(0.0, 1.0, 0.0), Vec3::Y);
    CameraView {
        position: eye,
        clip_from_world: clip_from_view * view_from_world,
        aspect,
    }
}

// ----------------------------------------------------------------------------
// Registration
// ----------------------------------------------------------------------------

#[test]
fn test_register_refreshes_existing_entry() {
    let ids = entities(1);
    let mut registry = CharacterRegistry::default();

    assert!(registry.register(entry(ids[0], Vec3::ZERO)));
    assert!(!registry.register(entry(ids[0], Vec3::X)));

    assert_eq!(registry.len(), 1);
    assert_eq!(registry.get(ids[0]).map(|e| e.feet), Some(Vec3::X));
}

#[test]
fn test_all_skips_dead_and_keeps_order() {
    let ids = entities(3);
    let mut registry = CharacterRegistry::default();
    registry.register(entry(ids[2], Vec3::ZERO));
    registry.register(CharacterEntry {
        alive: false,
        ..entry(ids[0], Vec3::ZERO)
    });
    registry.register(entry(ids[1], Vec3::ZERO));

    let alive: Vec<Entity> = registry.all().map(|e| e.entity).collect();
    assert_eq!(alive, vec![ids[2], ids[1]]);
    assert!(registry.get(ids[0]).is_some());
}

#[test]
fn test_first_player_becomes_main_player() {
    let ids = entities(3);
    let mut registry = CharacterRegistry::default();
    registry.register(entry(ids[0], Vec3::ZERO));
    registry.register(CharacterEntry {
        is_player: true,
        has_ai: false,
        ..entry(ids[1], Vec3::ZERO)
    });
    registry.register(CharacterEntry {
        is_player: true,
        has_ai: false,
        ..entry(ids[2], Vec3::ZERO)
    });

    assert_eq!(registry.main_player().map(|e| e.entity), Some(ids[1]));

    registry.unregister(ids[1]);
    assert!(registry.main_player().is_none());
    assert!(registry.get(ids[1]).is_none());
    assert_eq!(registry.all().count(), 2);
}

#[test]
fn test_unregister_unknown_is_none() {
    let ids = entities(1);
    let mut registry = CharacterRegistry::default();
    assert!(registry.unregister(ids[0]).is_none());
    assert!(registry.is_empty());
}

// ----------------------------------------------------------------------------
// Sides
// ----------------------------------------------------------------------------

#[test]
fn test_explicit_sides_compare_by_id() {
    let ids = entities(3);
    let mut registry = CharacterRegistry::default();
    registry.register(CharacterEntry {
        side: Some(1),
        ..entry(ids[0], Vec3::ZERO)
    });
    registry.register(CharacterEntry {
        side: Some(1),
        has_ai: false,
        ..entry(ids[1], Vec3::ZERO)
    });
    registry.register(CharacterEntry {
        side: Some(2),
        ..entry(ids[2], Vec3::ZERO)
    });

    assert!(registry.is_same_side(ids[0], ids[1]));
    assert!(!registry.is_same_side(ids[0], ids[2]));
}

#[test]
fn test_sideless_characters_group_by_ai() {
    let ids = entities(4);
    let mut registry = CharacterRegistry::default();
    registry.register(entry(ids[0], Vec3::ZERO));
    registry.register(entry(ids[1], Vec3::ZERO));
    registry.register(CharacterEntry {
        has_ai: false,
        ..entry(ids[2], Vec3::ZERO)
    });
    // One explicit side is not enough to compare sides
    registry.register(CharacterEntry {
        side: Some(3),
        ..entry(ids[3], Vec3::ZERO)
    });

    assert!(registry.is_same_side(ids[0], ids[1]));
    assert!(!registry.is_same_side(ids[0], ids[2]));
    assert!(registry.is_same_side(ids[0], ids[3]));
}

// ----------------------------------------------------------------------------
// Sight
// ----------------------------------------------------------------------------

#[test]
fn test_character_in_front_of_camera_is_in_sight() {
    let ids = entities(1);
    let mut registry = CharacterRegistry::default();
    registry.register(entry(ids[0], Vec3::ZERO));

    let geometry = StaticGeometry::new();
    assert!(registry.is_in_sight(ids[0], 0.5, 0.0, &camera(), &geometry));
}

#[test]
fn test_occluded_character_is_not_in_sight() {
    let ids = entities(2);
    let mut registry = CharacterRegistry::default();
    registry.register(entry(ids[0], Vec3::ZERO));

    let mut geometry = StaticGeometry::new();
    geometry.add_cuboid(
        ids[1],
        Vec3::new(0.0, 1.0, 5.0),
        Vec3::ONE,
        Quat::IDENTITY,
        ColliderKind::Solid,
    );

    assert!(!registry.is_in_sight(ids[0], 0.5, 0.0, &camera(), &geometry));
}

#[test]
fn test_off_screen_or_behind_is_not_in_sight() {
    let ids = entities(3);
    let mut registry = CharacterRegistry::default();
    registry.register(entry(ids[0], Vec3::new(100.0, 0.0, 0.0)));
    registry.register(entry(ids[1], Vec3::new(0.0, 0.0, 20.0)));

    let geometry = StaticGeometry::new();
    assert!(!registry.is_in_sight(ids[0], 0.5, 0.0, &camera(), &geometry));
    assert!(!registry.is_in_sight(ids[1], 0.5, 0.0, &camera(), &geometry));
    assert!(!registry.is_in_sight(ids[2], 0.5, 0.0, &camera(), &geometry));
}

// ----------------------------------------------------------------------------
// Spawning
// ----------------------------------------------------------------------------

#[test]
fn test_bundle_stands_on_feet() {
    let mut profile = crate::content::CharacterProfile::new("brute");
    profile.can_be_made_to_fall = false;
    let feet = Vec3::new(2.0, 1.0, 0.0);

    let bundle = CharacterBundle::new(&profile, feet);

    assert!(bundle.body.feet(bundle.transform.translation).distance(feet) < 1e-5);
    assert!(!bundle.motor.can_be_made_to_fall);
    assert_eq!(bundle.gravity_scale.0, 0.0);
    assert!(bundle.motor.is_alive());
}

#[test]
fn test_spawned_enemy_carries_side_and_ai() {
    let registry = crate::content::ProfileRegistry::fallback();
    let grunt = registry.get("grunt").unwrap();
    let mut world = World::new();

    let entity = {
        let mut commands = world.commands();
        spawn_character(&mut commands, grunt, Vec3::new(4.0, 0.0, 0.0), false)
    };
    world.flush();

    let spawned = world.entity(entity);
    assert!(spawned.contains::<crate::ai::AiController>());
    assert!(spawned.contains::<crate::combat::Weapon>());
    assert!(!spawned.contains::<Player>());
    assert_eq!(
        spawned.get::<CharacterSide>().map(|s| s.0),
        grunt.side
    );
}

#[test]
fn test_spawned_player_is_marked() {
    let registry = crate::content::ProfileRegistry::fallback();
    let player = registry.get("player").unwrap();
    let mut world = World::new();

    let entity = {
        let mut commands = world.commands();
        spawn_character(&mut commands, player, Vec3::ZERO, true)
    };
    world.flush();

    assert!(world.entity(entity).contains::<Player>());
    assert!(!world.entity(entity).contains::<crate::ai::AiController>());
}
