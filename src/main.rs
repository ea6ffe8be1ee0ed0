use avian3d::prelude::*;
use bevy::prelude::*;

use platformer_motor::PlatformerPlugins;
use platformer_motor::characters::spawn_character;
use platformer_motor::content::ProfileRegistry;
use platformer_motor::world::{Climbables, Edge, EdgeVolume, GameLayer, Hazard, HazardKind, Rope};

fn main() {
    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Platformer".to_string(),
                resolution: (1280, 720).into(),
                resizable: true,
                ..default()
            }),
            ..default()
        }))
        .add_plugins(PhysicsPlugins::default())
        .add_plugins(PlatformerPlugins)
        .add_systems(Startup, setup_level)
        .run();
}

/// Builds the demo stage: a floor, a wall, a ledge with a grab edge, a rope over a pit, and
/// the hazards below it.
fn setup_level(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut climbables: ResMut<Climbables>,
    profiles: Res<ProfileRegistry>,
) {
    commands.spawn((
        Camera3d::default(),
        Transform::from_xyz(0.0, 4.0, 18.0).looking_at(Vec3::new(0.0, 2.0, 0.0), Vec3::Y),
    ));
    commands.spawn((
        DirectionalLight {
            shadows_enabled: true,
            ..default()
        },
        Transform::from_xyz(4.0, 10.0, 6.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    let stone = materials.add(Color::srgb(0.45, 0.45, 0.5));
    let blocks = [
        // Floor with a pit between x = -4 and x = -1
        (Vec3::new(-10.0, -0.5, 0.0), Vec3::new(12.0, 1.0, 4.0)),
        (Vec3::new(6.5, -0.5, 0.0), Vec3::new(15.0, 1.0, 4.0)),
        // Wall on the far right
        (Vec3::new(14.5, 3.0, 0.0), Vec3::new(1.0, 6.0, 4.0)),
        // Ledge whose left lip can be grabbed
        (Vec3::new(8.0, 1.25, 0.0), Vec3::new(4.0, 2.5, 4.0)),
    ];
    for (center, size) in blocks {
        commands.spawn((
            Mesh3d(meshes.add(Cuboid::from_size(size))),
            MeshMaterial3d(stone.clone()),
            Transform::from_translation(center),
            RigidBody::Static,
            Collider::cuboid(size.x, size.y, size.z),
            GameLayer::level(),
        ));
    }

    let lip = Vec3::new(6.0, 2.4, 0.0);
    let edge = climbables.add_edge(Edge::new(lip, Vec3::new(0.1, 0.1, 1.5), Quat::IDENTITY));
    commands.spawn((EdgeVolume { id: edge }, Transform::from_translation(lip)));

    climbables.add_rope(Rope::hanging(Vec3::new(-2.5, 6.0, 0.0), 8, 0.5, 0.05, Vec3::X));

    commands.spawn((
        Hazard {
            kind: HazardKind::Death,
            half_extents: Vec3::new(2.0, 1.0, 2.0),
        },
        Transform::from_xyz(-2.5, -3.0, 0.0),
    ));
    commands.spawn((
        Hazard {
            kind: HazardKind::Fall,
            half_extents: Vec3::new(0.5, 0.5, 2.0),
        },
        Transform::from_xyz(11.0, 0.5, 0.0),
    ));

    let roster = [
        ("player", Vec3::new(-8.0, 0.0, 0.0), true),
        ("grunt", Vec3::new(2.0, 0.0, 0.0), false),
        ("brute", Vec3::new(8.0, 2.5, 0.0), false),
    ];
    for (id, feet, player) in roster {
        match profiles.get(id) {
            Ok(profile) => {
                spawn_character(&mut commands, profile, feet, player);
            }
            Err(error) => warn!("Skipping spawn: {}", error),
        }
    }
}
