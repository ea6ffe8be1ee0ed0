//! Debug domain: hotkeys and gizmo overlays.

use bevy::ecs::message::MessageWriter;
use bevy::prelude::*;

use crate::ai::AiController;
use crate::animation::{Animator, StateAnimator};
use crate::characters::{CameraView, CharacterRegistry, Player};
use crate::commands::{CharacterCommand, CommandKind};
use crate::debug::state::DebugState;
use crate::motor::{CharacterBody, CharacterMotor, LocomotionMode};
use crate::world::{AvianGeometry, Climbables, Hazard, HazardKind};

const ROPE_COLOR: Color = Color::srgb(0.8, 0.6, 0.3);
const EDGE_COLOR: Color = Color::srgb(0.3, 0.8, 1.0);
const SKELETON_COLOR: Color = Color::srgb(1.0, 1.0, 0.4);
const HIDDEN_COLOR: Color = Color::srgb(0.5, 0.5, 0.5);

/// F1/F2/F3 toggle the overlays
pub(crate) fn toggle_overlays(keyboard: Res<ButtonInput<KeyCode>>, mut state: ResMut<DebugState>) {
    if keyboard.just_pressed(KeyCode::F1) {
        state.show_world = !state.show_world;
        info!("Debug world overlay: {}", state.show_world);
    }
    if keyboard.just_pressed(KeyCode::F2) {
        state.show_characters = !state.show_characters;
        info!("Debug character overlay: {}", state.show_characters);
    }
    if keyboard.just_pressed(KeyCode::F3) {
        state.show_skeletons = !state.show_skeletons;
        info!("Debug skeleton overlay: {}", state.show_skeletons);
    }
}

/// Handle keyboard shortcuts for debug actions on the player
pub(crate) fn handle_debug_hotkeys(
    keyboard: Res<ButtonInput<KeyCode>>,
    registry: Res<CharacterRegistry>,
    players: Query<Entity, With<Player>>,
    mut commands: MessageWriter<CharacterCommand>,
) {
    let ctrl = keyboard.pressed(KeyCode::ControlLeft) || keyboard.pressed(KeyCode::ControlRight);
    if !ctrl {
        return;
    }

    let kind = if keyboard.just_pressed(KeyCode::KeyK) {
        CommandKind::KnockOut { temporary: false }
    } else if keyboard.just_pressed(KeyCode::KeyT) {
        CommandKind::KnockOut { temporary: true }
    } else if keyboard.just_pressed(KeyCode::KeyR) {
        CommandKind::StandUp
    } else if keyboard.just_pressed(KeyCode::KeyH) {
        CommandKind::Heal(1000.0)
    } else if keyboard.just_pressed(KeyCode::KeyF) {
        CommandKind::SpeedUp {
            scale: 2.0,
            duration: 5.0,
        }
    } else {
        return;
    };

    let player = registry
        .main_player()
        .map(|entry| entry.entity)
        .or_else(|| players.iter().next());
    let Some(player) = player else {
        warn!("Debug command {:?} with no player", kind);
        return;
    };

    info!("Debug command {:?}", kind);
    commands.write(CharacterCommand {
        character: player,
        kind,
    });
}

pub(crate) fn draw_world(
    mut gizmos: Gizmos,
    climbables: Res<Climbables>,
    hazards: Query<(&Hazard, &GlobalTransform)>,
) {
    for (_, rope) in climbables.ropes() {
        for segment in rope.segments() {
            gizmos.line(segment.bottom, segment.top, ROPE_COLOR);
        }
    }

    for (_, edge) in climbables.edges() {
        let transform = Transform::from_translation(edge.center())
            .with_rotation(edge.rotation())
            .with_scale(edge.half_extents() * 2.0);
        gizmos.cube(transform, EDGE_COLOR);
        gizmos.line(edge.left_point(), edge.right_point(), Color::WHITE);
    }

    for (hazard, transform) in &hazards {
        let color = match hazard.kind {
            HazardKind::Death => Color::srgb(1.0, 0.1, 0.1),
            HazardKind::Fall => Color::srgb(1.0, 0.6, 0.1),
        };
        let transform = Transform::from_translation(transform.translation())
            .with_scale(hazard.half_extents * 2.0);
        gizmos.cube(transform, color);
    }
}

pub(crate) fn draw_characters(
    mut gizmos: Gizmos,
    registry: Res<CharacterRegistry>,
    geometry: AvianGeometry,
    cameras: Query<(&Camera, &GlobalTransform), With<Camera3d>>,
    characters: Query<(Entity, &CharacterMotor, &CharacterBody, &Transform, Option<&AiController>)>,
) {
    let view = cameras
        .iter()
        .find(|(camera, _)| camera.is_active)
        .and_then(|(camera, transform)| CameraView::from_camera(camera, transform));

    for (entity, motor, body, transform, ai) in &characters {
        let feet = body.feet(transform.translation);
        let color = match motor.mode() {
            LocomotionMode::Normal => Color::srgb(0.2, 1.0, 0.2),
            LocomotionMode::Dashing => Color::srgb(1.0, 0.2, 1.0),
            LocomotionMode::EdgeHanging | LocomotionMode::EdgeClimbing => EDGE_COLOR,
            LocomotionMode::RopeHanging | LocomotionMode::RopeClimbing => ROPE_COLOR,
            LocomotionMode::Falling | LocomotionMode::StandingUp => Color::srgb(1.0, 0.2, 0.2),
        };

        // Greyed out when the head is off screen or behind level geometry
        let hidden = view.is_some_and(|view| {
            !registry.is_in_sight(entity, 0.9, 0.0, &view, &geometry)
        });
        let color = if hidden { HIDDEN_COLOR } else { color };

        let top = feet + Vec3::Y * body.height;
        gizmos.line(feet, top, color);
        gizmos.circle(
            Isometry3d::new(feet, Quat::from_rotation_x(std::f32::consts::FRAC_PI_2)),
            body.radius,
            color,
        );

        let chest = feet + Vec3::Y * body.height * 0.6;
        gizmos.arrow(chest, chest + motor.forward() * 0.6, Color::WHITE);

        // Angry marker above AIs that picked a target
        if ai.and_then(AiController::target).is_some() {
            gizmos.line(top, top + Vec3::Y * 0.3, Color::srgb(1.0, 0.0, 0.0));
        }
    }
}

pub(crate) fn draw_skeletons(mut gizmos: Gizmos, animators: Query<&StateAnimator>) {
    for animator in &animators {
        let Some(skeleton) = animator.skeleton() else {
            continue;
        };
        for (_, position) in skeleton.iter() {
            gizmos.sphere(Isometry3d::from_translation(position), 0.04, SKELETON_COLOR);
        }
    }
}
