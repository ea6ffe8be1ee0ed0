//! Characters domain: spawning characters from loaded profiles.

use avian3d::prelude::*;
use bevy::prelude::*;

use crate::ai::AiController;
use crate::animation::{Clip, StateAnimator};
use crate::combat::CharacterHealth;
use crate::content::{CharacterProfile, WeaponProfile};
use crate::motor::{CharacterBody, CharacterMotor, DEFAULT_ANGLE};
use crate::world::{CharacterCollider, GameLayer};

use super::registry::{CharacterSide, Player};

/// Physics and motor components every character carries.
///
/// The motor integrates its own gravity, so the body ignores the global one.
#[derive(Bundle)]
pub struct CharacterBundle {
    pub name: Name,
    pub motor: CharacterMotor,
    pub body: CharacterBody,
    pub animator: StateAnimator,
    pub health: CharacterHealth,
    pub marker: CharacterCollider,
    pub transform: Transform,
    pub rigid_body: RigidBody,
    pub collider: Collider,
    pub collision_layers: CollisionLayers,
    pub velocity: LinearVelocity,
    pub friction: Friction,
    pub locked_axes: LockedAxes,
    pub gravity_scale: GravityScale,
}

impl CharacterBundle {
    /// Bundle standing on `feet`.
    pub fn new(profile: &CharacterProfile, feet: Vec3) -> Self {
        let body = profile.body;
        let mut motor = CharacterMotor::new(profile.motor.clone()).facing(profile.facing, DEFAULT_ANGLE);
        motor.can_be_made_to_fall = profile.can_be_made_to_fall;

        let capsule_length = (body.height - 2.0 * body.radius).max(0.0);
        let name = if profile.name.is_empty() {
            profile.id.clone()
        } else {
            profile.name.clone()
        };

        Self {
            name: Name::new(name),
            motor,
            body,
            animator: animator_for(profile.weapon.as_ref()),
            health: profile.health.clone(),
            marker: CharacterCollider,
            transform: Transform::from_translation(body.center(feet)),
            rigid_body: RigidBody::Dynamic,
            collider: Collider::capsule(body.radius, capsule_length),
            collision_layers: GameLayer::character(),
            velocity: LinearVelocity::default(),
            friction: Friction::ZERO,
            locked_axes: LockedAxes::ROTATION_LOCKED,
            gravity_scale: GravityScale(0.0),
        }
    }
}

/// Animator graph with a clip for every attack the weapon can play.
pub fn animator_for(weapon: Option<&WeaponProfile>) -> StateAnimator {
    let Some(weapon) = weapon else {
        return StateAnimator::humanoid(&[], None);
    };

    let combo: Vec<Clip> = weapon
        .combo
        .iter()
        .map(|attack| Clip::once(attack.state.clone(), weapon.clip_length))
        .collect();
    let attack = Clip::once(weapon.attack.state.clone(), weapon.clip_length);

    StateAnimator::humanoid(&combo, Some(attack))
}

/// Spawn a character from `profile` with its optional weapon, side and AI.
pub fn spawn_character(
    commands: &mut Commands,
    profile: &CharacterProfile,
    feet: Vec3,
    player: bool,
) -> Entity {
    let mut entity = commands.spawn(CharacterBundle::new(profile, feet));

    if let Some(weapon) = &profile.weapon {
        entity.insert(weapon.build());
    }
    if let Some(side) = profile.side {
        entity.insert(CharacterSide(side));
    }
    if let Some(settings) = &profile.ai {
        let mut controller = AiController::new(settings.clone());
        controller.set_center(feet);
        entity.insert(controller);
    }
    if player {
        entity.insert(Player);
    }

    let id = entity.id();
    debug!("Spawned '{}' as {:?} at {}", profile.id, id, feet);
    id
}
