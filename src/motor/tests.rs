//! Motor domain: scenario tests driven through the headless geometry service.

use bevy::prelude::*;
use proptest::prelude::*;

use super::*;
use crate::animation::{AnimLayer, Animator, Clip, StateAnimator, states};
use crate::combat::{Attack, Weapon};
use crate::core::{smoothstep, yaw_rotation};
use crate::world::{Climbables, ColliderKind, Edge, Rope, StaticGeometry};

const DT: f32 = 1.0 / 60.0;

fn entities(count: usize) -> Vec<Entity> {
    let mut world = World::new();
    (0..count).map(|_| world.spawn_empty().id()).collect()
}

fn combo_weapon() -> Weapon {
    let step = |state: &str| Attack {
        state: state.to_string(),
        ..default()
    };
    Weapon::new(vec![step("Combo 1"), step("Combo 2"), step("Combo 3")], Attack::default())
}

fn combo_animator() -> StateAnimator {
    StateAnimator::humanoid(
        &[
            Clip::once("Combo 1", 0.5),
            Clip::once("Combo 2", 0.5),
            Clip::once("Combo 3", 0.5),
        ],
        Some(Clip::once("Attack", 0.6)),
    )
}

/// One character in a static world. A tick runs the fixed phase, integrates velocity,
/// resolves the floor, advances the animator and runs the late phase.
struct Harness {
    motor: CharacterMotor,
    body: BodyState,
    geometry: StaticGeometry,
    climbables: Climbables,
    animator: StateAnimator,
    weapon: Option<Weapon>,
    events: Vec<MotorEvent>,
    floor: Option<f32>,
    ids: Vec<Entity>,
}

impl Harness {
    fn new(feet: Vec3) -> Self {
        let ids = entities(4);
        Self {
            motor: CharacterMotor::default(),
            body: BodyState::new(ids[0], &CharacterBody::default(), feet),
            geometry: StaticGeometry::new(),
            climbables: Climbables::default(),
            animator: combo_animator(),
            weapon: Some(combo_weapon()),
            events: Vec::new(),
            floor: None,
            ids,
        }
    }

    /// Adds a wide floor whose top is at y = 0.
    fn with_floor(mut self) -> Self {
        self.geometry.add_cuboid(
            self.ids[1],
            Vec3::new(0.0, -0.5, 0.0),
            Vec3::new(50.0, 0.5, 50.0),
            Quat::IDENTITY,
            ColliderKind::Solid,
        );
        self.floor = Some(0.0);
        self
    }

    fn fixed(&mut self) {
        let mut env = MotorEnv {
            geometry: &self.geometry,
            climbables: &mut self.climbables,
            animator: &mut self.animator,
            weapon: self.weapon.as_mut(),
            listener: &mut self.events,
        };
        self.motor.fixed_update(&mut self.body, &mut env, DT);
    }

    fn late(&mut self) {
        let mut env = MotorEnv {
            geometry: &self.geometry,
            climbables: &mut self.climbables,
            animator: &mut self.animator,
            weapon: self.weapon.as_mut(),
            listener: &mut self.events,
        };
        self.motor.late_update(&mut self.body, &mut env, DT);
    }

    fn tick(&mut self) {
        self.fixed();
        self.body.feet += self.body.velocity * DT;

        if let Some(floor) = self.floor
            && self.body.feet.y < floor
        {
            self.body.feet.y = floor;
            self.body.velocity.y = self.body.velocity.y.max(0.0);
        }

        self.animator.advance(DT);
        self.animator
            .set_pose(self.body.feet, yaw_rotation(self.motor.yaw()), self.body.height);
        self.late();
    }

    fn ticks(&mut self, count: usize) {
        for _ in 0..count {
            self.tick();
        }
    }

    fn count(&self, matches: impl Fn(&MotorEvent) -> bool) -> usize {
        self.events.iter().filter(|e| matches(e)).count()
    }
}

// -----------------------------------------------------------------------------
// Walking and jumping
// -----------------------------------------------------------------------------

#[test]
fn test_walk_approaches_walk_speed() {
    let mut h = Harness::new(Vec3::ZERO).with_floor();
    let mut previous = 0.0;

    for _ in 0..60 {
        h.motor.input_movement(1.0);
        h.tick();
        let along = h.body.velocity.x;
        assert!(along >= previous - 1e-4, "speed should not drop while walking");
        previous = along;
    }

    assert!(h.motor.is_grounded());
    assert!((h.body.velocity.x - 5.0).abs() < 0.05, "got {}", h.body.velocity.x);
    assert!(h.body.velocity.x <= 5.0 + 1e-4);
    assert_eq!(h.motor.mode(), LocomotionMode::Normal);
}

#[test]
fn test_releasing_input_stops_the_character() {
    let mut h = Harness::new(Vec3::ZERO).with_floor();
    for _ in 0..60 {
        h.motor.input_movement(1.0);
        h.tick();
    }

    h.ticks(60);
    assert!(h.body.velocity.x.abs() < 0.05);
}

#[test]
fn test_landing_fires_once() {
    let mut h = Harness::new(Vec3::new(0.0, 1.0, 0.0)).with_floor();
    h.ticks(90);

    assert!(h.motor.is_grounded());
    assert_eq!(h.count(|e| matches!(e, MotorEvent::Land { .. })), 1);
    let speed = h
        .events
        .iter()
        .find_map(|e| match e {
            MotorEvent::Land { speed } => Some(*speed),
            _ => None,
        })
        .unwrap_or_default();
    assert!(speed > 0.0);
}

#[test]
fn test_jump_then_second_jump_once() {
    let mut h = Harness::new(Vec3::ZERO).with_floor();
    h.ticks(5);

    h.motor.input_jump();
    h.tick();
    h.tick();
    assert!(h.motor.is_jumping());
    assert!(h.body.velocity.y > 9.0);

    h.ticks(20);
    assert!(!h.motor.is_grounded());

    h.motor.input_jump();
    h.tick();
    h.tick();
    assert!(h.motor.is_second_jumping());
    assert!(h.body.velocity.y > 9.0);

    h.ticks(20);
    let before = h.body.velocity.y;
    h.motor.input_jump();
    h.tick();
    h.tick();
    assert!(h.body.velocity.y < before, "no third jump while airborne");
}

// -----------------------------------------------------------------------------
// Dash
// -----------------------------------------------------------------------------

proptest! {
    #[test]
    fn prop_dash_follows_smoothstep(distance in 0.5f32..10.0) {
        let mut h = Harness::new(Vec3::new(0.0, 5.0, 0.0));
        let speed = h.motor.settings.dash.speed;
        h.motor.perform_dash(distance, false);

        let mut previous = 0.0;
        let mut steps = 0;
        while h.motor.is_dashing() && steps < 400 {
            h.fixed();
            h.body.feet.x += h.body.velocity.x * DT;
            steps += 1;

            let t = (steps as f32 * DT * speed / distance).min(1.0);
            let expected = distance * smoothstep(t);
            prop_assert!((h.body.feet.x - expected).abs() < 1e-3);
            prop_assert!(h.body.feet.x >= previous - 1e-5);
            previous = h.body.feet.x;
        }

        prop_assert!(!h.motor.is_dashing());
        prop_assert!((h.body.feet.x - distance).abs() < 1e-3);
    }
}

#[test]
fn test_dash_ignores_non_positive_distance() {
    let mut motor = CharacterMotor::default();
    motor.perform_dash(0.0, false);
    assert!(!motor.is_dashing());
    motor.perform_dash(-1.0, true);
    assert!(!motor.is_dashing());
}

#[test]
fn test_strong_dash_knocks_each_target_once() {
    let mut h = Harness::new(Vec3::ZERO).with_floor();
    let target = h.ids[2];
    h.geometry
        .add_ball(target, Vec3::new(0.9, 0.9, 0.0), 0.3, ColliderKind::Character);

    h.motor.perform_dash(2.0, true);
    for _ in 0..30 {
        h.fixed();
    }

    let impacts: Vec<_> = h
        .events
        .iter()
        .filter_map(|e| match e {
            MotorEvent::DashImpact { target, impulse } => Some((*target, *impulse)),
            _ => None,
        })
        .collect();
    assert_eq!(impacts.len(), 1);
    assert_eq!(impacts[0].0, target);
    assert!(impacts[0].1.x > 0.0 && impacts[0].1.y > 0.0);
}

// -----------------------------------------------------------------------------
// Fall lifecycle
// -----------------------------------------------------------------------------

#[test]
fn test_knock_out_is_ignored_while_invincible() {
    let mut motor = CharacterMotor::default();
    motor.timers.invincibility = 1.0;
    motor.knock_out(false);

    assert!(!motor.is_falling());
    assert_eq!(motor.fall_state(), FallState::Upright);
}

#[test]
fn test_temporary_knock_out_recovers() {
    let mut h = Harness::new(Vec3::ZERO).with_floor();
    h.ticks(5);

    h.motor.knock_out(true);
    assert!(h.motor.is_falling());
    assert!(!h.motor.uses_fallen_layer());

    let mut was_invincible = false;
    for _ in 0..120 {
        h.tick();
        was_invincible |= h.motor.is_invincible();
    }

    assert!(was_invincible);
    assert_eq!(h.motor.fall_state(), FallState::Upright);
    assert!(h.animator.is_in(AnimLayer::Base, states::STANDING)
        || h.animator.is_in(AnimLayer::Base, states::LOCOMOTION));
}

#[test]
fn test_permanent_knock_out_waits_for_stand_up() {
    let mut h = Harness::new(Vec3::ZERO).with_floor();
    h.ticks(5);

    h.motor.knock_out(false);
    h.ticks(120);
    assert!(h.motor.is_falling());
    assert!(h.motor.uses_fallen_layer());
    assert!(matches!(h.motor.fall_state(), FallState::Recovering { temporary: false }));

    h.motor.knock_out(true);
    assert!(matches!(h.motor.fall_state(), FallState::Recovering { .. }));

    h.motor.stand_up();
    h.ticks(120);
    assert_eq!(h.motor.fall_state(), FallState::Upright);
}

#[test]
fn test_dead_characters_stay_down() {
    let mut h = Harness::new(Vec3::ZERO).with_floor();
    h.ticks(5);

    h.motor.die();
    h.motor.stand_up();
    h.ticks(120);

    assert!(!h.motor.is_alive());
    assert!(h.motor.is_falling());
    assert!(h.motor.uses_fallen_layer());
    assert!(!h.motor.can_attack());
}

#[test]
fn test_dead_characters_ignore_movement() {
    let mut h = Harness::new(Vec3::ZERO).with_floor();
    h.ticks(5);

    h.motor.die();
    let start_x = h.body.feet.x;
    for _ in 0..60 {
        h.motor.input_movement(1.0);
        h.tick();
    }

    assert!(!h.motor.accepts_movement());
    assert!(h.body.velocity.x.abs() < 0.05);
    assert!((h.body.feet.x - start_x).abs() < 0.05);
}

#[test]
fn test_knocked_out_characters_ignore_movement() {
    let mut h = Harness::new(Vec3::ZERO).with_floor();
    h.ticks(5);

    h.motor.knock_out(false);
    let start_x = h.body.feet.x;
    for _ in 0..60 {
        h.motor.input_movement(1.0);
        h.tick();
    }

    assert!(h.motor.is_falling());
    assert!(h.body.velocity.x.abs() < 0.05);
    assert!((h.body.feet.x - start_x).abs() < 0.05);
}

#[test]
fn test_knocked_out_running_character_slows_down() {
    let mut h = Harness::new(Vec3::ZERO).with_floor();
    for _ in 0..60 {
        h.motor.input_movement(1.0);
        h.tick();
    }
    assert!(h.body.velocity.x > 4.0);

    h.motor.knock_out(false);
    for _ in 0..60 {
        h.motor.input_movement(1.0);
        h.tick();
    }

    assert!(h.body.velocity.x.abs() < 0.05);
}

// -----------------------------------------------------------------------------
// Attacks
// -----------------------------------------------------------------------------

#[test]
fn test_combo_advances_one_step_at_a_time() {
    let mut h = Harness::new(Vec3::ZERO).with_floor();
    h.ticks(5);

    let mut seen = Vec::new();
    let mut previous = None;
    for _ in 0..240 {
        h.motor.input_attack();
        h.tick();

        let current = h.motor.combo_index();
        match (previous, current) {
            (Some(a), Some(b)) => assert!(b == a || b == a + 1, "combo jumped from {a} to {b}"),
            (None, Some(b)) => assert_eq!(b, 0),
            _ => {}
        }
        if let Some(index) = current {
            seen.push(index);
        }
        previous = current;
    }

    assert!(seen.contains(&0));
    assert!(seen.contains(&1));
    assert!(seen.contains(&2));
    assert!(h.count(|e| matches!(e, MotorEvent::Attack { .. })) >= 3);
}

#[test]
fn test_attack_while_running_is_single() {
    let mut h = Harness::new(Vec3::ZERO).with_floor();
    h.ticks(5);

    h.motor.input_movement(1.0);
    h.motor.input_attack();
    h.tick();

    assert!(h.motor.is_attacking());
    assert_eq!(h.motor.combo_index(), None);
    assert_eq!(h.count(|e| matches!(e, MotorEvent::InitiateAttack)), 1);
    assert!(h.weapon.as_ref().is_some_and(|w| w.is_initiated()));
}

#[test]
fn test_hit_reaction_latches_and_clears() {
    let mut h = Harness::new(Vec3::ZERO).with_floor();
    h.ticks(5);

    h.motor.on_hit();
    h.ticks(2);
    assert!(h.motor.is_getting_hit());

    h.ticks(60);
    assert!(!h.motor.is_getting_hit());
}

// -----------------------------------------------------------------------------
// Walls
// -----------------------------------------------------------------------------

fn wall_harness() -> Harness {
    let mut h = Harness::new(Vec3::new(0.1, 2.0, 0.0));
    let wall = h.ids[1];
    h.geometry.add_cuboid(
        wall,
        Vec3::new(0.6, 2.0, 0.0),
        Vec3::new(0.2, 2.0, 2.0),
        Quat::IDENTITY,
        ColliderKind::Solid,
    );
    h
}

#[test]
fn test_wall_slide_while_falling_against_wall() {
    let mut h = wall_harness();
    h.ticks(30);

    assert!(h.motor.is_on_wall());
    assert!(h.motor.is_wall_sliding());
    assert!(h.count(|e| matches!(e, MotorEvent::Slide { .. })) >= 1);
}

#[test]
fn test_wall_slows_the_fall() {
    let mut h = wall_harness();
    h.ticks(10);
    assert!(h.motor.is_on_wall());
    assert!(h.body.velocity.y < 0.0);

    let before = h.body.velocity.y;
    h.fixed();

    let pulled = before - h.body.velocity.y;
    assert!((pulled - h.motor.settings.wall.gravity * DT).abs() < 1e-4);
}

#[test]
fn test_post_dash_grace_suspends_wall_gravity() {
    let mut h = wall_harness();
    h.ticks(10);
    assert!(h.motor.is_on_wall());

    h.motor.timers.post_dash_gravity = 0.3;
    let before = h.body.velocity.y;
    h.fixed();

    assert_eq!(h.body.velocity.y, before);
}

#[test]
fn test_wall_jump_pushes_away_and_turns() {
    let mut h = wall_harness();
    h.ticks(10);

    h.motor.input_jump();
    h.tick();
    h.tick();

    assert_eq!(h.motor.direction(), Direction::Left);
    assert!(h.body.velocity.x < -4.0);
    assert!(h.body.velocity.y > 9.0);
}

// -----------------------------------------------------------------------------
// Edges
// -----------------------------------------------------------------------------

fn edge_harness() -> Harness {
    let mut h = Harness::new(Vec3::new(-0.5, 0.5, 0.0));
    h.motor.settings.climbing.edge_height = 0.1;
    h.climbables.add_edge(Edge::new(
        Vec3::new(0.0, 1.9, 0.0),
        Vec3::new(0.25, 0.1, 1.0),
        Quat::IDENTITY,
    ));
    h
}

#[test]
fn test_edge_hang_settles_on_hang_line() {
    let mut h = edge_harness();
    h.ticks(120);

    assert!(h.motor.is_hanging_on_edge());
    assert_eq!(h.motor.mode(), LocomotionMode::EdgeHanging);
    assert!((h.body.feet.y - 0.3).abs() < 1e-3, "feet at {}", h.body.feet.y);
    assert!((h.body.feet.x + 0.55).abs() < 1e-2);
    assert!(!h.motor.has_free_hands());
}

#[test]
fn test_edge_climb_lifts_the_body() {
    let mut h = edge_harness();
    h.ticks(120);

    for _ in 0..40 {
        h.motor.input_movement(1.0);
        h.tick();
    }

    assert!(h.motor.is_edge_climbing());
    assert_eq!(h.motor.mode(), LocomotionMode::EdgeClimbing);
    assert!(h.body.feet.y > 1.0);
}

#[test]
fn test_edge_jump_releases_edge() {
    let mut h = edge_harness();
    h.ticks(120);

    h.motor.input_jump();
    h.tick();
    h.tick();

    assert!(h.motor.edge_grab().is_none());
    assert!(h.body.velocity.y > 0.0);
}

// -----------------------------------------------------------------------------
// Ropes
// -----------------------------------------------------------------------------

fn rope_harness() -> Harness {
    let mut h = Harness::new(Vec3::new(0.1, 1.0, 0.0));
    h.climbables
        .add_rope(Rope::hanging(Vec3::new(0.0, 4.0, 0.0), 4, 1.0, 0.05, Vec3::X));
    h
}

#[test]
fn test_ideal_segment_is_height_ordered() {
    let mut h = rope_harness();
    h.motor.rope_contacts = h.climbables.rope_contacts(&h.body.capsule());

    let hand = h.motor.ideal_segment(&h.climbables, h.body.hand_point());
    let hip = h.motor.ideal_segment(&h.climbables, h.body.hip_point());
    assert_eq!(hand.map(|s| s.index), Some(1));
    assert_eq!(hip.map(|s| s.index), Some(2));

    let above = h.body.feet + Vec3::Y * 10.0;
    assert!(h.motor.ideal_segment(&h.climbables, above).is_none());
}

#[test]
fn test_rope_grab_and_hang() {
    let mut h = rope_harness();
    h.tick();

    assert!(h.motor.is_hanging_on_rope());
    assert_eq!(h.motor.mode(), LocomotionMode::RopeHanging);
    assert!(!h.motor.can_attack());

    h.ticks(30);
    assert!(h.motor.is_hanging_on_rope());
    assert_eq!(h.motor.rope_grab().map(|g| g.hand.index), Some(1));
}

#[test]
fn test_rope_released_when_hand_leaves_rope_then_ignored() {
    let mut h = rope_harness();
    h.tick();
    assert!(h.motor.is_hanging_on_rope());

    // Hand above the anchor: no segment spans it
    h.body.feet = Vec3::new(0.1, 3.0, 0.0);
    h.late();
    assert!(!h.motor.is_hanging_on_rope());

    for _ in 0..30 {
        h.body.feet = Vec3::new(0.1, 1.0, 0.0);
        h.body.velocity = Vec3::ZERO;
        h.tick();
        assert!(!h.motor.is_hanging_on_rope(), "released rope should be ignored for a while");
    }

    let mut regrabbed = false;
    for _ in 0..90 {
        h.body.feet = Vec3::new(0.1, 1.0, 0.0);
        h.body.velocity = Vec3::ZERO;
        h.tick();
        regrabbed |= h.motor.is_hanging_on_rope();
    }
    assert!(regrabbed);
}

// -----------------------------------------------------------------------------
// Facing
// -----------------------------------------------------------------------------

#[test]
fn test_turning_toward_new_direction() {
    let mut h = Harness::new(Vec3::ZERO).with_floor();
    h.ticks(5);
    assert!(h.motor.is_facing_walk_direction());

    h.motor.input_direction(Direction::Left);
    h.tick();
    assert!(h.motor.direction_strength() < 1.0);

    h.ticks(120);
    assert!(h.motor.is_facing_walk_direction());
    assert!((h.motor.forward() - Vec3::NEG_X).length() < 1e-2);
}

#[test]
fn test_speed_up_expires() {
    let mut h = Harness::new(Vec3::ZERO).with_floor();
    h.motor.speed_up(2.0, 0.5);
    assert_eq!(h.motor.speed_multiplier(), 2.0);

    h.ticks(40);
    assert_eq!(h.motor.speed_multiplier(), 1.0);
}
