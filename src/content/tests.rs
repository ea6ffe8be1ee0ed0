use std::path::Path;

use super::*;
use crate::motor::Direction;

const BUNDLED: &str = include_str!("../../assets/data/profiles.ron");

fn parse(source: &str) -> Result<Vec<CharacterProfile>, ContentError> {
    parse_profiles(source, Path::new("test.ron"))
}

// ----------------------------------------------------------------------------
// Parsing
// ----------------------------------------------------------------------------

#[test]
fn test_bundled_profiles_are_valid() {
    let profiles = parse(BUNDLED).unwrap();
    assert_eq!(profiles.len(), 3);

    for profile in &profiles {
        let errors = validate_profile(profile);
        assert!(errors.is_empty(), "{}: {:?}", profile.id, errors);
    }
}

#[test]
fn test_bundled_player_has_three_step_combo() {
    let profiles = parse(BUNDLED).unwrap();
    let player = profiles.iter().find(|p| p.id == "player").unwrap();

    let weapon = player.weapon.as_ref().unwrap().build();
    assert_eq!(weapon.combo.len(), 3);
    assert!(weapon.combo[2].strong_dash);
    assert_eq!(weapon.attack.damage, 40.0);
    assert_eq!(player.side, Some(0));
    assert!(player.ai.is_none());
}

#[test]
fn test_minimal_profile_uses_defaults() {
    let source = r#"(schema_version: 1, items: [(id: "dummy")])"#;
    let profiles = parse(source).unwrap();
    let dummy = &profiles[0];

    assert_eq!(dummy.body.height, 1.8);
    assert_eq!(dummy.health.max_health, 100.0);
    assert_eq!(dummy.motor.walk.speed, 5.0);
    assert!(dummy.can_be_made_to_fall);
    assert_eq!(dummy.facing, Direction::Right);
    assert!(dummy.weapon.is_none());
}

#[test]
fn test_partial_attack_keeps_defaults() {
    let source = r#"(schema_version: 1, items: [(id: "a", weapon: (attack: (damage: 5.0)))])"#;
    let profiles = parse(source).unwrap();
    let weapon = profiles[0].weapon.as_ref().unwrap();

    assert_eq!(weapon.attack.damage, 5.0);
    assert_eq!(weapon.attack.duration, 0.6);
    assert_eq!(weapon.attack.state, "Attack");
    assert!(weapon.attack.ignore_behind);
}

#[test]
fn test_wrong_schema_version_is_rejected() {
    let source = r#"(schema_version: 7, items: [])"#;
    assert!(matches!(
        parse(source),
        Err(ContentError::Schema {
            found: 7,
            expected: 1,
            ..
        })
    ));
}

#[test]
fn test_malformed_file_reports_parse_error() {
    let error = parse("(schema_version: 1, items: [(id: ]").unwrap_err();
    assert!(matches!(error, ContentError::Parse { .. }));
    assert!(error.to_string().contains("test.ron"));
}

#[test]
fn test_missing_file_reports_io_error() {
    let result = load_profiles(Path::new("does/not/exist.ron"));
    assert!(matches!(result, Err(ContentError::Io { .. })));
}

// ----------------------------------------------------------------------------
// Validation
// ----------------------------------------------------------------------------

#[test]
fn test_attack_fractions_outside_unit_range_are_invalid() {
    let mut profile = CharacterProfile::new("bad");
    let mut weapon = WeaponProfile::default();
    weapon.attack.start = 1.5;
    profile.weapon = Some(weapon);

    let errors = validate_profile(&profile);
    assert_eq!(errors.len(), 1);
    assert!(matches!(
        &errors[0],
        ContentError::Invalid { field, .. } if field.contains("start")
    ));
}

#[test]
fn test_hit_delay_must_leave_a_window() {
    let mut profile = CharacterProfile::new("bad");
    let mut weapon = WeaponProfile::default();
    weapon.attack.hit_delay = 0.6;
    profile.weapon = Some(weapon);

    assert!(!validate_profile(&profile).is_empty());
}

#[test]
fn test_non_positive_motor_speed_is_invalid() {
    let mut profile = CharacterProfile::new("slow");
    profile.motor.walk.speed = 0.0;

    let errors = validate_profile(&profile);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].to_string().contains("motor.walk.speed"));
}

// ----------------------------------------------------------------------------
// Registry
// ----------------------------------------------------------------------------

#[test]
fn test_unknown_profile_lookup_fails() {
    let registry = ProfileRegistry::fallback();
    assert!(registry.get("player").is_ok());
    assert!(matches!(
        registry.get("dragon"),
        Err(ContentError::UnknownProfile(id)) if id == "dragon"
    ));
}

#[test]
fn test_fallback_profiles_are_valid() {
    let registry = ProfileRegistry::fallback();
    assert_eq!(registry.ids(), vec!["grunt", "player"]);

    for id in registry.ids() {
        let profile = registry.get(id).unwrap();
        assert!(validate_profile(profile).is_empty());
    }
    assert!(registry.get("grunt").unwrap().ai.is_some());
}
