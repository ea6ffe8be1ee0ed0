//! Validation of loaded character profiles.

use super::data::CharacterProfile;
use super::loader::ContentError;

/// Helper macro for checking a value lies in a range
macro_rules! check_range {
    ($errors:expr, $profile:expr, $field:expr, $value:expr, $range:expr) => {
        if !$range.contains(&$value) {
            $errors.push(ContentError::Invalid {
                profile: $profile.id.clone(),
                field: $field.to_string(),
                reason: format!("{} is outside {:?}", $value, $range),
            });
        }
    };
}

/// Validate one profile.
/// Returns a list of validation errors, empty if the profile is usable.
pub fn validate_profile(profile: &CharacterProfile) -> Vec<ContentError> {
    let mut errors = Vec::new();

    if profile.id.trim().is_empty() {
        errors.push(ContentError::Invalid {
            profile: profile.id.clone(),
            field: "id".to_string(),
            reason: "must not be empty".to_string(),
        });
    }

    for field in profile.motor.non_positive_fields() {
        errors.push(ContentError::Invalid {
            profile: profile.id.clone(),
            field: format!("motor.{field}"),
            reason: "must be positive".to_string(),
        });
    }

    check_range!(errors, profile, "body.height", profile.body.height, 0.1..=10.0);
    check_range!(errors, profile, "body.radius", profile.body.radius, 0.01..=profile.body.height * 0.5);
    check_range!(errors, profile, "health.max_health", profile.health.max_health, f32::EPSILON..=f32::MAX);
    check_range!(errors, profile, "health.health", profile.health.health, 0.0..=profile.health.max_health);

    if let Some(weapon) = &profile.weapon {
        check_range!(errors, profile, "weapon.reach", weapon.reach, f32::EPSILON..=f32::MAX);
        check_range!(errors, profile, "weapon.clip_length", weapon.clip_length, f32::EPSILON..=f32::MAX);

        for attack in weapon.attacks() {
            let field = |name: &str| format!("attack '{}' {}", attack.state, name);
            check_range!(errors, profile, field("start"), attack.start, 0.0..=1.0);
            check_range!(errors, profile, field("hit_delay"), attack.hit_delay, 0.0..=1.0);
            check_range!(errors, profile, field("duration"), attack.duration, f32::EPSILON..=1.0);
            check_range!(errors, profile, field("damage"), attack.damage, 0.0..=f32::MAX);
            if attack.hit_delay >= attack.duration {
                errors.push(ContentError::Invalid {
                    profile: profile.id.clone(),
                    field: field("hit_delay"),
                    reason: "leaves no hit window".to_string(),
                });
            }
        }
    }

    if let Some(ai) = &profile.ai {
        check_range!(errors, profile, "ai.attack_wait", ai.attack_wait, 0.0..=f32::MAX);
        check_range!(errors, profile, "ai.forget_distance", ai.forget_distance, ai.notice_distance..=f32::MAX);
    }

    errors
}
