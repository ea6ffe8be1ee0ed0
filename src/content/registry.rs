//! ProfileRegistry resource providing lookups for loaded character profiles.

use std::collections::HashMap;

use bevy::prelude::*;

use crate::ai::AiSettings;
use crate::combat::Attack;

use super::data::{CharacterProfile, WeaponProfile};
use super::loader::ContentError;

#[derive(Resource, Debug, Default)]
pub struct ProfileRegistry {
    profiles: HashMap<String, CharacterProfile>,
}

impl ProfileRegistry {
    /// Adds a profile, replacing any profile with the same id.
    pub fn insert(&mut self, profile: CharacterProfile) {
        if self.profiles.contains_key(&profile.id) {
            warn!("Profile '{}' defined twice, keeping the last one", profile.id);
        }
        self.profiles.insert(profile.id.clone(), profile);
    }

    pub fn get(&self, id: &str) -> Result<&CharacterProfile, ContentError> {
        self.profiles
            .get(id)
            .ok_or_else(|| ContentError::UnknownProfile(id.to_string()))
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    /// Profile ids in sorted order.
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.profiles.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    /// Returns a summary of loaded profiles for logging.
    pub fn summary(&self) -> String {
        format!("ProfileRegistry loaded {} profiles: {}", self.len(), self.ids().join(", "))
    }

    /// Built-in profiles used when the profile file is missing or broken: a player with a
    /// three-step combo and an AI grunt with a single swing.
    pub fn fallback() -> Self {
        let step = |state: &str| Attack {
            state: state.to_string(),
            ..default()
        };

        let mut player = CharacterProfile::new("player");
        player.name = "Player".to_string();
        player.weapon = Some(WeaponProfile {
            combo: vec![step("Combo 1"), step("Combo 2"), step("Combo 3")],
            ..default()
        });

        let mut grunt = CharacterProfile::new("grunt");
        grunt.name = "Grunt".to_string();
        grunt.weapon = Some(WeaponProfile::default());
        grunt.ai = Some(AiSettings {
            patrol_left: 2.0,
            patrol_right: 2.0,
            ..default()
        });

        let mut registry = Self::default();
        registry.insert(player);
        registry.insert(grunt);
        registry
    }
}
