//! Content domain: character profiles loaded from RON at startup.

use std::path::Path;

use bevy::prelude::*;

pub mod data;
pub mod loader;
pub mod registry;
pub mod validation;

#[cfg(test)]
mod tests;

pub use data::{CharacterProfile, WeaponProfile};
pub use loader::{ContentError, load_profiles, parse_profiles};
pub use registry::ProfileRegistry;
pub use validation::validate_profile;

pub const PROFILES_PATH: &str = "assets/data/profiles.ron";

pub struct ContentPlugin;

impl Plugin for ContentPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(load_or_fallback(Path::new(PROFILES_PATH)));
    }
}

fn load_or_fallback(path: &Path) -> ProfileRegistry {
    match load_profiles(path) {
        Ok((registry, rejected)) => {
            for error in &rejected {
                warn!("Rejected profile: {}", error);
            }
            if registry.is_empty() {
                warn!("No usable profiles in {}, using built-in profiles", path.display());
                return ProfileRegistry::fallback();
            }
            info!("{}", registry.summary());
            registry
        }
        Err(error) => {
            warn!("{}; using built-in profiles", error);
            ProfileRegistry::fallback()
        }
    }
}
