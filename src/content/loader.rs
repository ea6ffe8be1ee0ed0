//! Loader for RON content files at startup.

use std::fs;
use std::path::{Path, PathBuf};

use ron::Options;
use thiserror::Error;

use super::data::{CharacterProfile, DataFile, SCHEMA_VERSION};
use super::registry::ProfileRegistry;
use super::validation::validate_profile;

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: ron::error::SpannedError,
    },
    #[error("{} has schema version {found}, expected {expected}", .path.display())]
    Schema {
        path: PathBuf,
        found: u32,
        expected: u32,
    },
    #[error("unknown character profile '{0}'")]
    UnknownProfile(String),
    #[error("profile '{profile}' has invalid {field}: {reason}")]
    Invalid {
        profile: String,
        field: String,
        reason: String,
    },
}

/// Create RON options with extensions enabled for more flexible parsing.
fn ron_options() -> Options {
    Options::default().with_default_extension(ron::extensions::Extensions::IMPLICIT_SOME)
}

/// Parses a profile file's contents. `path` is only used for error reporting.
pub fn parse_profiles(source: &str, path: &Path) -> Result<Vec<CharacterProfile>, ContentError> {
    let data: DataFile<CharacterProfile> =
        ron_options()
            .from_str(source)
            .map_err(|source| ContentError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

    if data.schema_version != SCHEMA_VERSION {
        return Err(ContentError::Schema {
            path: path.to_path_buf(),
            found: data.schema_version,
            expected: SCHEMA_VERSION,
        });
    }

    Ok(data.items)
}

/// Loads and validates every profile in `path`. Invalid profiles are reported and skipped;
/// a file that cannot be read or parsed fails as a whole.
pub fn load_profiles(path: &Path) -> Result<(ProfileRegistry, Vec<ContentError>), ContentError> {
    let contents = fs::read_to_string(path).map_err(|source| ContentError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let mut registry = ProfileRegistry::default();
    let mut rejected = Vec::new();

    for profile in parse_profiles(&contents, path)? {
        let errors = validate_profile(&profile);
        if errors.is_empty() {
            registry.insert(profile);
        } else {
            rejected.extend(errors);
        }
    }

    Ok((registry, rejected))
}
