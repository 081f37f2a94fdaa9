//! AI profiles - named AI personalities
//!
//! Each profile is an `AiSettings` record with a display name.
//! Loaded from config/ai_profiles.toml and hot-reloaded every 10 seconds.

use bevy::prelude::*;
use serde::Deserialize;
use std::fs;

use super::AiSettings;
use crate::error::{AiError, Result};

/// Path to AI profiles file
pub const AI_PROFILES_FILE: &str = "config/ai_profiles.toml";

/// A named settings record
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AiProfile {
    /// Profile name for display
    pub name: String,
    /// Every settings field may appear directly in the profile table
    #[serde(flatten)]
    pub settings: AiSettings,
}

impl Default for AiProfile {
    fn default() -> Self {
        Self {
            name: "Balanced".to_string(),
            settings: AiSettings::default(),
        }
    }
}

#[derive(Deserialize)]
struct ProfileFile {
    #[serde(default)]
    profile: Vec<AiProfile>,
}

/// Database of AI profiles loaded from file
#[derive(Resource, Debug, Clone)]
pub struct AiProfileDatabase {
    profiles: Vec<AiProfile>,
}

impl Default for AiProfileDatabase {
    fn default() -> Self {
        Self::load_from_file(AI_PROFILES_FILE)
    }
}

impl AiProfileDatabase {
    /// Single built-in profile
    pub fn builtin() -> Self {
        Self {
            profiles: vec![AiProfile::default()],
        }
    }

    /// Load profiles from file, or return the built-in profile if the file is missing or bad
    pub fn load_from_file(path: &str) -> Self {
        let content = match fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) => {
                warn!("Could not read AI profiles file {}: {}, using defaults", path, e);
                return Self::builtin();
            }
        };

        match parse_profiles(&content) {
            Ok(profiles) if !profiles.is_empty() => {
                info!("Loaded {} AI profiles from {}", profiles.len(), path);
                Self { profiles }
            }
            Ok(_) => {
                warn!("No profiles parsed from {}, using defaults", path);
                Self::builtin()
            }
            Err(e) => {
                warn!("{} in {}, using defaults", e, path);
                Self::builtin()
            }
        }
    }

    /// Get profile by index, wrapping around if out of bounds
    pub fn get(&self, index: usize) -> &AiProfile {
        &self.profiles[index % self.profiles.len()]
    }

    /// Find a profile by name (case-insensitive)
    pub fn find(&self, name: &str) -> Option<&AiProfile> {
        self.profiles
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
    }

    /// Add a profile, replacing one with the same name
    pub fn push(&mut self, profile: AiProfile) {
        self.profiles
            .retain(|p| !p.name.eq_ignore_ascii_case(&profile.name));
        self.profiles.push(profile);
    }

    /// Profile names in file order
    pub fn names(&self) -> Vec<&str> {
        self.profiles.iter().map(|p| p.name.as_str()).collect()
    }

    /// Get number of profiles
    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

/// Parse `[[profile]]` tables. Profiles with invalid settings are skipped with a warning.
pub fn parse_profiles(content: &str) -> Result<Vec<AiProfile>> {
    let file: ProfileFile =
        toml::from_str(content).map_err(|e| AiError::Config(format!("TOML parse error: {}", e)))?;

    Ok(file
        .profile
        .into_iter()
        .filter(|p| match p.settings.validate() {
            Ok(()) => true,
            Err(e) => {
                warn!("Skipping AI profile '{}': {}", p.name, e);
                false
            }
        })
        .collect())
}
