//! Config file auto-reload system
//!
//! Polls the AI profile file every 10 seconds and reloads it when modified.
//! Seats bound to a named profile pick up the new settings on their next turn.

use bevy::prelude::*;
use std::fs;
use std::time::SystemTime;

use crate::ai::{AI_PROFILES_FILE, AiProfileDatabase};
use crate::game::{GameSession, SeatProfiles};

/// How often to check for config changes (seconds)
pub const CHECK_INTERVAL: f32 = 10.0;

/// Tracks modification times of config files for hot-reload
#[derive(Resource)]
pub struct ConfigWatcher {
    /// Time since last check
    pub timer: f32,
    pub path: String,
    /// Last known modification time
    pub ai_profiles_mtime: Option<SystemTime>,
}

impl Default for ConfigWatcher {
    fn default() -> Self {
        Self::watching(AI_PROFILES_FILE)
    }
}

impl ConfigWatcher {
    pub fn watching(path: &str) -> Self {
        Self {
            timer: 0.0,
            path: path.to_string(),
            ai_profiles_mtime: get_mtime(path),
        }
    }

    /// Advance the poll timer. Returns true when the file changed since the last poll.
    pub fn poll(&mut self, dt: f32) -> bool {
        self.timer += dt;
        if self.timer < CHECK_INTERVAL {
            return false;
        }
        self.timer = 0.0;

        let mtime = get_mtime(&self.path);
        if mtime == self.ai_profiles_mtime {
            return false;
        }
        self.ai_profiles_mtime = mtime;
        true
    }
}

/// Get file modification time, or None if file doesn't exist
fn get_mtime(path: &str) -> Option<SystemTime> {
    fs::metadata(path).ok().and_then(|m| m.modified().ok())
}

/// Check for profile file changes and reload as needed.
/// Runs every 10 seconds.
pub fn check_config_changes(
    time: Res<Time>,
    mut watcher: ResMut<ConfigWatcher>,
    mut profile_db: ResMut<AiProfileDatabase>,
    seats: Res<SeatProfiles>,
    mut session: ResMut<GameSession>,
) {
    if !watcher.poll(time.delta_secs()) {
        return;
    }

    *profile_db = AiProfileDatabase::load_from_file(&watcher.path);
    info!("Auto-reloaded AI profiles from {}", watcher.path);
    seats.apply(&profile_db, &mut session);
}
