//! TOML scenario file parsing

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::ai::AiSettings;
use crate::board::PawnColor;
use crate::constants::{DEFAULT_BOARD_SIZE, DEFAULT_CELL_SIZE};

/// Complete scenario definition from TOML file
#[derive(Debug, Deserialize)]
pub struct ScenarioDefinition {
    pub name: String,
    pub description: Option<String>,
    pub setup: ScenarioSetup,
    #[serde(default)]
    pub run: RunConfig,
    #[serde(default)]
    pub expect: ScenarioExpectations,
}

/// Board and AI configuration
#[derive(Debug, Deserialize)]
pub struct ScenarioSetup {
    #[serde(default = "default_board_size")]
    pub board_size: u32,
    #[serde(default = "default_cell_size")]
    pub cell_size: f32,
    pub seed: Option<u64>,
    /// Color the AI plays
    #[serde(default = "default_ai_color")]
    pub ai_color: PawnColor,
    #[serde(default)]
    pub pawns: Vec<PawnDef>,
    #[serde(default)]
    pub obstacles: Vec<ObstacleDef>,
    /// Partial settings table; missing fields take their defaults
    pub settings: Option<AiSettings>,
}

fn default_board_size() -> u32 {
    DEFAULT_BOARD_SIZE
}

fn default_cell_size() -> f32 {
    DEFAULT_CELL_SIZE
}

fn default_ai_color() -> PawnColor {
    PawnColor::White
}

/// Pawn placement. Facing defaults to +Z for White and -Z for Black.
#[derive(Debug, Clone, Deserialize)]
pub struct PawnDef {
    pub id: String,
    pub color: PawnColor,
    pub x: f32,
    #[serde(default)]
    pub y: f32,
    pub z: f32,
    pub facing: Option<[f32; 3]>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ObstacleDef {
    pub x: f32,
    pub z: f32,
    #[serde(default = "default_obstacle_radius")]
    pub radius: f32,
}

fn default_obstacle_radius() -> f32 {
    0.5
}

/// What the scenario exercises
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunMode {
    /// Select a pawn and plan its shot, no frames
    #[default]
    Plan,
    /// Play the whole turn frame by frame
    Turn,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RunConfig {
    #[serde(default)]
    pub mode: RunMode,
    #[serde(default = "default_max_frames")]
    pub max_frames: u64,
    #[serde(default = "default_fps")]
    pub fps: f32,
    /// Cancel the turn at the start of this frame
    pub cancel_at_frame: Option<u64>,
    pub camera_move_secs: Option<f32>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            mode: RunMode::default(),
            max_frames: default_max_frames(),
            fps: default_fps(),
            cancel_at_frame: None,
            camera_move_secs: None,
        }
    }
}

fn default_max_frames() -> u64 {
    900 // 15 seconds
}

fn default_fps() -> f32 {
    60.0
}

/// Expected scenario outcomes
#[derive(Debug, Default, Deserialize)]
pub struct ScenarioExpectations {
    #[serde(default)]
    pub sequence: Vec<ExpectedEvent>,
    /// Event kinds that must never be captured
    #[serde(default)]
    pub absent: Vec<String>,
    /// Final state checks, e.g. "selected = me" or "direction.z > 0.99"
    #[serde(default)]
    pub checks: Vec<String>,
}

/// Expected event in sequence
#[derive(Debug, Deserialize)]
pub struct ExpectedEvent {
    pub event: String,
    pub pawn: Option<String>,
    pub frame_min: Option<u64>,
    pub frame_max: Option<u64>,
}

/// Parse a scenario file from path
pub fn parse_test_file(path: &Path) -> Result<ScenarioDefinition, String> {
    let content = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;

    toml::from_str(&content).map_err(|e| format!("Failed to parse {}: {}", path.display(), e))
}

/// Every .toml file under `base`, sorted, optionally filtered by relative path
pub fn discover_tests(base: &Path, filter: Option<&str>) -> Vec<PathBuf> {
    let mut tests = Vec::new();
    discover_tests_recursive(base, base, filter, &mut tests);
    tests.sort();
    tests
}

fn discover_tests_recursive(
    base: &Path,
    current: &Path,
    filter: Option<&str>,
    tests: &mut Vec<PathBuf>,
) {
    let entries = match fs::read_dir(current) {
        Ok(e) => e,
        Err(_) => return,
    };

    for entry in entries.flatten() {
        let path = entry.path();

        if path.is_dir() {
            discover_tests_recursive(base, &path, filter, tests);
        } else if path.extension().is_some_and(|e| e == "toml") {
            if let Some(f) = filter {
                let rel = path.strip_prefix(base).unwrap_or(&path).to_string_lossy();
                if !rel.contains(f) {
                    continue;
                }
            }
            tests.push(path);
        }
    }
}
