//! Scenario testing system for deterministic AI turns
//!
//! Scenarios describe a board, an AI color and optional settings in TOML,
//! then check the captured turn events and the final plan against
//! expectations.

pub mod assertions;
pub mod parser;
pub mod runner;

pub use assertions::{AssertionError, CapturedEvent, ScenarioState, check_absent, check_sequence, check_state};
pub use parser::{
    ExpectedEvent, ObstacleDef, PawnDef, RunConfig, RunMode, ScenarioDefinition, ScenarioExpectations,
    ScenarioSetup, discover_tests, parse_test_file,
};
pub use runner::{TestResult, run_test};

/// Default path for test scenarios
pub const SCENARIOS_DIR: &str = "tests/scenarios";
