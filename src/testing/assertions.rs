//! Assertion checking for scenario expectations

use std::collections::HashMap;

use super::parser::ExpectedEvent;

/// Error when an assertion fails
#[derive(Debug)]
pub struct AssertionError {
    pub message: String,
    pub expected: String,
    pub actual: String,
}

impl std::fmt::Display for AssertionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}\n    Expected: {}\n    Actual: {}", self.message, self.expected, self.actual)
    }
}

/// Captured event with timing info
#[derive(Debug, Clone)]
pub struct CapturedEvent {
    pub frame: u64,
    pub event_type: String,
    /// Scenario label of the pawn the event is about
    pub pawn: Option<String>,
}

/// Check if captured events match expected sequence
pub fn check_sequence(expected: &[ExpectedEvent], captured: &[CapturedEvent]) -> Result<(), AssertionError> {
    let mut captured_idx = 0;

    for (i, exp) in expected.iter().enumerate() {
        // Find matching event starting from current position
        let found = captured[captured_idx..].iter().enumerate().find(|(_, cap)| {
            cap.event_type == exp.event
                && exp.pawn.as_ref().is_none_or(|pawn| cap.pawn.as_ref() == Some(pawn))
        });

        let Some((offset, cap)) = found else {
            let pawn_str = exp.pawn.as_ref().map(|p| format!(" (pawn: {})", p)).unwrap_or_default();
            return Err(AssertionError {
                message: format!("Event #{} '{}'{} not found", i + 1, exp.event, pawn_str),
                expected: format!("'{}' event in sequence", exp.event),
                actual: format!(
                    "events after position {}: {:?}",
                    captured_idx,
                    captured[captured_idx..].iter().map(|e| &e.event_type).collect::<Vec<_>>()
                ),
            });
        };

        if let Some(min) = exp.frame_min
            && cap.frame < min
        {
            return Err(AssertionError {
                message: format!("Event #{} '{}' occurred too early", i + 1, exp.event),
                expected: format!("frame >= {}", min),
                actual: format!("frame {}", cap.frame),
            });
        }
        if let Some(max) = exp.frame_max
            && cap.frame > max
        {
            return Err(AssertionError {
                message: format!("Event #{} '{}' occurred too late", i + 1, exp.event),
                expected: format!("frame <= {}", max),
                actual: format!("frame {}", cap.frame),
            });
        }
        captured_idx += offset + 1;
    }

    Ok(())
}

/// Fail if any of the listed event kinds was captured
pub fn check_absent(absent: &[String], captured: &[CapturedEvent]) -> Result<(), AssertionError> {
    for kind in absent {
        if let Some(cap) = captured.iter().find(|c| &c.event_type == kind) {
            return Err(AssertionError {
                message: format!("Unexpected '{}' event", kind),
                expected: format!("no '{}' events", kind),
                actual: format!("'{}' at frame {}", kind, cap.frame),
            });
        }
    }
    Ok(())
}

/// Final scenario state: numeric readings plus labels such as the selected pawn
#[derive(Debug, Default)]
pub struct ScenarioState {
    pub numbers: HashMap<String, f32>,
    pub labels: HashMap<String, String>,
}

impl ScenarioState {
    pub fn set_number(&mut self, path: &str, value: f32) {
        self.numbers.insert(path.to_string(), value);
    }

    pub fn set_label(&mut self, path: &str, value: &str) {
        self.labels.insert(path.to_string(), value.to_string());
    }

    fn known_paths(&self) -> Vec<&str> {
        let mut paths: Vec<&str> = self
            .numbers
            .keys()
            .chain(self.labels.keys())
            .map(String::as_str)
            .collect();
        paths.sort();
        paths
    }
}

/// Parse a check string into (path, operator, value)
fn parse_check(check: &str) -> Option<(&str, &str, &str)> {
    // Try operators in order of specificity (>= before >, etc.)
    for op in &[">=", "<=", "!=", "=", ">", "<"] {
        if let Some(idx) = check.find(op) {
            let path = check[..idx].trim();
            let value = check[idx + op.len()..].trim();
            return Some((path, op, value));
        }
    }
    None
}

/// Check every "path op value" string against the state. The value may name another numeric path.
pub fn check_state(checks: &[String], state: &ScenarioState) -> Result<(), AssertionError> {
    for check in checks {
        let (path, operator, expected_value) = parse_check(check).ok_or_else(|| AssertionError {
            message: format!("Invalid check syntax: {}", check),
            expected: "format: 'path = value' or 'path > value'".to_string(),
            actual: check.clone(),
        })?;

        if let Some(&actual) = state.numbers.get(path) {
            let expected = match state.numbers.get(expected_value) {
                Some(&other) => other,
                None => expected_value.parse().map_err(|_| AssertionError {
                    message: format!("Invalid value for {}", path),
                    expected: "number or numeric path".to_string(),
                    actual: expected_value.to_string(),
                })?,
            };
            check_float_comparison(check, actual, operator, expected)?;
            continue;
        }

        if let Some(actual) = state.labels.get(path) {
            let expected = expected_value.trim_matches('"');
            let pass = match operator {
                "=" => actual == expected,
                "!=" => actual != expected,
                _ => {
                    return Err(AssertionError {
                        message: format!("Operator '{}' not supported for label {}", operator, path),
                        expected: "= or !=".to_string(),
                        actual: check.clone(),
                    });
                }
            };
            if !pass {
                return Err(AssertionError {
                    message: format!("Check failed: {}", check),
                    expected: expected.to_string(),
                    actual: actual.clone(),
                });
            }
            continue;
        }

        return Err(AssertionError {
            message: format!("Unknown path '{}'", path),
            expected: format!("one of {:?}", state.known_paths()),
            actual: check.clone(),
        });
    }

    Ok(())
}

/// Check float comparison with operator
fn check_float_comparison(check: &str, actual: f32, operator: &str, value: f32) -> Result<(), AssertionError> {
    let pass = match operator {
        ">=" => actual >= value,
        "<=" => actual <= value,
        ">" => actual > value,
        "<" => actual < value,
        "=" => (actual - value).abs() < 0.01,
        "!=" => (actual - value).abs() >= 0.01,
        _ => false,
    };

    if !pass {
        return Err(AssertionError {
            message: format!("Check failed: {} (actual: {:.3})", check, actual),
            expected: format!("{} {}", operator, value),
            actual: format!("{:.3}", actual),
        });
    }

    Ok(())
}
