//! Assertion checking for test expectations

use super::parser::{ExpectedEvent, StateAssertion};
use crate::events::BusEvent;

/// Error when an assertion fails
#[derive(Debug, Clone)]
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
    pub detail: Option<String>,
}

impl CapturedEvent {
    pub fn from_bus_event(frame: u64, event: &BusEvent) -> Self {
        Self {
            frame,
            event_type: event.event.name().to_string(),
            detail: event.event.detail(),
        }
    }
}

/// Check if captured events match expected sequence
pub fn check_sequence(expected: &[ExpectedEvent], captured: &[CapturedEvent]) -> Result<(), AssertionError> {
    let mut captured_idx = 0;

    for (i, exp) in expected.iter().enumerate() {
        // Find matching event starting from current position
        let found = captured[captured_idx..].iter().enumerate().find(|(_, cap)| {
            if cap.event_type != exp.event {
                return false;
            }
            if let Some(ref detail) = exp.detail
                && cap.detail.as_ref() != Some(detail)
            {
                return false;
            }
            true
        });

        match found {
            Some((offset, cap)) => {
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
            None => {
                let detail_str = exp.detail.as_ref().map(|d| format!(" ({})", d)).unwrap_or_default();
                return Err(AssertionError {
                    message: format!("Event #{} '{}'{} not found", i + 1, exp.event, detail_str),
                    expected: format!("'{}' event in sequence", exp.event),
                    actual: format!("events after position {}: {:?}",
                        captured_idx,
                        captured[captured_idx..].iter().map(|e| &e.event_type).collect::<Vec<_>>()
                    ),
                });
            }
        }
    }

    Ok(())
}

/// Count captured events of one type
pub fn count_events(captured: &[CapturedEvent], event_type: &str) -> usize {
    captured.iter().filter(|e| e.event_type == event_type).count()
}

/// World state for assertions
#[derive(Debug, Clone, Default)]
pub struct WorldState {
    pub ball: Option<BallState>,
    /// "made", "missed" or "neutral"
    pub status: String,
    pub action: String,
    /// Current animation phase label, "none" when idle
    pub phase: String,
    pub shots_started: u64,
    pub shots_finished: u64,
    pub messages_received: u64,
    pub connection: String,
    pub connect_attempts: u64,
    pub telemetry_sent: usize,
    pub offset_x: f32,
    pub offset_z: f32,
}

#[derive(Debug, Clone)]
pub struct BallState {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    /// "blend" or "animation"
    pub owner: String,
    pub color: String,
}

enum Observed {
    Number(f32),
    Text(String),
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

fn observe(path: &str, state: &WorldState) -> Result<Observed, AssertionError> {
    let parts: Vec<&str> = path.split('.').collect();

    if parts[0] == "ball" {
        let ball = state.ball.as_ref().ok_or_else(|| AssertionError {
            message: "Ball state check failed".to_string(),
            expected: "ball exists".to_string(),
            actual: "no ball".to_string(),
        })?;
        return match parts.get(1) {
            Some(&"x") => Ok(Observed::Number(ball.x)),
            Some(&"y") => Ok(Observed::Number(ball.y)),
            Some(&"z") => Ok(Observed::Number(ball.z)),
            Some(&"owner") => Ok(Observed::Text(ball.owner.clone())),
            Some(&"color") => Ok(Observed::Text(ball.color.clone())),
            _ => Err(unknown_path(path)),
        };
    }

    match (parts[0], parts.get(1).copied()) {
        ("shot", Some("status")) => Ok(Observed::Text(state.status.clone())),
        ("shot", Some("phase")) => Ok(Observed::Text(state.phase.clone())),
        ("shots", Some("started")) => Ok(Observed::Number(state.shots_started as f32)),
        ("shots", Some("finished")) => Ok(Observed::Number(state.shots_finished as f32)),
        ("tracker", Some("action")) => Ok(Observed::Text(state.action.clone())),
        ("messages", Some("received")) => Ok(Observed::Number(state.messages_received as f32)),
        ("connection", Some("state")) => Ok(Observed::Text(state.connection.clone())),
        ("connection", Some("attempts")) => Ok(Observed::Number(state.connect_attempts as f32)),
        ("telemetry", Some("sent")) => Ok(Observed::Number(state.telemetry_sent as f32)),
        ("input", Some("offset_x")) => Ok(Observed::Number(state.offset_x)),
        ("input", Some("offset_z")) => Ok(Observed::Number(state.offset_z)),
        _ => Err(unknown_path(path)),
    }
}

fn unknown_path(path: &str) -> AssertionError {
    AssertionError {
        message: format!("Unknown check path: {}", path),
        expected: "ball.{x,y,z,owner,color}, shot.{status,phase}, shots.{started,finished}, \
                   tracker.action, messages.received, connection.{state,attempts}, \
                   telemetry.sent, input.{offset_x,offset_z}"
            .to_string(),
        actual: path.to_string(),
    }
}

/// Check state assertions against world state
pub fn check_state(assertion: &StateAssertion, state: &WorldState) -> Result<(), AssertionError> {
    for check in &assertion.checks {
        let (path, operator, expected_value) = parse_check(check).ok_or_else(|| AssertionError {
            message: format!("Invalid check syntax: {}", check),
            expected: "format: 'object.property = value' or 'object.property > value'".to_string(),
            actual: check.clone(),
        })?;

        match observe(path, state)? {
            Observed::Number(actual) => check_float_comparison(path, actual, operator, expected_value)?,
            Observed::Text(actual) => check_text_comparison(path, &actual, operator, expected_value)?,
        }
    }

    Ok(())
}

fn check_text_comparison(path: &str, actual: &str, operator: &str, expected_str: &str) -> Result<(), AssertionError> {
    let expected = expected_str.trim_matches('"');
    let pass = match operator {
        "=" => actual == expected,
        "!=" => actual != expected,
        _ => {
            return Err(AssertionError {
                message: format!("Operator '{}' not supported for {}", operator, path),
                expected: "= or !=".to_string(),
                actual: operator.to_string(),
            });
        }
    };

    if !pass {
        return Err(AssertionError {
            message: format!("Check failed: {} {} {}", path, operator, expected),
            expected: format!("{} {} {}", path, operator, expected),
            actual: actual.to_string(),
        });
    }

    Ok(())
}

/// Check float comparison with operator
fn check_float_comparison(path: &str, actual: f32, operator: &str, expected_str: &str) -> Result<(), AssertionError> {
    let value: f32 = expected_str.trim().parse().map_err(|_| AssertionError {
        message: format!("Invalid value for {}", path),
        expected: "number".to_string(),
        actual: expected_str.to_string(),
    })?;

    let pass = match operator {
        ">=" => actual >= value,
        "<=" => actual <= value,
        ">" => actual > value,
        "<" => actual < value,
        "=" => (actual - value).abs() < 0.1,
        "!=" => (actual - value).abs() >= 0.1,
        _ => false,
    };

    if !pass {
        return Err(AssertionError {
            message: format!("Check failed: {} {} {} (actual: {:.2})", path, operator, expected_str, actual),
            expected: format!("{} {} {}", path, operator, value),
            actual: format!("{:.2}", actual),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> WorldState {
        WorldState {
            ball: Some(BallState {
                x: 1.0,
                y: 2.0,
                z: -3.0,
                owner: "animation".to_string(),
                color: "made".to_string(),
            }),
            status: "made".to_string(),
            phase: "drop".to_string(),
            shots_started: 1,
            connection: "open".to_string(),
            ..Default::default()
        }
    }

    fn assertion(checks: &[&str]) -> StateAssertion {
        StateAssertion {
            after_frame: 0,
            checks: checks.iter().map(|c| c.to_string()).collect(),
        }
    }

    #[test]
    fn test_numeric_and_text_checks() {
        let checks = assertion(&[
            "ball.x = 1.05",
            "ball.y > 1.5",
            "ball.z <= -3",
            "ball.owner = animation",
            "shot.phase != flight",
            "shots.started >= 1",
            "connection.state = \"open\"",
        ]);
        assert!(check_state(&checks, &state()).is_ok());
    }

    #[test]
    fn test_failures_report_actual() {
        let err = check_state(&assertion(&["ball.y < 1.0"]), &state()).unwrap_err();
        assert_eq!(err.actual, "2.00");

        let err = check_state(&assertion(&["shot.status = missed"]), &state()).unwrap_err();
        assert_eq!(err.actual, "made");

        assert!(check_state(&assertion(&["shot.status > made"]), &state()).is_err());
        assert!(check_state(&assertion(&["nonsense.path = 1"]), &state()).is_err());
        assert!(check_state(&assertion(&["no operator"]), &state()).is_err());
    }

    #[test]
    fn test_sequence_order_and_detail() {
        let captured = vec![
            CapturedEvent { frame: 2, event_type: "ShotTriggered".into(), detail: None },
            CapturedEvent { frame: 2, event_type: "PhaseEntered".into(), detail: Some("flight".into()) },
            CapturedEvent { frame: 80, event_type: "PhaseEntered".into(), detail: Some("drop".into()) },
        ];
        let expected = vec![
            ExpectedEvent { event: "ShotTriggered".into(), detail: None, frame_min: None, frame_max: Some(5) },
            ExpectedEvent { event: "PhaseEntered".into(), detail: Some("drop".into()), frame_min: Some(60), frame_max: None },
        ];
        assert!(check_sequence(&expected, &captured).is_ok());

        let out_of_order = vec![
            ExpectedEvent { event: "PhaseEntered".into(), detail: Some("drop".into()), frame_min: None, frame_max: None },
            ExpectedEvent { event: "ShotTriggered".into(), detail: None, frame_min: None, frame_max: None },
        ];
        assert!(check_sequence(&out_of_order, &captured).is_err());
        assert_eq!(count_events(&captured, "PhaseEntered"), 2);
    }
}
