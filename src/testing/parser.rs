//! TOML test file parsing

use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::constants::{BALL_SPAWN, FLOOR_POSITION, RIM_POSITION};

/// Complete test definition from TOML file
#[derive(Debug, Deserialize)]
pub struct TestDefinition {
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub setup: TestSetup,
    #[serde(default)]
    pub input: Vec<FrameInput>,
    #[serde(default)]
    pub expect: TestExpectations,
}

/// Scene and link configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TestSetup {
    /// Accept every connection attempt as soon as it is made
    pub auto_open: bool,
    /// Refuse this many attempts first
    pub fail_connects: u32,
    /// Install a transport at all
    pub transport: bool,
    pub ball: [f32; 3],
    pub rim: [f32; 3],
    pub floor: [f32; 3],
    /// Name given to the floor object (probed against the floor name list)
    pub floor_name: String,
    /// Scene objects left out: "ball", "rim" or "floor"
    pub without: Vec<String>,
}

impl TestSetup {
    pub fn spawns(&self, object: &str) -> bool {
        !self.without.iter().any(|name| name == object)
    }
}

impl Default for TestSetup {
    fn default() -> Self {
        Self {
            auto_open: true,
            fail_connects: 0,
            transport: true,
            ball: BALL_SPAWN.to_array(),
            rim: RIM_POSITION.to_array(),
            floor: FLOOR_POSITION.to_array(),
            floor_name: "floor".to_string(),
            without: Vec::new(),
        }
    }
}

/// Everything that happens before a given frame runs
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FrameInput {
    pub frame: u64,
    /// Text frame pushed on the live connection
    pub message: Option<String>,
    /// Several frames, delivered in order within the same update
    #[serde(default)]
    pub messages: Vec<String>,
    /// Accept the pending attempt
    #[serde(default)]
    pub open: bool,
    /// Peer closes the connection
    #[serde(default)]
    pub close: bool,
    /// Socket error on the live connection
    pub fail: Option<String>,
    /// Local direction; persists until changed
    pub move_x: Option<f32>,
    pub move_y: Option<f32>,
}

impl FrameInput {
    /// All text frames for this step, `message` first
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.message
            .iter()
            .chain(self.messages.iter())
            .map(String::as_str)
    }
}

/// Expected test outcomes
#[derive(Debug, Default, Deserialize)]
pub struct TestExpectations {
    #[serde(default)]
    pub sequence: Vec<ExpectedEvent>,
    /// Multiple state assertions at different frames (uses [[expect.state]] TOML syntax)
    #[serde(default)]
    pub state: Vec<StateAssertion>,
}

/// Expected event in sequence
#[derive(Debug, Deserialize)]
pub struct ExpectedEvent {
    pub event: String,
    /// Phase, status, label or reason carried by the event
    pub detail: Option<String>,
    pub frame_min: Option<u64>,
    pub frame_max: Option<u64>,
}

/// State assertion after simulation
#[derive(Debug, Clone, Deserialize)]
pub struct StateAssertion {
    pub after_frame: u64,
    #[serde(default)]
    pub checks: Vec<String>,
}

/// Parse a test file from path
pub fn parse_test_file(path: &Path) -> Result<TestDefinition, String> {
    let content = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;

    parse_test_str(&content).map_err(|e| format!("Failed to parse {}: {}", path.display(), e))
}

pub fn parse_test_str(content: &str) -> Result<TestDefinition, toml::de::Error> {
    toml::from_str(content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_basic() {
        let toml = r#"
name = "Test"
[setup]
fail_connects = 2
rim = [1.0, 3.0, -4.0]
without = ["floor"]

[[input]]
frame = 3
message = '{"shot_in": true}'
move_x = 1.0

[[input]]
frame = 4
messages = ['{}', '{"shot_in": false}']
close = true

[[expect.state]]
after_frame = 10
checks = ["ball.owner = animation"]

[[expect.sequence]]
event = "PhaseEntered"
detail = "drop"
"#;
        let def = parse_test_str(toml).unwrap();
        assert_eq!(def.name, "Test");
        assert!(def.setup.auto_open);
        assert_eq!(def.setup.fail_connects, 2);
        assert_eq!(def.setup.rim, [1.0, 3.0, -4.0]);
        assert_eq!(def.setup.ball, BALL_SPAWN.to_array());
        assert!(!def.setup.spawns("floor"));
        assert!(def.setup.spawns("ball"));
        assert_eq!(def.input[0].texts().count(), 1);
        assert_eq!(def.input[0].move_x, Some(1.0));
        assert_eq!(def.input[1].texts().collect::<Vec<_>>(), vec!["{}", r#"{"shot_in": false}"#]);
        assert!(def.input[1].close);
        assert_eq!(def.expect.state[0].after_frame, 10);
        assert_eq!(def.expect.sequence[0].detail.as_deref(), Some("drop"));
    }

    #[test]
    fn test_minimal_file() {
        let def = parse_test_str(r#"name = "Empty""#).unwrap();
        assert!(def.input.is_empty());
        assert!(def.setup.transport);
        assert_eq!(def.setup.floor_name, "floor");
    }
}
