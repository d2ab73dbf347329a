//! Scenario testing system for deterministic receiver testing
//!
//! Provides a scripted connector and a headless app harness for running
//! TOML scenarios (pose streams, connection drops, local input) frame by frame.

pub mod assertions;
pub mod connector;
pub mod input;
pub mod parser;
pub mod runner;

pub use assertions::{AssertionError, check_sequence, check_state};
pub use connector::ScriptedConnector;
pub use input::ScriptedInputs;
pub use parser::{
    ExpectedEvent, FrameInput, StateAssertion, TestDefinition, TestExpectations, TestSetup,
};
pub use runner::{Harness, TestResult, run_test};

/// Default path for test scenarios
pub const SCENARIOS_DIR: &str = "tests/scenarios";
