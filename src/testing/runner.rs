//! Test execution engine
//!
//! Builds a headless app around `ReceiverPlugin` with a scripted connector
//! and a fixed 60 Hz clock, then steps it one frame at a time.

use bevy::app::ScheduleRunnerPlugin;
use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use std::time::Duration;

use crate::ball::{Ball, BallOwner, RimTarget, StatusFeedback};
use crate::constants::FLOOR_HALF_EXTENTS;
use crate::events::EventBus;
use crate::floor::FloorBounds;
use crate::input::{LocalInput, ScriptedDirection};
use crate::plugin::ReceiverPlugin;
use crate::pose::PoseIngest;
use crate::settings::ReceiverSettings;
use crate::shot::ShotState;
use crate::transport::TransportManager;
use crate::tuning::MotionTuning;

use super::assertions::{
    AssertionError, BallState, CapturedEvent, WorldState, check_sequence, check_state,
};
use super::connector::ScriptedConnector;
use super::input::ScriptedInputs;
use super::parser::{FrameInput, TestDefinition, TestSetup};

/// Seconds per simulated frame
pub const FRAME_SECONDS: f32 = 1.0 / 60.0;

/// Frames run when a test has no inputs or state checks
const DEFAULT_FRAMES: u64 = 60;

/// Result of running a test
#[derive(Debug)]
pub enum TestResult {
    Pass { frames: u64 },
    Fail { error: AssertionError },
    Error { message: String },
}

/// A headless receiver app plus the handle that drives its link
pub struct Harness {
    pub app: App,
    pub connector: ScriptedConnector,
    pub frame: u64,
    pub events: Vec<CapturedEvent>,
    seen_events: usize,
}

impl Harness {
    pub fn new(setup: &TestSetup) -> Self {
        let connector = ScriptedConnector::new(setup.auto_open, setup.fail_connects);
        let settings = ReceiverSettings {
            event_log_enabled: false,
            ..Default::default()
        };

        let mut app = App::new();
        app.add_plugins(
            MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(Duration::from_secs_f32(
                FRAME_SECONDS,
            ))),
        );
        app.add_plugins(bevy::transform::TransformPlugin);
        app.insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f32(
            FRAME_SECONDS,
        )));

        if setup.transport {
            app.insert_resource(TransportManager::new(
                settings.endpoint.clone(),
                settings.reconnect_interval,
                connector.clone(),
            ));
        }
        app.insert_resource(MotionTuning::default());
        app.insert_resource(settings);
        app.insert_resource(EventBus::new());
        app.init_resource::<ScriptedDirection>();
        app.add_plugins(ReceiverPlugin);

        let setup = setup.clone();
        app.add_systems(Startup, move |commands: Commands| {
            spawn_test_scene(commands, &setup);
        });

        Self {
            app,
            connector,
            frame: 0,
            events: Vec::new(),
            seen_events: 0,
        }
    }

    /// Apply scripted inputs, then run one frame
    pub fn step(&mut self, inputs: &[FrameInput], direction: Vec2) {
        for input in inputs {
            if input.open {
                self.connector.open();
            }
            for text in input.texts() {
                self.connector.push_text(text);
            }
            if let Some(reason) = &input.fail {
                self.connector.fail(reason);
            }
            if input.close {
                self.connector.close("closed by peer");
            }
        }
        self.app.world_mut().resource_mut::<ScriptedDirection>().0 = direction;

        self.app.update();
        self.frame += 1;
        self.capture_events();
    }

    /// Run `frames` frames with no scripted input
    pub fn run(&mut self, frames: u64) {
        for _ in 0..frames {
            self.step(&[], Vec2::ZERO);
        }
    }

    fn capture_events(&mut self) {
        let bus = self.app.world().resource::<EventBus>();
        let processed = bus.processed();
        for event in &processed[self.seen_events.min(processed.len())..] {
            self.events
                .push(CapturedEvent::from_bus_event(self.frame, event));
        }
        self.seen_events = processed.len();
    }

    pub fn world_state(&mut self) -> WorldState {
        extract_world_state(self.app.world_mut(), &self.connector)
    }
}

/// Run a single test and return the result
pub fn run_test(test: &TestDefinition) -> TestResult {
    let mut scripted = ScriptedInputs::from_inputs(&test.input);

    // Set max frame from state assertions if present (use max of all assertions)
    for state in &test.expect.state {
        scripted.set_max_frame(state.after_frame);
    }

    // Ensure we run at least some frames
    if scripted.max_frame == 0 {
        scripted.max_frame = DEFAULT_FRAMES;
    }

    let mut harness = Harness::new(&test.setup);

    while scripted.should_continue() {
        let inputs = scripted.advance_frame();
        harness.step(&inputs, scripted.direction);

        let frame = harness.frame;
        let due: Vec<_> = test
            .expect
            .state
            .iter()
            .filter(|a| a.after_frame == frame)
            .collect();
        if due.is_empty() {
            continue;
        }

        let world_state = harness.world_state();
        for assertion in due {
            if let Err(mut error) = check_state(assertion, &world_state) {
                error.message = format!("[frame {}] {}", frame, error.message);
                return TestResult::Fail { error };
            }
        }
    }

    if let Err(error) = check_sequence(&test.expect.sequence, &harness.events) {
        return TestResult::Fail { error };
    }

    TestResult::Pass {
        frames: harness.frame,
    }
}

fn spawn_test_scene(mut commands: Commands, setup: &TestSetup) {
    if setup.spawns("ball") {
        commands.spawn((
            Transform::from_translation(Vec3::from_array(setup.ball)),
            Name::new("ball"),
            Ball,
        ));
    }
    if setup.spawns("rim") {
        commands.spawn((
            Transform::from_translation(Vec3::from_array(setup.rim)),
            Name::new("rim"),
            RimTarget,
        ));
    }
    if setup.spawns("floor") {
        commands.spawn((
            Transform::from_translation(Vec3::from_array(setup.floor)),
            Name::new(setup.floor_name.clone()),
            FloorBounds {
                half_extents: FLOOR_HALF_EXTENTS,
            },
        ));
    }
}

fn extract_world_state(world: &mut World, connector: &ScriptedConnector) -> WorldState {
    let ball = world
        .query_filtered::<(&Transform, &BallOwner, &StatusFeedback), With<Ball>>()
        .iter(world)
        .next()
        .map(|(transform, owner, feedback)| BallState {
            x: transform.translation.x,
            y: transform.translation.y,
            z: transform.translation.z,
            owner: owner.name().to_string(),
            color: feedback.0.name().to_string(),
        });

    let ingest = world.resource::<PoseIngest>();
    let shot = world.resource::<ShotState>();
    let input = world.resource::<LocalInput>();
    let transport = world.get_resource::<TransportManager>();

    WorldState {
        ball,
        status: ingest.status.name().to_string(),
        action: ingest.last_action.clone().unwrap_or_default(),
        phase: shot
            .phase()
            .map(|p| p.label())
            .unwrap_or_else(|| "none".to_string()),
        shots_started: shot.started,
        shots_finished: shot.finished,
        messages_received: ingest.messages_received,
        connection: transport
            .map(|t| t.state().name())
            .unwrap_or("none")
            .to_string(),
        connect_attempts: transport.map(|t| t.attempts_started()).unwrap_or(0),
        telemetry_sent: connector.sent_count(),
        offset_x: input.offset.x,
        offset_z: input.offset.y,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::parser::parse_test_str;

    fn run(toml: &str) -> TestResult {
        run_test(&parse_test_str(toml).unwrap())
    }

    fn assert_pass(result: TestResult) {
        match result {
            TestResult::Pass { .. } => {}
            TestResult::Fail { error } => panic!("{}", error),
            TestResult::Error { message } => panic!("{}", message),
        }
    }

    #[test]
    fn test_harness_connects_on_first_frame() {
        let mut harness = Harness::new(&TestSetup::default());
        harness.run(1);
        let state = harness.world_state();
        assert_eq!(state.connection, "open");
        assert_eq!(state.connect_attempts, 1);
        assert_eq!(state.phase, "none");
        assert_eq!(harness.events[0].event_type, "ConnectAttempt");
    }

    #[test]
    fn test_ball_follows_tracker() {
        assert_pass(run(r#"
name = "follow"
[[input]]
frame = 2
message = '{"ball": {"x": 420, "y": 240}}'

[[expect.state]]
after_frame = 120
checks = ["ball.x = 1.0", "ball.y = 1.5", "ball.owner = blend", "messages.received = 1"]
"#));
    }

    #[test]
    fn test_made_shot_runs_full_animation() {
        assert_pass(run(r#"
name = "made"
[[input]]
frame = 2
message = '{"shot_in": false}'
[[input]]
frame = 3
message = '{"shot_in": true}'

[[expect.state]]
after_frame = 4
checks = ["ball.owner = animation", "shot.phase = flight", "shots.started = 1", "ball.color = made"]

[[expect.state]]
after_frame = 600
checks = ["ball.owner = blend", "shots.finished = 1", "shot.phase = none", "ball.x = 0", "ball.y = 1.5", "ball.z = 0"]

[[expect.sequence]]
event = "ShotTriggered"
frame_max = 3
[[expect.sequence]]
event = "PhaseEntered"
detail = "drop"
[[expect.sequence]]
event = "PhaseEntered"
detail = "bounce 1"
[[expect.sequence]]
event = "PhaseEntered"
detail = "return"
[[expect.sequence]]
event = "ShotFinished"
"#));
    }

    #[test]
    fn test_no_server_retries_every_two_seconds() {
        assert_pass(run(r#"
name = "offline"
[setup]
fail_connects = 1000

[[expect.state]]
after_frame = 600
checks = ["connection.attempts >= 5", "connection.attempts <= 6", "ball.x = 0", "ball.y = 1.5", "telemetry.sent = 0"]
"#));
    }
}
