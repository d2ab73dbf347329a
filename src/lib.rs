//! Ballsync - drives a 3D ball from a live tracker stream, built with Bevy
//!
//! This crate provides the transport, pose ingestion, shot animation and
//! feedback systems; `ReceiverPlugin` wires them into an app.

// Core modules
pub mod config_watcher;
pub mod constants;
pub mod events;
pub mod helpers;
pub mod plugin;
pub mod protocol;
pub mod settings;
pub mod testing;
pub mod transport;
pub mod tuning;

// Scene logic modules
pub mod ball;
pub mod feedback;
pub mod floor;
pub mod input;
pub mod pose;
pub mod shot;
pub mod telemetry;
pub mod ui;

// Re-export commonly used types for convenience
pub use ball::{
    Anchor, Ball, BallOwner, FollowTarget, PreviousPosition, RimTarget, StatusFeedback,
};
pub use config_watcher::ConfigWatcher;
pub use constants::*;
pub use events::{BusEvent, EventBus, EventLogConfig, EventLogger, ReceiverEvent};
pub use floor::FloorBounds;
pub use helpers::*;
pub use input::{LocalInput, ScriptedDirection};
pub use plugin::ReceiverPlugin;
pub use pose::{PoseIngest, TrackerMapping};
pub use protocol::{OutboundMessage, PoseMessage, ShotStatus, TrackerPoint, decode_pose};
pub use settings::ReceiverSettings;
pub use shot::{ShotAnimation, ShotEvent, ShotPhase, ShotProfile, ShotState};
pub use transport::{
    ConnectionState, Connector, TransportError, TransportEvent, TransportManager,
    WebSocketConnector,
};
pub use tuning::MotionTuning;
pub use ui::{HudSettings, StatusText};
