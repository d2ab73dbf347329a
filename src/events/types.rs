//! Event type definitions for the session log

use bevy::prelude::*;

use crate::protocol::ShotStatus;
use crate::tuning::MotionTuning;

/// Everything the receiver records about a session
#[derive(Debug, Clone, PartialEq)]
pub enum ReceiverEvent {
    // === Session Events ===
    /// Session started (generated once per launch)
    SessionStart {
        session_id: String, // UUID v4
        timestamp: String,
    },
    /// Motion tuning snapshot (logged after session start and on reload)
    Config(MotionTuning),

    // === Transport Events ===
    ConnectAttempt { attempt: u64, endpoint: String },
    Connected { endpoint: String },
    Disconnected { reason: String },
    /// Inbound frame that failed to decode
    Malformed { error: String },

    // === Tracker Events ===
    StatusChange { status: ShotStatus },
    Action { label: String },

    // === Shot Events ===
    ShotTriggered { from: Vec3, to: Vec3 },
    PhaseEntered { phase: String },
    ShotFinished { duration: f32, home: Vec3 },
}

impl ReceiverEvent {
    /// Two-letter code used in the compact log format
    pub fn type_code(&self) -> &'static str {
        match self {
            ReceiverEvent::SessionStart { .. } => "SE",
            ReceiverEvent::Config(_) => "CF",
            ReceiverEvent::ConnectAttempt { .. } => "CA",
            ReceiverEvent::Connected { .. } => "CO",
            ReceiverEvent::Disconnected { .. } => "DC",
            ReceiverEvent::Malformed { .. } => "MM",
            ReceiverEvent::StatusChange { .. } => "ST",
            ReceiverEvent::Action { .. } => "AC",
            ReceiverEvent::ShotTriggered { .. } => "SH",
            ReceiverEvent::PhaseEntered { .. } => "PH",
            ReceiverEvent::ShotFinished { .. } => "SF",
        }
    }

    /// Variant name, as used by scenario event sequences
    pub fn name(&self) -> &'static str {
        match self {
            ReceiverEvent::SessionStart { .. } => "SessionStart",
            ReceiverEvent::Config(_) => "Config",
            ReceiverEvent::ConnectAttempt { .. } => "ConnectAttempt",
            ReceiverEvent::Connected { .. } => "Connected",
            ReceiverEvent::Disconnected { .. } => "Disconnected",
            ReceiverEvent::Malformed { .. } => "Malformed",
            ReceiverEvent::StatusChange { .. } => "StatusChange",
            ReceiverEvent::Action { .. } => "Action",
            ReceiverEvent::ShotTriggered { .. } => "ShotTriggered",
            ReceiverEvent::PhaseEntered { .. } => "PhaseEntered",
            ReceiverEvent::ShotFinished { .. } => "ShotFinished",
        }
    }

    /// Short detail shown next to the name (phase, status, label or reason)
    pub fn detail(&self) -> Option<String> {
        match self {
            ReceiverEvent::Disconnected { reason } => Some(reason.clone()),
            ReceiverEvent::StatusChange { status } => Some(status.name().to_string()),
            ReceiverEvent::Action { label } => Some(label.clone()),
            ReceiverEvent::PhaseEntered { phase } => Some(phase.clone()),
            _ => None,
        }
    }
}
