//! Compact text format for session events
//!
//! Format: `T:NNNNN|CODE|data...`
//! - T:NNNNN = milliseconds since session start (5 digits, wraps at 99999)
//! - CODE = 2-char event type code
//! - data = pipe-separated values specific to the event type
//!
//! Examples:
//! ```text
//! T:00000|SE|6f1c0d2e-...|20261019_141502
//! T:00016|CA|1|ws://localhost:8765
//! T:00031|CO|ws://localhost:8765
//! T:02410|ST|made
//! T:02410|SH|0.41,1.62,0.00|0.00,3.05,-6.00
//! T:02410|PH|flight
//! T:06310|SF|3.90|0.00,1.50,0.00
//! ```
//!
//! Free-text fields (reasons, errors, labels) are always last and may
//! contain `|`; the parser rejoins them.

use bevy::prelude::*;

use super::types::ReceiverEvent;
use crate::protocol::ShotStatus;
use crate::tuning::MotionTuning;

fn fmt_vec3(v: Vec3) -> String {
    format!("{:.2},{:.2},{:.2}", v.x, v.y, v.z)
}

fn parse_vec3(s: &str) -> Option<Vec3> {
    let mut parts = s.split(',').map(|p| p.trim().parse::<f32>());
    let x = parts.next()?.ok()?;
    let y = parts.next()?.ok()?;
    let z = parts.next()?.ok()?;
    Some(Vec3::new(x, y, z))
}

fn parse_status(s: &str) -> Option<ShotStatus> {
    match s {
        "made" => Some(ShotStatus::Made),
        "missed" => Some(ShotStatus::Missed),
        "neutral" => Some(ShotStatus::Unknown),
        _ => None,
    }
}

/// Serialize an event to one log line
pub fn serialize_event(time_ms: u32, event: &ReceiverEvent) -> String {
    let ts = format!("T:{:05}", time_ms % 100000);
    let code = event.type_code();

    let data = match event {
        ReceiverEvent::SessionStart {
            session_id,
            timestamp,
        } => format!("{}|{}", session_id, timestamp),
        ReceiverEvent::Config(tuning) => {
            serde_json::to_string(tuning).unwrap_or_else(|_| "{}".to_string())
        }
        ReceiverEvent::ConnectAttempt { attempt, endpoint } => {
            format!("{}|{}", attempt, endpoint)
        }
        ReceiverEvent::Connected { endpoint } => endpoint.clone(),
        ReceiverEvent::Disconnected { reason } => reason.clone(),
        ReceiverEvent::Malformed { error } => error.replace('\n', " "),
        ReceiverEvent::StatusChange { status } => status.name().to_string(),
        ReceiverEvent::Action { label } => label.replace('\n', " "),
        ReceiverEvent::ShotTriggered { from, to } => {
            format!("{}|{}", fmt_vec3(*from), fmt_vec3(*to))
        }
        ReceiverEvent::PhaseEntered { phase } => phase.clone(),
        ReceiverEvent::ShotFinished { duration, home } => {
            format!("{:.2}|{}", duration, fmt_vec3(*home))
        }
    };

    format!("{}|{}|{}", ts, code, data)
}

/// Parse one log line back into `(time_ms, event)`
pub fn parse_event(line: &str) -> Option<(u32, ReceiverEvent)> {
    let parts: Vec<&str> = line.split('|').collect();
    if parts.len() < 3 {
        return None;
    }

    let ts_str = parts[0].strip_prefix("T:")?;
    let time_ms: u32 = ts_str.parse().ok()?;

    let code = parts[1];
    let data = &parts[2..];
    let rest = |from: usize| data[from..].join("|");

    let event = match code {
        "SE" if data.len() >= 2 => ReceiverEvent::SessionStart {
            session_id: data[0].to_string(),
            timestamp: data[1].to_string(),
        },
        "CF" => {
            let tuning: MotionTuning = serde_json::from_str(&rest(0)).ok()?;
            ReceiverEvent::Config(tuning)
        }
        "CA" if data.len() >= 2 => ReceiverEvent::ConnectAttempt {
            attempt: data[0].parse().ok()?,
            endpoint: rest(1),
        },
        "CO" => ReceiverEvent::Connected { endpoint: rest(0) },
        "DC" => ReceiverEvent::Disconnected { reason: rest(0) },
        "MM" => ReceiverEvent::Malformed { error: rest(0) },
        "ST" => ReceiverEvent::StatusChange {
            status: parse_status(data[0])?,
        },
        "AC" => ReceiverEvent::Action { label: rest(0) },
        "SH" if data.len() >= 2 => ReceiverEvent::ShotTriggered {
            from: parse_vec3(data[0])?,
            to: parse_vec3(data[1])?,
        },
        "PH" => ReceiverEvent::PhaseEntered {
            phase: data[0].to_string(),
        },
        "SF" if data.len() >= 2 => ReceiverEvent::ShotFinished {
            duration: data[0].parse().ok()?,
            home: parse_vec3(data[1])?,
        },
        _ => return None,
    };

    Some((time_ms, event))
}
