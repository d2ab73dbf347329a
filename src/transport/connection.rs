//! Connection lifecycle and reconnect cadence
//!
//! `TransportManager` owns the connection state. The socket itself lives
//! behind a [`Connector`], which reports back through an unbounded channel
//! that the frame loop drains once per frame.

use bevy::prelude::*;
use std::sync::{Mutex, PoisonError};
use thiserror::Error;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};

use crate::protocol::{PoseMessage, ProtocolError};

/// Identifies one connection attempt; events from older attempts are stale
pub type AttemptId = u64;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Open,
}

impl ConnectionState {
    pub fn name(&self) -> &'static str {
        match self {
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Open => "open",
        }
    }
}

/// Transport faults. Never fatal; the reconnect cadence retries.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum TransportError {
    #[error("failed to connect to {endpoint}: {reason}")]
    Connect { endpoint: String, reason: String },
    #[error("socket error: {0}")]
    Socket(String),
    #[error("transport runtime unavailable: {0}")]
    Runtime(String),
}

/// Reported by a connector, tagged with the attempt that produced it
#[derive(Debug)]
pub enum TransportEvent {
    Opened {
        attempt: AttemptId,
        outbound: UnboundedSender<String>,
    },
    Pose {
        attempt: AttemptId,
        message: PoseMessage,
    },
    Malformed {
        attempt: AttemptId,
        error: String,
    },
    Error {
        attempt: AttemptId,
        error: TransportError,
    },
    Closed {
        attempt: AttemptId,
        reason: Option<String>,
    },
}

impl TransportEvent {
    pub fn attempt(&self) -> AttemptId {
        match self {
            TransportEvent::Opened { attempt, .. }
            | TransportEvent::Pose { attempt, .. }
            | TransportEvent::Malformed { attempt, .. }
            | TransportEvent::Error { attempt, .. }
            | TransportEvent::Closed { attempt, .. } => *attempt,
        }
    }

    /// Wrap a decode result as a pose or malformed event
    pub fn from_decoded(attempt: AttemptId, decoded: Result<PoseMessage, ProtocolError>) -> Self {
        match decoded {
            Ok(message) => TransportEvent::Pose { attempt, message },
            Err(e) => TransportEvent::Malformed {
                attempt,
                error: e.to_string(),
            },
        }
    }
}

/// Opens sockets on behalf of the manager
pub trait Connector: Send + Sync + 'static {
    /// Begin one attempt. Must not block; outcomes are reported on `events`.
    fn connect(
        &mut self,
        attempt: AttemptId,
        endpoint: &str,
        events: UnboundedSender<TransportEvent>,
    );

    /// Release any background resources
    fn shutdown(&mut self) {}
}

/// What the frame loop sees after draining the event queue
#[derive(Debug, Clone, PartialEq)]
pub enum TransportUpdate {
    Opened,
    Lost { reason: String },
    Pose(PoseMessage),
    Malformed(String),
}

#[derive(Resource)]
pub struct TransportManager {
    endpoint: String,
    interval: f32,
    timer: f32,
    state: ConnectionState,
    attempt: AttemptId,
    attempts_started: u64,
    outbound: Option<UnboundedSender<String>>,
    events_tx: UnboundedSender<TransportEvent>,
    events_rx: Mutex<UnboundedReceiver<TransportEvent>>,
    connector: Box<dyn Connector>,
}

impl TransportManager {
    pub fn new(endpoint: impl Into<String>, interval: f32, connector: impl Connector) -> Self {
        let (events_tx, events_rx) = unbounded_channel();
        Self {
            endpoint: endpoint.into(),
            interval: interval.max(0.0),
            timer: 0.0,
            state: ConnectionState::Disconnected,
            attempt: 0,
            attempts_started: 0,
            outbound: None,
            events_tx,
            events_rx: Mutex::new(events_rx),
            connector: Box::new(connector),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state == ConnectionState::Open
    }

    pub fn attempts_started(&self) -> u64 {
        self.attempts_started
    }

    /// Advance the reconnect timer. When it fires and the connection is
    /// neither connecting nor open, exactly one attempt is started.
    pub fn tick(&mut self, dt: f32) -> Option<AttemptId> {
        self.timer -= dt;
        if self.timer > 0.0 {
            return None;
        }
        self.timer = self.interval;

        if self.state != ConnectionState::Disconnected {
            return None;
        }

        self.attempt += 1;
        self.attempts_started += 1;
        self.state = ConnectionState::Connecting;
        info!(
            "Connecting to {} (attempt {})",
            self.endpoint, self.attempts_started
        );
        self.connector
            .connect(self.attempt, &self.endpoint, self.events_tx.clone());
        Some(self.attempt)
    }

    /// Apply one connector event. Returns what the frame loop should act on.
    pub fn handle_event(&mut self, event: TransportEvent) -> Option<TransportUpdate> {
        if event.attempt() != self.attempt {
            debug!("Discarding event from stale attempt {}", event.attempt());
            return None;
        }

        match event {
            TransportEvent::Opened { outbound, .. } => {
                info!("Connected to {}", self.endpoint);
                self.state = ConnectionState::Open;
                self.outbound = Some(outbound);
                Some(TransportUpdate::Opened)
            }
            TransportEvent::Pose { message, .. } => {
                (self.state == ConnectionState::Open).then_some(TransportUpdate::Pose(message))
            }
            TransportEvent::Malformed { error, .. } => {
                debug!("Dropping malformed message: {}", error);
                Some(TransportUpdate::Malformed(error))
            }
            TransportEvent::Error { error, .. } => {
                warn!("Transport error: {}", error);
                self.lose(error.to_string())
            }
            TransportEvent::Closed { reason, .. } => {
                let reason = reason.unwrap_or_else(|| "closed".to_string());
                info!("Connection closed: {}", reason);
                self.lose(reason)
            }
        }
    }

    fn lose(&mut self, reason: String) -> Option<TransportUpdate> {
        if self.state == ConnectionState::Disconnected {
            return None;
        }
        self.state = ConnectionState::Disconnected;
        self.outbound = None;
        Some(TransportUpdate::Lost { reason })
    }

    /// Drain everything the connector reported since the last frame
    pub fn drain(&mut self) -> Vec<TransportUpdate> {
        let mut events = Vec::new();
        {
            let rx = self
                .events_rx
                .get_mut()
                .unwrap_or_else(PoisonError::into_inner);
            while let Ok(event) = rx.try_recv() {
                events.push(event);
            }
        }
        events
            .into_iter()
            .filter_map(|event| self.handle_event(event))
            .collect()
    }

    /// Fire-and-forget send; skipped unless the connection is open
    pub fn send_text(&mut self, text: String) -> bool {
        if self.state != ConnectionState::Open {
            return false;
        }
        let Some(outbound) = &self.outbound else {
            return false;
        };
        if outbound.send(text).is_err() {
            debug!("Outbound queue closed, dropping message");
            return false;
        }
        true
    }

    /// Best-effort close of the live connection
    pub fn shutdown(&mut self) {
        // Dropping the sender ends the socket task's outbound loop; the connector
        // gives it a short grace period to send the close frame
        self.outbound = None;
        self.state = ConnectionState::Disconnected;
        self.attempt += 1;
        self.connector.shutdown();
    }
}
