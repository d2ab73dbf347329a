//! In-process connector for headless runs
//!
//! Stands in for the WebSocket: scenario scripts open, close and fail the
//! current attempt and push raw text frames exactly as the socket task would.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};

use crate::protocol::decode_pose;
use crate::transport::{AttemptId, Connector, TransportError, TransportEvent};

#[derive(Default)]
struct Link {
    auto_open: bool,
    /// Attempts that fail before one is allowed through
    fail_connects: u32,
    attempts: Vec<AttemptId>,
    live: Option<(AttemptId, UnboundedSender<TransportEvent>)>,
    outbound: Option<UnboundedReceiver<String>>,
    sent: Vec<String>,
}

impl Link {
    fn open(&mut self) -> bool {
        let Some((attempt, events)) = &self.live else {
            return false;
        };
        let (outbound, outbound_rx) = unbounded_channel();
        let ok = events
            .send(TransportEvent::Opened {
                attempt: *attempt,
                outbound,
            })
            .is_ok();
        self.outbound = Some(outbound_rx);
        ok
    }

    fn send(&mut self, event: impl FnOnce(AttemptId) -> TransportEvent) -> bool {
        match &self.live {
            Some((attempt, events)) => events.send(event(*attempt)).is_ok(),
            None => false,
        }
    }

    fn collect_sent(&mut self) {
        if let Some(rx) = &mut self.outbound {
            while let Ok(text) = rx.try_recv() {
                self.sent.push(text);
            }
        }
    }
}

/// Cloneable handle; every clone drives the same link
#[derive(Clone, Default)]
pub struct ScriptedConnector {
    link: Arc<Mutex<Link>>,
}

impl ScriptedConnector {
    pub fn new(auto_open: bool, fail_connects: u32) -> Self {
        let link = Link {
            auto_open,
            fail_connects,
            ..Default::default()
        };
        Self {
            link: Arc::new(Mutex::new(link)),
        }
    }

    fn link(&self) -> MutexGuard<'_, Link> {
        self.link.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of connect calls so far
    pub fn attempts(&self) -> usize {
        self.link().attempts.len()
    }

    /// Accept the pending attempt
    pub fn open(&self) -> bool {
        self.link().open()
    }

    /// Deliver a raw text frame on the live attempt
    pub fn push_text(&self, text: &str) -> bool {
        let decoded = decode_pose(text);
        self.link()
            .send(|attempt| TransportEvent::from_decoded(attempt, decoded))
    }

    /// Peer closes the connection
    pub fn close(&self, reason: &str) -> bool {
        let mut link = self.link();
        link.collect_sent();
        let sent = link.send(|attempt| TransportEvent::Closed {
            attempt,
            reason: Some(reason.to_string()),
        });
        link.live = None;
        sent
    }

    /// Socket error on the live connection
    pub fn fail(&self, reason: &str) -> bool {
        let mut link = self.link();
        link.collect_sent();
        let sent = link.send(|attempt| TransportEvent::Error {
            attempt,
            error: TransportError::Socket(reason.to_string()),
        });
        link.live = None;
        sent
    }

    /// Every outbound text frame written so far
    pub fn sent(&self) -> Vec<String> {
        let mut link = self.link();
        link.collect_sent();
        link.sent.clone()
    }

    pub fn sent_count(&self) -> usize {
        let mut link = self.link();
        link.collect_sent();
        link.sent.len()
    }
}

impl Connector for ScriptedConnector {
    fn connect(&mut self, attempt: AttemptId, endpoint: &str, events: UnboundedSender<TransportEvent>) {
        let mut link = self.link();
        link.attempts.push(attempt);
        link.collect_sent();
        link.outbound = None;

        if link.fail_connects > 0 {
            link.fail_connects -= 1;
            let _ = events.send(TransportEvent::Error {
                attempt,
                error: TransportError::Connect {
                    endpoint: endpoint.to_string(),
                    reason: "connection refused".to_string(),
                },
            });
            link.live = None;
            return;
        }

        link.live = Some((attempt, events));
        if link.auto_open {
            link.open();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::{ConnectionState, TransportManager, TransportUpdate};

    #[test]
    fn test_auto_open_and_messages() {
        let connector = ScriptedConnector::new(true, 0);
        let mut manager = TransportManager::new("ws://test", 2.0, connector.clone());

        assert!(manager.tick(0.0).is_some());
        assert_eq!(manager.drain(), vec![TransportUpdate::Opened]);
        assert!(connector.push_text(r#"{"shot_in": false}"#));
        assert!(connector.push_text("{broken"));

        let updates = manager.drain();
        assert_eq!(updates.len(), 2);
        assert!(matches!(updates[0], TransportUpdate::Pose(_)));
        assert!(matches!(updates[1], TransportUpdate::Malformed(_)));

        assert!(manager.send_text("hello".to_string()));
        assert_eq!(connector.sent(), vec!["hello".to_string()]);
    }

    #[test]
    fn test_refused_connects_then_open() {
        let connector = ScriptedConnector::new(true, 2);
        let mut manager = TransportManager::new("ws://test", 2.0, connector.clone());

        manager.tick(0.0);
        assert!(matches!(manager.drain()[0], TransportUpdate::Lost { .. }));
        assert_eq!(manager.state(), ConnectionState::Disconnected);

        manager.tick(2.0);
        manager.drain();
        manager.tick(2.0);
        assert_eq!(manager.drain(), vec![TransportUpdate::Opened]);
        assert_eq!(connector.attempts(), 3);
    }

    #[test]
    fn test_close_without_connection_is_noop() {
        let connector = ScriptedConnector::new(false, 0);
        assert!(!connector.close("bye"));
        assert!(!connector.push_text("{}"));
    }
}
