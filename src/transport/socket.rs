//! WebSocket connector backed by a private tokio runtime

use futures_util::{SinkExt, StreamExt};
use std::future::Future;
use std::time::Duration;
use tokio::runtime::Runtime;
use tokio::sync::mpsc::{UnboundedSender, unbounded_channel};
use tokio::task::JoinHandle;
use tokio_tungstenite::{connect_async, tungstenite::Message};

use super::connection::{AttemptId, Connector, TransportError, TransportEvent};
use crate::constants::SHUTDOWN_GRACE_MS;
use crate::protocol::{decode_frame, decode_pose};

/// Production connector: one tokio task per connection attempt
pub struct WebSocketConnector {
    runtime: Option<Runtime>,
    tasks: Vec<JoinHandle<()>>,
}

impl WebSocketConnector {
    pub fn new() -> Result<Self, TransportError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("ballsync-transport")
            .enable_all()
            .build()
            .map_err(|e| TransportError::Runtime(e.to_string()))?;
        Ok(Self {
            runtime: Some(runtime),
            tasks: Vec::new(),
        })
    }

    fn spawn(&mut self, task: impl Future<Output = ()> + Send + 'static) {
        let Some(runtime) = &self.runtime else {
            return;
        };
        self.tasks.retain(|handle| !handle.is_finished());
        self.tasks.push(runtime.spawn(task));
    }
}

impl Connector for WebSocketConnector {
    fn connect(
        &mut self,
        attempt: AttemptId,
        endpoint: &str,
        events: UnboundedSender<TransportEvent>,
    ) {
        if self.runtime.is_none() {
            let _ = events.send(TransportEvent::Error {
                attempt,
                error: TransportError::Runtime("runtime already shut down".into()),
            });
            return;
        }
        self.spawn(run_connection(attempt, endpoint.to_string(), events));
    }

    fn shutdown(&mut self) {
        let Some(runtime) = self.runtime.take() else {
            return;
        };
        // Live tasks see their outbound queue closed and send a close frame
        let pending = std::mem::take(&mut self.tasks);
        let grace = Duration::from_millis(SHUTDOWN_GRACE_MS);
        runtime.block_on(async move {
            let _ = tokio::time::timeout(grace, futures_util::future::join_all(pending)).await;
        });
        runtime.shutdown_background();
    }
}

/// Connect, then pump frames both ways until either side closes
async fn run_connection(
    attempt: AttemptId,
    endpoint: String,
    events: UnboundedSender<TransportEvent>,
) {
    let stream = match connect_async(endpoint.as_str()).await {
        Ok((stream, _response)) => stream,
        Err(e) => {
            let _ = events.send(TransportEvent::Error {
                attempt,
                error: TransportError::Connect {
                    endpoint,
                    reason: e.to_string(),
                },
            });
            return;
        }
    };

    let (mut sink, mut source) = stream.split();
    let (outbound, mut outbound_rx) = unbounded_channel::<String>();
    if events
        .send(TransportEvent::Opened { attempt, outbound })
        .is_err()
    {
        return;
    }

    loop {
        tokio::select! {
            frame = source.next() => {
                let event = match frame {
                    Some(Ok(Message::Text(text))) => {
                        TransportEvent::from_decoded(attempt, decode_pose(&text))
                    }
                    Some(Ok(Message::Binary(bytes))) => {
                        TransportEvent::from_decoded(attempt, decode_frame(bytes))
                    }
                    Some(Ok(Message::Close(frame))) => TransportEvent::Closed {
                        attempt,
                        reason: frame.map(|f| format!("{} {}", f.code, f.reason)),
                    },
                    // Ping/pong are answered by tungstenite
                    Some(Ok(_)) => continue,
                    Some(Err(e)) => TransportEvent::Error {
                        attempt,
                        error: TransportError::Socket(e.to_string()),
                    },
                    None => TransportEvent::Closed { attempt, reason: None },
                };
                let finished = matches!(
                    event,
                    TransportEvent::Closed { .. } | TransportEvent::Error { .. }
                );
                if events.send(event).is_err() || finished {
                    break;
                }
            }
            text = outbound_rx.recv() => {
                match text {
                    Some(text) => {
                        if let Err(e) = sink.send(Message::Text(text)).await {
                            let _ = events.send(TransportEvent::Error {
                                attempt,
                                error: TransportError::Socket(e.to_string()),
                            });
                            break;
                        }
                    }
                    None => {
                        let _ = sink.send(Message::Close(None)).await;
                        let _ = events.send(TransportEvent::Closed {
                            attempt,
                            reason: Some("closed locally".into()),
                        });
                        break;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shutdown_lets_tasks_finish_closing() {
        let mut connector = WebSocketConnector::new().unwrap();
        let (outbound_tx, mut outbound_rx) = unbounded_channel::<String>();
        let (done_tx, mut done_rx) = unbounded_channel::<&'static str>();

        connector.spawn(async move {
            // Same shape as the socket loop: wait for the queue to close, then report
            while outbound_rx.recv().await.is_some() {}
            let _ = done_tx.send("closed");
        });

        drop(outbound_tx);
        connector.shutdown();

        assert_eq!(done_rx.try_recv(), Ok("closed"));
        assert!(connector.runtime.is_none());
        assert!(connector.tasks.is_empty());
    }

    #[test]
    fn test_connect_after_shutdown_reports_error() {
        let mut connector = WebSocketConnector::new().unwrap();
        connector.shutdown();
        let (events_tx, mut events_rx) = unbounded_channel();
        connector.connect(0, "ws://127.0.0.1:1", events_tx);
        assert!(matches!(
            events_rx.try_recv(),
            Ok(TransportEvent::Error {
                error: TransportError::Runtime(_),
                ..
            })
        ));
    }
}
