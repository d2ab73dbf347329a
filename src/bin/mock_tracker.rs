//! Mock tracker: serves a synthetic pose stream over WebSocket
//!
//! Usage:
//!   cargo run --bin mock-tracker                          # ws://127.0.0.1:8765
//!   cargo run --bin mock-tracker -- --addr 0.0.0.0:9000   # Other address
//!   cargo run --bin mock-tracker -- --interval-ms 16      # Faster stream
//!
//! The ball traces a slow figure-eight around the frame center with a little
//! jitter. A shot cycle repeats every few seconds: dribble (no result), miss,
//! dribble, make. Input telemetry from the receiver nudges the ball.

use std::net::SocketAddr;
use std::time::Duration;

use ballsync::protocol::OutboundMessage;
use futures_util::{SinkExt, StreamExt};
use rand::{Rng, SeedableRng};
use serde_json::json;
use tokio::net::{TcpListener, TcpStream};
use tokio::time::{Instant, interval};
use tokio_tungstenite::{accept_async, tungstenite::Message};
use tracing::{debug, info, warn};

const DEFAULT_ADDR: &str = "127.0.0.1:8765";
const DEFAULT_INTERVAL_MS: u64 = 30;
/// Tracker pixels per unit of receiver input
const NUDGE_SCALE: f32 = 5.0;
const FRAME_WIDTH: f32 = 640.0;
const FRAME_HEIGHT: f32 = 480.0;

/// (seconds, action, shot_in) segments of the repeating shot cycle
const SHOT_CYCLE: [(f32, &str, Option<bool>); 4] = [
    (4.0, "dribbling", None),
    (1.5, "real_shot", Some(false)),
    (4.0, "holding_right", None),
    (1.5, "real_shot", Some(true)),
];

struct Config {
    addr: SocketAddr,
    interval: Duration,
}

fn parse_args() -> Result<Config, String> {
    let args: Vec<String> = std::env::args().collect();
    let value_of = |flag: &str| {
        args.iter()
            .position(|a| a == flag)
            .and_then(|i| args.get(i + 1))
            .cloned()
    };

    let addr = value_of("--addr")
        .unwrap_or_else(|| DEFAULT_ADDR.to_string())
        .parse::<SocketAddr>()
        .map_err(|e| format!("invalid --addr: {}", e))?;
    let interval_ms = match value_of("--interval-ms") {
        Some(ms) => ms
            .parse::<u64>()
            .map_err(|e| format!("invalid --interval-ms: {}", e))?,
        None => DEFAULT_INTERVAL_MS,
    };

    Ok(Config {
        addr,
        interval: Duration::from_millis(interval_ms.max(1)),
    })
}

/// Synthetic tracker state for one connection
struct TrackerSim {
    started: Instant,
    nudge_x: f32,
    nudge_y: f32,
    last: (f32, f32),
}

impl TrackerSim {
    fn new() -> Self {
        Self {
            started: Instant::now(),
            nudge_x: 0.0,
            nudge_y: 0.0,
            last: (FRAME_WIDTH * 0.5, FRAME_HEIGHT * 0.5),
        }
    }

    fn shot_segment(elapsed: f32) -> (&'static str, Option<bool>) {
        let period: f32 = SHOT_CYCLE.iter().map(|(secs, _, _)| secs).sum();
        let mut t = elapsed % period;
        for (secs, action, shot_in) in SHOT_CYCLE {
            if t < secs {
                return (action, shot_in);
            }
            t -= secs;
        }
        ("dribbling", None)
    }

    fn apply_input(&mut self, text: &str) {
        match serde_json::from_str::<OutboundMessage>(text) {
            Ok(OutboundMessage::Input {
                move_x,
                move_y,
                offset_x,
                offset_z,
            }) => {
                if move_x != 0.0 || move_y != 0.0 {
                    debug!(
                        "Input move ({:.2}, {:.2}) offset ({:.2}, {:.2})",
                        move_x, move_y, offset_x, offset_z
                    );
                }
                self.nudge_x += move_x * NUDGE_SCALE;
                self.nudge_y -= move_y * NUDGE_SCALE;
            }
            Err(e) => debug!("Ignoring receiver message: {}", e),
        }
    }

    fn next_frame(&mut self, rng: &mut impl Rng) -> serde_json::Value {
        let elapsed = self.started.elapsed().as_secs_f32();
        let x = FRAME_WIDTH * 0.5 + 120.0 * (elapsed * 0.7).sin() + self.nudge_x + rng.gen_range(-2.0..2.0);
        let y = FRAME_HEIGHT * 0.5 + 60.0 * (elapsed * 1.4).sin() + self.nudge_y + rng.gen_range(-2.0..2.0);
        let x = x.clamp(0.0, FRAME_WIDTH);
        let y = y.clamp(0.0, FRAME_HEIGHT);
        let (vx, vy) = (x - self.last.0, y - self.last.1);
        self.last = (x, y);

        let (action, shot_in) = Self::shot_segment(elapsed);
        json!({
            "pose": {},
            "action": action,
            "ball": { "x": x, "y": y, "vx": vx, "vy": vy },
            "shot_in": shot_in,
        })
    }
}

async fn serve_client(stream: TcpStream, peer: SocketAddr, period: Duration) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let ws = accept_async(stream).await?;
    info!("Receiver connected from {}", peer);
    let (mut sink, mut source) = ws.split();

    let mut sim = TrackerSim::new();
    let mut rng = rand::rngs::StdRng::from_entropy();
    let mut ticker = interval(period);
    let mut frames_sent: u64 = 0;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let frame = sim.next_frame(&mut rng);
                sink.send(Message::Text(frame.to_string())).await?;
                frames_sent += 1;
            }
            msg = source.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => sim.apply_input(&text),
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {}
                    Some(Err(e)) => return Err(e.into()),
                }
            }
        }
    }

    info!("Receiver {} disconnected after {} frames", peer, frames_sent);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = parse_args()?;
    let listener = TcpListener::bind(config.addr).await?;
    info!(
        "Mock tracker listening on ws://{} ({} ms per frame)",
        config.addr,
        config.interval.as_millis()
    );

    loop {
        let (stream, peer) = listener.accept().await?;
        let period = config.interval;
        tokio::spawn(async move {
            if let Err(e) = serve_client(stream, peer, period).await {
                warn!("Receiver {} dropped: {}", peer, e);
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shot_cycle_segments() {
        assert_eq!(TrackerSim::shot_segment(0.0), ("dribbling", None));
        assert_eq!(TrackerSim::shot_segment(4.5), ("real_shot", Some(false)));
        assert_eq!(TrackerSim::shot_segment(10.5), ("real_shot", Some(true)));
        // Wraps after one period (11 s)
        assert_eq!(TrackerSim::shot_segment(11.2), ("dribbling", None));
    }

    #[test]
    fn test_input_nudges_ball() {
        let mut sim = TrackerSim::new();
        sim.apply_input(r#"{"type": "input", "move_x": 1.0, "move_y": 0.5, "offset_x": 0.0, "offset_z": 0.0}"#);
        assert_eq!(sim.nudge_x, 5.0);
        assert_eq!(sim.nudge_y, -2.5);
        sim.apply_input("not json");
        assert_eq!(sim.nudge_x, 5.0);
    }
}
