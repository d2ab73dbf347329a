//! Transport: WebSocket connection to the tracker with a fixed reconnect cadence

mod connection;
mod socket;
mod systems;

pub use connection::{
    AttemptId, ConnectionState, Connector, TransportError, TransportEvent, TransportManager,
    TransportUpdate,
};
pub use socket::WebSocketConnector;
pub use systems::{InboundPose, close_transport_on_exit, pump_transport, reconnect_tick};
