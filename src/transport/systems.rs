//! Frame-loop side of the transport

use bevy::prelude::*;

use super::connection::{TransportManager, TransportUpdate};
use crate::events::{EventBus, ReceiverEvent};
use crate::protocol::PoseMessage;

/// A decoded pose message, dispatched on the frame loop
#[derive(Message, Debug, Clone)]
pub struct InboundPose(pub PoseMessage);

/// Advance the reconnect cadence
pub fn reconnect_tick(
    time: Res<Time>,
    mut transport: ResMut<TransportManager>,
    mut bus: ResMut<EventBus>,
) {
    if let Some(attempt) = transport.tick(time.delta_secs()) {
        let endpoint = transport.endpoint().to_string();
        bus.emit(ReceiverEvent::ConnectAttempt { attempt, endpoint });
    }
}

/// Drain connector events into `InboundPose` messages
pub fn pump_transport(
    mut transport: ResMut<TransportManager>,
    mut poses: MessageWriter<InboundPose>,
    mut bus: ResMut<EventBus>,
) {
    for update in transport.drain() {
        match update {
            TransportUpdate::Opened => {
                let endpoint = transport.endpoint().to_string();
                bus.emit(ReceiverEvent::Connected { endpoint });
            }
            TransportUpdate::Lost { reason } => {
                bus.emit(ReceiverEvent::Disconnected { reason });
            }
            TransportUpdate::Pose(message) => {
                poses.write(InboundPose(message));
            }
            TransportUpdate::Malformed(error) => {
                bus.emit(ReceiverEvent::Malformed { error });
            }
        }
    }
}

/// Close the socket when the app exits
pub fn close_transport_on_exit(
    mut exit: MessageReader<AppExit>,
    mut transport: ResMut<TransportManager>,
) {
    if exit.read().next().is_some() {
        info!("Closing transport");
        transport.shutdown();
    }
}
