//! Outbound input telemetry, one message per frame while connected

use bevy::prelude::*;

use crate::input::LocalInput;
use crate::protocol::OutboundMessage;
use crate::transport::TransportManager;

pub fn input_message(input: &LocalInput) -> OutboundMessage {
    OutboundMessage::Input {
        move_x: input.direction.x,
        move_y: input.direction.y,
        offset_x: input.offset.x,
        offset_z: input.offset.y,
    }
}

pub fn send_input_telemetry(input: Res<LocalInput>, mut transport: ResMut<TransportManager>) {
    if !transport.is_open() {
        return;
    }
    match input_message(&input).to_text() {
        Ok(text) => {
            transport.send_text(text);
        }
        Err(e) => warn!("Failed to encode input telemetry: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_y_is_sent_as_z() {
        let input = LocalInput {
            direction: Vec2::new(0.0, 1.0),
            offset: Vec2::new(0.5, -1.5),
        };
        assert_eq!(
            input_message(&input),
            OutboundMessage::Input {
                move_x: 0.0,
                move_y: 1.0,
                offset_x: 0.5,
                offset_z: -1.5,
            }
        );
    }
}
