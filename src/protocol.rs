//! Wire protocol between the tracker and the receiver
//!
//! Inbound frames are UTF-8 JSON pose messages; every field is optional and
//! unknown fields are ignored. Outbound frames carry local input telemetry.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use thiserror::Error;

/// A frame that could not be turned into a pose message
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("frame is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
    #[error("malformed pose message: {0}")]
    Json(#[from] serde_json::Error),
}

/// Ball position in tracker pixels. Either coordinate may be missing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
pub struct TrackerPoint {
    #[serde(default, deserialize_with = "lenient_number")]
    pub x: Option<f32>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub y: Option<f32>,
}

/// Decoded inbound message
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PoseMessage {
    /// Present only when `ball` is a JSON object
    #[serde(default, deserialize_with = "lenient_point")]
    pub ball: Option<TrackerPoint>,
    /// Present only when `shot_in` is a JSON boolean
    #[serde(default, deserialize_with = "lenient_bool")]
    pub shot_in: Option<bool>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub action: Option<String>,
}

impl PoseMessage {
    pub fn status(&self) -> ShotStatus {
        ShotStatus::from_flag(self.shot_in)
    }
}

/// Tri-state shot result
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ShotStatus {
    /// `shot_in: true`
    Made,
    /// `shot_in: false`
    Missed,
    /// `shot_in` absent or not a boolean
    #[default]
    Unknown,
}

impl ShotStatus {
    pub fn from_flag(flag: Option<bool>) -> Self {
        match flag {
            Some(true) => ShotStatus::Made,
            Some(false) => ShotStatus::Missed,
            None => ShotStatus::Unknown,
        }
    }

    /// Collapsed flag used for shot edge detection (unknown counts as not made)
    pub fn is_made(self) -> bool {
        matches!(self, ShotStatus::Made)
    }

    pub fn name(&self) -> &'static str {
        match self {
            ShotStatus::Made => "made",
            ShotStatus::Missed => "missed",
            ShotStatus::Unknown => "neutral",
        }
    }
}

/// Messages sent to the tracker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutboundMessage {
    /// Local directional input and the accumulated world offset
    Input {
        move_x: f32,
        move_y: f32,
        offset_x: f32,
        offset_z: f32,
    },
}

impl OutboundMessage {
    pub fn to_text(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Decode a text frame
pub fn decode_pose(text: &str) -> Result<PoseMessage, ProtocolError> {
    Ok(serde_json::from_str(text)?)
}

/// Decode a raw frame (bytes -> UTF-8 -> pose message)
pub fn decode_frame(bytes: Vec<u8>) -> Result<PoseMessage, ProtocolError> {
    let text = String::from_utf8(bytes)?;
    decode_pose(&text)
}

fn lenient_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f32>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    // Numbers outside the f32 range count as missing
    Ok(value
        .as_f64()
        .map(|v| v as f32)
        .filter(|v| v.is_finite()))
}

fn lenient_bool<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<bool>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(value.as_bool())
}

fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    })
}

fn lenient_point<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<TrackerPoint>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    if !value.is_object() {
        return Ok(None);
    }
    Ok(serde_json::from_value(value).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_message() {
        let msg = decode_pose(
            r#"{"ball": {"x": 420, "y": 240.5, "vx": 3, "vy": -1}, "shot_in": true, "action": "real_shot", "pose": {}}"#,
        )
        .unwrap();
        assert_eq!(
            msg.ball,
            Some(TrackerPoint {
                x: Some(420.0),
                y: Some(240.5)
            })
        );
        assert_eq!(msg.status(), ShotStatus::Made);
        assert_eq!(msg.action.as_deref(), Some("real_shot"));
    }

    #[test]
    fn test_missing_fields_do_not_fail() {
        let msg = decode_pose("{}").unwrap();
        assert_eq!(msg, PoseMessage::default());
        assert_eq!(msg.status(), ShotStatus::Unknown);

        let msg = decode_pose(r#"{"ball": {"y": 100}}"#).unwrap();
        let ball = msg.ball.unwrap();
        assert_eq!(ball.x, None);
        assert_eq!(ball.y, Some(100.0));
    }

    #[test]
    fn test_shot_in_tri_state() {
        assert_eq!(decode_pose(r#"{"shot_in": true}"#).unwrap().status(), ShotStatus::Made);
        assert_eq!(decode_pose(r#"{"shot_in": false}"#).unwrap().status(), ShotStatus::Missed);
        assert_eq!(decode_pose(r#"{"shot_in": null}"#).unwrap().status(), ShotStatus::Unknown);
        assert_eq!(decode_pose(r#"{"shot_in": "yes"}"#).unwrap().status(), ShotStatus::Unknown);
        assert!(!ShotStatus::Unknown.is_made());
    }

    #[test]
    fn test_non_object_ball_is_absent() {
        let msg = decode_pose(r#"{"ball": [1, 2], "action": 7}"#).unwrap();
        assert_eq!(msg.ball, None);
        assert_eq!(msg.action.as_deref(), Some("7"));
    }

    #[test]
    fn test_out_of_range_coordinates_are_absent() {
        let msg = decode_pose(r#"{"ball": {"x": 1e39, "y": 240}}"#).unwrap();
        let ball = msg.ball.unwrap();
        assert_eq!(ball.x, None);
        assert_eq!(ball.y, Some(240.0));

        let msg = decode_pose(r#"{"ball": {"x": 320, "y": -1e300}}"#).unwrap();
        assert_eq!(msg.ball.unwrap().y, None);
    }

    #[test]
    fn test_malformed_frames_are_errors() {
        assert!(matches!(decode_pose("{not json"), Err(ProtocolError::Json(_))));
        assert!(matches!(decode_pose("42"), Err(ProtocolError::Json(_))));
        assert!(matches!(decode_pose(r#""text""#), Err(ProtocolError::Json(_))));
        assert!(matches!(
            decode_frame(vec![0xff, 0xfe, 0x00]),
            Err(ProtocolError::Utf8(_))
        ));
    }

    #[test]
    fn test_binary_frame_decodes() {
        let msg = decode_frame(br#"{"shot_in": false}"#.to_vec()).unwrap();
        assert_eq!(msg.status(), ShotStatus::Missed);
    }

    #[test]
    fn test_outbound_input_shape() {
        let text = OutboundMessage::Input {
            move_x: 1.0,
            move_y: -0.5,
            offset_x: 0.25,
            offset_z: 2.0,
        }
        .to_text()
        .unwrap();
        let value: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["type"], "input");
        assert_eq!(value["move_x"], 1.0);
        assert_eq!(value["move_y"], -0.5);
        assert_eq!(value["offset_x"], 0.25);
        assert_eq!(value["offset_z"], 2.0);
    }
}
