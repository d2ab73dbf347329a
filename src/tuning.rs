//! Motion tuning (smoothing, spin, shot animation, tracker mapping)
//!
//! Artist-tunable values stored in config/motion_tuning.json. Every field
//! falls back to its constant default, so partial files are valid.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::constants::*;
use crate::settings::{ConfigError, read_json, write_json};

/// Path to the motion tuning config
pub const MOTION_TUNING_FILE: &str = "config/motion_tuning.json";

/// One bounce after the drop phase
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BounceTuning {
    pub height: f32,
    pub forward: f32,
    /// Progress per second (higher = quicker bounce)
    pub rate: f32,
    /// Multiple of `spin_speed` while bouncing
    pub spin: f32,
}

fn default_bounces() -> Vec<BounceTuning> {
    BOUNCES
        .iter()
        .map(|&(height, forward, rate, spin)| BounceTuning {
            height,
            forward,
            rate,
            spin,
        })
        .collect()
}

/// Runtime-adjustable motion values
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionTuning {
    // Follow / spin
    pub move_smooth: f32,
    pub spin_speed: f32,
    pub spin_motion_epsilon: f32,
    pub spin_motion_gain: f32,
    // Local input
    pub input_speed: f32,
    pub stick_deadzone: f32,
    // Tracker mapping
    pub tracker_center_x: f32,
    pub tracker_center_y: f32,
    pub tracker_units_per_scene_unit: f32,
    pub target_band_center: f32,
    pub target_band_min: f32,
    pub target_band_max: f32,
    // Shot animation
    pub shot_speed: f32,
    pub drop_after_shot: f32,
    pub arc_height: f32,
    pub arc_per_unit: f32,
    pub arc_min: f32,
    pub flight_duration_per_unit: f32,
    pub flight_duration_min: f32,
    pub flight_duration_max: f32,
    pub drop_forward_speed: f32,
    pub drop_settle_margin: f32,
    pub return_rate: f32,
    pub flight_spin: f32,
    pub drop_spin: f32,
    pub return_spin: f32,
    #[serde(default = "default_bounces")]
    pub bounces: Vec<BounceTuning>,
}

impl Default for MotionTuning {
    fn default() -> Self {
        Self {
            move_smooth: MOVE_SMOOTH,
            spin_speed: SPIN_SPEED,
            spin_motion_epsilon: SPIN_MOTION_EPSILON,
            spin_motion_gain: SPIN_MOTION_GAIN,
            input_speed: INPUT_SPEED,
            stick_deadzone: STICK_DEADZONE,
            tracker_center_x: TRACKER_CENTER_X,
            tracker_center_y: TRACKER_CENTER_Y,
            tracker_units_per_scene_unit: TRACKER_UNITS_PER_SCENE_UNIT,
            target_band_center: TARGET_BAND_CENTER,
            target_band_min: TARGET_BAND_MIN,
            target_band_max: TARGET_BAND_MAX,
            shot_speed: SHOT_SPEED,
            drop_after_shot: DROP_AFTER_SHOT,
            arc_height: ARC_HEIGHT,
            arc_per_unit: ARC_PER_UNIT,
            arc_min: ARC_MIN,
            flight_duration_per_unit: FLIGHT_DURATION_PER_UNIT,
            flight_duration_min: FLIGHT_DURATION_MIN,
            flight_duration_max: FLIGHT_DURATION_MAX,
            drop_forward_speed: DROP_FORWARD_SPEED,
            drop_settle_margin: DROP_SETTLE_MARGIN,
            return_rate: RETURN_RATE,
            flight_spin: FLIGHT_SPIN,
            drop_spin: DROP_SPIN,
            return_spin: RETURN_SPIN,
            bounces: default_bounces(),
        }
    }
}

impl MotionTuning {
    /// Load tuning from `path`
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        read_json(path)
    }

    /// Load tuning from the default file, falling back to defaults
    pub fn load_or_default() -> Self {
        let path = Path::new(MOTION_TUNING_FILE);
        match Self::load(path) {
            Ok(tuning) => {
                info!("Loaded motion tuning from {}", MOTION_TUNING_FILE);
                tuning
            }
            Err(ConfigError::Missing(_)) => Self::default(),
            Err(e) => {
                warn!("{}, using default motion tuning", e);
                Self::default()
            }
        }
    }

    /// Save tuning to the default file
    pub fn save(&self) -> Result<(), ConfigError> {
        write_json(Path::new(MOTION_TUNING_FILE), self)
    }

    /// Speed of the gravity-like fall during the drop phase
    pub fn drop_speed(&self) -> f32 {
        self.shot_speed * self.drop_after_shot * 0.5
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_tuning_uses_defaults() {
        let tuning: MotionTuning =
            serde_json::from_str(r#"{"move_smooth": 4.0, "arc_height": 3.0}"#).unwrap();
        assert_eq!(tuning.move_smooth, 4.0);
        assert_eq!(tuning.arc_height, 3.0);
        assert_eq!(tuning.spin_speed, SPIN_SPEED);
        assert_eq!(tuning.bounces.len(), 2);
    }

    #[test]
    fn test_bounces_can_be_replaced() {
        let tuning: MotionTuning = serde_json::from_str(
            r#"{"bounces": [{"height": 1.0, "forward": 0.5, "rate": 3.0, "spin": -1.0}]}"#,
        )
        .unwrap();
        assert_eq!(tuning.bounces.len(), 1);
        assert_eq!(tuning.bounces[0].rate, 3.0);
    }

    #[test]
    fn test_drop_speed() {
        let tuning = MotionTuning::default();
        assert!((tuning.drop_speed() - 6.0).abs() < 1e-5);
    }
}
