//! Cosmetic spin proportional to how fast the ball is moving

use bevy::prelude::*;

use super::components::{Ball, PreviousPosition};
use crate::constants::{SPIN_BAND_HIGH, SPIN_BAND_LOW};
use crate::tuning::MotionTuning;

/// Spin rate (degrees/sec) for a squared per-frame displacement, or `None`
/// when the ball is at rest
pub fn spin_rate(displacement_sq: f32, base: f32, gain: f32, epsilon: f32) -> Option<f32> {
    if displacement_sq <= epsilon {
        return None;
    }
    let speed = (displacement_sq * gain).clamp(0.0, 1.0);
    Some(base * SPIN_BAND_LOW + (base * SPIN_BAND_HIGH - base * SPIN_BAND_LOW) * speed)
}

/// Runs every frame, during animations too
pub fn spin_feedback(
    time: Res<Time>,
    tuning: Res<MotionTuning>,
    mut balls: Query<(&mut Transform, &mut PreviousPosition), With<Ball>>,
) {
    let dt = time.delta_secs();
    for (mut transform, mut previous) in &mut balls {
        let displacement_sq = transform.translation.distance_squared(previous.0);
        if let Some(rate) = spin_rate(
            displacement_sq,
            tuning.spin_speed,
            tuning.spin_motion_gain,
            tuning.spin_motion_epsilon,
        ) {
            transform.rotate_local_x((rate * dt).to_radians());
        }
        previous.0 = transform.translation;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_at_rest_no_spin() {
        assert_eq!(spin_rate(0.0, 480.0, 1000.0, 1e-6), None);
        assert_eq!(spin_rate(1e-6, 480.0, 1000.0, 1e-6), None);
    }

    #[test]
    fn test_band_limits() {
        // Just above the threshold: close to half speed
        let slow = spin_rate(2e-6, 480.0, 1000.0, 1e-6).unwrap();
        assert!((slow - 240.0).abs() < 1.0);
        // Saturated at 1.5x
        assert_eq!(spin_rate(0.5, 480.0, 1000.0, 1e-6), Some(720.0));
        assert_eq!(spin_rate(50.0, 480.0, 1000.0, 1e-6), Some(720.0));
    }

    #[test]
    fn test_midpoint() {
        let mid = spin_rate(0.0005, 480.0, 1000.0, 1e-6).unwrap();
        assert!((mid - 480.0).abs() < 1e-3);
    }
}
