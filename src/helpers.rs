//! Utility functions for ballsync

/// Clamp without panicking when `min > max` (misconfigured tuning).
/// Values below `min` snap to `min` first, then values above `max` snap to `max`.
pub fn clamp_lenient(value: f32, min: f32, max: f32) -> f32 {
    if value < min {
        min
    } else if value > max {
        max
    } else {
        value
    }
}

/// Hermite ease-in-out over [0, 1]; input is clamped first
pub fn smoothstep(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Half-sine hump: 0 at t=0, 1 at t=0.5, 0 at t=1
pub fn half_sine(t: f32) -> f32 {
    (std::f32::consts::PI * t).sin()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_lenient_inverted_range() {
        // min wins for small values, max wins for large values
        assert_eq!(clamp_lenient(1.0, 2.0, 1.5), 2.0);
        assert_eq!(clamp_lenient(3.0, 2.0, 1.5), 1.5);
        assert_eq!(clamp_lenient(0.7, 0.5, 5.0), 0.7);
    }

    #[test]
    fn test_smoothstep_endpoints() {
        assert_eq!(smoothstep(-1.0), 0.0);
        assert_eq!(smoothstep(0.0), 0.0);
        assert_eq!(smoothstep(0.5), 0.5);
        assert_eq!(smoothstep(1.0), 1.0);
        assert_eq!(smoothstep(2.0), 1.0);
    }
}
