//! Tracker image space -> scene offset

use bevy::prelude::*;

use crate::protocol::TrackerPoint;
use crate::tuning::MotionTuning;

/// Linear remap from tracker pixels to a scene-space offset from the anchor.
/// Image x maps to scene X; image y (down) maps to scene height (up), clamped
/// to the target band.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackerMapping {
    pub center_x: f32,
    pub center_y: f32,
    pub units_per_scene_unit: f32,
    pub band_center: f32,
    pub band_min: f32,
    pub band_max: f32,
}

impl Default for TrackerMapping {
    fn default() -> Self {
        Self::from_tuning(&MotionTuning::default())
    }
}

impl TrackerMapping {
    pub fn from_tuning(tuning: &MotionTuning) -> Self {
        Self {
            center_x: tuning.tracker_center_x,
            center_y: tuning.tracker_center_y,
            units_per_scene_unit: tuning.tracker_units_per_scene_unit,
            band_center: tuning.target_band_center,
            band_min: tuning.target_band_min,
            band_max: tuning.target_band_max,
        }
    }

    /// Map a tracker position to an offset `(nx, fy - center, 0)`.
    /// Non-finite coordinates are treated as the image center.
    pub fn map(&self, x: f32, y: f32) -> Vec3 {
        let x = if x.is_finite() { x } else { self.center_x };
        let y = if y.is_finite() { y } else { self.center_y };
        let scale = if self.units_per_scene_unit.abs() > f32::EPSILON {
            self.units_per_scene_unit
        } else {
            1.0
        };
        let nx = (x - self.center_x) / scale;
        let ny = (y - self.center_y) / scale;
        let fy = crate::helpers::clamp_lenient(self.band_center - ny, self.band_min, self.band_max);
        Vec3::new(nx, fy - self.band_center, 0.0)
    }

    /// Map a possibly partial point; missing coordinates sit at the image center
    pub fn offset_for(&self, point: &TrackerPoint) -> Vec3 {
        self.map(
            point.x.unwrap_or(self.center_x),
            point.y.unwrap_or(self.center_y),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-4
    }

    #[test]
    fn test_center_maps_to_zero() {
        let mapping = TrackerMapping::default();
        assert!(close(mapping.map(320.0, 240.0), Vec3::ZERO));
    }

    #[test]
    fn test_linear_mapping() {
        let mapping = TrackerMapping::default();
        // 100 px right and 100 px up in the image
        assert!(close(mapping.map(420.0, 140.0), Vec3::new(1.0, 1.0, 0.0)));
        assert!(close(mapping.map(220.0, 290.0), Vec3::new(-1.0, -0.5, 0.0)));
    }

    #[test]
    fn test_height_is_clamped_to_band() {
        let mapping = TrackerMapping::default();
        // y far below the image -> fy clamps to 0.5 -> offset.y = -2.0
        for y in [480.0, 1000.0, 1.0e6] {
            let offset = mapping.map(320.0, y);
            assert!((offset.y - (-2.0)).abs() < 1e-4, "y={y} -> {offset:?}");
        }
        // y far above -> fy clamps to 5.0 -> offset.y = 2.5
        for y in [-10.0, -1000.0, -1.0e6] {
            let offset = mapping.map(320.0, y);
            assert!((offset.y - 2.5).abs() < 1e-4, "y={y} -> {offset:?}");
        }
    }

    #[test]
    fn test_band_holds_for_any_input() {
        let mapping = TrackerMapping::default();
        for i in -50..50 {
            let x = i as f32 * 97.0;
            let y = i as f32 * 131.0;
            let fy = mapping.map(x, y).y + mapping.band_center;
            assert!((0.5..=5.0).contains(&fy));
        }
    }

    #[test]
    fn test_extreme_input_maps_to_finite_offset() {
        let mapping = TrackerMapping::default();
        for (x, y) in [
            (f32::INFINITY, 240.0),
            (320.0, f32::NEG_INFINITY),
            (f32::NAN, f32::NAN),
            (f32::MAX, f32::MIN),
        ] {
            let offset = mapping.map(x, y);
            assert!(offset.is_finite(), "({x}, {y}) -> {offset:?}");
        }
        assert!(close(mapping.map(f32::INFINITY, 240.0), Vec3::ZERO));
    }

    #[test]
    fn test_missing_coordinates_default_to_center() {
        let mapping = TrackerMapping::default();
        let point = TrackerPoint {
            x: None,
            y: Some(140.0),
        };
        assert!(close(mapping.offset_for(&point), Vec3::new(0.0, 1.0, 0.0)));
        assert!(close(
            mapping.offset_for(&TrackerPoint::default()),
            Vec3::ZERO
        ));
    }
}
