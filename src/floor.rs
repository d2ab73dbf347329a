//! Floor height lookup for the shot animation
//!
//! The floor is whichever named scene object is found first; its height is
//! the top of its bounds, or a fixed distance below its origin when it has
//! none.

use bevy::prelude::*;

use crate::constants::{FLOOR_BOUNDS_SKIN, FLOOR_UNBOUNDED_OFFSET};

/// Local-space half extents of a floor object's collision box
#[derive(Component, Debug, Clone, Copy)]
pub struct FloorBounds {
    pub half_extents: Vec3,
}

/// Height a dropping ball should settle at for one floor object
pub fn floor_height_of(transform: &GlobalTransform, bounds: Option<&FloorBounds>) -> f32 {
    let (scale, rotation, translation) = transform.to_scale_rotation_translation();
    match bounds {
        Some(bounds) => {
            // Vertical half extent of the world-space box around the rotated, scaled bounds
            let axes = Mat3::from_quat(rotation) * Mat3::from_diagonal(scale);
            let half_height = axes.row(1).abs().dot(bounds.half_extents);
            translation.y + half_height + FLOOR_BOUNDS_SKIN
        }
        None => translation.y - FLOOR_UNBOUNDED_OFFSET,
    }
}

/// Pick the first candidate whose name matches `names` (in order)
pub fn resolve_floor_height<'a>(
    candidates: impl IntoIterator<Item = (&'a str, f32)>,
    names: &[String],
    fallback: f32,
) -> f32 {
    let candidates: Vec<(&str, f32)> = candidates.into_iter().collect();
    names
        .iter()
        .find_map(|name| {
            candidates
                .iter()
                .find(|(candidate, _)| *candidate == name.as_str())
                .map(|(_, height)| *height)
        })
        .unwrap_or(fallback)
}
