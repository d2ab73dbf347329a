//! Ball colour driven by the last reported shot status

use bevy::prelude::*;

use crate::ball::{Ball, StatusFeedback};
use crate::constants::{STATUS_MADE_COLOR, STATUS_MISSED_COLOR, STATUS_NEUTRAL_COLOR};
use crate::pose::PoseIngest;
use crate::protocol::ShotStatus;

pub fn status_color(status: ShotStatus) -> Color {
    match status {
        ShotStatus::Made => STATUS_MADE_COLOR,
        ShotStatus::Missed => STATUS_MISSED_COLOR,
        ShotStatus::Unknown => STATUS_NEUTRAL_COLOR,
    }
}

/// Applied on every frame, animation or not. Materials are optional so the
/// system also runs headless.
pub fn apply_status_feedback(
    pose: Res<PoseIngest>,
    mut materials: Option<ResMut<Assets<StandardMaterial>>>,
    mut balls: Query<(&mut StatusFeedback, Option<&MeshMaterial3d<StandardMaterial>>), With<Ball>>,
) {
    for (mut feedback, material) in &mut balls {
        if feedback.0 == pose.status && !feedback.is_added() {
            continue;
        }
        feedback.0 = pose.status;

        if let (Some(materials), Some(material)) = (materials.as_deref_mut(), material)
            && let Some(material) = materials.get_mut(&material.0)
        {
            material.base_color = status_color(pose.status);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_each_status_has_its_own_color() {
        assert_eq!(status_color(ShotStatus::Made), Color::srgb(0.0, 1.0, 0.0));
        assert_eq!(status_color(ShotStatus::Missed), Color::srgb(1.0, 0.0, 0.0));
        assert_ne!(status_color(ShotStatus::Unknown), status_color(ShotStatus::Made));
        assert_ne!(status_color(ShotStatus::Unknown), status_color(ShotStatus::Missed));
    }
}
