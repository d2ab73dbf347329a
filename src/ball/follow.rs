//! Smoothed follow of tracker position plus local input

use bevy::prelude::*;

use super::components::{Anchor, Ball, BallOwner, FollowTarget};
use crate::input::LocalInput;
use crate::pose::PoseIngest;
use crate::tuning::MotionTuning;

/// anchor + tracker offset + local input offset (input y maps to scene Z)
pub fn compose_target(anchor: Vec3, tracker_offset: Vec3, input_offset: Vec2) -> Vec3 {
    anchor + tracker_offset + Vec3::new(input_offset.x, 0.0, input_offset.y)
}

/// Frame-rate scaled exponential approach. Never overshoots.
pub fn approach(current: Vec3, target: Vec3, dt: f32, smooth: f32) -> Vec3 {
    current.lerp(target, (dt * smooth).clamp(0.0, 1.0))
}

pub fn update_follow_target(
    anchor: Option<Res<Anchor>>,
    pose: Res<PoseIngest>,
    input: Res<LocalInput>,
    mut targets: Query<&mut FollowTarget, With<Ball>>,
) {
    let Some(anchor) = anchor else {
        return;
    };
    let target = compose_target(anchor.0, pose.tracker_offset, input.offset);
    for mut follow in &mut targets {
        follow.0 = target;
    }
}

/// Move the ball toward its target while nothing else owns it
pub fn follow_target(
    time: Res<Time>,
    tuning: Res<MotionTuning>,
    mut balls: Query<(&mut Transform, &FollowTarget, &BallOwner), With<Ball>>,
) {
    let dt = time.delta_secs();
    for (mut transform, target, owner) in &mut balls {
        if *owner != BallOwner::Blend {
            continue;
        }
        transform.translation = approach(transform.translation, target.0, dt, tuning.move_smooth);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compose_target() {
        let target = compose_target(
            Vec3::new(0.0, 1.5, 0.0),
            Vec3::new(1.0, 0.5, 0.0),
            Vec2::new(0.25, -2.0),
        );
        assert_eq!(target, Vec3::new(1.25, 2.0, -2.0));
    }

    #[test]
    fn test_approach_is_exponential() {
        let target = Vec3::new(10.0, 0.0, 0.0);
        let step = approach(Vec3::ZERO, target, 1.0 / 60.0, 8.0);
        assert!((step.x - 10.0 * 8.0 / 60.0).abs() < 1e-4);

        // Converges without ever passing the target
        let mut pos = Vec3::ZERO;
        for _ in 0..600 {
            pos = approach(pos, target, 1.0 / 60.0, 8.0);
            assert!(pos.x <= 10.0);
        }
        assert!((pos - target).length() < 1e-3);
    }

    #[test]
    fn test_large_dt_snaps_instead_of_overshooting() {
        let target = Vec3::new(1.0, 2.0, 3.0);
        assert_eq!(approach(Vec3::ZERO, target, 1.0, 8.0), target);
        assert_eq!(approach(Vec3::ZERO, target, 0.0, 8.0), Vec3::ZERO);
    }
}
