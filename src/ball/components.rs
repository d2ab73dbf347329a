//! Ball-related components and the anchor

use bevy::prelude::*;

use crate::protocol::ShotStatus;

/// Marker for the tracked ball
#[derive(Component)]
#[require(BallOwner, FollowTarget, PreviousPosition, StatusFeedback)]
pub struct Ball;

/// Which system writes the ball's position this frame
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BallOwner {
    /// Smoothed follow of tracker + local input
    #[default]
    Blend,
    /// Scripted shot animation
    Animation,
}

impl BallOwner {
    pub fn name(&self) -> &'static str {
        match self {
            BallOwner::Blend => "blend",
            BallOwner::Animation => "animation",
        }
    }
}

/// Where the follow system is steering the ball (recomputed every frame)
#[derive(Component, Debug, Clone, Copy, Default, PartialEq)]
pub struct FollowTarget(pub Vec3);

/// Ball position on the previous frame (spin feedback)
#[derive(Component, Debug, Clone, Copy, Default, PartialEq)]
pub struct PreviousPosition(pub Vec3);

/// Shot status currently shown on the ball
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusFeedback(pub ShotStatus);

/// Marker for the rim the shot animation flies to
#[derive(Component)]
pub struct RimTarget;

/// Ball position at startup. Tracker and input offsets are relative to it.
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct Anchor(pub Vec3);

/// Record the anchor from the ball's initial placement
pub fn capture_anchor(
    mut commands: Commands,
    mut balls: Query<(&Transform, &mut PreviousPosition, &mut FollowTarget), With<Ball>>,
) {
    let Some((transform, mut previous, mut target)) = balls.iter_mut().next() else {
        warn!("No ball in scene, tracking disabled");
        return;
    };
    let anchor = transform.translation;
    previous.0 = anchor;
    target.0 = anchor;
    commands.insert_resource(Anchor(anchor));
    info!(
        "Anchor captured at ({:.2}, {:.2}, {:.2})",
        anchor.x, anchor.y, anchor.z
    );
}
