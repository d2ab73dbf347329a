//! Apply inbound pose messages on the frame loop

use bevy::prelude::*;

use super::ingest::PoseIngest;
use super::mapper::TrackerMapping;
use crate::ball::{Ball, RimTarget};
use crate::events::{EventBus, ReceiverEvent};
use crate::shot::{ShotEvent, ShotState};
use crate::transport::InboundPose;
use crate::tuning::MotionTuning;

/// Ingest every pose message received this frame, in arrival order.
/// Messages are dropped while no ball exists.
pub fn ingest_poses(
    mut inbound: MessageReader<InboundPose>,
    mut ingest: ResMut<PoseIngest>,
    tuning: Res<MotionTuning>,
    shot: Res<ShotState>,
    balls: Query<(), With<Ball>>,
    rims: Query<(), With<RimTarget>>,
    mut shots: MessageWriter<ShotEvent>,
    mut bus: ResMut<EventBus>,
) {
    if balls.is_empty() {
        inbound.clear();
        return;
    }

    let mapping = TrackerMapping::from_tuning(&tuning);
    let mut animation_active = shot.is_active();

    for InboundPose(message) in inbound.read() {
        let previous_action = ingest.last_action.clone();
        let outcome = ingest.ingest(message, &mapping, animation_active);

        if outcome.status_changed {
            bus.emit(ReceiverEvent::StatusChange {
                status: outcome.status,
            });
        }
        if ingest.last_action != previous_action
            && let Some(label) = ingest.last_action.clone()
        {
            bus.emit(ReceiverEvent::Action { label });
        }
        if outcome.shot_triggered {
            shots.write(ShotEvent);
            // The animation only starts when there is a rim to aim at
            if !rims.is_empty() {
                animation_active = true;
            }
        }
    }
}
