//! Pose ingestion: status resolution, target updates, shot edge detection

use bevy::prelude::*;

use super::mapper::TrackerMapping;
use crate::protocol::{PoseMessage, ShotStatus};

/// Latest tracker-derived state, updated once per inbound message
#[derive(Resource, Debug, Default)]
pub struct PoseIngest {
    /// Offset from the anchor derived from the last accepted ball position
    pub tracker_offset: Vec3,
    /// Status of the last message
    pub status: ShotStatus,
    /// Last action label reported by the tracker
    pub last_action: Option<String>,
    /// Collapsed shot flag of the previous message (unknown = false)
    last_shot: bool,
    pub messages_received: u64,
}

/// What a single message changed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestOutcome {
    pub status: ShotStatus,
    pub status_changed: bool,
    pub target_updated: bool,
    pub shot_triggered: bool,
}

impl PoseIngest {
    /// Apply one message. `animation_active` suppresses target updates and
    /// shot triggers; status is always applied.
    pub fn ingest(
        &mut self,
        message: &PoseMessage,
        mapping: &TrackerMapping,
        animation_active: bool,
    ) -> IngestOutcome {
        self.messages_received += 1;

        let status = message.status();
        let status_changed = status != self.status;
        self.status = status;

        if let Some(action) = &message.action {
            self.last_action = Some(action.clone());
        }

        if animation_active {
            // Suppressed: the edge detector keeps the value that started the animation
            return IngestOutcome {
                status,
                status_changed,
                target_updated: false,
                shot_triggered: false,
            };
        }

        let mut target_updated = false;
        if let Some(ball) = &message.ball {
            self.tracker_offset = mapping.offset_for(ball);
            target_updated = true;
        }

        let shot = status.is_made();
        let shot_triggered = shot && !self.last_shot;
        self.last_shot = shot;

        IngestOutcome {
            status,
            status_changed,
            target_updated,
            shot_triggered,
        }
    }

    /// Collapsed flag of the previous message
    pub fn last_shot(&self) -> bool {
        self.last_shot
    }
}
