//! Receiver plugin: resources, messages and the per-frame system order
//!
//! Frame order:
//! - PreUpdate: bus clock, reconnect cadence, transport drain
//! - Update: local input, pose ingest, shot start/step, follow, spin, colour, telemetry
//! - Last: socket shutdown and event log on exit

use bevy::prelude::*;

use crate::ball::{capture_anchor, follow_target, spin_feedback, update_follow_target};
use crate::config_watcher::{ConfigWatcher, check_config_changes};
use crate::events::{EventBus, close_event_log, update_event_bus_time, write_event_log};
use crate::feedback::apply_status_feedback;
use crate::input::{LocalInput, capture_input};
use crate::pose::{PoseIngest, ingest_poses};
use crate::settings::ReceiverSettings;
use crate::shot::{ShotEvent, ShotState, advance_shot_animation, start_shot_animation};
use crate::telemetry::send_input_telemetry;
use crate::transport::{
    InboundPose, TransportManager, close_transport_on_exit, pump_transport, reconnect_tick,
};
use crate::tuning::MotionTuning;

/// Everything needed to drive a ball from the tracker. Resources already
/// inserted by the app (tuning, settings, transport, bus) are kept.
pub struct ReceiverPlugin;

impl Plugin for ReceiverPlugin {
    fn build(&self, app: &mut App) {
        app.add_message::<InboundPose>()
            .add_message::<ShotEvent>()
            .init_resource::<MotionTuning>()
            .init_resource::<ReceiverSettings>()
            .init_resource::<PoseIngest>()
            .init_resource::<LocalInput>()
            .init_resource::<ShotState>();

        if !app.world().contains_resource::<EventBus>() {
            app.insert_resource(EventBus::new());
        }

        app.add_systems(PostStartup, capture_anchor)
            .add_systems(
                PreUpdate,
                (
                    update_event_bus_time,
                    (reconnect_tick, pump_transport)
                        .chain()
                        .run_if(resource_exists::<TransportManager>),
                )
                    .chain(),
            )
            .add_systems(
                Update,
                (
                    check_config_changes.run_if(resource_exists::<ConfigWatcher>),
                    capture_input,
                    ingest_poses,
                    start_shot_animation,
                    advance_shot_animation,
                    update_follow_target,
                    follow_target,
                    spin_feedback,
                    apply_status_feedback,
                    send_input_telemetry.run_if(resource_exists::<TransportManager>),
                )
                    .chain(),
            )
            .add_systems(
                Last,
                (
                    close_transport_on_exit.run_if(resource_exists::<TransportManager>),
                    write_event_log,
                    close_event_log,
                )
                    .chain(),
            );
    }
}
