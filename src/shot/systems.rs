//! Shot animation systems: start on a shot event, step once per frame

use bevy::prelude::*;

use super::animation::ShotAnimation;
use super::phases::{ShotPhase, ShotProfile};
use crate::ball::{Anchor, Ball, BallOwner, RimTarget, compose_target};
use crate::events::{EventBus, ReceiverEvent};
use crate::floor::{FloorBounds, floor_height_of, resolve_floor_height};
use crate::input::LocalInput;
use crate::settings::ReceiverSettings;
use crate::tuning::MotionTuning;

/// A false -> true edge of the shot flag while no animation is running
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShotEvent;

/// The running animation, if any (at most one at a time)
#[derive(Resource, Debug, Default)]
pub struct ShotState {
    pub animation: Option<ShotAnimation>,
    pub started: u64,
    pub finished: u64,
}

impl ShotState {
    pub fn is_active(&self) -> bool {
        self.animation.is_some()
    }

    pub fn phase(&self) -> Option<ShotPhase> {
        self.animation.as_ref().map(|a| a.phase())
    }
}

/// Begin an animation from the ball's current position to the rim.
/// Ignored while another animation runs or when the rim is missing.
pub fn start_shot_animation(
    mut shots: MessageReader<ShotEvent>,
    mut state: ResMut<ShotState>,
    tuning: Res<MotionTuning>,
    mut balls: Query<(&Transform, &mut BallOwner), With<Ball>>,
    rims: Query<&GlobalTransform, With<RimTarget>>,
    mut bus: ResMut<EventBus>,
) {
    for _ in shots.read() {
        if state.is_active() {
            debug!("Shot already in progress, ignoring");
            continue;
        }
        let Some((transform, mut owner)) = balls.iter_mut().next() else {
            continue;
        };
        if *owner != BallOwner::Blend {
            continue;
        }
        let Some(rim) = rims.iter().next() else {
            warn!("Shot ignored: no rim target in scene");
            continue;
        };

        let start = transform.translation;
        let end = rim.translation();
        state.animation = Some(ShotAnimation::begin(
            start,
            end,
            ShotProfile::from_tuning(&tuning),
        ));
        state.started += 1;
        *owner = BallOwner::Animation;

        info!("Shot made, animating to rim");
        bus.emit(ReceiverEvent::ShotTriggered { from: start, to: end });
        bus.emit(ReceiverEvent::PhaseEntered {
            phase: ShotPhase::Flight.label(),
        });
    }
}

/// Step the running animation and hand the ball back when it finishes
#[allow(clippy::too_many_arguments)]
pub fn advance_shot_animation(
    time: Res<Time>,
    mut shot_state: ResMut<ShotState>,
    anchor: Option<Res<Anchor>>,
    input: Res<LocalInput>,
    settings: Res<ReceiverSettings>,
    floors: Query<(&Name, &GlobalTransform, Option<&FloorBounds>)>,
    mut balls: Query<(&mut Transform, &mut BallOwner), With<Ball>>,
    mut bus: ResMut<EventBus>,
) {
    let state = &mut *shot_state;
    let Some(animation) = state.animation.as_mut() else {
        return;
    };
    let Some((mut transform, mut owner)) = balls.iter_mut().next() else {
        warn!("Ball removed during shot animation");
        state.animation = None;
        return;
    };

    let home = anchor
        .map(|anchor| compose_target(anchor.0, Vec3::ZERO, input.offset))
        .unwrap_or_else(|| animation.start());

    let frame = animation.step(time.delta_secs(), home, || {
        let candidates = floors
            .iter()
            .map(|(name, transform, bounds)| (name.as_str(), floor_height_of(transform, bounds)));
        resolve_floor_height(candidates, &settings.floor_names, settings.floor_fallback)
    });

    transform.translation = frame.position;
    transform.rotate_local_x(frame.spin_degrees.to_radians());

    for phase in &frame.entered {
        if *phase == ShotPhase::Drop
            && let Some(floor) = animation.floor()
        {
            debug!("Floor resolved at {:.2}", floor);
        }
        bus.emit(ReceiverEvent::PhaseEntered {
            phase: phase.label(),
        });
    }

    if frame.finished {
        let duration = animation.elapsed();
        state.animation = None;
        state.finished += 1;
        *owner = BallOwner::Blend;
        info!("Shot animation finished after {:.2}s", duration);
        bus.emit(ReceiverEvent::ShotFinished { duration, home });
    }
}
