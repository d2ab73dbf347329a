//! Shot animation state machine: Flight -> Drop -> Bounce(k) -> Return

use bevy::prelude::*;

use super::phases::{
    BouncePhase, DropPhase, FlightPhase, PhaseStep, ReturnPhase, ShotPhase, ShotProfile,
};

#[derive(Debug, Clone)]
enum PhaseState {
    Flight(FlightPhase),
    Drop(DropPhase),
    Bounce(usize, BouncePhase),
    Return(ReturnPhase),
}

impl PhaseState {
    fn id(&self) -> ShotPhase {
        match self {
            PhaseState::Flight(_) => ShotPhase::Flight,
            PhaseState::Drop(_) => ShotPhase::Drop,
            PhaseState::Bounce(index, _) => ShotPhase::Bounce(*index),
            PhaseState::Return(_) => ShotPhase::Return,
        }
    }
}

/// Result of one animation frame
#[derive(Debug, Clone, PartialEq)]
pub struct ShotFrame {
    pub position: Vec3,
    /// Rotation about the local X axis for this frame
    pub spin_degrees: f32,
    /// Phases entered at the end of this frame, in order
    pub entered: Vec<ShotPhase>,
    pub finished: bool,
}

/// One running animation. Owns the ball's position until it finishes.
#[derive(Debug, Clone)]
pub struct ShotAnimation {
    profile: ShotProfile,
    start: Vec3,
    direction: Vec3,
    floor: Option<f32>,
    phase: PhaseState,
    position: Vec3,
    elapsed: f32,
    finished: bool,
}

impl ShotAnimation {
    /// Start a shot from `start` toward the rim at `end`
    pub fn begin(start: Vec3, end: Vec3, profile: ShotProfile) -> Self {
        let flight = FlightPhase::new(start, end, &profile);
        Self {
            start,
            direction: (end - start).normalize_or_zero(),
            floor: None,
            phase: PhaseState::Flight(flight),
            position: start,
            elapsed: 0.0,
            finished: false,
            profile,
        }
    }

    pub fn phase(&self) -> ShotPhase {
        self.phase.id()
    }

    pub fn start(&self) -> Vec3 {
        self.start
    }

    /// Floor height resolved for this animation (after the flight)
    pub fn floor(&self) -> Option<f32> {
        self.floor
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Advance one frame. `home` is where the ball returns to; the floor is
    /// resolved lazily when the drop begins.
    pub fn step(&mut self, dt: f32, home: Vec3, resolve_floor: impl FnOnce() -> f32) -> ShotFrame {
        if self.finished {
            return ShotFrame {
                position: self.position,
                spin_degrees: 0.0,
                entered: Vec::new(),
                finished: true,
            };
        }

        self.elapsed += dt;
        let (position, step, spin) = match &mut self.phase {
            PhaseState::Flight(flight) => {
                let (position, step) = flight.step(dt);
                (position, step, self.profile.flight_spin)
            }
            PhaseState::Drop(drop) => {
                let (position, step) = drop.step(dt);
                (position, step, self.profile.drop_spin)
            }
            PhaseState::Bounce(_, bounce) => {
                let (position, step) = bounce.step(dt);
                (position, step, bounce.spin())
            }
            PhaseState::Return(ret) => {
                let (position, step) = ret.step(dt, home);
                (position, step, self.profile.return_spin)
            }
        };
        self.position = position;

        let mut entered = Vec::new();
        if step == PhaseStep::Advance {
            let mut resolve_floor = Some(resolve_floor);
            self.advance(&mut entered, &mut resolve_floor);
        }

        ShotFrame {
            position,
            spin_degrees: self.profile.spin_speed * spin * dt,
            entered,
            finished: self.finished,
        }
    }

    /// Move to the next phase, skipping any phase that would take no frames
    fn advance<F: FnOnce() -> f32>(
        &mut self,
        entered: &mut Vec<ShotPhase>,
        resolve_floor: &mut Option<F>,
    ) {
        let next_bounce = match self.phase.id() {
            ShotPhase::Flight => {
                let fallback = self.floor.unwrap_or(crate::constants::FLOOR_FALLBACK_HEIGHT);
                let floor = resolve_floor.take().map(|f| f()).unwrap_or(fallback);
                self.floor = Some(floor);
                let drop = DropPhase::new(self.position, self.direction, floor, &self.profile);
                let settled = drop.is_settled();
                self.phase = PhaseState::Drop(drop);
                entered.push(ShotPhase::Drop);
                if !settled {
                    return;
                }
                0
            }
            ShotPhase::Drop => 0,
            ShotPhase::Bounce(index) => index + 1,
            ShotPhase::Return => {
                self.finished = true;
                return;
            }
        };

        let floor = self.floor.unwrap_or(crate::constants::FLOOR_FALLBACK_HEIGHT);
        self.phase = match self.profile.bounces.get(next_bounce) {
            Some(bounce) => PhaseState::Bounce(
                next_bounce,
                BouncePhase::new(self.position, self.direction, floor, *bounce),
            ),
            None => PhaseState::Return(ReturnPhase::new(self.position, floor, &self.profile)),
        };
        entered.push(self.phase.id());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tuning::MotionTuning;

    const DT: f32 = 1.0 / 60.0;

    fn run(animation: &mut ShotAnimation, home: Vec3, floor: f32) -> (Vec<ShotPhase>, ShotFrame, u32) {
        let mut phases = vec![animation.phase()];
        let mut frames = 0;
        loop {
            frames += 1;
            let frame = animation.step(DT, home, || floor);
            assert!(frame.position.is_finite());
            phases.extend(frame.entered.iter().copied());
            if frame.finished {
                return (phases, frame, frames);
            }
            assert!(frames < 10_000, "animation did not terminate");
        }
    }

    #[test]
    fn test_full_sequence_returns_home() {
        let home = Vec3::new(0.0, 1.5, 0.0);
        let mut animation =
            ShotAnimation::begin(home, Vec3::new(0.0, 3.05, -6.0), ShotProfile::default());
        let (phases, frame, frames) = run(&mut animation, home, 0.01);
        assert_eq!(
            phases,
            vec![
                ShotPhase::Flight,
                ShotPhase::Drop,
                ShotPhase::Bounce(0),
                ShotPhase::Bounce(1),
                ShotPhase::Return
            ]
        );
        assert!((frame.position - home).length() < 1e-4);
        assert_eq!(animation.floor(), Some(0.01));
        // flight ~78 + drop ~28 + bounces 34 + 28 + return 60
        assert!((200..=260).contains(&frames), "frames {frames}");
    }

    #[test]
    fn test_floor_resolved_once_after_flight() {
        let mut animation = ShotAnimation::begin(
            Vec3::ZERO,
            Vec3::new(0.0, 3.0, -6.0),
            ShotProfile::default(),
        );
        let mut calls = 0;
        loop {
            let frame = animation.step(DT, Vec3::ZERO, || {
                calls += 1;
                0.0
            });
            if frame.entered.contains(&ShotPhase::Drop) {
                assert_eq!(animation.floor(), Some(0.0));
            }
            if frame.finished {
                break;
            }
        }
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_settled_drop_is_skipped_in_the_same_frame() {
        // Rim below the settle line: the drop takes no frames
        let mut animation = ShotAnimation::begin(
            Vec3::new(0.0, 0.2, 0.0),
            Vec3::new(0.0, 0.2, -2.0),
            ShotProfile::default(),
        );
        let mut skipped = false;
        loop {
            let frame = animation.step(DT, Vec3::ZERO, || 0.0);
            if frame.entered.contains(&ShotPhase::Drop) {
                assert_eq!(frame.entered, vec![ShotPhase::Drop, ShotPhase::Bounce(0)]);
                skipped = true;
            }
            if frame.finished {
                break;
            }
        }
        assert!(skipped);
    }

    #[test]
    fn test_no_bounces_goes_straight_to_return() {
        let mut tuning = MotionTuning::default();
        tuning.bounces.clear();
        let home = Vec3::new(1.0, 1.5, 0.0);
        let mut animation = ShotAnimation::begin(
            home,
            Vec3::new(0.0, 3.05, -6.0),
            ShotProfile::from_tuning(&tuning),
        );
        let (phases, frame, _) = run(&mut animation, home, 0.5);
        assert_eq!(
            phases,
            vec![ShotPhase::Flight, ShotPhase::Drop, ShotPhase::Return]
        );
        assert!((frame.position - home).length() < 1e-4);
    }

    #[test]
    fn test_return_clamps_to_floor() {
        // Home below the floor: the ball rests on the floor instead
        let home = Vec3::new(0.0, -3.0, 0.0);
        let mut animation =
            ShotAnimation::begin(Vec3::ZERO, Vec3::new(0.0, 3.0, -5.0), ShotProfile::default());
        let (_, frame, _) = run(&mut animation, home, 0.5);
        assert!((frame.position.y - 0.5).abs() < 1e-5);
    }

    #[test]
    fn test_spin_follows_phase() {
        let mut animation =
            ShotAnimation::begin(Vec3::ZERO, Vec3::new(0.0, 3.0, -6.0), ShotProfile::default());
        let frame = animation.step(DT, Vec3::ZERO, || 0.0);
        assert!((frame.spin_degrees - 480.0 * 1.5 * DT).abs() < 1e-4);
    }

    #[test]
    fn test_step_after_finish_is_inert() {
        let home = Vec3::ZERO;
        let mut animation =
            ShotAnimation::begin(home, Vec3::new(0.0, 1.0, -1.0), ShotProfile::default());
        run(&mut animation, home, 0.0);
        let frame = animation.step(DT, home, || 0.0);
        assert!(frame.finished);
        assert_eq!(frame.spin_degrees, 0.0);
    }

    #[test]
    fn test_zero_length_shot_terminates() {
        let home = Vec3::new(0.0, 3.0, 0.0);
        let mut animation = ShotAnimation::begin(home, home, ShotProfile::default());
        let (_, frame, _) = run(&mut animation, home, 0.0);
        assert!((frame.position - home).length() < 1e-4);
    }
}
