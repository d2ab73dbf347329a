//! Closed-form motion phases of the shot animation
//!
//! Each phase is stepped once per frame and reports whether it finished.
//! Progress values clamp to 1 on the finishing step so the last position is
//! exactly the phase target.

use bevy::prelude::*;

use crate::constants::{MIN_PHASE_DURATION, MIN_PHASE_RATE};
use crate::helpers::{clamp_lenient, half_sine, smoothstep};
use crate::tuning::{BounceTuning, MotionTuning};

/// Motion parameters for one animation, sanitized so every phase terminates
#[derive(Debug, Clone, PartialEq)]
pub struct ShotProfile {
    pub spin_speed: f32,
    pub flight_duration_per_unit: f32,
    pub flight_duration_min: f32,
    pub flight_duration_max: f32,
    pub arc_per_unit: f32,
    pub arc_min: f32,
    pub arc_height: f32,
    pub drop_forward_speed: f32,
    pub drop_speed: f32,
    pub drop_settle_margin: f32,
    pub bounces: Vec<BounceTuning>,
    pub return_rate: f32,
    pub flight_spin: f32,
    pub drop_spin: f32,
    pub return_spin: f32,
}

impl ShotProfile {
    pub fn from_tuning(tuning: &MotionTuning) -> Self {
        Self {
            spin_speed: tuning.spin_speed,
            flight_duration_per_unit: tuning.flight_duration_per_unit,
            flight_duration_min: tuning.flight_duration_min,
            flight_duration_max: tuning.flight_duration_max,
            arc_per_unit: tuning.arc_per_unit,
            arc_min: tuning.arc_min,
            arc_height: tuning.arc_height,
            drop_forward_speed: tuning.drop_forward_speed,
            drop_speed: tuning.drop_speed().max(MIN_PHASE_RATE),
            drop_settle_margin: tuning.drop_settle_margin.max(0.0),
            bounces: tuning
                .bounces
                .iter()
                .map(|b| BounceTuning {
                    rate: b.rate.max(MIN_PHASE_RATE),
                    ..*b
                })
                .collect(),
            return_rate: tuning.return_rate.max(MIN_PHASE_RATE),
            flight_spin: tuning.flight_spin,
            drop_spin: tuning.drop_spin,
            return_spin: tuning.return_spin,
        }
    }
}

impl Default for ShotProfile {
    fn default() -> Self {
        Self::from_tuning(&MotionTuning::default())
    }
}

/// Phase identifiers (Idle is the absence of an animation)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShotPhase {
    Flight,
    Drop,
    /// Index into the configured bounce list
    Bounce(usize),
    Return,
}

impl ShotPhase {
    pub fn label(&self) -> String {
        match self {
            ShotPhase::Flight => "flight".to_string(),
            ShotPhase::Drop => "drop".to_string(),
            ShotPhase::Bounce(index) => format!("bounce {}", index + 1),
            ShotPhase::Return => "return".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseStep {
    Continue,
    Advance,
}

impl PhaseStep {
    fn finished_when(done: bool) -> Self {
        if done {
            PhaseStep::Advance
        } else {
            PhaseStep::Continue
        }
    }
}

/// Arc from the release point to the rim
#[derive(Debug, Clone)]
pub struct FlightPhase {
    start: Vec3,
    end: Vec3,
    pub duration: f32,
    pub arc: f32,
    t: f32,
}

impl FlightPhase {
    pub fn new(start: Vec3, end: Vec3, profile: &ShotProfile) -> Self {
        let distance = start.distance(end);
        let duration = clamp_lenient(
            distance * profile.flight_duration_per_unit,
            profile.flight_duration_min,
            profile.flight_duration_max,
        )
        .max(MIN_PHASE_DURATION);
        let arc = clamp_lenient(
            distance * profile.arc_per_unit,
            profile.arc_min,
            profile.arc_height,
        );
        Self {
            start,
            end,
            duration,
            arc,
            t: 0.0,
        }
    }

    pub fn step(&mut self, dt: f32) -> (Vec3, PhaseStep) {
        self.t = (self.t + dt / self.duration).min(1.0);
        let s = smoothstep(self.t);
        let position = self.start.lerp(self.end, s) + Vec3::Y * half_sine(s) * self.arc;
        (position, PhaseStep::finished_when(self.t >= 1.0))
    }
}

/// Fall through the net while drifting along the shot direction
#[derive(Debug, Clone)]
pub struct DropPhase {
    position: Vec3,
    direction: Vec3,
    forward_speed: f32,
    fall_speed: f32,
    floor: f32,
    margin: f32,
}

impl DropPhase {
    pub fn new(position: Vec3, direction: Vec3, floor: f32, profile: &ShotProfile) -> Self {
        // Net descent stays positive even when the shot direction points up
        let climb = direction.y.max(0.0) * profile.drop_forward_speed.max(0.0);
        Self {
            position,
            direction,
            forward_speed: profile.drop_forward_speed,
            fall_speed: profile.drop_speed.max(climb + MIN_PHASE_RATE),
            floor,
            margin: profile.drop_settle_margin,
        }
    }

    /// Already within the settle margin; the phase takes no frames
    pub fn is_settled(&self) -> bool {
        self.position.y <= self.floor + self.margin
    }

    pub fn step(&mut self, dt: f32) -> (Vec3, PhaseStep) {
        self.position += self.direction * self.forward_speed * dt;
        self.position.y -= self.fall_speed * dt;
        self.position.y = self.position.y.max(self.floor);
        (self.position, PhaseStep::finished_when(self.is_settled()))
    }
}

/// One hop along the shot direction
#[derive(Debug, Clone)]
pub struct BouncePhase {
    start: Vec3,
    direction: Vec3,
    bounce: BounceTuning,
    floor: f32,
    u: f32,
}

impl BouncePhase {
    pub fn new(start: Vec3, direction: Vec3, floor: f32, bounce: BounceTuning) -> Self {
        Self {
            start,
            direction,
            bounce,
            floor,
            u: 0.0,
        }
    }

    pub fn spin(&self) -> f32 {
        self.bounce.spin
    }

    pub fn step(&mut self, dt: f32) -> (Vec3, PhaseStep) {
        self.u = (self.u + dt * self.bounce.rate).min(1.0);
        let mut position = self.start + self.direction * (self.bounce.forward * self.u);
        position.y = (self.floor + half_sine(self.u) * self.bounce.height).max(self.floor);
        (position, PhaseStep::finished_when(self.u >= 1.0))
    }
}

/// Eased glide back to the home position
#[derive(Debug, Clone)]
pub struct ReturnPhase {
    start: Vec3,
    rate: f32,
    floor: f32,
    r: f32,
}

impl ReturnPhase {
    pub fn new(start: Vec3, floor: f32, profile: &ShotProfile) -> Self {
        Self {
            start,
            rate: profile.return_rate,
            floor,
            r: 0.0,
        }
    }

    /// `home` may move while returning (local input keeps accumulating)
    pub fn step(&mut self, dt: f32, home: Vec3) -> (Vec3, PhaseStep) {
        self.r = (self.r + dt * self.rate).min(1.0);
        let mut position = self.start.lerp(home, smoothstep(self.r));
        position.y = position.y.max(self.floor);
        (position, PhaseStep::finished_when(self.r >= 1.0))
    }
}
