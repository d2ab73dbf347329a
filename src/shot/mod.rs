//! Shot animation: Flight -> Drop -> Bounce(k) -> Return, triggered by a made shot

mod animation;
mod phases;
mod systems;

pub use animation::{ShotAnimation, ShotFrame};
pub use phases::{
    BouncePhase, DropPhase, FlightPhase, PhaseStep, ReturnPhase, ShotPhase, ShotProfile,
};
pub use systems::{ShotEvent, ShotState, advance_shot_animation, start_shot_animation};
