//! Ball module - components, follow smoothing, and spin feedback

mod components;
mod follow;
mod spin;

pub use components::*;
pub use follow::*;
pub use spin::*;
