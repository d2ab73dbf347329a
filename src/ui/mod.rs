//! UI module - status HUD

mod hud;

pub use hud::*;
