//! Tunable constants for ballsync
//!
//! Defaults for every runtime value; `MotionTuning` and `ReceiverSettings`
//! start from these and may be overridden from the config directory.

use bevy::prelude::*;

// =============================================================================
// TRACKER FRAME (640x480 reference image)
// =============================================================================

pub const TRACKER_CENTER_X: f32 = 320.0; // Default x when the tracker omits it
pub const TRACKER_CENTER_Y: f32 = 240.0; // Default y when the tracker omits it
pub const TRACKER_UNITS_PER_SCENE_UNIT: f32 = 100.0; // Pixels per scene unit
pub const TARGET_BAND_CENTER: f32 = 2.5; // Scene height that maps to tracker center
pub const TARGET_BAND_MIN: f32 = 0.5; // Lowest mapped height
pub const TARGET_BAND_MAX: f32 = 5.0; // Highest mapped height

// =============================================================================
// TRANSPORT
// =============================================================================

pub const DEFAULT_ENDPOINT: &str = "ws://localhost:8765";
pub const RECONNECT_INTERVAL: f32 = 2.0; // Seconds between reconnect checks
pub const SHUTDOWN_GRACE_MS: u64 = 200; // Time for socket tasks to send their close frame on exit

// =============================================================================
// FOLLOW / SPIN
// =============================================================================

pub const MOVE_SMOOTH: f32 = 8.0; // Exponential approach rate toward the target
pub const SPIN_SPEED: f32 = 480.0; // Base spin rate (degrees/sec)
pub const SPIN_MOTION_EPSILON: f32 = 0.000001; // Squared displacement below this = at rest
pub const SPIN_MOTION_GAIN: f32 = 1000.0; // Squared displacement scale before clamping to [0,1]
pub const SPIN_BAND_LOW: f32 = 0.5; // Spin multiplier at rest threshold
pub const SPIN_BAND_HIGH: f32 = 1.5; // Spin multiplier at full speed

// =============================================================================
// LOCAL INPUT
// =============================================================================

pub const INPUT_SPEED: f32 = 2.0; // Offset units per second at full deflection
pub const STICK_DEADZONE: f32 = 0.25; // Analog stick deadzone before it takes precedence

// =============================================================================
// SHOT ANIMATION
// =============================================================================

pub const SHOT_SPEED: f32 = 10.0;
pub const DROP_AFTER_SHOT: f32 = 1.2;
pub const ARC_HEIGHT: f32 = 5.0; // Upper bound of the flight arc
pub const ARC_PER_UNIT: f32 = 0.8; // Arc height per unit of shot distance
pub const ARC_MIN: f32 = 2.0;
pub const FLIGHT_DURATION_PER_UNIT: f32 = 0.22; // Seconds of flight per unit of distance
pub const FLIGHT_DURATION_MIN: f32 = 0.8;
pub const FLIGHT_DURATION_MAX: f32 = 1.3;
pub const DROP_FORWARD_SPEED: f32 = 2.2; // Forward drift while dropping through the net
pub const DROP_SETTLE_MARGIN: f32 = 0.3; // Drop ends this far above the floor
pub const RETURN_RATE: f32 = 1.0; // Return progress per second

/// Bounces after the drop: (height, forward distance, progress rate, spin multiplier)
pub const BOUNCES: [(f32, f32, f32, f32); 2] = [(3.0, 2.0, 1.8, -1.0), (0.7, 0.5, 2.2, -0.6)];

pub const FLIGHT_SPIN: f32 = 1.5;
pub const DROP_SPIN: f32 = -0.8;
pub const RETURN_SPIN: f32 = 0.4;

/// Lower bounds that keep every phase finite even with hostile tuning
pub const MIN_PHASE_DURATION: f32 = 0.01;
pub const MIN_PHASE_RATE: f32 = 0.01;

// =============================================================================
// FLOOR
// =============================================================================

pub const FLOOR_NAMES: [&str; 2] = ["floor", "Ground"]; // Probed in order
pub const FLOOR_FALLBACK_HEIGHT: f32 = 0.5; // Used when no floor object exists
pub const FLOOR_BOUNDS_SKIN: f32 = 0.01; // Added on top of floor bounds
pub const FLOOR_UNBOUNDED_OFFSET: f32 = 2.0; // Floor sits this far below an unbounded floor object

// =============================================================================
// STATUS COLORS
// =============================================================================

pub const STATUS_MADE_COLOR: Color = Color::srgb(0.0, 1.0, 0.0);
pub const STATUS_MISSED_COLOR: Color = Color::srgb(1.0, 0.0, 0.0);
pub const STATUS_NEUTRAL_COLOR: Color = Color::srgb(1.0, 0.92, 0.016);

// =============================================================================
// SCENE LAYOUT (used by the binary and the headless harness)
// =============================================================================

pub const BALL_RADIUS: f32 = 0.25;
pub const BALL_SPAWN: Vec3 = Vec3::new(0.0, 1.5, 0.0);
pub const RIM_POSITION: Vec3 = Vec3::new(0.0, 3.05, -6.0);
pub const FLOOR_POSITION: Vec3 = Vec3::ZERO;
pub const FLOOR_HALF_EXTENTS: Vec3 = Vec3::new(10.0, 0.05, 10.0);
pub const CAMERA_POSITION: Vec3 = Vec3::new(0.0, 3.0, 8.0);
pub const BACKGROUND_COLOR: Color = Color::srgb(0.35, 0.32, 0.28);
pub const FLOOR_COLOR: Color = Color::srgb(0.15, 0.13, 0.12);
pub const RIM_COLOR: Color = Color::srgb(0.9, 0.35, 0.1);

// =============================================================================
// TEXT/UI COLORS
// =============================================================================

pub const TEXT_PRIMARY: Color = Color::srgb(0.95, 0.9, 0.8);
