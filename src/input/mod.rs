//! Input module - LocalInput resource and capture_input system
//!
//! Local directional input nudges the ball on the floor plane. The
//! accumulated offset is never reset; it keeps drifting the follow target
//! and the home position the shot animation returns to.

use bevy::prelude::*;

use crate::tuning::MotionTuning;

/// Directional input for this frame plus the running world-space offset
#[derive(Resource, Debug, Default, Clone, Copy, PartialEq)]
pub struct LocalInput {
    /// x = right, y = up on the stick / W key (unit length at most)
    pub direction: Vec2,
    /// Accumulated offset; x maps to scene X, y maps to scene Z
    pub offset: Vec2,
}

impl LocalInput {
    /// Integrate one frame of input
    pub fn accumulate(&mut self, direction: Vec2, speed: f32, dt: f32) {
        self.direction = direction;
        self.offset += direction * speed * dt;
    }
}

/// Fixed direction that replaces device input (headless runs and scenarios)
#[derive(Resource, Debug, Default, Clone, Copy)]
pub struct ScriptedDirection(pub Vec2);

/// Unit steps from digital keys; opposite keys cancel
pub fn digital_direction(left: bool, right: bool, down: bool, up: bool) -> Vec2 {
    let axis = |neg: bool, pos: bool| (pos as i8 - neg as i8) as f32;
    Vec2::new(axis(left, right), axis(down, up))
}

/// Analog stick wins when it is outside the deadzone
pub fn combine_directions(analog: Option<Vec2>, digital: Vec2) -> Vec2 {
    analog.unwrap_or(digital).clamp_length_max(1.0)
}

/// First left stick pushed past the deadzone
fn stick_direction(gamepads: &Query<&Gamepad>, deadzone: f32) -> Option<Vec2> {
    gamepads.iter().find_map(|gamepad| {
        let stick = Vec2::new(
            gamepad.get(GamepadAxis::LeftStickX).unwrap_or(0.0),
            gamepad.get(GamepadAxis::LeftStickY).unwrap_or(0.0),
        );
        (stick.length() > deadzone).then_some(stick)
    })
}

/// Runs first in Update; the offset integrates every frame regardless of
/// connection or animation state
pub fn capture_input(
    time: Res<Time>,
    tuning: Res<MotionTuning>,
    keyboard: Option<Res<ButtonInput<KeyCode>>>,
    gamepads: Query<&Gamepad>,
    scripted: Option<Res<ScriptedDirection>>,
    mut input: ResMut<LocalInput>,
) {
    let direction = match scripted {
        Some(scripted) => scripted.0.clamp_length_max(1.0),
        None => {
            let digital = keyboard
                .map(|keys| {
                    digital_direction(
                        keys.pressed(KeyCode::KeyA) || keys.pressed(KeyCode::ArrowLeft),
                        keys.pressed(KeyCode::KeyD) || keys.pressed(KeyCode::ArrowRight),
                        keys.pressed(KeyCode::KeyS) || keys.pressed(KeyCode::ArrowDown),
                        keys.pressed(KeyCode::KeyW) || keys.pressed(KeyCode::ArrowUp),
                    )
                })
                .unwrap_or(Vec2::ZERO);
            combine_directions(stick_direction(&gamepads, tuning.stick_deadzone), digital)
        }
    };

    input.accumulate(direction, tuning.input_speed, time.delta_secs());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digital_keys() {
        assert_eq!(digital_direction(false, true, false, false), Vec2::X);
        assert_eq!(digital_direction(true, true, false, true), Vec2::Y);
        assert_eq!(digital_direction(true, false, true, false), Vec2::new(-1.0, -1.0));
    }

    #[test]
    fn test_diagonal_is_normalized() {
        let dir = combine_directions(None, Vec2::new(1.0, 1.0));
        assert!((dir.length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_analog_wins_over_keys() {
        let dir = combine_directions(Some(Vec2::new(-0.5, 0.0)), Vec2::new(1.0, 0.0));
        assert_eq!(dir, Vec2::new(-0.5, 0.0));
    }

    #[test]
    fn test_offset_accumulates_and_never_resets() {
        let mut input = LocalInput::default();
        for _ in 0..60 {
            input.accumulate(Vec2::X, 2.0, 1.0 / 60.0);
        }
        assert!((input.offset.x - 2.0).abs() < 1e-4);
        // Releasing the stick keeps the offset
        input.accumulate(Vec2::ZERO, 2.0, 1.0 / 60.0);
        assert_eq!(input.direction, Vec2::ZERO);
        assert!((input.offset.x - 2.0).abs() < 1e-4);
    }
}
