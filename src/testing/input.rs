//! Scripted frame inputs for tests

use bevy::prelude::*;
use std::collections::HashMap;

use super::parser::FrameInput;

/// Frame-indexed script. Frames are 1-based: frame N is the Nth update.
#[derive(Debug, Default)]
pub struct ScriptedInputs {
    pub frames: HashMap<u64, Vec<FrameInput>>,
    /// Local direction (persists between frames)
    pub direction: Vec2,
    /// Last frame handed out
    pub current_frame: u64,
    /// Maximum frame to run
    pub max_frame: u64,
}

impl ScriptedInputs {
    /// Create from parsed frame inputs
    pub fn from_inputs(inputs: &[FrameInput]) -> Self {
        let mut frames: HashMap<u64, Vec<FrameInput>> = HashMap::new();
        let mut max_frame = 0u64;

        for fi in inputs {
            max_frame = max_frame.max(fi.frame);
            frames.entry(fi.frame).or_default().push(fi.clone());
        }

        Self {
            frames,
            max_frame,
            ..Default::default()
        }
    }

    /// Set max frame (for state assertions)
    pub fn set_max_frame(&mut self, frame: u64) {
        self.max_frame = self.max_frame.max(frame);
    }

    /// Move to the next frame and return what happens before it runs
    pub fn advance_frame(&mut self) -> Vec<FrameInput> {
        self.current_frame += 1;
        let inputs = self.frames.remove(&self.current_frame).unwrap_or_default();

        for input in &inputs {
            if let Some(x) = input.move_x {
                self.direction.x = x;
            }
            if let Some(y) = input.move_y {
                self.direction.y = y;
            }
        }

        inputs
    }

    /// Check if simulation should continue
    pub fn should_continue(&self) -> bool {
        self.current_frame < self.max_frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(frame: u64) -> FrameInput {
        FrameInput {
            frame,
            ..Default::default()
        }
    }

    #[test]
    fn test_direction_persists() {
        let mut scripted = ScriptedInputs::from_inputs(&[
            FrameInput {
                move_x: Some(1.0),
                ..at(2)
            },
            FrameInput {
                move_y: Some(-1.0),
                ..at(4)
            },
        ]);
        assert_eq!(scripted.max_frame, 4);

        scripted.advance_frame();
        assert_eq!(scripted.direction, Vec2::ZERO);
        scripted.advance_frame();
        assert_eq!(scripted.direction, Vec2::X);
        scripted.advance_frame();
        assert_eq!(scripted.direction, Vec2::X);
        let inputs = scripted.advance_frame();
        assert_eq!(inputs.len(), 1);
        assert_eq!(scripted.direction, Vec2::new(1.0, -1.0));
        assert!(!scripted.should_continue());
    }

    #[test]
    fn test_same_frame_entries_kept_in_order() {
        let mut scripted = ScriptedInputs::from_inputs(&[
            FrameInput {
                message: Some("a".into()),
                ..at(1)
            },
            FrameInput {
                message: Some("b".into()),
                ..at(1)
            },
        ]);
        let inputs = scripted.advance_frame();
        let texts: Vec<&str> = inputs.iter().flat_map(|i| i.texts()).collect();
        assert_eq!(texts, vec!["a", "b"]);
    }
}
