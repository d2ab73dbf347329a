//! Status HUD: connection, tracker action, shot status and animation phase

use bevy::prelude::*;

use crate::ball::{Ball, BallOwner};
use crate::constants::TEXT_PRIMARY;
use crate::input::LocalInput;
use crate::pose::PoseIngest;
use crate::shot::ShotState;
use crate::transport::{ConnectionState, TransportManager};

/// HUD visibility
#[derive(Resource)]
pub struct HudSettings {
    pub visible: bool,
}

impl Default for HudSettings {
    fn default() -> Self {
        Self { visible: true }
    }
}

/// Status text component
#[derive(Component)]
pub struct StatusText;

pub fn spawn_hud(mut commands: Commands) {
    commands.spawn((
        Text::new(""),
        TextFont {
            font_size: 14.0,
            ..default()
        },
        TextColor(TEXT_PRIMARY),
        Node {
            position_type: PositionType::Absolute,
            left: Val::Px(10.0),
            top: Val::Px(10.0),
            ..default()
        },
        StatusText,
    ));
}

/// Toggle HUD visibility (F3 / D-pad Up)
pub fn toggle_hud(
    keyboard: Res<ButtonInput<KeyCode>>,
    gamepads: Query<&Gamepad>,
    mut settings: ResMut<HudSettings>,
    mut text_query: Query<&mut Visibility, With<StatusText>>,
) {
    let pressed = keyboard.just_pressed(KeyCode::F3)
        || gamepads
            .iter()
            .any(|gp| gp.just_pressed(GamepadButton::DPadUp));

    if pressed {
        settings.visible = !settings.visible;
        if let Ok(mut visibility) = text_query.single_mut() {
            *visibility = if settings.visible {
                Visibility::Inherited
            } else {
                Visibility::Hidden
            };
        }
    }
}

/// One-line summary shown in the HUD
pub fn status_line(
    connection: ConnectionState,
    endpoint: &str,
    ingest: &PoseIngest,
    owner: BallOwner,
    shot: &ShotState,
    input: &LocalInput,
) -> String {
    let phase = shot
        .phase()
        .map(|p| p.label())
        .unwrap_or_else(|| "-".to_string());
    format!(
        "{} {} | msgs {} | action: {} | shot: {} | ball: {} ({}) | offset {:+.2},{:+.2}",
        connection.name(),
        endpoint,
        ingest.messages_received,
        ingest.last_action.as_deref().unwrap_or("-"),
        ingest.status.name(),
        owner.name(),
        phase,
        input.offset.x,
        input.offset.y,
    )
}

/// Update the status text
pub fn update_hud_text(
    settings: Res<HudSettings>,
    transport: Option<Res<TransportManager>>,
    ingest: Res<PoseIngest>,
    shot: Res<ShotState>,
    input: Res<LocalInput>,
    balls: Query<&BallOwner, With<Ball>>,
    mut text_query: Query<&mut Text, With<StatusText>>,
) {
    if !settings.visible {
        return;
    }

    let Ok(mut text) = text_query.single_mut() else {
        return;
    };

    let (connection, endpoint) = transport
        .as_deref()
        .map(|t| (t.state(), t.endpoint()))
        .unwrap_or((ConnectionState::Disconnected, "offline"));
    let owner = balls.iter().next().copied().unwrap_or_default();

    text.0 = status_line(connection, endpoint, &ingest, owner, &shot, &input);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_line_idle() {
        let line = status_line(
            ConnectionState::Connecting,
            "ws://localhost:8765",
            &PoseIngest::default(),
            BallOwner::Blend,
            &ShotState::default(),
            &LocalInput::default(),
        );
        assert!(line.starts_with("connecting ws://localhost:8765"));
        assert!(line.contains("shot: neutral"));
        assert!(line.contains("action: -"));
    }
}
