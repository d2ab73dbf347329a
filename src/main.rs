//! Ballsync - drives a 3D ball from a live tracker stream
//!
//! Main entry point: settings, transport, scene setup and system registration.

use ballsync::ui::{self, HudSettings};
use ballsync::{
    Ball, ConfigWatcher, EventBus, EventLogConfig, EventLogger, FloorBounds, MotionTuning,
    ReceiverEvent, ReceiverPlugin, ReceiverSettings, RimTarget, TransportManager,
    WebSocketConnector, constants::*,
};
use bevy::{diagnostic::FrameTimeDiagnosticsPlugin, prelude::*};

fn main() {
    // Parse command-line arguments
    let args: Vec<String> = std::env::args().collect();

    // Load persistent settings (uses defaults if file doesn't exist)
    let mut settings = ReceiverSettings::load();

    // Save settings on first run to ensure file exists
    if let Err(e) = settings.save() {
        warn!("Failed to save initial settings: {}", e);
    }
    settings.apply_args(&args);

    let tuning = MotionTuning::load_or_default();
    let log_config = EventLogConfig::from_settings(&settings);

    let mut app = App::new();
    app.add_plugins((
        DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Ballsync".into(),
                ..default()
            }),
            ..default()
        }),
        FrameTimeDiagnosticsPlugin::default(),
    ))
    .insert_resource(ClearColor(BACKGROUND_COLOR))
    .insert_resource(EventBus::new())
    .insert_resource(EventLogger::new(log_config))
    .insert_resource(tuning)
    .init_resource::<ConfigWatcher>()
    .init_resource::<HudSettings>();

    // Without a runtime the receiver still runs, driven by local input only
    match WebSocketConnector::new() {
        Ok(connector) => {
            app.insert_resource(TransportManager::new(
                settings.endpoint.clone(),
                settings.reconnect_interval,
                connector,
            ));
        }
        Err(e) => error!("{}, running without a tracker connection", e),
    }

    app.insert_resource(settings)
        .add_plugins(ReceiverPlugin)
        .add_systems(Startup, (setup, ui::spawn_hud, start_event_log))
        .add_systems(Update, (ui::toggle_hud, ui::update_hud_text).chain())
        .run();
}

/// Spawn the ball, rim, floor, camera and light
fn setup(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    commands.spawn((
        Camera3d::default(),
        Transform::from_translation(CAMERA_POSITION).looking_at(RIM_POSITION.with_y(1.5), Vec3::Y),
    ));

    commands.spawn((
        DirectionalLight {
            illuminance: 8000.0,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_xyz(4.0, 8.0, 4.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    // Floor
    commands.spawn((
        Mesh3d(meshes.add(Cuboid::from_size(FLOOR_HALF_EXTENTS * 2.0))),
        MeshMaterial3d(materials.add(FLOOR_COLOR)),
        Transform::from_translation(FLOOR_POSITION),
        FloorBounds {
            half_extents: FLOOR_HALF_EXTENTS,
        },
        Name::new("floor"),
    ));

    // Rim (flat ring facing up)
    commands.spawn((
        Mesh3d(meshes.add(Torus::new(0.2, 0.25))),
        MeshMaterial3d(materials.add(RIM_COLOR)),
        Transform::from_translation(RIM_POSITION),
        RimTarget,
        Name::new("rim"),
    ));

    // Ball; its own material so status colouring doesn't leak to other meshes
    commands.spawn((
        Mesh3d(meshes.add(Sphere::new(BALL_RADIUS))),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: STATUS_NEUTRAL_COLOR,
            perceptual_roughness: 0.6,
            ..default()
        })),
        Transform::from_translation(BALL_SPAWN),
        Ball,
        Name::new("ball"),
    ));
}

/// Open the session log and record the tuning in effect
fn start_event_log(
    time: Res<Time>,
    mut logger: ResMut<EventLogger>,
    mut bus: ResMut<EventBus>,
    tuning: Res<MotionTuning>,
) {
    let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S").to_string();
    logger.start_session(&timestamp, (time.elapsed_secs() * 1000.0) as u32);
    bus.emit(ReceiverEvent::Config(tuning.clone()));
}
