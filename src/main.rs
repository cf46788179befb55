//! Echo Loop - record a cycle, then watch your echo replay it
//!
//! Main entry point: app setup and system registration.

use bevy::prelude::*;
use echoloop::{
    ConfigWatcher, CurrentSettings, EchoLoopPlugin, EchoLoopSet, EventLogConfig,
    EventLogger, LoopSettings, SceneDef, capture_input, check_config_changes, constants::*,
    spawn_scene, ui,
};
use std::path::Path;

/// HUD line height above the scene
const HUD_Y: f32 = 300.0;

fn main() {
    let settings = LoopSettings::load();

    // Save settings on first run to ensure file exists
    if let Err(e) = settings.save() {
        warn!("Failed to save initial settings: {}", e);
    }

    let scene = SceneDef::load_or_default(Path::new(SCENE_FILE));
    let event_log = settings.event_log;

    let mut app = App::new();
    app.add_plugins(DefaultPlugins.set(WindowPlugin {
        primary_window: Some(Window {
            title: "Echo Loop".into(),
            ..default()
        }),
        ..default()
    }))
    .insert_resource(ClearColor(DEFAULT_BACKGROUND_COLOR))
    .insert_resource(CurrentSettings::new(settings))
    .insert_resource(scene)
    .init_resource::<ConfigWatcher>();

    if event_log {
        let mut logger = EventLogger::new(EventLogConfig::default());
        logger.start_session(&chrono::Local::now().to_rfc3339());
        app.insert_resource(logger);
    }

    app.add_plugins(EchoLoopPlugin)
        .add_systems(Startup, setup)
        .add_systems(
            Update,
            (
                capture_input.before(EchoLoopSet::Source),
                check_config_changes.before(EchoLoopSet::Source),
                (
                    ui::update_cycle_hud,
                    ui::dress_new_echoes,
                    ui::animate_echoes,
                )
                    .after(EchoLoopSet::Effects),
            ),
        )
        .run();
}

fn setup(mut commands: Commands, scene: Res<SceneDef>) {
    commands.spawn(Camera2d);
    spawn_scene(&mut commands, &scene, true);
    ui::spawn_cycle_hud(&mut commands, HUD_Y);
    info!(
        "Scene ready: {} plates, {} levers, {} gates",
        scene.plates.len(),
        scene.levers.len(),
        scene.gates.len()
    );
}
