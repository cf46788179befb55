//! Headless App Builder
//!
//! Provides a reusable builder for creating headless Bevy apps that run the
//! echo loop without rendering. Time is stepped by hand, so runs are
//! deterministic. Used by tests and the `simulate` binary.

use bevy::prelude::*;
use std::time::Duration;

use crate::events::EventBus;
use crate::playback::{EchoSpawnService, EchoSpawner};
use crate::plugin::EchoLoopPlugin;
use crate::scene::{SceneDef, spawn_scene};
use crate::settings::{CurrentSettings, LoopSettings};

/// Builder for creating headless Bevy apps
pub struct HeadlessAppBuilder {
    settings: LoopSettings,
    scene: Option<SceneDef>,
    spawner: Option<EchoSpawnService>,
    spawn_service: bool,
    capture_events: bool,
}

impl Default for HeadlessAppBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessAppBuilder {
    /// Create a new builder with default settings and the built-in scene
    pub fn new() -> Self {
        Self {
            settings: LoopSettings::default(),
            scene: Some(SceneDef::default()),
            spawner: None,
            spawn_service: true,
            capture_events: true,
        }
    }

    pub fn with_settings(mut self, settings: LoopSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Scene spawned at startup
    pub fn with_scene(mut self, scene: SceneDef) -> Self {
        self.scene = Some(scene);
        self
    }

    /// Start with an empty world
    pub fn without_scene(mut self) -> Self {
        self.scene = None;
        self
    }

    /// Replace the default echo spawner
    pub fn with_spawner(mut self, spawner: impl EchoSpawner) -> Self {
        self.spawner = Some(EchoSpawnService::new(spawner));
        self
    }

    /// Leave the spawn service out (cycles will refuse to start)
    pub fn without_spawn_service(mut self) -> Self {
        self.spawn_service = false;
        self
    }

    /// Use the plugin's default bus instead of one that keeps every event
    pub fn without_event_capture(mut self) -> Self {
        self.capture_events = false;
        self
    }

    /// Build the app
    ///
    /// The returned app has:
    /// - a manually stepped `Time` (see [`step`])
    /// - EchoLoopPlugin with the given settings
    /// - the scene spawned by a Startup system (no sprites)
    ///
    /// No event logger is installed. Unless `without_event_capture` was
    /// used, bus events stay in `EventBus` for callers to drain.
    pub fn build(self) -> App {
        let mut app = App::new();
        app.init_resource::<Time>();
        app.insert_resource(CurrentSettings::new(self.settings));
        if let Some(spawner) = self.spawner {
            app.insert_resource(spawner);
        }
        if self.capture_events {
            app.insert_resource(EventBus::new());
        }

        app.add_plugins(EchoLoopPlugin);

        if !self.spawn_service {
            app.world_mut().remove_resource::<EchoSpawnService>();
        }

        if let Some(scene) = self.scene {
            app.add_systems(Startup, move |mut commands: Commands| {
                spawn_scene(&mut commands, &scene, false);
            });
        }

        app
    }
}

/// Advance the clock by `secs` and run one frame
pub fn step(app: &mut App, secs: f32) {
    app.world_mut()
        .resource_mut::<Time>()
        .advance_by(Duration::from_secs_f32(secs));
    app.update();
}

/// Run frames of `dt` until `secs` have passed. Returns the frame count.
pub fn run_for(app: &mut App, secs: f32, dt: f32) -> u32 {
    let frames = (secs / dt).round().max(0.0) as u32;
    for _ in 0..frames {
        step(app, dt);
    }
    frames
}
