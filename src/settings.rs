//! Persistent loop settings
//!
//! Saves and loads loop tuning (cycle length, zone gating, echo cap, actor
//! speeds) to/from a loop_settings.json file in the config directory.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::constants::*;

/// Path to the settings file
pub const SETTINGS_FILE: &str = "config/loop_settings.json";

fn default_true() -> bool {
    true
}

/// Settings that survive between sessions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoopSettings {
    /// Seconds recorded per cycle (also the echo repetition length)
    pub cycle_duration: f32,
    /// Whether a cycle may only start inside an activation zone
    #[serde(default = "default_true")]
    pub require_activation_zone: bool,
    /// Maximum live echoes (None = unlimited)
    #[serde(default)]
    pub max_echoes: Option<usize>,
    pub walk_speed: f32,
    pub run_speed: f32,
    pub interact_range: f32,
    /// Write .evlog files under logs/
    #[serde(default = "default_true")]
    pub event_log: bool,
}

impl Default for LoopSettings {
    fn default() -> Self {
        Self {
            cycle_duration: DEFAULT_CYCLE_DURATION,
            require_activation_zone: true,
            max_echoes: None,
            walk_speed: WALK_SPEED,
            run_speed: RUN_SPEED,
            interact_range: INTERACT_RANGE,
            event_log: true,
        }
    }
}

impl LoopSettings {
    /// Load settings from file, or return defaults if file doesn't exist
    pub fn load() -> Self {
        Self::load_from(Path::new(SETTINGS_FILE))
    }

    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            info!("No {} found, using defaults", path.display());
            return Self::default();
        }

        match fs::read_to_string(path) {
            Ok(content) => match Self::parse(&content) {
                Ok(settings) => {
                    info!("Loaded settings from {}", path.display());
                    settings
                }
                Err(e) => {
                    warn!("Failed to parse {}: {}, using defaults", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                warn!("Failed to read {}: {}, using defaults", path.display(), e);
                Self::default()
            }
        }
    }

    /// Parse settings JSON. Rejects a non-positive cycle duration.
    pub fn parse(content: &str) -> Result<Self, String> {
        let settings: Self = serde_json::from_str(content).map_err(|e| e.to_string())?;
        if !(settings.cycle_duration > 0.0) {
            return Err(format!(
                "cycle_duration must be positive, got {}",
                settings.cycle_duration
            ));
        }
        Ok(settings)
    }

    /// Save settings to file
    pub fn save(&self) -> Result<(), std::io::Error> {
        self.save_to(Path::new(SETTINGS_FILE))
    }

    pub fn save_to(&self, path: &Path) -> Result<(), std::io::Error> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(path, json)?;
        info!("Saved settings to {}", path.display());
        Ok(())
    }
}

/// Resource holding the active settings
#[derive(Resource, Debug, Clone, Default)]
pub struct CurrentSettings {
    pub settings: LoopSettings,
}

impl CurrentSettings {
    pub fn new(settings: LoopSettings) -> Self {
        Self { settings }
    }
}
