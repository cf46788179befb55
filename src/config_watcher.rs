//! Settings file auto-reload system
//!
//! Polls the settings file every few seconds and reloads it when modified.
//! A new cycle duration is picked up by the orchestrator at the next cycle.

use bevy::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::settings::{CurrentSettings, LoopSettings, SETTINGS_FILE};

/// How often to check for config changes (seconds)
const CHECK_INTERVAL: f32 = 2.0;

/// Tracks the modification time of the settings file for hot-reload
#[derive(Resource)]
pub struct ConfigWatcher {
    /// Time since last check
    pub timer: f32,
    pub path: PathBuf,
    /// Last known modification time
    pub settings_mtime: Option<SystemTime>,
}

impl Default for ConfigWatcher {
    fn default() -> Self {
        Self::new(PathBuf::from(SETTINGS_FILE))
    }
}

impl ConfigWatcher {
    pub fn new(path: PathBuf) -> Self {
        let settings_mtime = get_mtime(&path);
        Self {
            timer: 0.0,
            path,
            settings_mtime,
        }
    }

    /// Re-read the file if its mtime moved. Returns the new settings when
    /// they parse and differ from `current`.
    pub fn poll(&mut self, current: &LoopSettings) -> Option<LoopSettings> {
        let mtime = get_mtime(&self.path);
        if mtime == self.settings_mtime {
            return None;
        }
        self.settings_mtime = mtime;

        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) => {
                warn!("Settings file {} unreadable: {}, keeping current", self.path.display(), e);
                return None;
            }
        };
        match LoopSettings::parse(&content) {
            Ok(settings) if settings != *current => Some(settings),
            Ok(_) => None,
            Err(e) => {
                warn!("Settings file {} invalid: {}, keeping current", self.path.display(), e);
                None
            }
        }
    }
}

/// Get file modification time, or None if file doesn't exist
fn get_mtime(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).ok().and_then(|m| m.modified().ok())
}

/// Check for settings changes every CHECK_INTERVAL seconds
pub fn check_config_changes(
    time: Res<Time>,
    mut watcher: ResMut<ConfigWatcher>,
    mut settings: ResMut<CurrentSettings>,
) {
    watcher.timer += time.delta_secs();
    if watcher.timer < CHECK_INTERVAL {
        return;
    }
    watcher.timer = 0.0;

    if let Some(new_settings) = watcher.poll(&settings.settings) {
        info!("Auto-reloaded settings from {}", watcher.path.display());
        settings.settings = new_settings;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_poll_picks_up_changes_and_skips_bad_files() {
        let dir = std::env::temp_dir().join(format!("echoloop_watch_{}", std::process::id()));
        let path = dir.join("loop_settings.json");
        let _ = fs::remove_dir_all(&dir);

        let mut watcher = ConfigWatcher::new(path.clone());
        let current = LoopSettings::default();
        assert!(watcher.poll(&current).is_none());

        let changed = LoopSettings {
            cycle_duration: 3.0,
            ..Default::default()
        };
        changed.save_to(&path).unwrap();
        assert_eq!(watcher.poll(&current), Some(changed.clone()));
        // Same mtime, nothing new
        assert!(watcher.poll(&current).is_none());

        fs::write(&path, "{ not json").unwrap();
        watcher.settings_mtime = None;
        assert!(watcher.poll(&changed).is_none());

        let _ = fs::remove_dir_all(dir);
    }
}
