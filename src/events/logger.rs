//! Event logger
//!
//! Writes every bus event of a play session to `logs/<timestamp>_<id>.evlog`.

use bevy::prelude::*;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use uuid::Uuid;

use super::bus::EventBus;
use super::format::serialize_event;
use super::types::LoopEvent;

/// Configuration for event logging
#[derive(Resource, Clone)]
pub struct EventLogConfig {
    /// Directory for log files
    pub log_dir: PathBuf,
    /// Whether logging is enabled
    pub enabled: bool,
}

impl Default for EventLogConfig {
    fn default() -> Self {
        Self {
            log_dir: PathBuf::from("logs"),
            enabled: true,
        }
    }
}

/// Active event logger with file handle
#[derive(Resource)]
pub struct EventLogger {
    writer: Option<BufWriter<File>>,
    session_id: String,
    path: Option<PathBuf>,
    lines: u64,
    config: EventLogConfig,
}

impl EventLogger {
    /// Create a new event logger (but don't open file yet)
    pub fn new(config: EventLogConfig) -> Self {
        Self {
            writer: None,
            session_id: String::new(),
            path: None,
            lines: 0,
            config,
        }
    }

    /// Start a new log session. Generates a session UUID and logs SessionStart.
    pub fn start_session(&mut self, timestamp: &str) {
        if !self.config.enabled {
            return;
        }

        self.session_id = Uuid::new_v4().to_string();

        if let Err(e) = std::fs::create_dir_all(&self.config.log_dir) {
            warn!("Failed to create log directory: {}", e);
            return;
        }

        // Filesystem-safe timestamp, session prefix for uniqueness
        let file_stamp: String = timestamp
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
            .collect();
        let filename = format!("{}_{}.evlog", file_stamp, &self.session_id[..8]);
        let path = self.config.log_dir.join(filename);

        match OpenOptions::new().create(true).write(true).truncate(true).open(&path) {
            Ok(file) => {
                self.writer = Some(BufWriter::new(file));
                info!("Event logging started: {} (session: {})", path.display(), &self.session_id[..8]);
                self.path = Some(path);
                self.log(0, &LoopEvent::SessionStart {
                    session_id: self.session_id.clone(),
                    timestamp: timestamp.to_string(),
                });
            }
            Err(e) => {
                warn!("Failed to open event log: {}", e);
            }
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn path(&self) -> Option<&PathBuf> {
        self.path.as_ref()
    }

    pub fn lines_written(&self) -> u64 {
        self.lines
    }

    /// End the current log session
    pub fn end_session(&mut self) {
        if let Some(mut writer) = self.writer.take()
            && let Err(e) = writer.flush()
        {
            warn!("Failed to flush event log: {}", e);
        }
    }

    /// Log an event
    pub fn log(&mut self, time_ms: u32, event: &LoopEvent) {
        let Some(writer) = &mut self.writer else {
            return;
        };

        let line = serialize_event(time_ms, event);
        if let Err(e) = writeln!(writer, "{}", line) {
            warn!("Failed to write event: {}", e);
            return;
        }
        self.lines += 1;
    }

    pub fn flush(&mut self) {
        if let Some(writer) = &mut self.writer
            && let Err(e) = writer.flush()
        {
            warn!("Failed to flush event log: {}", e);
        }
    }

    pub fn is_active(&self) -> bool {
        self.writer.is_some()
    }
}

impl Default for EventLogger {
    fn default() -> Self {
        Self::new(EventLogConfig::default())
    }
}

impl Drop for EventLogger {
    fn drop(&mut self) {
        self.end_session();
    }
}

/// Drain the bus into the log file each frame
pub fn flush_event_log(mut bus: ResMut<EventBus>, mut logger: ResMut<EventLogger>) {
    let events = bus.drain();
    if events.is_empty() {
        return;
    }
    for event in &events {
        logger.log(event.time_ms, &event.event);
    }
    logger.flush();
}
