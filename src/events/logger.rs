//! Session event log file

use bevy::prelude::*;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use uuid::Uuid;

use super::bus::{BusEvent, EventBus};
use super::format::serialize_event;
use super::types::ReceiverEvent;
use crate::settings::ReceiverSettings;

#[derive(Resource, Clone)]
pub struct EventLogConfig {
    pub log_dir: PathBuf,
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

impl EventLogConfig {
    pub fn from_settings(settings: &ReceiverSettings) -> Self {
        Self {
            log_dir: PathBuf::from(&settings.log_dir),
            enabled: settings.event_log_enabled,
        }
    }
}

/// Active event logger with file handle
#[derive(Resource)]
pub struct EventLogger {
    writer: Option<BufWriter<File>>,
    session_id: String,
    start_ms: u32,
    path: Option<PathBuf>,
    config: EventLogConfig,
}

impl EventLogger {
    /// Create a new event logger (but don't open file yet)
    pub fn new(config: EventLogConfig) -> Self {
        Self {
            writer: None,
            session_id: String::new(),
            start_ms: 0,
            path: None,
            config,
        }
    }

    /// Open a new log file and write the SessionStart event
    pub fn start_session(&mut self, timestamp: &str, start_ms: u32) {
        if !self.config.enabled {
            return;
        }

        self.session_id = Uuid::new_v4().to_string();

        if let Err(e) = std::fs::create_dir_all(&self.config.log_dir) {
            warn!("Failed to create log directory: {}", e);
            return;
        }

        let filename = format!("{}_{}.evlog", timestamp, &self.session_id[..8]);
        let path = self.config.log_dir.join(filename);

        match OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&path)
        {
            Ok(file) => {
                self.writer = Some(BufWriter::new(file));
                self.start_ms = start_ms;
                info!(
                    "Event logging started: {} (session: {})",
                    path.display(),
                    &self.session_id[..8]
                );
                self.path = Some(path);
                self.log(
                    start_ms,
                    &ReceiverEvent::SessionStart {
                        session_id: self.session_id.clone(),
                        timestamp: timestamp.to_string(),
                    },
                );
            }
            Err(e) => {
                warn!("Failed to open event log: {}", e);
            }
        }
    }

    pub fn path(&self) -> Option<&PathBuf> {
        self.path.as_ref()
    }

    /// Flush and close the current log file
    pub fn end_session(&mut self) {
        if let Some(mut writer) = self.writer.take()
            && let Err(e) = writer.flush()
        {
            warn!("Failed to flush event log: {}", e);
        }
    }

    /// Write one event; `time_ms` is app time, stored relative to session start
    pub fn log(&mut self, time_ms: u32, event: &ReceiverEvent) {
        let Some(writer) = &mut self.writer else {
            return;
        };

        let line = serialize_event(time_ms.saturating_sub(self.start_ms), event);
        if let Err(e) = writeln!(writer, "{}", line) {
            warn!("Failed to write event: {}", e);
        }
    }

    pub fn log_all(&mut self, events: &[BusEvent]) {
        for bus_event in events {
            self.log(bus_event.time_ms, &bus_event.event);
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

/// Drain the bus every frame; write to the log file if one is open
pub fn write_event_log(mut bus: ResMut<EventBus>, logger: Option<ResMut<EventLogger>>) {
    let events = bus.drain();
    if let Some(mut logger) = logger {
        logger.log_all(&events);
    }
}

/// Flush the log when the app exits
pub fn close_event_log(mut exit: MessageReader<AppExit>, logger: Option<ResMut<EventLogger>>) {
    if exit.read().next().is_none() {
        return;
    }
    if let Some(mut logger) = logger {
        logger.end_session();
        info!("Event log closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::format::parse_event;

    fn temp_dir(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("ballsync_{}_{}", name, Uuid::new_v4()))
    }

    #[test]
    fn test_session_file_contains_events() {
        let dir = temp_dir("evlog");
        let mut logger = EventLogger::new(EventLogConfig {
            log_dir: dir.clone(),
            enabled: true,
        });
        logger.start_session("20261019_120000", 1000);
        assert!(logger.is_active());
        logger.log(
            1250,
            &ReceiverEvent::PhaseEntered {
                phase: "drop".to_string(),
            },
        );
        logger.end_session();

        let path = logger.path().unwrap().clone();
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("20261019_120000_"));
        assert!(name.ends_with(".evlog"));

        let content = std::fs::read_to_string(&path).unwrap();
        let events: Vec<_> = content.lines().filter_map(parse_event).collect();
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], (0, ReceiverEvent::SessionStart { .. })));
        assert_eq!(events[1].0, 250);

        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn test_disabled_logger_writes_nothing() {
        let dir = temp_dir("disabled");
        let mut logger = EventLogger::new(EventLogConfig {
            log_dir: dir.clone(),
            enabled: false,
        });
        logger.start_session("20261019_120000", 0);
        assert!(!logger.is_active());
        assert!(!dir.exists());
    }
}
