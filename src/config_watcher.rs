//! Config file auto-reload system
//!
//! Polls the motion tuning file every 2 seconds and reloads it when modified.

use bevy::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::events::{EventBus, ReceiverEvent};
use crate::tuning::{MOTION_TUNING_FILE, MotionTuning};

/// How often to check for config changes (seconds)
const CHECK_INTERVAL: f32 = 2.0;

/// Tracks the modification time of the tuning file for hot-reload
#[derive(Resource)]
pub struct ConfigWatcher {
    /// Time since last check
    pub timer: f32,
    pub tuning_path: PathBuf,
    pub tuning_mtime: Option<SystemTime>,
}

impl Default for ConfigWatcher {
    fn default() -> Self {
        Self::watching(MOTION_TUNING_FILE)
    }
}

impl ConfigWatcher {
    pub fn watching(path: impl AsRef<Path>) -> Self {
        let tuning_path = path.as_ref().to_path_buf();
        Self {
            timer: 0.0,
            tuning_mtime: get_mtime(&tuning_path),
            tuning_path,
        }
    }

    /// Advance the poll timer; returns true when the file changed since the last check
    pub fn poll(&mut self, dt: f32) -> bool {
        self.timer += dt;
        if self.timer < CHECK_INTERVAL {
            return false;
        }
        self.timer = 0.0;

        let mtime = get_mtime(&self.tuning_path);
        if mtime == self.tuning_mtime {
            return false;
        }
        self.tuning_mtime = mtime;
        true
    }
}

/// Get file modification time, or None if file doesn't exist
fn get_mtime(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).ok().and_then(|m| m.modified().ok())
}

/// Reload motion tuning when its file changes. A file that fails to parse
/// leaves the current tuning in place.
pub fn check_config_changes(
    time: Res<Time>,
    mut watcher: ResMut<ConfigWatcher>,
    mut tuning: ResMut<MotionTuning>,
    mut bus: ResMut<EventBus>,
) {
    if !watcher.poll(time.delta_secs()) {
        return;
    }

    match MotionTuning::load(&watcher.tuning_path) {
        Ok(loaded) => {
            if *tuning != loaded {
                *tuning = loaded;
                info!("Auto-reloaded motion tuning from {}", watcher.tuning_path.display());
                bus.emit(ReceiverEvent::Config(tuning.clone()));
            }
        }
        Err(e) => warn!("{}, keeping current motion tuning", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_poll_detects_change_after_interval() {
        let dir = std::env::temp_dir().join(format!("ballsync_watch_{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("motion_tuning.json");
        fs::write(&path, "{}").unwrap();

        let mut watcher = ConfigWatcher::watching(&path);
        assert!(!watcher.poll(CHECK_INTERVAL + 0.1));

        let later = SystemTime::now() + Duration::from_secs(5);
        fs::File::options()
            .write(true)
            .open(&path)
            .unwrap()
            .set_modified(later)
            .unwrap();

        // Not yet time to check
        assert!(!watcher.poll(0.5));
        assert!(watcher.poll(CHECK_INTERVAL));
        assert!(!watcher.poll(CHECK_INTERVAL));

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_missing_file_never_fires() {
        let mut watcher = ConfigWatcher::watching("config/not_here.json");
        assert!(!watcher.poll(CHECK_INTERVAL * 3.0));
    }
}
