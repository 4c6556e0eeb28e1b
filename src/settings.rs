//! Host settings
//!
//! Stored as JSON next to the game. Physics is not configurable here; it is
//! derived from the screen and the target frame rate.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::consts::TARGET_FPS;
use crate::error::PersistenceError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Frame rate the physics is tuned for; also the FPS averaging window
    pub target_fps: u32,
    /// JSON file holding the high score
    pub high_score_path: PathBuf,
    /// Log average FPS once per window
    pub log_fps: bool,
    /// Fixed launch RNG seed (random when absent)
    pub seed: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            target_fps: TARGET_FPS,
            high_score_path: PathBuf::from("inoball_scores.json"),
            log_fps: true,
            seed: None,
        }
    }
}

impl Settings {
    /// Load settings from `path`, falling back to defaults if the file is
    /// missing or unreadable
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(json) => match serde_json::from_str(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings from {}", path.display());
                    settings
                }
                Err(e) => {
                    log::warn!("Bad settings file {}: {}, using defaults", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                log::info!("No settings at {} ({}), using defaults", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), PersistenceError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path.as_ref(), json)?;
        log::info!("Settings saved");
        Ok(())
    }
}
