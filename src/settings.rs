//! Game settings
//!
//! Level size and driver timing, stored as JSON next to the binary.

use std::fs;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;

/// Errors from reading or writing a settings file
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("settings I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("settings JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid level size {width}x{height}")]
    LevelSize { width: f32, height: f32 },
}

/// Game settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Level ===
    /// Generated level length (world units)
    pub level_width: f32,
    /// Viewport height the terrain is generated for
    pub level_height: f32,
    /// Fixed seed; a time-based seed is used when absent
    pub seed: Option<u64>,

    // === Driver ===
    /// Largest frame delta fed to the fixed-step accumulator (seconds)
    pub max_frame_dt: f64,
    /// Frame pacing for the headless loop
    pub target_fps: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            level_width: LEVEL_WIDTH,
            level_height: LEVEL_HEIGHT,
            seed: None,

            max_frame_dt: MAX_FRAME_DT,
            target_fps: 60,
        }
    }
}

impl Settings {
    /// Load settings from a JSON file; missing fields take their defaults
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)?;
        let settings: Settings = serde_json::from_str(&json)?;
        settings.validate()?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Write settings as pretty JSON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SettingsError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path.as_ref(), json)?;
        log::info!("Settings saved to {}", path.as_ref().display());
        Ok(())
    }

    /// Level extents must leave room for the runway and the anchors
    pub fn validate(&self) -> Result<(), SettingsError> {
        let ok = self.level_width.is_finite()
            && self.level_height.is_finite()
            && self.level_width > crate::sim::terrain::RUNWAY_END
            && self.level_height > crate::sim::terrain::GROUND_OFFSET;
        if ok {
            Ok(())
        } else {
            Err(SettingsError::LevelSize {
                width: self.level_width,
                height: self.level_height,
            })
        }
    }

    /// The configured seed, or the current Unix time in milliseconds
    pub fn resolve_seed(&self) -> u64 {
        self.seed.unwrap_or_else(|| {
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_millis() as u64)
                .unwrap_or_default()
        })
    }
}
