//! Animation configuration resource.
//!
//! Settings loaded from an INI file, with safe defaults when the file or a
//! value is missing.
//!
//! # Configuration File Format
//!
//! ```ini
//! [animation]
//! chunk_size = 64
//!
//! [time]
//! target_fps = 60
//! time_scale = 1.0
//! ```

use bevy_ecs::prelude::*;
use configparser::ini::Ini;
use log::info;
use std::path::PathBuf;

use crate::error::{AnimationError, Result};
use crate::resources::animationtable::DEFAULT_CHUNK_SIZE;

const DEFAULT_TARGET_FPS: u32 = 60;
const DEFAULT_TIME_SCALE: f32 = 1.0;
const DEFAULT_CONFIG_PATH: &str = "./config.ini";

#[derive(Resource, Debug, Clone)]
pub struct AnimationConfig {
    /// Rows added to or removed from the instance table per capacity change.
    pub chunk_size: usize,
    /// Host frames per second.
    pub target_fps: u32,
    /// Multiplier applied to the frame delta for scaled animations.
    pub time_scale: f32,
    /// Path to the configuration file.
    pub config_path: PathBuf,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl AnimationConfig {
    pub fn new() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            target_fps: DEFAULT_TARGET_FPS,
            time_scale: DEFAULT_TIME_SCALE,
            config_path: PathBuf::from(DEFAULT_CONFIG_PATH),
        }
    }

    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: path.into(),
            ..Self::new()
        }
    }

    /// Host frame delta in seconds.
    pub fn frame_delta(&self) -> f32 {
        1.0 / self.target_fps.max(1) as f32
    }

    /// Load configuration from the INI file.
    ///
    /// Missing values keep their current values. Fails if the file cannot be
    /// read or a value is out of range, leaving `self` unchanged.
    pub fn load_from_file(&mut self) -> Result<()> {
        let mut config = Ini::new();
        config
            .load(&self.config_path)
            .map_err(|e| AnimationError::Config(format!("Failed to load config file: {}", e)))?;

        let mut loaded = self.clone();

        // [animation] section
        if let Some(chunk_size) = config.getuint("animation", "chunk_size").ok().flatten() {
            if chunk_size == 0 {
                return Err(AnimationError::Config(
                    "animation.chunk_size must be positive".to_string(),
                ));
            }
            loaded.chunk_size = chunk_size as usize;
        }

        // [time] section
        if let Some(fps) = config.getuint("time", "target_fps").ok().flatten() {
            if fps == 0 {
                return Err(AnimationError::Config(
                    "time.target_fps must be positive".to_string(),
                ));
            }
            loaded.target_fps = fps as u32;
        }
        if let Some(scale) = config.getfloat("time", "time_scale").ok().flatten() {
            if !(scale.is_finite() && scale >= 0.0) {
                return Err(AnimationError::Config(format!(
                    "time.time_scale must be a non-negative number, got {scale}"
                )));
            }
            loaded.time_scale = scale as f32;
        }

        *self = loaded;
        info!(
            "Loaded config: chunk_size={}, fps={}, time_scale={}",
            self.chunk_size, self.target_fps, self.time_scale
        );

        Ok(())
    }

    /// Save configuration to the INI file.
    pub fn save_to_file(&self) -> Result<()> {
        let mut config = Ini::new();

        config.set("animation", "chunk_size", Some(self.chunk_size.to_string()));
        config.set("time", "target_fps", Some(self.target_fps.to_string()));
        config.set("time", "time_scale", Some(self.time_scale.to_string()));

        config
            .write(&self.config_path)
            .map_err(|e| AnimationError::Config(format!("Failed to save config file: {}", e)))?;

        info!("Saved config to {:?}", self.config_path);

        Ok(())
    }
}
