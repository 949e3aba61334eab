// Copyright (C) 2026  Caprica Software Limited
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Application configuration.
//!
//! This module manages the application configuration file and the playback
//! timing constants derived from it.

use std::{path::PathBuf, time::Duration};

use serde::{Deserialize, Serialize};

const CONFIG_NAME: &str = "waha-player";

/// Delay between a chapter finishing and the switch to the next audio
/// chapter, leaving time for the transition animation.
pub const ADVANCE_DELAY_MS: u64 = 500;

/// Delay before switching into the Training video chapter.
pub const VIDEO_ADVANCE_DELAY_MS: u64 = 1000;

/// Interval between playback status updates from a media backend.
pub const PROGRESS_INTERVAL_MS: u64 = 1000;

/// Number of automatic reloads attempted after a media error.
pub const MAX_MEDIA_RETRIES: u32 = 1;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub version: u32,
    pub media_dir: String,
    pub database_file: String,
    pub log_file: String,
    pub advance_delay_ms: u64,
    pub video_advance_delay_ms: u64,
    pub progress_interval_ms: u64,
    pub max_media_retries: u32,
    pub autoplay_on_open: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: 1,
            media_dir: "media".to_string(),
            database_file: "waha.db".to_string(),
            log_file: "waha-player.log".to_string(),
            advance_delay_ms: ADVANCE_DELAY_MS,
            video_advance_delay_ms: VIDEO_ADVANCE_DELAY_MS,
            progress_interval_ms: PROGRESS_INTERVAL_MS,
            max_media_retries: MAX_MEDIA_RETRIES,
            autoplay_on_open: false,
        }
    }
}

impl AppConfig {
    pub fn timing(&self) -> PlaybackTiming {
        PlaybackTiming {
            advance_delay: Duration::from_millis(self.advance_delay_ms),
            video_advance_delay: Duration::from_millis(self.video_advance_delay_ms),
            progress_interval: Duration::from_millis(self.progress_interval_ms),
            max_retries: self.max_media_retries,
            autoplay_on_open: self.autoplay_on_open,
        }
    }

    pub fn media_path(&self) -> PathBuf {
        PathBuf::from(&self.media_dir)
    }
}

/// Timing and retry parameters for a playback session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackTiming {
    pub advance_delay: Duration,
    pub video_advance_delay: Duration,
    pub progress_interval: Duration,
    pub max_retries: u32,
    pub autoplay_on_open: bool,
}

impl Default for PlaybackTiming {
    fn default() -> Self {
        AppConfig::default().timing()
    }
}

pub fn load_config() -> AppConfig {
    confy::load(CONFIG_NAME, None).unwrap_or_default()
}

pub fn save_config(cfg: &AppConfig) -> Result<(), confy::ConfyError> {
    confy::store(CONFIG_NAME, None, cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_timing_uses_named_constants() {
        let timing = PlaybackTiming::default();
        assert_eq!(timing.advance_delay, Duration::from_millis(500));
        assert_eq!(timing.video_advance_delay, Duration::from_millis(1000));
        assert_eq!(timing.progress_interval, Duration::from_millis(1000));
        assert_eq!(timing.max_retries, 1);
        assert!(!timing.autoplay_on_open);
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let cfg: AppConfig = serde_json::from_str(r#"{ "media_dir": "/tmp/waha" }"#).unwrap();
        assert_eq!(cfg.media_dir, "/tmp/waha");
        assert_eq!(cfg.advance_delay_ms, ADVANCE_DELAY_MS);
        assert_eq!(cfg.database_file, "waha.db");
    }
}
