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

//! Media playback control and state management.
//!
//! This module provides the [`MediaHandle`] used by a playback session to own
//! a single audio or video resource, and the [`MediaBackend`] seam that
//! handles talk to. The production backend is an MPV worker thread (see
//! [`mpv`]); the handle itself never blocks on playback operations, it sends
//! [`MediaCommand`]s and later receives [`MediaEvent`]s.

pub mod handle;
pub mod mpv;

use std::{fmt, path::PathBuf, time::Duration};

use thiserror::Error;

pub use handle::{HandleUpdate, MediaHandle};

/// Represents the current playback status of a media handle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlayerState {
    Playing,
    Paused,
    Stopped,
}

/// Where a media resource is read from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MediaSource {
    Local(PathBuf),
    Stream(String),
}

impl MediaSource {
    /// The location handed to the playback engine.
    pub fn uri(&self) -> String {
        match self {
            MediaSource::Local(path) => path.to_string_lossy().into_owned(),
            MediaSource::Stream(url) => url.clone(),
        }
    }

    pub fn is_local(&self) -> bool {
        matches!(self, MediaSource::Local(_))
    }
}

impl fmt::Display for MediaSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaSource::Local(path) => write!(f, "file {}", path.display()),
            MediaSource::Stream(url) => write!(f, "stream {url}"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LoadOptions {
    pub autoplay: bool,
    pub progress_interval: Duration,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            autoplay: false,
            progress_interval: Duration::from_millis(crate::config::PROGRESS_INTERVAL_MS),
        }
    }
}

/// Instructions sent from a handle to its backend.
#[derive(Clone, Debug, PartialEq)]
pub enum MediaCommand {
    Load {
        generation: u64,
        uri: String,
        autoplay: bool,
        progress_interval: Duration,
    },
    Play,
    Pause,
    Seek(u64),
    Unload,
}

/// Notifications from a backend, each tagged with the generation of the load
/// it belongs to.
#[derive(Clone, Debug, PartialEq)]
pub enum MediaEvent {
    Loaded {
        generation: u64,
        duration_ms: u64,
    },
    Status {
        generation: u64,
        position_ms: u64,
        duration_ms: u64,
        playing: bool,
    },
    SeekCompleted {
        generation: u64,
    },
    Finished {
        generation: u64,
    },
    Error {
        generation: u64,
        message: String,
    },
}

impl MediaEvent {
    pub fn generation(&self) -> u64 {
        match self {
            MediaEvent::Loaded { generation, .. }
            | MediaEvent::Status { generation, .. }
            | MediaEvent::SeekCompleted { generation }
            | MediaEvent::Finished { generation }
            | MediaEvent::Error { generation, .. } => *generation,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MediaError {
    #[error("media worker is no longer running")]
    Disconnected,

    #[error("no source to reload")]
    NoSource,

    #[error("playback failed after {attempts} attempt(s): {message}")]
    RetriesExhausted { attempts: u32, message: String },
}

/// The seam between a [`MediaHandle`] and the engine that actually decodes
/// and renders media.
pub trait MediaBackend {
    fn send(&mut self, command: MediaCommand) -> Result<(), MediaError>;
}
