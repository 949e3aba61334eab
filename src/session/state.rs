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

//! Playback session state and outcomes.

use std::time::Duration;

use thiserror::Error;

use crate::{
    lesson::SequenceError,
    model::Chapter,
    player::MediaError,
};

/// Snapshot of the session for presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PlaybackState {
    pub active_chapter: Option<Chapter>,
    pub media_loaded: bool,
    pub playing: bool,
    pub position_ms: u64,
    pub duration_ms: u64,
    pub autoplay: bool,
    pub prefer_text: bool,
}

impl PlaybackState {
    /// Played fraction of the active chapter, 0 while the duration is
    /// unknown.
    pub fn fraction(&self) -> f64 {
        if self.duration_ms == 0 {
            0.0
        } else {
            (self.position_ms as f64 / self.duration_ms as f64).clamp(0.0, 1.0)
        }
    }
}

/// Something the presentation layer should react to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    ChapterChanged {
        chapter: Chapter,
        prefer_text: bool,
        available: bool,
    },
    ChapterRestarted {
        chapter: Chapter,
    },
    AdvanceScheduled {
        from: Chapter,
        to: Chapter,
        delay: Duration,
    },
    AdvanceBlocked {
        target: Chapter,
    },
    LessonCompleted {
        set_id: String,
        index: u32,
    },
    LessonFinished,
    MediaRetrying {
        chapter: Chapter,
        attempt: u32,
    },
}

/// Recoverable failures surfaced by a playback session. None of them end the
/// session; the caller may keep using it.
#[derive(Debug, Error)]
pub enum PlaybackError {
    #[error(transparent)]
    Sequence(#[from] SequenceError),

    #[error("{chapter} media failed: {source}")]
    Media {
        chapter: Chapter,
        #[source]
        source: MediaError,
    },

    #[error(transparent)]
    Progress(#[from] anyhow::Error),
}
