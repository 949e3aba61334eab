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

//! Chapter sequencing.
//!
//! A lesson type declares a fixed, ordered list of chapters. When the active
//! chapter finishes the sequencer decides whether playback moves on, after a
//! short delay that lets the chapter switch animate, or stops.

use std::time::Duration;

use thiserror::Error;

use crate::{
    config::PlaybackTiming,
    model::{Chapter, LessonType},
};

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SequenceError {
    #[error("{chapter} is not a chapter of {} lessons", .lesson_type.tag())]
    ChapterNotInLesson {
        chapter: Chapter,
        lesson_type: LessonType,
    },
}

/// What happens once the active chapter finishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Switch to `to` once `delay` has passed.
    Advance {
        to: Chapter,
        delay: Duration,
        prefer_text: bool,
    },
    /// The next chapter's media is still downloading, stay put.
    Blocked { target: Chapter },
    /// The lesson has no further chapter.
    Terminal,
}

/// Facts about the open lesson that influence a transition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransitionContext {
    pub has_story_audio: bool,
    pub audio_downloading: bool,
    pub video_downloading: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct ChapterSequencer {
    lesson_type: LessonType,
    advance_delay: Duration,
    video_advance_delay: Duration,
}

impl ChapterSequencer {
    pub fn new(lesson_type: LessonType, timing: &PlaybackTiming) -> Self {
        Self {
            lesson_type,
            advance_delay: timing.advance_delay,
            video_advance_delay: timing.video_advance_delay,
        }
    }

    pub fn lesson_type(&self) -> LessonType {
        self.lesson_type
    }

    pub fn chapters(&self) -> &'static [Chapter] {
        self.lesson_type.chapters()
    }

    pub fn initial_chapter(&self) -> Option<Chapter> {
        self.lesson_type.initial_chapter()
    }

    pub fn ensure_declared(&self, chapter: Chapter) -> Result<(), SequenceError> {
        if self.lesson_type.has_chapter(chapter) {
            Ok(())
        } else {
            Err(SequenceError::ChapterNotInLesson {
                chapter,
                lesson_type: self.lesson_type,
            })
        }
    }

    /// Decides the transition after `current` finishes.
    pub fn next_chapter(
        &self,
        current: Chapter,
        context: TransitionContext,
    ) -> Result<Transition, SequenceError> {
        self.ensure_declared(current)?;

        let Some(to) = successor(self.lesson_type, current) else {
            return Ok(Transition::Terminal);
        };

        let transition = match to {
            Chapter::Story if !context.has_story_audio => Transition::Advance {
                to,
                delay: self.advance_delay,
                prefer_text: true,
            },
            Chapter::Story if context.audio_downloading => Transition::Blocked { target: to },
            Chapter::Training if context.video_downloading => Transition::Blocked { target: to },
            Chapter::Training => Transition::Advance {
                to,
                delay: self.video_advance_delay,
                prefer_text: false,
            },
            _ => Transition::Advance {
                to,
                delay: self.advance_delay,
                prefer_text: false,
            },
        };

        Ok(transition)
    }
}

fn successor(lesson_type: LessonType, current: Chapter) -> Option<Chapter> {
    use Chapter::*;

    match (lesson_type, current) {
        (LessonType::Audiobook, Story) | (LessonType::VideoOnly, Training) => None,
        (_, Fellowship) => Some(Story),
        (LessonType::StandardDmc, Story) => Some(Training),
        (_, Story) | (_, Training) => Some(Application),
        (_, Application) => None,
    }
}
