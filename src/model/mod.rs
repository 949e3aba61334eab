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

//! Domain models and core data structures.
//!
//! This module defines the central entities of the lesson player, such as
//! lessons, lesson sets and chapters, representing the content schema used
//! for playback and progress tracking.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One segment of a lesson.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Chapter {
    Fellowship,
    Story,
    Training,
    Application,
}

impl Chapter {
    /// The kind of media resource that plays this chapter.
    pub fn media_kind(self) -> MediaKind {
        match self {
            Chapter::Training => MediaKind::Video,
            _ => MediaKind::Audio,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Chapter::Fellowship => "Fellowship",
            Chapter::Story => "Story",
            Chapter::Training => "Training",
            Chapter::Application => "Application",
        }
    }
}

impl fmt::Display for Chapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The kind of underlying resource owned by a media handle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MediaKind {
    Audio,
    Video,
}

/// Tag determining which chapters a lesson has and where its media comes
/// from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LessonType {
    StandardDbs,
    StandardDmc,
    StandardNoAudio,
    VideoOnly,
    Audiobook,
    Book,
}

impl LessonType {
    /// The chapters this lesson type declares, in playback order.
    pub fn chapters(self) -> &'static [Chapter] {
        use Chapter::*;

        match self {
            LessonType::StandardDbs | LessonType::StandardNoAudio => {
                &[Fellowship, Story, Application]
            }
            LessonType::StandardDmc => &[Fellowship, Story, Training, Application],
            LessonType::VideoOnly => &[Training],
            LessonType::Audiobook => &[Story],
            LessonType::Book => &[],
        }
    }

    pub fn has_chapter(self, chapter: Chapter) -> bool {
        self.chapters().contains(&chapter)
    }

    /// The chapter a freshly opened lesson starts on, `None` for lessons
    /// without media.
    pub fn initial_chapter(self) -> Option<Chapter> {
        match self {
            LessonType::StandardDbs | LessonType::StandardDmc | LessonType::StandardNoAudio => {
                Some(Chapter::Fellowship)
            }
            LessonType::VideoOnly => Some(Chapter::Training),
            LessonType::Audiobook => Some(Chapter::Story),
            LessonType::Book => None,
        }
    }

    /// The chapter whose playback progress decides lesson completion.
    pub fn completion_chapter(self) -> Option<Chapter> {
        match self {
            LessonType::StandardDbs | LessonType::StandardDmc | LessonType::StandardNoAudio => {
                Some(Chapter::Application)
            }
            LessonType::VideoOnly => Some(Chapter::Training),
            LessonType::Audiobook => Some(Chapter::Story),
            LessonType::Book => None,
        }
    }

    /// Whether the Story chapter of this lesson type is backed by audio.
    pub fn has_story_audio(self) -> bool {
        matches!(
            self,
            LessonType::StandardDbs | LessonType::StandardDmc | LessonType::Audiobook
        )
    }

    pub fn tag(self) -> &'static str {
        match self {
            LessonType::StandardDbs => "standard_dbs",
            LessonType::StandardDmc => "standard_dmc",
            LessonType::StandardNoAudio => "standard_no_audio",
            LessonType::VideoOnly => "video_only",
            LessonType::Audiobook => "audiobook",
            LessonType::Book => "book",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        let lesson_type = match tag {
            "standard_dbs" => LessonType::StandardDbs,
            "standard_dmc" => LessonType::StandardDmc,
            "standard_no_audio" => LessonType::StandardNoAudio,
            "video_only" => LessonType::VideoOnly,
            "audiobook" => LessonType::Audiobook,
            "book" => LessonType::Book,
            _ => return None,
        };

        Some(lesson_type)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScripturePassage {
    pub header: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lesson {
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub lesson_type: LessonType,
    #[serde(default)]
    pub fellowship_type: Option<String>,
    #[serde(default)]
    pub application_type: Option<String>,
    #[serde(default)]
    pub scripture: Vec<ScripturePassage>,
    #[serde(default)]
    pub audio_source: Option<String>,
    #[serde(default)]
    pub video_source: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
}

impl Lesson {
    /// Returns the question set backing a question chapter.
    pub fn question_set(&self, chapter: Chapter) -> Option<&str> {
        match chapter {
            Chapter::Fellowship => self.fellowship_type.as_deref(),
            Chapter::Application => self.application_type.as_deref(),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LessonSet {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub lessons: Vec<Lesson>,
}

/// A lesson together with its position in its set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LessonRef {
    pub set_id: String,
    pub index: u32,
    pub lesson: Lesson,
}
