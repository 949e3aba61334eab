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

//! Download state consumed by the lesson player.
//!
//! Downloads themselves are performed elsewhere; this module only keeps the
//! progress map the download coordinator publishes and uses it, together with
//! the local [`MediaStorage`], to decide where each chapter's media is played
//! from.

use std::collections::HashMap;

use tracing::warn;

use crate::{
    model::{Chapter, Lesson, MediaKind},
    player::MediaSource,
    storage::MediaStorage,
};

/// Suffix appended to a lesson id to key its video download.
pub const VIDEO_SUFFIX: &str = "v";

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DownloadRecord {
    pub progress: f64,
}

/// In-flight downloads keyed by lesson id (audio) or lesson id plus
/// [`VIDEO_SUFFIX`] (video).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Downloads {
    records: HashMap<String, DownloadRecord>,
}

impl Downloads {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key(lesson_id: &str, kind: MediaKind) -> String {
        match kind {
            MediaKind::Audio => lesson_id.to_string(),
            MediaKind::Video => format!("{lesson_id}{VIDEO_SUFFIX}"),
        }
    }

    pub fn progress(&self, lesson_id: &str, kind: MediaKind) -> Option<f64> {
        self.records
            .get(&Self::key(lesson_id, kind))
            .map(|record| record.progress)
    }

    /// Whether a download for this media is present and not yet complete.
    pub fn is_downloading(&self, lesson_id: &str, kind: MediaKind) -> bool {
        self.progress(lesson_id, kind)
            .is_some_and(|progress| progress < 1.0)
    }

    /// Records new progress; a finished download is removed from the map.
    /// Reports that are not a finite number are ignored.
    pub fn update(&mut self, lesson_id: &str, kind: MediaKind, progress: f64) {
        if !progress.is_finite() {
            warn!(lesson_id, ?kind, progress, "ignoring invalid download progress");
            return;
        }

        let key = Self::key(lesson_id, kind);
        let progress = progress.clamp(0.0, 1.0);

        if progress >= 1.0 {
            self.records.remove(&key);
        } else {
            self.records.insert(key, DownloadRecord { progress });
        }
    }

    pub fn remove(&mut self, lesson_id: &str, kind: MediaKind) {
        self.records.remove(&Self::key(lesson_id, kind));
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Local file name of a lesson's own media.
pub fn lesson_file_name(lesson_id: &str, kind: MediaKind) -> String {
    match kind {
        MediaKind::Audio => format!("{lesson_id}.mp3"),
        MediaKind::Video => format!("{lesson_id}{VIDEO_SUFFIX}.mp4"),
    }
}

/// Local file name of a question set's audio.
pub fn question_file_name(question_set: &str) -> String {
    format!("{question_set}.mp3")
}

/// Picks the source a chapter should be played from, or `None` when the
/// chapter has nothing playable right now.
///
/// Question chapters are installed with the language and only ever played
/// from local storage. Story and Training prefer a completed local download
/// and fall back to streaming when connected.
pub fn resolve_source(
    lesson: &Lesson,
    chapter: Chapter,
    downloads: &Downloads,
    storage: &dyn MediaStorage,
    connected: bool,
) -> Option<MediaSource> {
    match chapter {
        Chapter::Fellowship | Chapter::Application => {
            let question_set = lesson.question_set(chapter)?;
            storage
                .local_file(&question_file_name(question_set))
                .map(MediaSource::Local)
        }
        Chapter::Story => {
            if !lesson.lesson_type.has_story_audio() {
                return None;
            }
            lesson_source(
                lesson,
                MediaKind::Audio,
                lesson.audio_source.as_deref(),
                downloads,
                storage,
                connected,
            )
        }
        Chapter::Training => lesson_source(
            lesson,
            MediaKind::Video,
            lesson.video_source.as_deref(),
            downloads,
            storage,
            connected,
        ),
    }
}

fn lesson_source(
    lesson: &Lesson,
    kind: MediaKind,
    stream_url: Option<&str>,
    downloads: &Downloads,
    storage: &dyn MediaStorage,
    connected: bool,
) -> Option<MediaSource> {
    if !downloads.is_downloading(&lesson.id, kind) {
        if let Some(path) = storage.local_file(&lesson_file_name(&lesson.id, kind)) {
            return Some(MediaSource::Local(path));
        }
    }

    if connected {
        stream_url.map(|url| MediaSource::Stream(url.to_string()))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::{model::LessonType, storage::MemoryStorage};

    fn lesson(lesson_type: LessonType) -> Lesson {
        Lesson {
            id: "en.1.1".into(),
            title: "Creation".into(),
            lesson_type,
            fellowship_type: Some("en.dbs-fellowship".into()),
            application_type: Some("en.dbs-application".into()),
            scripture: vec![],
            audio_source: Some("https://example.org/en.1.1.mp3".into()),
            video_source: Some("https://example.org/en.1.1v.mp4".into()),
            text: None,
        }
    }

    #[test]
    fn video_records_use_suffixed_key() {
        let mut downloads = Downloads::new();
        downloads.update("en.1.1", MediaKind::Video, 0.4);

        assert_eq!(Downloads::key("en.1.1", MediaKind::Video), "en.1.1v");
        assert_eq!(downloads.progress("en.1.1", MediaKind::Video), Some(0.4));
        assert_eq!(downloads.progress("en.1.1", MediaKind::Audio), None);
        assert!(downloads.is_downloading("en.1.1", MediaKind::Video));
    }

    #[test]
    fn non_finite_progress_is_ignored() {
        let mut downloads = Downloads::new();
        downloads.update("en.1.1", MediaKind::Video, 0.25);

        downloads.update("en.1.1", MediaKind::Video, f64::NAN);
        downloads.update("en.1.1", MediaKind::Video, f64::INFINITY);
        assert_eq!(downloads.progress("en.1.1", MediaKind::Video), Some(0.25));
        assert!(downloads.is_downloading("en.1.1", MediaKind::Video));

        downloads.update("en.1.1", MediaKind::Audio, f64::NAN);
        assert_eq!(downloads.progress("en.1.1", MediaKind::Audio), None);
    }

    #[test]
    fn completed_download_is_removed() {
        let mut downloads = Downloads::new();
        downloads.update("en.1.1", MediaKind::Audio, 0.9);
        downloads.update("en.1.1", MediaKind::Audio, 1.0);
        assert!(downloads.is_empty());
        assert!(!downloads.is_downloading("en.1.1", MediaKind::Audio));
    }

    #[test]
    fn local_file_is_preferred_when_not_downloading() {
        let storage = MemoryStorage::with_files(["en.1.1.mp3"]);
        let source = resolve_source(
            &lesson(LessonType::StandardDbs),
            Chapter::Story,
            &Downloads::new(),
            &storage,
            true,
        );
        assert_eq!(source, Some(MediaSource::Local(PathBuf::from("en.1.1.mp3"))));
    }

    #[test]
    fn partial_download_streams_when_connected() {
        let storage = MemoryStorage::with_files(["en.1.1.mp3"]);
        let mut downloads = Downloads::new();
        downloads.update("en.1.1", MediaKind::Audio, 0.3);

        let lesson = lesson(LessonType::StandardDbs);
        assert_eq!(
            resolve_source(&lesson, Chapter::Story, &downloads, &storage, true),
            Some(MediaSource::Stream("https://example.org/en.1.1.mp3".into()))
        );
        assert_eq!(
            resolve_source(&lesson, Chapter::Story, &downloads, &storage, false),
            None
        );
    }

    #[test]
    fn question_audio_is_local_only() {
        let lesson = lesson(LessonType::StandardDbs);
        let empty = MemoryStorage::default();
        assert_eq!(
            resolve_source(&lesson, Chapter::Fellowship, &Downloads::new(), &empty, true),
            None
        );

        let storage = MemoryStorage::with_files(["en.dbs-application.mp3"]);
        assert_eq!(
            resolve_source(&lesson, Chapter::Application, &Downloads::new(), &storage, false),
            Some(MediaSource::Local(PathBuf::from("en.dbs-application.mp3")))
        );
    }

    #[test]
    fn no_audio_story_has_no_source() {
        let storage = MemoryStorage::with_files(["en.1.1.mp3"]);
        let source = resolve_source(
            &lesson(LessonType::StandardNoAudio),
            Chapter::Story,
            &Downloads::new(),
            &storage,
            true,
        );
        assert_eq!(source, None);
    }
}
