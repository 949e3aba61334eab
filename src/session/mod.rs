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

//! Lesson playback session.
//!
//! A [`PlaybackSession`] is created when a lesson is opened and lives until it
//! is closed. It decides which chapter is active, owns one audio and one
//! video [`MediaHandle`], schedules automatic chapter advances and records
//! lesson completion in the injected [`ProgressRepository`].
//!
//! The session is driven entirely by its owner:
//!
//! 1. **Media events**: every [`MediaEvent`] from a backend is passed to
//!    [`PlaybackSession::handle_media_event`].
//! 2. **Ticks**: [`PlaybackSession::tick`] is called periodically and performs
//!    any chapter advance whose delay has elapsed.
//! 3. **User actions**: chapter changes, play, pause and seeking.
//!
//! Each call returns the [`SessionEvent`]s the presentation layer should
//! react to.

mod state;

use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

pub use state::{PlaybackError, PlaybackState, SessionEvent};

use crate::{
    config::PlaybackTiming,
    downloads::{self, Downloads},
    lesson::{
        ChapterSequencer, CompletionDecision, CompletionTracker, Transition, TransitionContext,
    },
    model::{Chapter, Lesson, LessonRef, MediaKind},
    player::{
        HandleUpdate, LoadOptions, MediaBackend, MediaError, MediaEvent, MediaHandle, MediaSource,
    },
    storage::MediaStorage,
    store::ProgressRepository,
    util::clock::Clock,
};

/// Collaborators a session is built from.
pub struct SessionDeps<B, R, C> {
    pub audio: B,
    pub video: B,
    pub progress: R,
    pub storage: Box<dyn MediaStorage>,
    pub clock: C,
}

#[derive(Debug, Clone, Copy)]
struct PendingAdvance {
    to: Chapter,
    due: Instant,
    prefer_text: bool,
}

pub struct PlaybackSession<B: MediaBackend, R: ProgressRepository, C: Clock> {
    group_id: String,
    lesson_ref: LessonRef,
    sequencer: ChapterSequencer,
    tracker: CompletionTracker,
    audio: MediaHandle<B>,
    video: MediaHandle<B>,
    progress: R,
    storage: Box<dyn MediaStorage>,
    clock: C,
    timing: PlaybackTiming,
    downloads: Downloads,
    connected: bool,
    active_chapter: Option<Chapter>,
    prefer_text: bool,
    autoplay: bool,
    pending: Option<PendingAdvance>,
    closed: bool,
}

impl<B: MediaBackend, R: ProgressRepository, C: Clock> PlaybackSession<B, R, C> {
    /// Opens a lesson for a group and starts loading its initial chapter.
    ///
    /// Lessons without media (books) open with no active chapter.
    ///
    /// # Errors
    ///
    /// Returns an error if stored progress cannot be read or the initial media
    /// cannot be handed to its backend.
    pub fn open(
        group_id: &str,
        lesson_ref: LessonRef,
        downloads: Downloads,
        connected: bool,
        deps: SessionDeps<B, R, C>,
        timing: PlaybackTiming,
    ) -> Result<Self, PlaybackError> {
        let lesson_type = lesson_ref.lesson.lesson_type;
        let already_complete =
            deps.progress
                .is_complete(group_id, &lesson_ref.set_id, lesson_ref.index)?;

        let mut session = Self {
            group_id: group_id.to_string(),
            sequencer: ChapterSequencer::new(lesson_type, &timing),
            tracker: CompletionTracker::new(lesson_type, already_complete),
            lesson_ref,
            audio: MediaHandle::new(MediaKind::Audio, deps.audio, timing.max_retries),
            video: MediaHandle::new(MediaKind::Video, deps.video, timing.max_retries),
            progress: deps.progress,
            storage: deps.storage,
            clock: deps.clock,
            timing,
            downloads,
            connected,
            active_chapter: None,
            prefer_text: false,
            autoplay: timing.autoplay_on_open,
            pending: None,
            closed: false,
        };

        info!(
            lesson = %session.lesson().id,
            group = %session.group_id,
            already_complete,
            "opened lesson"
        );

        if let Some(chapter) = session.sequencer.initial_chapter() {
            let prefer_text = session.prefers_text(chapter);
            session.enter_chapter(chapter, timing.autoplay_on_open, prefer_text)?;
        }

        Ok(session)
    }

    pub fn lesson(&self) -> &Lesson {
        &self.lesson_ref.lesson
    }

    pub fn lesson_ref(&self) -> &LessonRef {
        &self.lesson_ref
    }

    pub fn group_id(&self) -> &str {
        &self.group_id
    }

    pub fn progress(&self) -> &R {
        &self.progress
    }

    pub fn downloads(&self) -> &Downloads {
        &self.downloads
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn is_complete(&self) -> bool {
        self.tracker.is_complete()
    }

    pub fn chapters(&self) -> &'static [Chapter] {
        self.sequencer.chapters()
    }

    pub fn active_chapter(&self) -> Option<Chapter> {
        self.active_chapter
    }

    /// The chapter an automatic advance is waiting to switch to.
    pub fn pending_advance(&self) -> Option<Chapter> {
        self.pending.map(|pending| pending.to)
    }

    pub fn handle(&self, kind: MediaKind) -> &MediaHandle<B> {
        match kind {
            MediaKind::Audio => &self.audio,
            MediaKind::Video => &self.video,
        }
    }

    fn handle_mut(&mut self, kind: MediaKind) -> &mut MediaHandle<B> {
        match kind {
            MediaKind::Audio => &mut self.audio,
            MediaKind::Video => &mut self.video,
        }
    }

    pub fn state(&self) -> PlaybackState {
        let Some(chapter) = self.active_chapter else {
            return PlaybackState::default();
        };
        let handle = self.handle(chapter.media_kind());

        PlaybackState {
            active_chapter: Some(chapter),
            media_loaded: handle.is_loaded(),
            playing: handle.is_playing(),
            position_ms: handle.position_ms(),
            duration_ms: handle.duration_ms(),
            autoplay: self.autoplay,
            prefer_text: self.prefer_text,
        }
    }

    /// Whether a chapter can be selected right now. Chapters whose media is
    /// neither stored locally nor streamable are shown disabled.
    pub fn chapter_available(&self, chapter: Chapter) -> bool {
        self.lesson().lesson_type.has_chapter(chapter)
            && (self.prefers_text(chapter) || self.resolve(chapter).is_some())
    }

    pub fn set_connected(&mut self, connected: bool) {
        if self.connected != connected {
            debug!(connected, "connectivity changed");
        }
        self.connected = connected;
    }

    /// Applies a progress report from the download coordinator for this
    /// lesson's media. A completed download makes local storage look for the
    /// new file.
    pub fn update_download(&mut self, kind: MediaKind, progress: f64) {
        let lesson_id = self.lesson_ref.lesson.id.clone();
        self.downloads.update(&lesson_id, kind, progress);

        if progress >= 1.0 {
            self.refresh_storage();
        }
    }

    pub fn replace_downloads(&mut self, downloads: Downloads) {
        self.downloads = downloads;
        self.refresh_storage();
    }

    /// Feeds a backend event into the session.
    ///
    /// Events from stale loads are dropped by the handles. A media failure
    /// that survives the retry policy is returned as an error after the
    /// handle has been unloaded.
    pub fn handle_media_event(
        &mut self,
        kind: MediaKind,
        event: MediaEvent,
    ) -> Result<Vec<SessionEvent>, PlaybackError> {
        let Some(update) = self.handle_mut(kind).apply(event) else {
            return Ok(vec![]);
        };

        let Some(chapter) = self.active_chapter.filter(|c| c.media_kind() == kind) else {
            return Ok(vec![]);
        };

        match update {
            HandleUpdate::Loaded { duration_ms } => {
                debug!(%chapter, duration_ms, "chapter media loaded");
                Ok(vec![])
            }
            HandleUpdate::Progress {
                position_ms,
                duration_ms,
            } => self.check_completion(chapter, position_ms, duration_ms),
            HandleUpdate::Finished { duration_ms } => {
                let mut events = self.check_completion(chapter, duration_ms, duration_ms)?;
                events.extend(self.schedule_next(chapter)?);
                Ok(events)
            }
            HandleUpdate::Retrying { attempt } => {
                Ok(vec![SessionEvent::MediaRetrying { chapter, attempt }])
            }
            HandleUpdate::Failed(source) => Err(PlaybackError::Media { chapter, source }),
        }
    }

    /// Performs a scheduled chapter advance once its delay has passed.
    pub fn tick(&mut self) -> Result<Vec<SessionEvent>, PlaybackError> {
        let Some(pending) = self.pending else {
            return Ok(vec![]);
        };

        if self.clock.now() < pending.due {
            return Ok(vec![]);
        }

        self.pending = None;
        self.enter_chapter(pending.to, true, pending.prefer_text)
    }

    /// Switches to `target` at the user's request.
    ///
    /// The switch only happens when `target` differs from the active chapter
    /// and no load is in flight for it; otherwise the active chapter restarts
    /// from the beginning. Restarting a chapter whose media is not held, after
    /// a failure, a finish or while it was unavailable, enters it again so its
    /// source is resolved and loaded afresh.
    pub fn change_chapter(&mut self, target: Chapter) -> Result<Vec<SessionEvent>, PlaybackError> {
        self.sequencer.ensure_declared(target)?;
        self.pending = None;

        let Some(current) = self.active_chapter else {
            let prefer_text = self.prefers_text(target);
            return self.enter_chapter(target, true, prefer_text);
        };

        let handle = self.handle(current.media_kind());

        if target != current && !handle.is_loading() {
            let prefer_text = self.prefers_text(target);
            return self.enter_chapter(target, true, prefer_text);
        }

        if !handle.is_loaded() && !handle.is_loading() {
            let prefer_text = self.prefers_text(current);
            return self.enter_chapter(current, true, prefer_text);
        }

        self.handle_mut(current.media_kind())
            .seek(0)
            .map_err(|source| PlaybackError::Media {
                chapter: current,
                source,
            })?;

        Ok(vec![SessionEvent::ChapterRestarted { chapter: current }])
    }

    pub fn play(&mut self) -> Result<(), PlaybackError> {
        self.with_active(|handle| handle.play())
    }

    pub fn pause(&mut self) -> Result<(), PlaybackError> {
        self.with_active(|handle| handle.pause())
    }

    pub fn toggle_play(&mut self) -> Result<(), PlaybackError> {
        self.with_active(|handle| {
            if handle.is_playing() {
                handle.pause()
            } else {
                handle.play()
            }
        })
    }

    pub fn seek(&mut self, position_ms: u64) -> Result<(), PlaybackError> {
        self.with_active(|handle| handle.seek(position_ms))
    }

    /// Seeks relative to the current position, stopping at either end.
    pub fn seek_relative(&mut self, delta: Duration, forward: bool) -> Result<(), PlaybackError> {
        let delta_ms = delta.as_millis() as u64;
        self.with_active(|handle| {
            let position = if forward {
                handle.position_ms().saturating_add(delta_ms)
            } else {
                handle.position_ms().saturating_sub(delta_ms)
            };
            handle.seek(position)
        })
    }

    /// Unloads all media and drops any scheduled advance. Safe to call more
    /// than once; also performed on drop.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.pending = None;
        self.audio.unload();
        self.video.unload();
        self.closed = true;
        info!(lesson = %self.lesson_ref.lesson.id, "closed lesson");
    }

    fn with_active(
        &mut self,
        f: impl FnOnce(&mut MediaHandle<B>) -> Result<(), MediaError>,
    ) -> Result<(), PlaybackError> {
        let Some(chapter) = self.active_chapter else {
            return Ok(());
        };

        f(self.handle_mut(chapter.media_kind()))
            .map_err(|source| PlaybackError::Media { chapter, source })
    }

    fn refresh_storage(&mut self) {
        if let Err(e) = self.storage.refresh() {
            warn!(error = %e, "failed to refresh media storage");
        }
    }

    fn prefers_text(&self, chapter: Chapter) -> bool {
        chapter == Chapter::Story && !self.lesson().lesson_type.has_story_audio()
    }

    fn resolve(&self, chapter: Chapter) -> Option<MediaSource> {
        downloads::resolve_source(
            self.lesson(),
            chapter,
            &self.downloads,
            self.storage.as_ref(),
            self.connected,
        )
    }

    fn enter_chapter(
        &mut self,
        chapter: Chapter,
        autoplay: bool,
        prefer_text: bool,
    ) -> Result<Vec<SessionEvent>, PlaybackError> {
        self.pending = None;

        if let Some(previous) = self.active_chapter {
            if previous.media_kind() != chapter.media_kind() {
                self.handle_mut(previous.media_kind()).unload();
            }
        }

        self.active_chapter = Some(chapter);
        self.prefer_text = prefer_text;
        self.autoplay = autoplay;

        let source = self.resolve(chapter);
        let available = source.is_some() || prefer_text;
        let options = LoadOptions {
            autoplay,
            progress_interval: self.timing.progress_interval,
        };

        info!(%chapter, autoplay, prefer_text, available, "entering chapter");

        let handle = self.handle_mut(chapter.media_kind());
        match source {
            Some(source) => {
                handle
                    .load(source, options)
                    .map_err(|e| PlaybackError::Media { chapter, source: e })?;
            }
            None => handle.unload(),
        }

        Ok(vec![SessionEvent::ChapterChanged {
            chapter,
            prefer_text,
            available,
        }])
    }

    fn check_completion(
        &mut self,
        chapter: Chapter,
        position_ms: u64,
        duration_ms: u64,
    ) -> Result<Vec<SessionEvent>, PlaybackError> {
        if self.tracker.observe(chapter, position_ms, duration_ms) != CompletionDecision::Reached {
            return Ok(vec![]);
        }

        let set_id = self.lesson_ref.set_id.clone();
        let index = self.lesson_ref.index;

        if self.progress.is_complete(&self.group_id, &set_id, index)? {
            debug!(%set_id, index, "lesson already marked complete");
            return Ok(vec![]);
        }

        if let Err(e) = self.progress.set_complete(&self.group_id, &set_id, index) {
            // Leave the tracker armed so the next update tries again.
            self.tracker = CompletionTracker::new(self.lesson().lesson_type, false);
            return Err(e.into());
        }

        info!(group = %self.group_id, %set_id, index, "lesson complete");

        Ok(vec![SessionEvent::LessonCompleted { set_id, index }])
    }

    fn schedule_next(&mut self, chapter: Chapter) -> Result<Vec<SessionEvent>, PlaybackError> {
        let lesson = self.lesson();
        let context = TransitionContext {
            has_story_audio: lesson.lesson_type.has_story_audio(),
            audio_downloading: self.downloads.is_downloading(&lesson.id, MediaKind::Audio),
            video_downloading: self.downloads.is_downloading(&lesson.id, MediaKind::Video),
        };

        let event = match self.sequencer.next_chapter(chapter, context)? {
            Transition::Advance {
                to,
                delay,
                prefer_text,
            } => {
                debug!(from = %chapter, %to, ?delay, "scheduling chapter advance");
                self.pending = Some(PendingAdvance {
                    to,
                    due: self.clock.now() + delay,
                    prefer_text,
                });
                SessionEvent::AdvanceScheduled {
                    from: chapter,
                    to,
                    delay,
                }
            }
            Transition::Blocked { target } => {
                debug!(%target, "next chapter still downloading");
                SessionEvent::AdvanceBlocked { target }
            }
            Transition::Terminal => SessionEvent::LessonFinished,
        };

        Ok(vec![event])
    }
}

impl<B: MediaBackend, R: ProgressRepository, C: Clock> Drop for PlaybackSession<B, R, C> {
    fn drop(&mut self) {
        self.close();
    }
}
