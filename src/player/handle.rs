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

//! A single owned media resource.
//!
//! A [`MediaHandle`] owns at most one loaded resource at a time. Every load
//! bumps a generation counter and every event coming back from the backend is
//! checked against it, so results of a load that has since been replaced or
//! unloaded are discarded instead of being applied to the wrong resource.

use tracing::{debug, warn};

use crate::{
    model::MediaKind,
    player::{
        LoadOptions, MediaBackend, MediaCommand, MediaError, MediaEvent, MediaSource, PlayerState,
    },
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Status {
    Idle,
    Loading,
    Loaded,
    // Played to the end; the backend no longer holds the resource.
    Ended,
}

/// What an applied [`MediaEvent`] means for the owner of the handle.
#[derive(Clone, Debug, PartialEq)]
pub enum HandleUpdate {
    Loaded { duration_ms: u64 },
    Progress { position_ms: u64, duration_ms: u64 },
    Finished { duration_ms: u64 },
    Retrying { attempt: u32 },
    Failed(MediaError),
}

pub struct MediaHandle<B: MediaBackend> {
    kind: MediaKind,
    backend: B,
    generation: u64,
    status: Status,
    source: Option<MediaSource>,
    options: LoadOptions,
    position_ms: u64,
    duration_ms: u64,
    playing: bool,
    seeking: bool,
    max_retries: u32,
    attempts: u32,
}

impl<B: MediaBackend> MediaHandle<B> {
    pub fn new(kind: MediaKind, backend: B, max_retries: u32) -> Self {
        Self {
            kind,
            backend,
            generation: 0,
            status: Status::Idle,
            source: None,
            options: LoadOptions::default(),
            position_ms: 0,
            duration_ms: 0,
            playing: false,
            seeking: false,
            max_retries,
            attempts: 0,
        }
    }

    pub fn kind(&self) -> MediaKind {
        self.kind
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_loaded(&self) -> bool {
        self.status == Status::Loaded
    }

    pub fn is_loading(&self) -> bool {
        self.status == Status::Loading
    }

    pub fn is_ended(&self) -> bool {
        self.status == Status::Ended
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn position_ms(&self) -> u64 {
        self.position_ms
    }

    pub fn duration_ms(&self) -> u64 {
        self.duration_ms
    }

    pub fn source(&self) -> Option<&MediaSource> {
        self.source.as_ref()
    }

    pub fn state(&self) -> PlayerState {
        if self.status != Status::Loaded {
            PlayerState::Stopped
        } else if self.playing {
            PlayerState::Playing
        } else {
            PlayerState::Paused
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Loads `source`, replacing whatever this handle held before.
    ///
    /// Returns the generation of the new load.
    pub fn load(&mut self, source: MediaSource, options: LoadOptions) -> Result<u64, MediaError> {
        self.attempts = 0;
        self.issue_load(source, options)
    }

    fn issue_load(&mut self, source: MediaSource, options: LoadOptions) -> Result<u64, MediaError> {
        self.unload();

        self.generation += 1;
        self.status = Status::Loading;
        self.options = options;
        self.source = Some(source.clone());

        debug!(kind = ?self.kind, generation = self.generation, %source, "loading media");

        let command = MediaCommand::Load {
            generation: self.generation,
            uri: source.uri(),
            autoplay: options.autoplay,
            progress_interval: options.progress_interval,
        };

        if let Err(e) = self.backend.send(command) {
            self.status = Status::Idle;
            return Err(e);
        }

        Ok(self.generation)
    }

    /// Starts playback. Media that has played to the end is loaded again
    /// and plays from the start.
    pub fn play(&mut self) -> Result<(), MediaError> {
        match self.status {
            Status::Loaded => {
                self.backend.send(MediaCommand::Play)?;
                self.playing = true;
                Ok(())
            }
            Status::Ended => self.replay(),
            Status::Idle | Status::Loading => Ok(()),
        }
    }

    fn replay(&mut self) -> Result<(), MediaError> {
        let Some(source) = self.source.clone() else {
            return Ok(());
        };
        let options = LoadOptions {
            autoplay: true,
            ..self.options
        };
        self.attempts = 0;
        self.issue_load(source, options).map(|_| ())
    }

    pub fn pause(&mut self) -> Result<(), MediaError> {
        if !self.is_loaded() {
            return Ok(());
        }
        self.backend.send(MediaCommand::Pause)?;
        self.playing = false;
        Ok(())
    }

    /// Seeks to an absolute position, clamped to the media duration.
    ///
    /// Position updates from the backend are ignored until the seek completes
    /// so the reported position does not jump back and forth.
    pub fn seek(&mut self, position_ms: u64) -> Result<(), MediaError> {
        if !self.is_loaded() {
            return Ok(());
        }
        let target = position_ms.min(self.duration_ms);
        self.backend.send(MediaCommand::Seek(target))?;
        self.position_ms = target;
        self.seeking = true;
        Ok(())
    }

    /// Releases the resource. Safe to call at any time, any load still in
    /// flight is invalidated.
    pub fn unload(&mut self) {
        self.generation += 1;

        if self.status != Status::Idle {
            if let Err(e) = self.backend.send(MediaCommand::Unload) {
                warn!(kind = ?self.kind, error = %e, "failed to unload media");
            }
        }

        self.status = Status::Idle;
        self.position_ms = 0;
        self.duration_ms = 0;
        self.playing = false;
        self.seeking = false;
    }

    /// Applies a backend event, returning `None` for events from a stale
    /// generation or ones that change nothing.
    pub fn apply(&mut self, event: MediaEvent) -> Option<HandleUpdate> {
        if event.generation() != self.generation {
            debug!(
                kind = ?self.kind,
                event_generation = event.generation(),
                generation = self.generation,
                "discarding stale media event"
            );
            return None;
        }

        match event {
            MediaEvent::Loaded { duration_ms, .. } => {
                if self.status != Status::Loading {
                    return None;
                }
                self.status = Status::Loaded;
                self.duration_ms = duration_ms;
                self.position_ms = 0;
                self.playing = self.options.autoplay;
                self.attempts = 0;
                Some(HandleUpdate::Loaded { duration_ms })
            }
            MediaEvent::Status {
                position_ms,
                duration_ms,
                playing,
                ..
            } => {
                if self.status != Status::Loaded {
                    return None;
                }
                if duration_ms > 0 {
                    self.duration_ms = duration_ms;
                }
                self.playing = playing;
                if !self.seeking {
                    self.position_ms = position_ms.min(self.duration_ms);
                }
                Some(self.progress())
            }
            MediaEvent::SeekCompleted { .. } => {
                if !self.seeking {
                    return None;
                }
                self.seeking = false;
                Some(self.progress())
            }
            MediaEvent::Finished { .. } => {
                if self.status != Status::Loaded {
                    return None;
                }
                self.status = Status::Ended;
                self.playing = false;
                self.seeking = false;
                self.position_ms = self.duration_ms;
                Some(HandleUpdate::Finished {
                    duration_ms: self.duration_ms,
                })
            }
            MediaEvent::Error { message, .. } => Some(self.recover(message)),
        }
    }

    fn progress(&self) -> HandleUpdate {
        HandleUpdate::Progress {
            position_ms: self.position_ms,
            duration_ms: self.duration_ms,
        }
    }

    // Reloads the current source while retries remain, otherwise gives up
    // and reports a recoverable failure.
    fn recover(&mut self, message: String) -> HandleUpdate {
        warn!(kind = ?self.kind, attempts = self.attempts, %message, "media error");

        let Some(source) = self.source.clone() else {
            self.unload();
            return HandleUpdate::Failed(MediaError::NoSource);
        };

        if self.attempts >= self.max_retries {
            let attempts = self.attempts + 1;
            self.unload();
            return HandleUpdate::Failed(MediaError::RetriesExhausted { attempts, message });
        }

        self.attempts += 1;
        let attempt = self.attempts;
        match self.issue_load(source, self.options) {
            Ok(_) => HandleUpdate::Retrying { attempt },
            Err(e) => {
                self.unload();
                HandleUpdate::Failed(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc, time::Duration};

    use super::*;

    #[derive(Clone, Default)]
    struct RecordingBackend {
        commands: Rc<RefCell<Vec<MediaCommand>>>,
    }

    impl MediaBackend for RecordingBackend {
        fn send(&mut self, command: MediaCommand) -> Result<(), MediaError> {
            self.commands.borrow_mut().push(command);
            Ok(())
        }
    }

    fn handle() -> (MediaHandle<RecordingBackend>, Rc<RefCell<Vec<MediaCommand>>>) {
        let backend = RecordingBackend::default();
        let commands = Rc::clone(&backend.commands);
        (MediaHandle::new(MediaKind::Audio, backend, 1), commands)
    }

    fn source() -> MediaSource {
        MediaSource::Stream("https://example.org/lesson.mp3".to_string())
    }

    fn loaded(duration_ms: u64) -> (MediaHandle<RecordingBackend>, Rc<RefCell<Vec<MediaCommand>>>) {
        let (mut h, commands) = handle();
        let generation = h.load(source(), LoadOptions::default()).unwrap();
        h.apply(MediaEvent::Loaded { generation, duration_ms });
        commands.borrow_mut().clear();
        (h, commands)
    }

    #[test]
    fn play_and_pause_are_noops_before_load() {
        let (mut h, commands) = handle();
        h.play().unwrap();
        h.pause().unwrap();
        h.seek(1000).unwrap();
        assert!(commands.borrow().is_empty());
        assert_eq!(h.state(), PlayerState::Stopped);
    }

    #[test]
    fn unload_without_load_is_safe() {
        let (mut h, commands) = handle();
        h.unload();
        h.unload();
        assert!(commands.borrow().is_empty());
        assert!(!h.is_loaded());
    }

    #[test]
    fn load_replaces_previous_resource() {
        let (mut h, commands) = loaded(5_000);
        let generation = h
            .load(
                MediaSource::Stream("https://example.org/other.mp3".into()),
                LoadOptions {
                    autoplay: true,
                    progress_interval: Duration::from_millis(250),
                },
            )
            .unwrap();

        let commands = commands.borrow();
        assert_eq!(commands[0], MediaCommand::Unload);
        assert_eq!(
            commands[1],
            MediaCommand::Load {
                generation,
                uri: "https://example.org/other.mp3".into(),
                autoplay: true,
                progress_interval: Duration::from_millis(250),
            }
        );
    }

    #[test]
    fn stale_events_are_discarded() {
        let (mut h, _) = handle();
        let first = h.load(source(), LoadOptions::default()).unwrap();
        let second = h.load(source(), LoadOptions::default()).unwrap();
        assert!(second > first);

        assert_eq!(h.apply(MediaEvent::Loaded { generation: first, duration_ms: 10 }), None);
        assert!(h.is_loading());

        assert_eq!(
            h.apply(MediaEvent::Loaded { generation: second, duration_ms: 10 }),
            Some(HandleUpdate::Loaded { duration_ms: 10 })
        );
        assert!(h.is_loaded());
    }

    #[test]
    fn load_result_after_unload_is_ignored() {
        let (mut h, _) = handle();
        let generation = h.load(source(), LoadOptions::default()).unwrap();
        h.unload();
        assert_eq!(h.apply(MediaEvent::Loaded { generation, duration_ms: 10 }), None);
        assert!(!h.is_loaded());
    }

    #[test]
    fn seek_clamps_to_duration() {
        let (mut h, commands) = loaded(5_000);
        h.seek(9_000).unwrap();
        assert_eq!(commands.borrow().last(), Some(&MediaCommand::Seek(5_000)));
        assert_eq!(h.position_ms(), 5_000);
    }

    #[test]
    fn status_updates_are_suspended_while_seeking() {
        let (mut h, _) = loaded(10_000);
        let generation = h.generation();
        h.seek(8_000).unwrap();

        let update = h.apply(MediaEvent::Status {
            generation,
            position_ms: 1_000,
            duration_ms: 10_000,
            playing: true,
        });
        assert_eq!(
            update,
            Some(HandleUpdate::Progress { position_ms: 8_000, duration_ms: 10_000 })
        );

        h.apply(MediaEvent::SeekCompleted { generation });
        let update = h.apply(MediaEvent::Status {
            generation,
            position_ms: 8_100,
            duration_ms: 10_000,
            playing: true,
        });
        assert_eq!(
            update,
            Some(HandleUpdate::Progress { position_ms: 8_100, duration_ms: 10_000 })
        );
    }

    #[test]
    fn error_reloads_same_source_once_then_fails() {
        let (mut h, commands) = loaded(10_000);
        let generation = h.generation();

        let update = h.apply(MediaEvent::Error { generation, message: "decoder".into() });
        assert_eq!(update, Some(HandleUpdate::Retrying { attempt: 1 }));
        assert!(h.is_loading());
        assert!(matches!(
            commands.borrow().last(),
            Some(MediaCommand::Load { uri, .. }) if uri == "https://example.org/lesson.mp3"
        ));

        let generation = h.generation();
        let update = h.apply(MediaEvent::Error { generation, message: "decoder".into() });
        assert_eq!(
            update,
            Some(HandleUpdate::Failed(MediaError::RetriesExhausted {
                attempts: 2,
                message: "decoder".into()
            }))
        );
        assert!(!h.is_loaded());
        assert!(!h.is_loading());
    }

    #[test]
    fn successful_reload_resets_retry_budget() {
        let (mut h, _) = loaded(10_000);
        h.apply(MediaEvent::Error { generation: h.generation(), message: "net".into() });
        h.apply(MediaEvent::Loaded { generation: h.generation(), duration_ms: 10_000 });

        let update = h.apply(MediaEvent::Error {
            generation: h.generation(),
            message: "net".into(),
        });
        assert_eq!(update, Some(HandleUpdate::Retrying { attempt: 1 }));
    }

    #[test]
    fn finished_moves_position_to_end() {
        let (mut h, _) = loaded(4_000);
        let update = h.apply(MediaEvent::Finished { generation: h.generation() });
        assert_eq!(update, Some(HandleUpdate::Finished { duration_ms: 4_000 }));
        assert_eq!(h.position_ms(), 4_000);
        assert!(!h.is_playing());
    }

    #[test]
    fn finished_media_is_no_longer_loaded() {
        let (mut h, commands) = loaded(4_000);
        h.apply(MediaEvent::Finished { generation: h.generation() });

        assert!(h.is_ended());
        assert!(!h.is_loaded());
        assert_eq!(h.state(), PlayerState::Stopped);

        h.seek(0).unwrap();
        h.pause().unwrap();
        assert!(commands.borrow().is_empty());
    }

    #[test]
    fn play_after_finish_loads_the_source_again() {
        let (mut h, commands) = loaded(4_000);
        let finished = h.generation();
        h.apply(MediaEvent::Finished { generation: finished });

        h.play().unwrap();

        assert!(h.is_loading());
        assert!(!h.is_playing());
        assert!(h.generation() > finished);
        assert!(matches!(
            commands.borrow().last(),
            Some(MediaCommand::Load { autoplay: true, uri, .. })
                if uri == "https://example.org/lesson.mp3"
        ));

        let update = h.apply(MediaEvent::Loaded {
            generation: h.generation(),
            duration_ms: 4_000,
        });
        assert_eq!(update, Some(HandleUpdate::Loaded { duration_ms: 4_000 }));
        assert!(h.is_playing());
        assert_eq!(h.position_ms(), 0);
    }
}
