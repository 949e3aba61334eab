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

//! MPV-backed media engine and event processing.
//!
//! This module provides the production [`MediaBackend`], leveraging `libmpv`
//! for audio and video decoding and playback control. Each backend owns a
//! background worker thread that bridges the command-based handle interface
//! and the MPV property observation system.
//!
//! # Architecture
//!
//! The engine operates using a dual-channel communication pattern:
//! 1. **Command Channel**: Receives [`MediaCommand`]s from a handle to control
//!    playback (load, play, pause, seek and unload).
//! 2. **Event Channel**: Broadcasts [`PlayerNotice`]s to the owner of the
//!    session, such as load completion, throttled status updates and errors.

use std::{
    sync::mpsc::{self, Receiver, Sender, TryRecvError},
    thread,
    time::{Duration, Instant},
};

use anyhow::{Context, Result};
use mpv::Format;
use tracing::{debug, warn};

use crate::{
    config::PROGRESS_INTERVAL_MS,
    model::MediaKind,
    player::{MediaBackend, MediaCommand, MediaError, MediaEvent},
};

/// What a media worker reports back to the application.
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerNotice {
    Media(MediaKind, MediaEvent),
    WorkerFailed(MediaKind, String),
}

/// A handle to an MPV worker thread.
///
/// This struct acts as a command proxy; it does not perform any media
/// processing itself but sends instructions to the worker.
pub struct MpvBackend {
    command_tx: Sender<MediaCommand>,
}

impl MpvBackend {
    /// Spawns the worker thread for one media kind.
    ///
    /// # Arguments
    ///
    /// * `kind` - Audio workers run without a video output, video workers
    ///   open an MPV window.
    /// * `event_tx` - The channel used to broadcast playback updates and
    ///   worker failures.
    pub fn spawn<E>(kind: MediaKind, event_tx: Sender<E>) -> Self
    where
        E: From<PlayerNotice> + Send + 'static,
    {
        let (command_tx, command_rx) = mpsc::channel::<MediaCommand>();

        let error_tx = event_tx.clone();
        thread::spawn(move || {
            if let Err(e) = media_worker(kind, command_rx, &event_tx) {
                let _ = error_tx.send(E::from(PlayerNotice::WorkerFailed(
                    kind,
                    format!("MPV worker failure: {:?}", e),
                )));
            }
        });

        Self { command_tx }
    }
}

impl MediaBackend for MpvBackend {
    fn send(&mut self, command: MediaCommand) -> Result<(), MediaError> {
        self.command_tx
            .send(command)
            .map_err(|_| MediaError::Disconnected)
    }
}

/// Playback bookkeeping owned by the worker thread.
struct WorkerState {
    kind: MediaKind,
    generation: u64,
    progress_interval: Duration,
    last_status: Option<Instant>,
    loaded: bool,
    seeking: bool,
    paused: bool,
    position_s: f64,
    duration_s: f64,
}

impl WorkerState {
    fn new(kind: MediaKind) -> Self {
        Self {
            kind,
            generation: 0,
            progress_interval: Duration::from_millis(PROGRESS_INTERVAL_MS),
            last_status: None,
            loaded: false,
            seeking: false,
            paused: true,
            position_s: 0.0,
            duration_s: 0.0,
        }
    }

    fn status_event(&mut self) -> MediaEvent {
        self.last_status = Some(Instant::now());
        MediaEvent::Status {
            generation: self.generation,
            position_ms: to_millis(self.position_s),
            duration_ms: to_millis(self.duration_s),
            playing: !self.paused,
        }
    }

    fn status_due(&self) -> bool {
        self.last_status
            .is_none_or(|at| at.elapsed() >= self.progress_interval)
    }
}

fn to_millis(seconds: f64) -> u64 {
    if seconds.is_finite() && seconds > 0.0 {
        (seconds * 1000.0) as u64
    } else {
        0
    }
}

/// The primary execution loop for a media backend.
///
/// This function initialises a local `libmpv` context and alternates between
/// draining pending commands and waiting for MPV events, until the command
/// sender is dropped.
///
/// # Errors
///
/// Returns an error if the MPV context fails to initialise, or if the event
/// channel is closed.
fn media_worker<E>(
    kind: MediaKind,
    command_rx: Receiver<MediaCommand>,
    event_tx: &Sender<E>,
) -> Result<()>
where
    E: From<PlayerNotice>,
{
    let mut handler = (|| {
        let mut builder = mpv::MpvHandlerBuilder::new().context("Failed to create MPV builder")?;
        if kind == MediaKind::Audio {
            builder
                .set_option("vo", "null")
                .context("Failed to set no video output")?;
        }
        builder.build().context("Failed to build MPV handler")
    })()?;

    handler
        .observe_property::<f64>("duration", 0)
        .context("Failed to observe duration")?;
    handler
        .observe_property::<bool>("pause", 0)
        .context("Failed to observe pause")?;
    handler
        .observe_property::<f64>("time-pos", 0)
        .context("Failed to observe time-pos")?;

    let mut state = WorkerState::new(kind);

    let send = |event: MediaEvent| -> Result<()> {
        event_tx
            .send(E::from(PlayerNotice::Media(kind, event)))
            .map_err(|_| anyhow::anyhow!("Failed to send media event"))
    };

    loop {
        if !process_commands(&mut handler, &command_rx, &mut state, &send)? {
            debug!(?kind, "media handle dropped, stopping worker");
            return Ok(());
        }
        process_mpv_events(&mut handler, &mut state, &send)?;
    }
}

/// Drains and executes all pending commands, returning `false` once the
/// owning handle has gone away.
fn process_commands(
    handler: &mut mpv::MpvHandler,
    command_rx: &Receiver<MediaCommand>,
    state: &mut WorkerState,
    send: &impl Fn(MediaEvent) -> Result<()>,
) -> Result<bool> {
    loop {
        let command = match command_rx.try_recv() {
            Ok(command) => command,
            Err(TryRecvError::Empty) => return Ok(true),
            Err(TryRecvError::Disconnected) => return Ok(false),
        };

        let result = match command {
            MediaCommand::Load {
                generation,
                uri,
                autoplay,
                progress_interval,
            } => {
                state.generation = generation;
                state.progress_interval = progress_interval;
                state.loaded = false;
                state.seeking = false;
                state.position_s = 0.0;
                state.duration_s = 0.0;
                state.last_status = None;

                handler
                    .set_property("pause", !autoplay)
                    .and_then(|_| handler.command(&["loadfile", &uri, "replace"]))
                    .map_err(|e| format!("Failed to load {}: {:?}", uri, e))
            }
            MediaCommand::Play => handler
                .set_property("pause", false)
                .map_err(|e| format!("Failed to play: {:?}", e)),
            MediaCommand::Pause => handler
                .set_property("pause", true)
                .map_err(|e| format!("Failed to pause: {:?}", e)),
            MediaCommand::Seek(position_ms) => {
                state.seeking = true;
                let seconds = format!("{:.3}", position_ms as f64 / 1000.0);
                handler
                    .command(&["seek", &seconds, "absolute"])
                    .map_err(|e| format!("Failed to seek: {:?}", e))
            }
            MediaCommand::Unload => {
                state.loaded = false;
                state.seeking = false;
                handler
                    .command(&["stop"])
                    .map_err(|e| format!("Failed to stop: {:?}", e))
            }
        };

        if let Err(message) = result {
            warn!(kind = ?state.kind, %message, "mpv command failed");
            send(MediaEvent::Error {
                generation: state.generation,
                message,
            })?;
        }
    }
}

/// Polls for MPV events and translates them into [`MediaEvent`]s.
///
/// This function waits for up to 50ms for an event from the MPV context.
/// Position changes are throttled to the progress interval of the current
/// load.
fn process_mpv_events(
    handler: &mut mpv::MpvHandler,
    state: &mut WorkerState,
    send: &impl Fn(MediaEvent) -> Result<()>,
) -> Result<()> {
    let Some(mpv_event) = handler.wait_event(0.05) else {
        return Ok(());
    };

    let media_event = match mpv_event {
        mpv::Event::FileLoaded => {
            state.loaded = true;
            state.duration_s = handler.get_property::<f64>("duration").unwrap_or(0.0);
            Some(MediaEvent::Loaded {
                generation: state.generation,
                duration_ms: to_millis(state.duration_s),
            })
        }
        mpv::Event::PropertyChange { name, change, .. } if state.loaded => match (name, change) {
            ("duration", Format::Double(duration)) => {
                state.duration_s = duration;
                None
            }
            ("pause", Format::Flag(pause)) => {
                state.paused = pause;
                Some(state.status_event())
            }
            ("time-pos", Format::Double(seconds)) if seconds >= 0.0 => {
                state.position_s = seconds;
                state.status_due().then(|| state.status_event())
            }
            _ => None,
        },
        mpv::Event::PlaybackRestart if state.seeking => {
            state.seeking = false;
            Some(MediaEvent::SeekCompleted {
                generation: state.generation,
            })
        }
        mpv::Event::EndFile(result) if state.loaded => match result {
            Ok(mpv::EndFileReason::MPV_END_FILE_REASON_EOF) => {
                state.loaded = false;
                Some(MediaEvent::Finished {
                    generation: state.generation,
                })
            }
            Ok(_) => None,
            Err(e) => {
                state.loaded = false;
                Some(MediaEvent::Error {
                    generation: state.generation,
                    message: format!("{:?}", e),
                })
            }
        },
        mpv::Event::EndFile(Err(e)) => Some(MediaEvent::Error {
            generation: state.generation,
            message: format!("{:?}", e),
        }),
        _ => None,
    };

    if let Some(event) = media_event {
        send(event)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seconds_convert_to_whole_millis() {
        assert_eq!(to_millis(1.2345), 1234);
        assert_eq!(to_millis(0.0), 0);
        assert_eq!(to_millis(-3.0), 0);
        assert_eq!(to_millis(f64::NAN), 0);
    }

    #[test]
    fn first_status_is_always_due() {
        let mut state = WorkerState::new(MediaKind::Audio);
        assert!(state.status_due());

        state.progress_interval = Duration::from_secs(60);
        state.position_s = 2.5;
        state.duration_s = 10.0;
        state.paused = false;
        state.generation = 7;

        assert_eq!(
            state.status_event(),
            MediaEvent::Status {
                generation: 7,
                position_ms: 2500,
                duration_ms: 10000,
                playing: true,
            }
        );
        assert!(!state.status_due());
    }
}
