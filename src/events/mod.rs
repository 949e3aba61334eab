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

//! Application event distribution and orchestration.
//!
//! This module defines the central event-handling logic for the application,
//! bridging user input (keyboard), media worker updates and the UI rendering
//! pipeline.
//!
//! # Architecture
//!
//! The system follows a reactive event-loop pattern:
//!
//! 1. **Capture**: Events are received via the [`AppEvent`] enum through an
//!    asynchronous channel.
//! 2. **Process**: The [`process_events`] function feeds them into the
//!    playback session and records what the session reports back.
//! 3. **Render**: After each event is processed, the UI is re-drawn using the
//!    `ratatui` terminal.

mod handlers;
use handlers::*;

use std::{io::Stdout, time::Duration};

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{Terminal, prelude::CrosstermBackend};
use waha_player::player::mpv::PlayerNotice;

use crate::{App, render::draw};

const FINE_SEEK_DELTA: Duration = Duration::from_secs(5);
const SEEK_DELTA: Duration = Duration::from_secs(20);

#[derive(Debug)]
pub(crate) enum AppEvent {
    Key(KeyEvent),

    Player(PlayerNotice),

    Tick,

    ExitApplication,
}

impl From<PlayerNotice> for AppEvent {
    fn from(notice: PlayerNotice) -> Self {
        AppEvent::Player(notice)
    }
}

/// Runs the main application loop, handling events and rendering the UI in the
/// terminal.
///
/// This function loops until a 'quit' event is received, the event channel
/// is closed or a media worker fails.
pub(crate) fn process_events(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    app: &mut App,
) -> Result<()> {
    terminal.draw(|f| draw(f, app))?;

    while let Ok(event) = app.event_rx.recv() {
        match event {
            AppEvent::ExitApplication => break,
            AppEvent::Key(key) => process_key_event(app, key)?,
            AppEvent::Player(PlayerNotice::Media(kind, media_event)) => {
                handle_media_event(app, kind, media_event)
            }
            AppEvent::Player(PlayerNotice::WorkerFailed(kind, message)) => {
                anyhow::bail!("{:?} worker stopped: {}", kind, message)
            }
            AppEvent::Tick => handle_tick(app),
        }

        terminal.draw(|f| draw(f, app))?;
    }

    Ok(())
}

/// Maps keyboard input to playback session actions.
///
/// # Errors
///
/// Returns an error only if the exit event cannot be sent; playback failures
/// are shown in the status line.
fn process_key_event(app: &mut App, key: KeyEvent) -> Result<()> {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => {
            app.event_tx.send(AppEvent::ExitApplication)?;
        }

        KeyCode::Char(' ') => {
            let result = app.session.toggle_play();
            report(app, result.map(|_| vec![]));
        }

        KeyCode::Char(',') => seek(app, FINE_SEEK_DELTA, false),
        KeyCode::Char('.') => seek(app, FINE_SEEK_DELTA, true),
        KeyCode::Char('<') | KeyCode::Left => seek(app, SEEK_DELTA, false),
        KeyCode::Char('>') | KeyCode::Right => seek(app, SEEK_DELTA, true),

        KeyCode::Char('r') => restart_chapter(app),

        KeyCode::Char(c @ '1'..='4') => {
            let index = c as usize - '1' as usize;
            select_chapter(app, index);
        }

        _ => {}
    }

    Ok(())
}
