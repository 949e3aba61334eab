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

use std::time::Duration;

use tracing::warn;
use waha_player::{
    model::MediaKind,
    player::MediaEvent,
    session::{PlaybackError, SessionEvent},
};

use crate::{App, StatusLine};

pub(super) fn handle_media_event(app: &mut App, kind: MediaKind, event: MediaEvent) {
    let result = app.session.handle_media_event(kind, event);
    report(app, result);
}

pub(super) fn handle_tick(app: &mut App) {
    let result = app.session.tick();
    report(app, result);
}

pub(super) fn seek(app: &mut App, delta: Duration, forward: bool) {
    let result = app.session.seek_relative(delta, forward);
    report(app, result.map(|_| vec![]));
}

pub(super) fn restart_chapter(app: &mut App) {
    if let Some(chapter) = app.session.active_chapter() {
        let result = app.session.change_chapter(chapter);
        report(app, result);
    }
}

pub(super) fn select_chapter(app: &mut App, index: usize) {
    let Some(&chapter) = app.session.chapters().get(index) else {
        return;
    };

    if !app.session.chapter_available(chapter) {
        app.status = Some(StatusLine::Info(format!("{} is not available", chapter)));
        return;
    }

    let result = app.session.change_chapter(chapter);
    report(app, result);
}

/// Records the outcome of a session call in the application state.
pub(super) fn report(app: &mut App, result: Result<Vec<SessionEvent>, PlaybackError>) {
    match result {
        Ok(events) => {
            for event in events {
                apply_session_event(app, event);
            }
        }
        Err(e) => {
            warn!(error = %e, "playback error");
            app.status = Some(StatusLine::Error(e.to_string()));
        }
    }
}

fn apply_session_event(app: &mut App, event: SessionEvent) {
    match event {
        SessionEvent::ChapterChanged {
            chapter,
            available,
            ..
        } => {
            app.status = (!available)
                .then(|| StatusLine::Info(format!("{} is not available offline", chapter)));
        }
        SessionEvent::ChapterRestarted { .. } => {}
        SessionEvent::AdvanceScheduled { to, .. } => {
            app.status = Some(StatusLine::Info(format!("Up next: {}", to)));
        }
        SessionEvent::AdvanceBlocked { target } => {
            app.status = Some(StatusLine::Info(format!("{} is still downloading", target)));
        }
        SessionEvent::LessonCompleted { .. } => {
            app.completed = true;
            app.status = Some(StatusLine::Info("Lesson complete".to_string()));
        }
        SessionEvent::LessonFinished => {
            app.status = Some(StatusLine::Info("End of lesson".to_string()));
        }
        SessionEvent::MediaRetrying { chapter, attempt } => {
            app.status = Some(StatusLine::Info(format!(
                "Reloading {} media (attempt {})",
                chapter, attempt
            )));
        }
    }
}
