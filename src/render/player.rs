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

//! Render the media player interface.
//!
//! This module renders the visual representation of the active chapter,
//! playback state, elapsed time and progress bar.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Padding, Paragraph},
};
use waha_player::util::format::{format_percent, format_time};

use crate::{
    App,
    render::icons::{ICON_PAUSE, ICON_PLAY, ICON_STOP},
};

/// Renders the player widget including chapter info and progress.
pub(crate) fn draw_player(f: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .borders(Borders::TOP | Borders::BOTTOM)
        .border_style(Style::default().fg(app.theme.border_colour))
        .padding(Padding::horizontal(1));

    let inner_area = block.inner(area);
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(inner_area);

    let info_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(0), Constraint::Length(30)])
        .split(chunks[0]);

    let state = app.session.state();

    let Some(chapter) = state.active_chapter else {
        f.render_widget(Paragraph::new("No media for this lesson"), info_chunks[0]);
        return;
    };

    let icon = if !state.media_loaded {
        ICON_STOP
    } else if state.playing {
        ICON_PLAY
    } else {
        ICON_PAUSE
    };

    let mut info = vec![
        emphasised(format!(" {icon} "), app.theme.text_colour),
        emphasised(chapter.label().to_string(), app.theme.accent_colour),
    ];

    if let Some(next) = app.session.pending_advance() {
        info.push(Span::raw(format!("  next: {}", next)).fg(app.theme.border_colour));
    }

    f.render_widget(Paragraph::new(Line::from(info)), info_chunks[0]);

    let remaining = state.duration_ms.saturating_sub(state.position_ms);
    let time_line = Line::from(vec![
        emphasised(format_time(state.position_ms), app.theme.accent_colour),
        emphasised(" of ".to_string(), app.theme.text_colour),
        emphasised(format_time(state.duration_ms), app.theme.accent_colour),
        Span::raw(format!("  -{}", format_time(remaining))).fg(app.theme.border_colour),
    ]);

    f.render_widget(Paragraph::new(time_line).alignment(Alignment::Right), info_chunks[1]);

    let origin = match app.session.handle(chapter.media_kind()).source() {
        Some(source) if source.is_local() => "from this device",
        Some(_) => "streaming",
        None if state.prefer_text => "read along",
        None => "not downloaded",
    };
    f.render_widget(Paragraph::new(origin).fg(app.theme.border_colour), chunks[1]);

    let position_gauge = Gauge::default()
        .gauge_style(
            Style::default()
                .fg(app.theme.accent_colour)
                .bg(app.theme.gauge_track_colour),
        )
        .ratio(state.fraction())
        .label(format_percent(state.fraction()))
        .use_unicode(true);

    f.render_widget(position_gauge, chunks[2]);
}

fn emphasised(text: String, colour: Color) -> Span<'static> {
    Span::styled(text, Style::default().fg(colour).add_modifier(Modifier::BOLD))
}
