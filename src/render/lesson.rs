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

//! Render the lesson header, chapter selector, chapter body and status line.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Padding, Paragraph, Wrap},
};
use waha_player::model::{Chapter, Lesson};

use crate::{
    App, StatusLine,
    render::icons::{ICON_COMPLETE, ICON_TEXT},
};

pub(crate) fn draw_header(f: &mut Frame, area: Rect, app: &App) {
    let lesson_ref = app.session.lesson_ref();

    let mut spans = vec![
        Span::styled(
            &lesson_ref.lesson.title,
            Style::default().add_modifier(Modifier::BOLD),
        )
        .fg(app.theme.accent_colour),
        Span::raw(format!("  {} #{}", lesson_ref.set_id, lesson_ref.index + 1))
            .fg(app.theme.border_colour),
    ];

    if app.completed {
        spans.push(Span::raw(format!("  {}", ICON_COMPLETE)).fg(app.theme.accent_colour));
    }

    let block = Block::default().padding(Padding::horizontal(1));
    f.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

/// Renders the selectable chapters with their key, highlighting the active
/// one and dimming the ones that cannot be played.
pub(crate) fn draw_chapters(f: &mut Frame, area: Rect, app: &App) {
    let active = app.session.active_chapter();

    let mut spans = Vec::new();
    for (i, &chapter) in app.session.chapters().iter().enumerate() {
        let label = format!(" {} {} ", i + 1, chapter);
        let style = if Some(chapter) == active {
            Style::default()
                .fg(app.theme.gauge_track_colour)
                .bg(app.theme.accent_colour)
                .add_modifier(Modifier::BOLD)
        } else if app.session.chapter_available(chapter) {
            Style::default().fg(app.theme.text_colour)
        } else {
            Style::default().fg(app.theme.disabled_colour)
        };
        spans.push(Span::styled(label, style));
        spans.push(Span::raw(" "));
    }

    let block = Block::default()
        .borders(Borders::TOP | Borders::BOTTOM)
        .border_style(Style::default().fg(app.theme.border_colour))
        .padding(Padding::horizontal(1));

    f.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

pub(crate) fn draw_body(f: &mut Frame, area: Rect, app: &App) {
    let lesson = app.session.lesson();
    let state = app.session.state();

    let lines = match state.active_chapter {
        Some(Chapter::Story) => story_lines(app, lesson, state.prefer_text),
        Some(chapter @ (Chapter::Fellowship | Chapter::Application)) => {
            let set = lesson.question_set(chapter).unwrap_or("none");
            vec![
                Line::from(format!("{} questions", chapter))
                    .fg(app.theme.header_colour)
                    .add_modifier(Modifier::BOLD),
                Line::from(format!("Question set: {}", set)),
            ]
        }
        Some(Chapter::Training) => vec![Line::from("Training video plays in its own window.")],
        None => text_lines(lesson),
    };

    let block = Block::default().padding(Padding::new(2, 2, 1, 0));
    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false })
        .fg(app.theme.text_colour);

    f.render_widget(paragraph, area);
}

fn story_lines<'a>(app: &App, lesson: &'a Lesson, prefer_text: bool) -> Vec<Line<'a>> {
    let mut lines = Vec::new();

    if prefer_text {
        lines.push(Line::from(format!("{} Read along", ICON_TEXT)).fg(app.theme.border_colour));
        lines.push(Line::default());
    }

    for passage in &lesson.scripture {
        lines.push(
            Line::from(passage.header.as_str())
                .fg(app.theme.header_colour)
                .add_modifier(Modifier::BOLD),
        );
        lines.push(Line::from(passage.text.as_str()));
        lines.push(Line::default());
    }

    lines.extend(text_lines(lesson));
    lines
}

fn text_lines(lesson: &Lesson) -> Vec<Line<'_>> {
    lesson
        .text
        .as_deref()
        .map(|text| text.lines().map(Line::from).collect())
        .unwrap_or_default()
}

pub(crate) fn draw_status(f: &mut Frame, area: Rect, app: &App) {
    let line = match &app.status {
        Some(StatusLine::Info(message)) => Line::from(message.as_str()).fg(app.theme.accent_colour),
        Some(StatusLine::Error(message)) => Line::from(message.as_str()).fg(app.theme.error_colour),
        None => Line::from("space play/pause  ,/. seek  1-4 chapter  r restart  q quit")
            .fg(app.theme.border_colour),
    };

    let block = Block::default().padding(Padding::horizontal(1));
    f.render_widget(Paragraph::new(line).block(block), area);
}
