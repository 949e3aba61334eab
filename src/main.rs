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

//! # Waha lesson player TUI.
//!
//! A terminal-based player for guided discipleship lessons.
//!
//! This application coordinates a TUI frontend built with `ratatui`, the
//! lesson playback session from the library crate and two MPV workers, one
//! for audio and one for video.
//!
//! It uses an event-driven architecture where:
//!
//! * The **Main Thread** owns the playback session, manages the terminal
//!   lifecycle and renders the UI.
//! * **Media Workers** run MPV and report playback progress as events.
//! * **Event Loops** capture user input and system ticks; ticks drive the
//!   delayed chapter advances.
//!
//! ## Architecture
//!
//! The application follows a strict setup-run-teardown pattern to ensure the
//! terminal state is restored and all media is unloaded even when the event
//! loop fails. Communication between the UI and the workers is handled via
//! `std::sync::mpsc` channels.

mod cli;
mod events;
mod render;
mod theme;

use std::{
    io,
    path::Path,
    process::ExitCode,
    sync::mpsc::{self, Receiver, Sender},
    thread,
    time::Duration,
};

use anyhow::{Context, Result};
use clap::Parser as _;
use crossterm::{
    event, execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::debug;
use waha_player::{
    config::{self, AppConfig},
    db::{self, SqliteProgressStore, import},
    downloads::Downloads,
    logging,
    model::MediaKind,
    player::mpv::MpvBackend,
    session::{PlaybackSession, SessionDeps},
    storage::LocalMediaStore,
    store::ProgressRepository,
    util::clock::SystemClock,
};

use crate::{
    cli::{Cli, Command, PlayArgs},
    events::{AppEvent, process_events},
    theme::Theme,
};

const TICK_INTERVAL: Duration = Duration::from_millis(250);

pub(crate) type Session = PlaybackSession<MpvBackend, SqliteProgressStore, SystemClock>;

/// A line of feedback shown beneath the player.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum StatusLine {
    Info(String),
    Error(String),
}

/// Application state.
pub(crate) struct App {
    pub(crate) theme: Theme,

    pub(crate) event_tx: Sender<AppEvent>,
    pub(crate) event_rx: Receiver<AppEvent>,

    pub(crate) session: Session,

    pub(crate) status: Option<StatusLine>,
    pub(crate) completed: bool,
}

impl App {
    /// Create a new instance of application state.
    pub(crate) fn new(
        session: Session,
        event_tx: Sender<AppEvent>,
        event_rx: Receiver<AppEvent>,
    ) -> Self {
        let completed = session.is_complete();

        Self {
            theme: Theme::default(),
            event_tx,
            event_rx,
            session,
            status: None,
            completed,
        }
    }
}

/// The entry point of the application.
fn main() -> ExitCode {
    if let Err(err) = try_main() {
        eprintln!("{err:#}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

fn try_main() -> Result<()> {
    let cli = Cli::parse();
    let config = config::load_config();

    logging::init(Path::new(&config.log_file)).context("Failed to initialise logging")?;
    debug!(?cli, "parsed cli");

    match cli.command {
        Command::Import { catalog } => {
            let mut store = SqliteProgressStore::open(&config.database_file)?;
            let catalog = import::read_catalog(&catalog)?;
            let count = import::import_catalog(store.connection_mut(), &catalog)?;
            println!("Imported {} lessons in {} sets", count, catalog.sets.len());
        }
        Command::Sets => {
            let store = SqliteProgressStore::open(&config.database_file)?;
            for set in db::fetch_sets(store.connection())? {
                println!("{}\t{}\t({} lessons)", set.id, set.title, set.lesson_count);
                for (index, id, title) in db::fetch_set_lessons(store.connection(), &set.id)? {
                    println!("  {index:>3}  {id}\t{title}");
                }
            }
        }
        Command::Progress(args) => {
            let store = SqliteProgressStore::open(&config.database_file)?;
            for (set_id, indices) in store.group_progress(&args.group)? {
                let indices: Vec<String> = indices.iter().map(u32::to_string).collect();
                println!("{}\t{}", set_id, indices.join(", "));
            }
        }
        Command::Unmark(args) => {
            let mut store = SqliteProgressStore::open(&config.database_file)?;
            store.set_incomplete(&args.group, &args.set, args.index)?;
        }
        Command::Play(args) => play(&config, args).context("Failed to play lesson")?,
    }

    Ok(())
}

/// Opens the lesson, runs the player until the user quits and tears
/// everything down again.
fn play(config: &AppConfig, args: PlayArgs) -> Result<()> {
    let store = SqliteProgressStore::open(&config.database_file)?;
    let lesson_ref = db::fetch_lesson(store.connection(), &args.lesson)?;
    let storage = LocalMediaStore::open(config.media_path())?;

    let (event_tx, event_rx) = mpsc::channel();

    let deps = SessionDeps {
        audio: MpvBackend::spawn(MediaKind::Audio, event_tx.clone()),
        video: MpvBackend::spawn(MediaKind::Video, event_tx.clone()),
        progress: store,
        storage: Box::new(storage),
        clock: SystemClock,
    };

    let session = PlaybackSession::open(
        &args.group,
        lesson_ref,
        Downloads::new(),
        !args.offline,
        deps,
        config.timing(),
    )
    .context("Failed to open lesson")?;

    let mut app = App::new(session, event_tx, event_rx);

    let mut terminal = setup_terminal()?;
    let res = run(&mut terminal, &mut app);
    restore_terminal(&mut terminal);

    app.session.close();

    res.context("Application error occurred")
}

/// Prepares the terminal for the TUI application.
///
/// # Errors
///
/// Returns an error if raw mode cannot be enabled or if the alternate screen
/// cannot be entered.
fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("Failed to enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend).context("Failed to create terminal")?;

    Ok(terminal)
}

/// Restores the terminal to its original state.
///
/// This function is "best-effort" and does not return a result, as it is
/// called during cleanup.
fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) {
    disable_raw_mode().ok();
    execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
    terminal.show_cursor().ok();
}

/// Starts the input and tick threads and enters the main event loop.
fn run(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    // Translate raw key events to application events.
    let tx_keys = app.event_tx.clone();
    thread::spawn(move || {
        loop {
            if let Ok(event::Event::Key(key)) = event::read() {
                if tx_keys.send(AppEvent::Key(key)).is_err() {
                    break;
                }
            }
        }
    });

    // Periodic tick, the minimum frame rate and the resolution of chapter
    // advance delays.
    let tx_tick = app.event_tx.clone();
    thread::spawn(move || {
        while tx_tick.send(AppEvent::Tick).is_ok() {
            thread::sleep(TICK_INTERVAL);
        }
    });

    process_events(terminal, app)
}
