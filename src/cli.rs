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

//! Command-line interface.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(author, version, about)]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub(crate) command: Command,
}

#[derive(Debug, Subcommand)]
pub(crate) enum Command {
    /// Replace the stored lesson content with a JSON catalogue.
    Import {
        /// Path of the catalogue file.
        catalog: PathBuf,
    },
    /// List the available lesson sets.
    Sets,
    /// Show the lessons a group has completed.
    Progress(GroupArgs),
    /// Mark a completed lesson as not complete again.
    Unmark(UnmarkArgs),
    /// Open a lesson in the player.
    Play(PlayArgs),
}

#[derive(Debug, Args)]
pub(crate) struct GroupArgs {
    /// Group whose progress is shown.
    #[arg(long)]
    pub(crate) group: String,
}

#[derive(Debug, Args)]
pub(crate) struct UnmarkArgs {
    #[arg(long)]
    pub(crate) group: String,

    #[arg(long)]
    pub(crate) set: String,

    /// Index of the lesson within its set.
    #[arg(long)]
    pub(crate) index: u32,
}

#[derive(Debug, Args)]
pub(crate) struct PlayArgs {
    /// Id of the lesson to open.
    pub(crate) lesson: String,

    /// Group the lesson is played with.
    #[arg(long)]
    pub(crate) group: String,

    /// Only play media that is stored locally.
    #[arg(long)]
    pub(crate) offline: bool,
}
