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

//! # Waha lesson player.
//!
//! The playback core of a guided discipleship lesson player. A lesson is made
//! of chapters (Fellowship, Story, Training and Application) whose media is
//! played one after another, and a group's progress records which lessons
//! of a set have been completed.
//!
//! * [`session`]: the playback controller tying everything together.
//! * [`lesson`]: chapter sequencing and completion rules.
//! * [`player`]: media handles and the MPV backend.
//! * [`downloads`] and [`storage`]: where chapter media is played from.
//! * [`store`] and [`db`]: progress and content persistence.

pub mod config;
pub mod db;
pub mod downloads;
pub mod lesson;
pub mod logging;
pub mod model;
pub mod player;
pub mod session;
pub mod storage;
pub mod store;
pub mod util;
