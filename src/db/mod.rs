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

//! Data access layer.
//!
//! This module handles all interactions with the SQLite database, including
//! schema creation, fetching lesson content and persisting group progress.
//! It uses cached statements for frequently executed queries.
//!
//! # Tables
//!
//! * `lesson_sets` - Ordered collections of lessons.
//! * `lessons` - Individual lessons, positioned within their set.
//! * `scripture` - Scripture passages read in a lesson's Story chapter.
//! * `set_progress` - Completed lesson indices per group and set.

pub mod import;
mod model;

use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension, params};

use crate::{
    model::{LessonRef, ScripturePassage},
    store::ProgressRepository,
};

/// Summary row for listing sets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetSummary {
    pub id: String,
    pub title: String,
    pub lesson_count: u32,
}

/// Opens a connection to the SQLite database and configures it.
///
/// This function performs the following setup:
/// * **WAL Mode**: Enables Write-Ahead Logging.
/// * **Constraints**: Enforces foreign key integrity.
/// * **Schema**: Executes [`create_schema`] to ensure all tables exist.
///
/// # Errors
///
/// Returns an error if the database file cannot be opened, the PRAGMA
/// configuration fails or the schema cannot be created.
pub fn init_db(path: impl AsRef<Path>) -> Result<Connection> {
    let path = path.as_ref();
    let conn = Connection::open(path)
        .with_context(|| format!("Failed to open database {}", path.display()))?;

    let journal_mode: String = conn.query_row("PRAGMA journal_mode = WAL", [], |r| r.get(0))?;
    if journal_mode != "wal" {
        anyhow::bail!(
            "Failed to switch to WAL mode. Current mode: {}",
            journal_mode
        );
    }

    conn.execute_batch(
        "
        PRAGMA synchronous = NORMAL;
        PRAGMA foreign_keys = ON;
    ",
    )?;

    conn.set_prepared_statement_cache_capacity(32);

    create_schema(&conn)?;

    Ok(conn)
}

/// Create the database schema.
///
/// Progress rows are deliberately not tied to `lessons` by a foreign key, so
/// re-importing content never discards a group's progress.
fn create_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "BEGIN;

        CREATE TABLE IF NOT EXISTS lesson_sets (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            position INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS lessons (
            id TEXT PRIMARY KEY,
            set_id TEXT NOT NULL,
            lesson_index INTEGER NOT NULL,
            title TEXT NOT NULL,
            lesson_type TEXT NOT NULL,
            fellowship_type TEXT,
            application_type TEXT,
            audio_source TEXT,
            video_source TEXT,
            text TEXT,
            UNIQUE (set_id, lesson_index),
            FOREIGN KEY (set_id) REFERENCES lesson_sets (id) ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_lessons_set_id ON lessons (set_id);

        CREATE TABLE IF NOT EXISTS scripture (
            lesson_id TEXT NOT NULL,
            position INTEGER NOT NULL,
            header TEXT NOT NULL,
            text TEXT NOT NULL,
            PRIMARY KEY (lesson_id, position),
            FOREIGN KEY (lesson_id) REFERENCES lessons (id) ON DELETE CASCADE
        );

        CREATE TABLE IF NOT EXISTS set_progress (
            group_id TEXT NOT NULL,
            set_id TEXT NOT NULL,
            lesson_index INTEGER NOT NULL,
            PRIMARY KEY (group_id, set_id, lesson_index)
        );

        COMMIT;",
    )
    .context("Failed to create schema")
}

/// Fetches all lesson sets in catalogue order, with their lesson counts.
pub fn fetch_sets(conn: &Connection) -> Result<Vec<SetSummary>> {
    let mut stmt = conn.prepare_cached(
        "SELECT s.id, s.title, COUNT(l.id)
         FROM lesson_sets s
         LEFT JOIN lessons l ON l.set_id = s.id
         GROUP BY s.id
         ORDER BY s.position",
    )?;

    let results = stmt
        .query_map([], |row| {
            Ok(SetSummary {
                id: row.get(0)?,
                title: row.get(1)?,
                lesson_count: row.get(2)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(results)
}

/// Fetches a lesson, its scripture and its position within its set.
///
/// # Errors
///
/// Returns an error if no lesson has the given id or the query fails.
pub fn fetch_lesson(conn: &Connection, lesson_id: &str) -> Result<LessonRef> {
    let mut stmt = conn.prepare_cached(
        "SELECT id, title, lesson_type, fellowship_type, application_type,
                audio_source, video_source, text, set_id, lesson_index
         FROM lessons
         WHERE id = ?",
    )?;

    let mut lesson_ref = stmt
        .query_row([lesson_id], LessonRef::from_row)
        .optional()?
        .with_context(|| format!("No lesson with id {}", lesson_id))?;

    lesson_ref.lesson.scripture = fetch_scripture(conn, lesson_id)?;

    Ok(lesson_ref)
}

fn fetch_scripture(conn: &Connection, lesson_id: &str) -> Result<Vec<ScripturePassage>> {
    let mut stmt = conn.prepare_cached(
        "SELECT header, text FROM scripture WHERE lesson_id = ? ORDER BY position",
    )?;

    let results = stmt
        .query_map([lesson_id], |row| {
            Ok(ScripturePassage {
                header: row.get(0)?,
                text: row.get(1)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(results)
}

/// Fetches the ids and titles of a set's lessons in index order.
pub fn fetch_set_lessons(conn: &Connection, set_id: &str) -> Result<Vec<(u32, String, String)>> {
    let mut stmt = conn.prepare_cached(
        "SELECT lesson_index, id, title FROM lessons WHERE set_id = ? ORDER BY lesson_index",
    )?;

    let results = stmt
        .query_map([set_id], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)))?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(results)
}

/// Group progress persisted in the `set_progress` table.
pub struct SqliteProgressStore {
    conn: Connection,
}

impl SqliteProgressStore {
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::new(init_db(path)?))
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn connection_mut(&mut self) -> &mut Connection {
        &mut self.conn
    }

    /// All stored progress for a group, as `(set_id, completed indices)`.
    pub fn group_progress(&self, group_id: &str) -> Result<Vec<(String, Vec<u32>)>> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT set_id, lesson_index FROM set_progress
             WHERE group_id = ?
             ORDER BY set_id, lesson_index",
        )?;

        let rows = stmt
            .query_map([group_id], |row| Ok((row.get::<_, String>(0)?, row.get::<_, u32>(1)?)))?
            .collect::<Result<Vec<_>, _>>()?;

        let mut results: Vec<(String, Vec<u32>)> = Vec::new();
        for (set_id, index) in rows {
            match results.last_mut() {
                Some((last, indices)) if *last == set_id => indices.push(index),
                _ => results.push((set_id, vec![index])),
            }
        }

        Ok(results)
    }
}

impl ProgressRepository for SqliteProgressStore {
    fn get_progress(&self, group_id: &str, set_id: &str) -> Result<Vec<u32>> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT lesson_index FROM set_progress
             WHERE group_id = ? AND set_id = ?
             ORDER BY lesson_index",
        )?;

        let results = stmt
            .query_map(params![group_id, set_id], |row| row.get(0))?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(results)
    }

    fn set_complete(&mut self, group_id: &str, set_id: &str, lesson_index: u32) -> Result<()> {
        let mut stmt = self.conn.prepare_cached(
            "INSERT OR IGNORE INTO set_progress (group_id, set_id, lesson_index)
             VALUES (?1, ?2, ?3)",
        )?;
        stmt.execute(params![group_id, set_id, lesson_index])
            .context("Failed to mark lesson complete")?;

        Ok(())
    }

    fn set_incomplete(&mut self, group_id: &str, set_id: &str, lesson_index: u32) -> Result<()> {
        let mut stmt = self.conn.prepare_cached(
            "DELETE FROM set_progress
             WHERE group_id = ?1 AND set_id = ?2 AND lesson_index = ?3",
        )?;
        stmt.execute(params![group_id, set_id, lesson_index])
            .context("Failed to unmark lesson")?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("waha.db");

        {
            let mut store = SqliteProgressStore::open(&path).unwrap();
            store.set_complete("family", "en.1", 2).unwrap();
            store.set_complete("family", "en.1", 0).unwrap();
            store.set_complete("family", "en.1", 2).unwrap();
        }

        let store = SqliteProgressStore::open(&path).unwrap();
        assert_eq!(store.get_progress("family", "en.1").unwrap(), vec![0, 2]);
        assert!(store.is_complete("family", "en.1", 2).unwrap());
        assert!(!store.is_complete("friends", "en.1", 2).unwrap());
    }

    #[test]
    fn unmark_and_group_listing() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = SqliteProgressStore::open(dir.path().join("waha.db")).unwrap();
        store.set_complete("family", "en.1", 0).unwrap();
        store.set_complete("family", "en.1", 1).unwrap();
        store.set_complete("family", "en.2", 4).unwrap();
        store.set_incomplete("family", "en.1", 0).unwrap();

        assert_eq!(
            store.group_progress("family").unwrap(),
            vec![("en.1".to_string(), vec![1]), ("en.2".to_string(), vec![4])]
        );
    }

    #[test]
    fn missing_lesson_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let conn = init_db(dir.path().join("waha.db")).unwrap();
        let err = fetch_lesson(&conn, "en.9.9").unwrap_err();
        assert!(err.to_string().contains("en.9.9"));
    }
}
