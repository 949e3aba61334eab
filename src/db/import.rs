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

//! Content catalogue import.
//!
//! Lesson content is delivered as a JSON catalogue of sets, each holding its
//! lessons in order. Importing replaces all existing content inside a single
//! transaction; group progress is left untouched.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use rusqlite::{Connection, params};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::model::LessonSet;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    pub sets: Vec<LessonSet>,
}

pub fn parse_catalog(json: &str) -> Result<Catalog> {
    serde_json::from_str(json).context("Failed to parse lesson catalogue")
}

pub fn read_catalog(path: &Path) -> Result<Catalog> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read catalogue {}", path.display()))?;
    parse_catalog(&json)
}

/// Replaces the stored content with the catalogue.
///
/// # Returns
///
/// Returns the total number of lessons imported.
///
/// # Errors
///
/// Returns an error if the transaction fails or the catalogue violates a
/// constraint, such as two lessons sharing an id.
pub fn import_catalog(conn: &mut Connection, catalog: &Catalog) -> Result<usize> {
    let tx = conn.transaction()?;

    tx.execute("DELETE FROM scripture", [])?;
    tx.execute("DELETE FROM lessons", [])?;
    tx.execute("DELETE FROM lesson_sets", [])?;

    let mut count = 0;

    for (position, set) in catalog.sets.iter().enumerate() {
        tx.execute(
            "INSERT INTO lesson_sets (id, title, position) VALUES (?, ?, ?)",
            params![set.id, set.title, position as i64],
        )
        .with_context(|| format!("Failed to insert set {}", set.id))?;

        for (index, lesson) in set.lessons.iter().enumerate() {
            tx.execute(
                "INSERT INTO lessons (id, set_id, lesson_index, title, lesson_type,
                    fellowship_type, application_type, audio_source, video_source, text)
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
                params![
                    lesson.id,
                    set.id,
                    index as i64,
                    lesson.title,
                    lesson.lesson_type,
                    lesson.fellowship_type,
                    lesson.application_type,
                    lesson.audio_source,
                    lesson.video_source,
                    lesson.text,
                ],
            )
            .with_context(|| format!("Failed to insert lesson {}", lesson.id))?;

            for (position, passage) in lesson.scripture.iter().enumerate() {
                tx.execute(
                    "INSERT INTO scripture (lesson_id, position, header, text) VALUES (?, ?, ?, ?)",
                    params![lesson.id, position as i64, passage.header, passage.text],
                )?;
            }

            count += 1;
        }
    }

    tx.commit().context("Failed to commit transaction")?;

    info!(sets = catalog.sets.len(), lessons = count, "imported catalogue");

    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db::{fetch_lesson, fetch_set_lessons, fetch_sets, init_db},
        model::{Chapter, LessonType},
    };

    const CATALOG: &str = r#"{
        "sets": [
            {
                "id": "en.1",
                "title": "Foundations",
                "lessons": [
                    {
                        "id": "en.1.1",
                        "title": "Creation",
                        "type": "standard_dbs",
                        "fellowship_type": "en.dbs-fellowship",
                        "application_type": "en.dbs-application",
                        "audio_source": "https://example.org/en.1.1.mp3",
                        "scripture": [
                            { "header": "Genesis 1:1-25", "text": "In the beginning..." },
                            { "header": "Genesis 2:1-3", "text": "Thus the heavens..." }
                        ]
                    },
                    {
                        "id": "en.1.2",
                        "title": "Making Disciples",
                        "type": "video_only",
                        "video_source": "https://example.org/en.1.2v.mp4"
                    }
                ]
            },
            { "id": "en.2", "title": "Topical", "lessons": [] }
        ]
    }"#;

    #[test]
    fn imported_lesson_is_fetched_with_position_and_scripture() {
        let dir = tempfile::tempdir().unwrap();
        let mut conn = init_db(dir.path().join("waha.db")).unwrap();
        let catalog = parse_catalog(CATALOG).unwrap();

        assert_eq!(import_catalog(&mut conn, &catalog).unwrap(), 2);

        let lesson_ref = fetch_lesson(&conn, "en.1.2").unwrap();
        assert_eq!(lesson_ref.set_id, "en.1");
        assert_eq!(lesson_ref.index, 1);
        assert_eq!(lesson_ref.lesson.lesson_type, LessonType::VideoOnly);
        assert_eq!(lesson_ref.lesson.question_set(Chapter::Fellowship), None);

        let creation = fetch_lesson(&conn, "en.1.1").unwrap();
        assert_eq!(creation.lesson, catalog.sets[0].lessons[0]);
        assert_eq!(creation.lesson.scripture[1].header, "Genesis 2:1-3");
    }

    #[test]
    fn reimport_replaces_content() {
        let dir = tempfile::tempdir().unwrap();
        let mut conn = init_db(dir.path().join("waha.db")).unwrap();
        let mut catalog = parse_catalog(CATALOG).unwrap();
        import_catalog(&mut conn, &catalog).unwrap();

        catalog.sets[0].lessons.truncate(1);
        import_catalog(&mut conn, &catalog).unwrap();

        let sets = fetch_sets(&conn).unwrap();
        assert_eq!(sets.len(), 2);
        assert_eq!(sets[0].lesson_count, 1);
        assert_eq!(sets[1].lesson_count, 0);
        assert_eq!(
            fetch_set_lessons(&conn, "en.1").unwrap(),
            vec![(0, "en.1.1".to_string(), "Creation".to_string())]
        );
        assert!(fetch_lesson(&conn, "en.1.2").is_err());
    }

    #[test]
    fn unknown_lesson_type_is_rejected() {
        let json = r#"{ "sets": [ { "id": "x", "title": "x", "lessons": [
            { "id": "x.1", "title": "x", "type": "piano" } ] } ] }"#;
        assert!(parse_catalog(json).is_err());
    }
}
