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

//! Database row mapping for domain models.
//!
//! This module provides the conversion logic between raw SQLite result rows
//! and the lesson models.

use rusqlite::{
    Result, Row, ToSql,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
};

use crate::model::{Lesson, LessonRef, LessonType};

impl LessonRef {
    /// Maps an SQLite row to a [`LessonRef`] with no scripture attached.
    ///
    /// Columns, in order: id, title, lesson_type, fellowship_type,
    /// application_type, audio_source, video_source, text, set_id,
    /// lesson_index.
    pub(crate) fn from_row(row: &Row) -> Result<Self> {
        Ok(Self {
            lesson: Lesson {
                id: row.get(0)?,
                title: row.get(1)?,
                lesson_type: row.get(2)?,
                fellowship_type: row.get(3)?,
                application_type: row.get(4)?,
                scripture: Vec::new(),
                audio_source: row.get(5)?,
                video_source: row.get(6)?,
                text: row.get(7)?,
            },
            set_id: row.get(8)?,
            index: row.get(9)?,
        })
    }
}

impl ToSql for LessonType {
    fn to_sql(&self) -> Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.tag()))
    }
}

impl FromSql for LessonType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        LessonType::from_tag(value.as_str()?).ok_or(FromSqlError::InvalidType)
    }
}
