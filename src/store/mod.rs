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

//! Lesson progress repository.
//!
//! Progress is recorded per group and per set as the list of completed lesson
//! indices. The playback session only talks to the [`ProgressRepository`]
//! trait; [`crate::db::SqliteProgressStore`] persists it and
//! [`InMemoryProgressStore`] backs tests.

use std::collections::{BTreeSet, HashMap};

use anyhow::Result;

pub trait ProgressRepository {
    /// Completed lesson indices for a group's set, in ascending order.
    fn get_progress(&self, group_id: &str, set_id: &str) -> Result<Vec<u32>>;

    /// Marks a lesson complete; marking an already complete lesson is a
    /// no-op.
    fn set_complete(&mut self, group_id: &str, set_id: &str, lesson_index: u32) -> Result<()>;

    fn set_incomplete(&mut self, group_id: &str, set_id: &str, lesson_index: u32) -> Result<()>;

    fn is_complete(&self, group_id: &str, set_id: &str, lesson_index: u32) -> Result<bool> {
        Ok(self.get_progress(group_id, set_id)?.contains(&lesson_index))
    }
}

#[derive(Debug, Default, Clone)]
pub struct InMemoryProgressStore {
    progress: HashMap<(String, String), BTreeSet<u32>>,
    writes: usize,
}

impl InMemoryProgressStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `set_complete` calls that changed stored progress.
    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl ProgressRepository for InMemoryProgressStore {
    fn get_progress(&self, group_id: &str, set_id: &str) -> Result<Vec<u32>> {
        let key = (group_id.to_string(), set_id.to_string());
        Ok(self
            .progress
            .get(&key)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default())
    }

    fn set_complete(&mut self, group_id: &str, set_id: &str, lesson_index: u32) -> Result<()> {
        let key = (group_id.to_string(), set_id.to_string());
        if self.progress.entry(key).or_default().insert(lesson_index) {
            self.writes += 1;
        }
        Ok(())
    }

    fn set_incomplete(&mut self, group_id: &str, set_id: &str, lesson_index: u32) -> Result<()> {
        let key = (group_id.to_string(), set_id.to_string());
        if let Some(set) = self.progress.get_mut(&key) {
            set.remove(&lesson_index);
        }
        Ok(())
    }
}

impl<R: ProgressRepository + ?Sized> ProgressRepository for &mut R {
    fn get_progress(&self, group_id: &str, set_id: &str) -> Result<Vec<u32>> {
        (**self).get_progress(group_id, set_id)
    }

    fn set_complete(&mut self, group_id: &str, set_id: &str, lesson_index: u32) -> Result<()> {
        (**self).set_complete(group_id, set_id, lesson_index)
    }

    fn set_incomplete(&mut self, group_id: &str, set_id: &str, lesson_index: u32) -> Result<()> {
        (**self).set_incomplete(group_id, set_id, lesson_index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_is_scoped_by_group_and_set() {
        let mut store = InMemoryProgressStore::new();
        store.set_complete("family", "en.1", 3).unwrap();
        store.set_complete("family", "en.1", 1).unwrap();
        store.set_complete("friends", "en.1", 2).unwrap();

        assert_eq!(store.get_progress("family", "en.1").unwrap(), vec![1, 3]);
        assert_eq!(store.get_progress("friends", "en.1").unwrap(), vec![2]);
        assert!(store.get_progress("family", "en.2").unwrap().is_empty());
    }

    #[test]
    fn set_complete_is_idempotent() {
        let mut store = InMemoryProgressStore::new();
        store.set_complete("family", "en.1", 1).unwrap();
        store.set_complete("family", "en.1", 1).unwrap();
        assert_eq!(store.writes(), 1);
        assert!(store.is_complete("family", "en.1", 1).unwrap());
    }

    #[test]
    fn manual_unmark_removes_index() {
        let mut store = InMemoryProgressStore::new();
        store.set_complete("family", "en.1", 1).unwrap();
        store.set_incomplete("family", "en.1", 1).unwrap();
        store.set_incomplete("family", "en.9", 1).unwrap();
        assert!(!store.is_complete("family", "en.1", 1).unwrap());
    }
}
