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

//! Local media storage.
//!
//! This module answers file-existence queries for downloaded lesson media.
//! The on-disk store indexes its directory with `WalkDir` and uses `Lofty` to
//! skip audio files that cannot be read, such as downloads that were cut
//! short.

use std::{
    collections::{HashMap, HashSet},
    path::{Path, PathBuf},
};

use anyhow::Result;
use lofty::{prelude::*, probe::Probe};
use tracing::{debug, warn};
use walkdir::WalkDir;

pub trait MediaStorage {
    /// Returns the path of a complete local file with this name, if any.
    fn local_file(&self, name: &str) -> Option<PathBuf>;

    /// Picks up files written since the last lookup, such as a download that
    /// just completed.
    fn refresh(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Media files found under a directory on disk.
pub struct LocalMediaStore {
    root: PathBuf,
    files: HashMap<String, PathBuf>,
}

impl LocalMediaStore {
    /// Opens and indexes the media directory, which need not exist yet.
    pub fn open(root: impl AsRef<Path>) -> Result<Self> {
        let mut store = Self {
            root: root.as_ref().to_path_buf(),
            files: HashMap::new(),
        };
        store.rescan()?;
        Ok(store)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Rebuilds the index from the directory contents.
    ///
    /// Returns the number of usable files found.
    pub fn rescan(&mut self) -> Result<usize> {
        self.files.clear();

        if !self.root.exists() {
            debug!(root = %self.root.display(), "media directory does not exist");
            return Ok(0);
        }

        for entry in WalkDir::new(&self.root)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
        {
            let path = entry.path();
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };

            if !is_usable(path) {
                warn!(path = %path.display(), "skipping unreadable media file");
                continue;
            }

            self.files.insert(name.to_string(), path.to_path_buf());
        }

        debug!(root = %self.root.display(), count = self.files.len(), "indexed media");

        Ok(self.files.len())
    }
}

// Audio must probe cleanly and report a duration, anything else only needs
// to be non-empty.
fn is_usable(path: &Path) -> bool {
    let is_audio = path.extension().is_some_and(|ext| ext == "mp3");

    if is_audio {
        match Probe::open(path).and_then(|p| p.read()) {
            Ok(file) => !file.properties().duration().is_zero(),
            Err(_) => false,
        }
    } else {
        path.metadata().map(|m| m.len() > 0).unwrap_or(false)
    }
}

impl MediaStorage for LocalMediaStore {
    fn local_file(&self, name: &str) -> Option<PathBuf> {
        self.files.get(name).cloned()
    }

    fn refresh(&mut self) -> Result<()> {
        self.rescan().map(|_| ())
    }
}

/// A storage fake holding file names only, resolving each to a relative path
/// of the same name.
#[derive(Clone, Debug, Default)]
pub struct MemoryStorage {
    files: HashSet<String>,
}

impl MemoryStorage {
    pub fn with_files<'a>(names: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            files: names.into_iter().map(str::to_string).collect(),
        }
    }

    pub fn insert(&mut self, name: &str) {
        self.files.insert(name.to_string());
    }
}

impl MediaStorage for MemoryStorage {
    fn local_file(&self, name: &str) -> Option<PathBuf> {
        self.files.contains(name).then(|| PathBuf::from(name))
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn missing_directory_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalMediaStore::open(dir.path().join("absent")).unwrap();
        assert_eq!(store.local_file("en.1.1v.mp4"), None);
    }

    #[test]
    fn indexes_nested_video_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("en")).unwrap();
        fs::write(dir.path().join("en/en.1.1v.mp4"), b"not empty").unwrap();
        fs::write(dir.path().join("en/en.1.2v.mp4"), b"").unwrap();

        let store = LocalMediaStore::open(dir.path()).unwrap();
        assert_eq!(
            store.local_file("en.1.1v.mp4"),
            Some(dir.path().join("en/en.1.1v.mp4"))
        );
        assert_eq!(store.local_file("en.1.2v.mp4"), None);
    }

    #[test]
    fn truncated_audio_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("en.1.1.mp3"), b"ID3").unwrap();

        let store = LocalMediaStore::open(dir.path()).unwrap();
        assert_eq!(store.local_file("en.1.1.mp3"), None);
    }

    #[test]
    fn rescan_picks_up_new_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = LocalMediaStore::open(dir.path()).unwrap();
        assert_eq!(store.local_file("en.1.1v.mp4"), None);

        fs::write(dir.path().join("en.1.1v.mp4"), b"video").unwrap();
        assert_eq!(store.rescan().unwrap(), 1);
        assert!(store.local_file("en.1.1v.mp4").is_some());
    }

    #[test]
    fn refresh_through_the_trait_rescans() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage: Box<dyn MediaStorage> =
            Box::new(LocalMediaStore::open(dir.path()).unwrap());

        fs::write(dir.path().join("en.1.1v.mp4"), b"video").unwrap();
        assert_eq!(storage.local_file("en.1.1v.mp4"), None);

        storage.refresh().unwrap();
        assert_eq!(
            storage.local_file("en.1.1v.mp4"),
            Some(dir.path().join("en.1.1v.mp4"))
        );
    }

    #[test]
    fn memory_storage_resolves_by_name() {
        let mut storage = MemoryStorage::default();
        storage.insert("en.dbs-fellowship.mp3");
        assert_eq!(
            storage.local_file("en.dbs-fellowship.mp3"),
            Some(PathBuf::from("en.dbs-fellowship.mp3"))
        );
        assert_eq!(storage.local_file("en.1.1.mp3"), None);
    }
}
