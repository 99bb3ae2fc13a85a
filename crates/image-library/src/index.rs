//! One-shot directory indexing
//!
//! The indexer walks a library root once and records, for every directory it
//! reaches, the names of its subdirectories and files. The resulting
//! [`DirectorySnapshot`] is immutable; callers that need fresh contents build
//! a new one.

use crate::error::{LibraryError, Result};
use serde::{Serialize, Serializer};
use std::collections::HashMap;
use std::ffi::OsString;
use std::fmt;
use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Snapshot key of the library root
pub const ROOT_DIR: &str = ".";

/// Names found directly inside one directory, in walk order
///
/// Names are kept exactly as the filesystem returned them, so they can be
/// joined back onto the root even when they are not valid UTF-8.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DirectoryContents {
    #[serde(serialize_with = "serialize_names")]
    pub subdirectories: Vec<OsString>,
    #[serde(serialize_with = "serialize_names")]
    pub files: Vec<OsString>,
}

fn serialize_names<S: Serializer>(names: &[OsString], serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.collect_seq(names.iter().map(|name| name.to_string_lossy()))
}

/// Immutable map from relative directory path to its contents
///
/// Keys are relative to the library root, with `.` for the root itself and
/// `sub/deeper` (never `./sub/deeper`) below it.
#[derive(Debug, Clone, Default)]
pub struct DirectorySnapshot {
    order: Vec<PathBuf>,
    entries: HashMap<PathBuf, DirectoryContents>,
}

impl DirectorySnapshot {
    /// Contents of `directory`; accepts `""`, `"."` and `"./x"` spellings
    pub fn get(&self, directory: impl AsRef<Path>) -> Option<&DirectoryContents> {
        self.entries.get(&normalize_relative(directory.as_ref()))
    }

    pub fn contains(&self, directory: impl AsRef<Path>) -> bool {
        self.get(directory).is_some()
    }

    /// Contents of the library root
    pub fn root(&self) -> Option<&DirectoryContents> {
        self.entries.get(Path::new(ROOT_DIR))
    }

    /// Number of directories in the snapshot
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Entries in the order the walk reached them, root first
    pub fn iter(&self) -> impl Iterator<Item = (&Path, &DirectoryContents)> + '_ {
        self.order
            .iter()
            .filter_map(|dir| self.entries.get(dir).map(|contents| (dir.as_path(), contents)))
    }

    /// Total number of files across all directories
    pub fn file_count(&self) -> usize {
        self.entries.values().map(|contents| contents.files.len()).sum()
    }

    fn insert(&mut self, directory: PathBuf) {
        if !self.entries.contains_key(&directory) {
            self.order.push(directory.clone());
            self.entries.insert(directory, DirectoryContents::default());
        }
    }

    /// Drop a directory that could not be read, together with its listing in
    /// the parent.
    fn remove(&mut self, directory: &Path) {
        self.entries.retain(|dir, _| !dir.starts_with(directory));
        self.order.retain(|dir| !dir.starts_with(directory));

        let parent = normalize_relative(directory.parent().unwrap_or(Path::new("")));
        if let (Some(name), Some(contents)) = (directory.file_name(), self.entries.get_mut(&parent)) {
            contents.subdirectories.retain(|subdir| subdir.as_os_str() != name);
        }
    }
}

impl fmt::Display for DirectorySnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (dir, contents) in self.iter() {
            writeln!(
                f,
                "{}: ({:?}, {:?})",
                dir.display(),
                contents.subdirectories,
                contents.files
            )?;
        }
        Ok(())
    }
}

/// Builds a [`DirectorySnapshot`] with a single recursive walk
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectoryIndexer {
    sort_entries: bool,
}

impl DirectoryIndexer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sort names by file name instead of keeping the filesystem's order
    pub fn sort_entries(mut self, sort_entries: bool) -> Self {
        self.sort_entries = sort_entries;
        self
    }

    /// Walk `root` and record every readable directory below it.
    ///
    /// Unreadable subdirectories, broken links and link loops are left out of
    /// the snapshot. Only a root that cannot be opened is an error.
    pub fn index(&self, root: &Path) -> Result<DirectorySnapshot> {
        fs::read_dir(root).map_err(|source| LibraryError::RootNotFound {
            path: root.to_path_buf(),
            source,
        })?;

        let mut walker = WalkDir::new(root).follow_links(true).min_depth(1);
        if self.sort_entries {
            walker = walker.sort_by_file_name();
        }

        let mut snapshot = DirectorySnapshot::default();
        snapshot.insert(PathBuf::from(ROOT_DIR));

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping unreadable entry under {}: {}", root.display(), e);
                    if let Some(relative) = e.path().and_then(|path| path.strip_prefix(root).ok()) {
                        if !relative.as_os_str().is_empty() {
                            snapshot.remove(relative);
                        }
                    }
                    continue;
                }
            };

            let Ok(relative) = entry.path().strip_prefix(root) else {
                continue;
            };
            let parent = normalize_relative(relative.parent().unwrap_or(Path::new("")));
            let name = entry.file_name().to_os_string();
            let is_dir = entry.file_type().is_dir();

            let Some(contents) = snapshot.entries.get_mut(&parent) else {
                continue;
            };
            if is_dir {
                contents.subdirectories.push(name);
                snapshot.insert(relative.to_path_buf());
            } else {
                contents.files.push(name);
            }
        }

        debug!(
            "Indexed {}: {} directories, {} files",
            root.display(),
            snapshot.len(),
            snapshot.file_count()
        );

        Ok(snapshot)
    }
}

/// Bring a relative directory path into snapshot key form
pub fn normalize_relative(path: &Path) -> PathBuf {
    let normalized: PathBuf = path
        .components()
        .filter(|component| !matches!(component, Component::CurDir))
        .collect();

    if normalized.as_os_str().is_empty() {
        PathBuf::from(ROOT_DIR)
    } else {
        normalized
    }
}

/// Path of `name` inside the relative directory `directory`
pub fn join_relative(directory: &Path, name: impl AsRef<Path>) -> PathBuf {
    let directory = normalize_relative(directory);
    if directory == Path::new(ROOT_DIR) {
        name.as_ref().to_path_buf()
    } else {
        directory.join(name)
    }
}
