//! Row model for the gallery panel
//!
//! The panel is a flat list of rows: folder labels, rows of image thumbnails
//! and folder tiles. Rows are plain data built from the library's query API,
//! so any front end can render them.

use crate::error::{LibraryError, Result};
use crate::index::{join_relative, normalize_relative, ROOT_DIR};
use crate::library::ImageLibrary;
use serde::Serialize;
use std::path::{Component, Path, PathBuf};

/// Separator between path components in folder labels
const LABEL_SEPARATOR: &str = " › ";

/// One row of the gallery panel
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "widget")]
pub enum PanelRow {
    /// Folder title; `main` marks the title of the whole library
    Label { text: String, main: bool },
    /// Up to `columns` thumbnails side by side
    ImageRow { columns: usize, image_paths: Vec<PathBuf> },
    /// A subdirectory tile showing its cover thumbnail
    FolderRow {
        columns: usize,
        directory: PathBuf,
        image_path: PathBuf,
    },
}

impl PanelRow {
    fn label(path: &Path, main: bool) -> Self {
        PanelRow::Label {
            text: prettify_path(path),
            main,
        }
    }
}

/// Join the components of `path` with ` › `
pub fn prettify_path(path: &Path) -> String {
    path.components()
        .filter_map(|component| match component {
            Component::Normal(name) => Some(name.to_string_lossy().into_owned()),
            Component::Prefix(prefix) => Some(prefix.as_os_str().to_string_lossy().into_owned()),
            Component::ParentDir => Some("..".to_string()),
            Component::RootDir | Component::CurDir => None,
        })
        .collect::<Vec<_>>()
        .join(LABEL_SEPARATOR)
}

/// Split `items` into consecutive groups of `size`; the last one may be shorter
pub fn chunk<T>(items: &[T], size: usize) -> impl Iterator<Item = &[T]> {
    items.chunks(size.max(1))
}

/// Rows for one directory: its label, its images, then a tile per subdirectory
pub fn folder_rows(library: &ImageLibrary, directory: impl AsRef<Path>, columns: usize) -> Result<Vec<PanelRow>> {
    let directory = normalize_relative(directory.as_ref());
    let columns = columns.max(1);
    let contents = library
        .contents()
        .get(&directory)
        .ok_or_else(|| LibraryError::UnknownDirectory(directory.clone()))?;

    let mut rows = Vec::new();
    if directory != Path::new(ROOT_DIR) {
        rows.push(PanelRow::label(&directory, false));
    }

    for names in chunk(&contents.files, columns) {
        let image_paths = names
            .iter()
            .map(|name| library.thumbnail(join_relative(&directory, name)))
            .collect();
        rows.push(PanelRow::ImageRow { columns, image_paths });
    }

    for subdirectory in &contents.subdirectories {
        let subdirectory = join_relative(&directory, subdirectory);
        let image_path = library.cover_thumbnail(&subdirectory)?;

        rows.push(PanelRow::label(&subdirectory, false));
        rows.push(PanelRow::FolderRow {
            columns,
            directory: subdirectory,
            image_path,
        });
    }

    Ok(rows)
}

/// Rows for the whole panel: the library title followed by the root's rows
pub fn library_rows(library: &ImageLibrary, columns: usize) -> Result<Vec<PanelRow>> {
    let home = dirs::home_dir();
    let title = home
        .as_deref()
        .and_then(|home| library.root().strip_prefix(home).ok())
        .filter(|relative| !relative.as_os_str().is_empty())
        .unwrap_or(library.root());

    let mut rows = vec![PanelRow::label(title, true)];
    rows.extend(folder_rows(library, ROOT_DIR, columns)?);
    Ok(rows)
}
