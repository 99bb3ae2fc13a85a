//! On-disk thumbnail cache
//!
//! Thumbnails mirror the layout of the source tree: the thumbnail of
//! `{root}/holiday/beach.jpg` lives at `{thumbnail_root}/holiday/beach.jpg`.
//! They are generated on first request and reused afterwards. Any failure to
//! produce one resolves to the placeholder image so a single bad file never
//! stops a gallery from rendering.

use crate::generate::generate_thumbnail;
use rayon::prelude::*;
use std::path::{Component, Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, warn};

/// Thumbnail cache for one library root
#[derive(Debug, Clone)]
pub struct ThumbnailCache {
    source_root: PathBuf,
    thumbnail_root: PathBuf,
    max_dimension: u32,
    placeholder: PathBuf,
}

impl ThumbnailCache {
    /// Create a cache for images under `source_root`, storing thumbnails under
    /// `thumbnail_root`, which must already exist.
    pub fn new(
        source_root: impl Into<PathBuf>,
        thumbnail_root: impl Into<PathBuf>,
        max_dimension: u32,
        placeholder: impl Into<PathBuf>,
    ) -> Self {
        Self {
            source_root: source_root.into(),
            thumbnail_root: thumbnail_root.into(),
            max_dimension,
            placeholder: placeholder.into(),
        }
    }

    pub fn thumbnail_root(&self) -> &Path {
        &self.thumbnail_root
    }

    pub fn placeholder(&self) -> &Path {
        &self.placeholder
    }

    /// Where the thumbnail of `relative_path` is stored, whether or not it exists yet
    pub fn thumbnail_path(&self, relative_path: &Path) -> PathBuf {
        self.thumbnail_root.join(relative_path)
    }

    /// Get the thumbnail of an image, generating it if not cached.
    ///
    /// Returns the placeholder path if the image cannot be read, decoded or
    /// written; this never fails.
    pub fn get_or_create(&self, relative_path: impl AsRef<Path>) -> PathBuf {
        let relative_path = relative_path.as_ref();

        if !is_contained(relative_path) {
            warn!(
                "Refusing thumbnail for path outside the library: {}",
                relative_path.display()
            );
            return self.placeholder.clone();
        }

        let target = self.thumbnail_path(relative_path);
        if target.is_file() {
            debug!("Thumbnail cache hit: {}", target.display());
            return target;
        }

        let source = self.source_root.join(relative_path);
        match generate_thumbnail(&source, &target, self.max_dimension) {
            Ok(()) => target,
            Err(e) => {
                warn!(
                    "Failed to create thumbnail for {}, using placeholder: {}",
                    source.display(),
                    e
                );
                self.placeholder.clone()
            }
        }
    }

    /// Get or create thumbnails for many images in parallel.
    ///
    /// Results are in input order. `progress_callback` receives
    /// `(completed, total)` after each image.
    pub fn get_or_create_batch<P, F>(&self, relative_paths: &[P], progress_callback: F) -> Vec<PathBuf>
    where
        P: AsRef<Path> + Sync,
        F: Fn(usize, usize) + Send + Sync,
    {
        let total = relative_paths.len();
        let completed = AtomicUsize::new(0);

        relative_paths
            .par_iter()
            .map(|relative_path| {
                let thumbnail = self.get_or_create(relative_path);

                let current = completed.fetch_add(1, Ordering::Relaxed) + 1;
                progress_callback(current, total);

                thumbnail
            })
            .collect()
    }
}

/// A relative path that stays inside the directory it is joined to
fn is_contained(path: &Path) -> bool {
    !path.as_os_str().is_empty()
        && path
            .components()
            .all(|component| matches!(component, Component::Normal(_) | Component::CurDir))
}
