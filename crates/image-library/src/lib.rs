//! Image library indexing and thumbnail caching for the SLS gallery viewer
//!
//! An [`ImageLibrary`] maps an image directory tree onto a private, on-disk
//! thumbnail cache and answers the navigation queries a gallery front end
//! needs: what is in each folder, which image represents a folder, which
//! thumbnail belongs to which original, and in what order a carousel should
//! show a folder's images.
//!
//! # Features
//!
//! - **Directory snapshot**: one walk at construction, walk order preserved
//! - **Stable cache location**: `{cache}/sls/{name}-{hash8}/thumbnails`, derived from the root path
//! - **Lazy thumbnails**: orientation-corrected, bounded to a fixed box, written atomically
//! - **Graceful degradation**: unreadable images resolve to a placeholder, never an error
//! - **Panel model**: plain row records for any rendering layer

pub mod cache;
pub mod error;
mod generate;
pub mod index;
pub mod library;
pub mod panel;
pub mod resolver;

pub use cache::ThumbnailCache;
pub use error::{LibraryError, Result};
pub use index::{DirectoryContents, DirectoryIndexer, DirectorySnapshot};
pub use library::ImageLibrary;
pub use panel::{chunk, folder_rows, library_rows, prettify_path, PanelRow};
pub use resolver::CacheDirectoryResolver;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Fallback image handed out whenever a real thumbnail cannot be produced
pub const PLACEHOLDER_IMAGE: &str = "resources/missing_image.png";

/// Application directory under the platform cache dir
pub const APP_CACHE_DIR: &str = "sls";

/// Configuration for an [`ImageLibrary`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LibraryConfig {
    /// Directory under which each library gets its own cache directory
    pub cache_base_dir: PathBuf,
    /// Edge of the bounding box thumbnails are shrunk into
    pub thumbnail_size: u32,
    pub placeholder: PathBuf,
    /// Sort names by file name while indexing instead of keeping walk order
    pub sort_entries: bool,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            cache_base_dir: default_cache_base_dir(),
            thumbnail_size: 100,
            placeholder: PathBuf::from(PLACEHOLDER_IMAGE),
            sort_entries: false,
        }
    }
}

impl LibraryConfig {
    /// Default configuration with the cache rooted at `cache_base_dir`
    pub fn with_cache_dir(cache_base_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_base_dir: cache_base_dir.into(),
            ..Self::default()
        }
    }
}

fn default_cache_base_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_CACHE_DIR)
}

/// Expand a leading `~` to the user's home directory
pub fn expand_home(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => match dirs::home_dir() {
            Some(home) => home.join(rest),
            None => path.to_path_buf(),
        },
        Err(_) => path.to_path_buf(),
    }
}
