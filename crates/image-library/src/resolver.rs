//! Cache directory naming
//!
//! Every library gets its own cache directory named after the library root:
//! the root's base name followed by a short hash of the full path. Two roots
//! with the same base name therefore never share thumbnails, and the same
//! root finds its thumbnails again after a restart.

use crate::error::{LibraryError, Result};
use base64::{engine::general_purpose, Engine as _};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Number of hash characters kept in a cache directory name
const HASH_LENGTH: usize = 8;

/// Subdirectory of a library's cache directory holding the thumbnails
pub const THUMBNAIL_DIR: &str = "thumbnails";

#[derive(Debug, Clone, Copy, Default)]
pub struct CacheDirectoryResolver;

impl CacheDirectoryResolver {
    /// `{base name}-{first 8 chars of url-safe base64(sha256(path))}`
    ///
    /// The path is hashed exactly as given, so callers should pass a
    /// canonical absolute path to get a stable name.
    pub fn derive_name(path: &Path) -> String {
        let base_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        let digest = Sha256::digest(path.to_string_lossy().as_bytes());
        let encoded = general_purpose::URL_SAFE.encode(digest);

        format!("{}-{}", base_name, &encoded[..HASH_LENGTH])
    }

    /// Resolve and create `{cache_base_dir}/{derive_name(path)}/thumbnails`
    pub fn resolve_cache_root(path: &Path, cache_base_dir: &Path) -> Result<PathBuf> {
        let cache_root = cache_base_dir
            .join(Self::derive_name(path))
            .join(THUMBNAIL_DIR);

        fs::create_dir_all(&cache_root).map_err(|source| LibraryError::CacheDirUnavailable {
            path: cache_root.clone(),
            source,
        })?;

        debug!("Thumbnail cache for {}: {}", path.display(), cache_root.display());
        Ok(cache_root)
    }
}
