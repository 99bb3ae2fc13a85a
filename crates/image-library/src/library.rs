//! The image library: a snapshot of one directory tree plus its thumbnail cache

use crate::cache::ThumbnailCache;
use crate::error::{LibraryError, Result};
use crate::index::{join_relative, normalize_relative, DirectoryContents, DirectoryIndexer, DirectorySnapshot};
use crate::resolver::CacheDirectoryResolver;
use crate::{expand_home, LibraryConfig};
use circular_list::CircularList;
use std::ffi::{OsStr, OsString};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::info;

/// An indexed image directory tree with a private thumbnail cache
///
/// The tree is indexed once when the library is opened. Queries take paths
/// relative to the library root: directories as `.`, `sub` or `sub/deeper`,
/// images as `a.jpg` or `sub/c.jpg`.
#[derive(Debug, Clone)]
pub struct ImageLibrary {
    root: PathBuf,
    contents: DirectorySnapshot,
    cache: ThumbnailCache,
    config: LibraryConfig,
}

impl ImageLibrary {
    /// Open a library with the default configuration
    pub fn new(root: impl AsRef<Path>) -> Result<Self> {
        Self::with_config(root, LibraryConfig::default())
    }

    /// Open a library, index it and make sure its cache directory exists
    pub fn with_config(root: impl AsRef<Path>, config: LibraryConfig) -> Result<Self> {
        let expanded = expand_home(root.as_ref());
        let root = expanded
            .canonicalize()
            .map_err(|source| LibraryError::RootNotFound {
                path: expanded.clone(),
                source,
            })?;

        let contents = DirectoryIndexer::new()
            .sort_entries(config.sort_entries)
            .index(&root)?;
        let thumbnail_root = CacheDirectoryResolver::resolve_cache_root(&root, &config.cache_base_dir)?;
        let cache = ThumbnailCache::new(
            root.clone(),
            thumbnail_root,
            config.thumbnail_size,
            config.placeholder.clone(),
        );

        info!(
            "Opened image library {} ({} directories, {} files), thumbnails in {}",
            root.display(),
            contents.len(),
            contents.file_count(),
            cache.thumbnail_root().display()
        );

        Ok(Self {
            root,
            contents,
            cache,
            config,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn contents(&self) -> &DirectorySnapshot {
        &self.contents
    }

    pub fn thumbnail_root(&self) -> &Path {
        self.cache.thumbnail_root()
    }

    pub fn config(&self) -> &LibraryConfig {
        &self.config
    }

    fn directory(&self, directory: &Path) -> Result<&DirectoryContents> {
        self.contents
            .get(directory)
            .ok_or_else(|| LibraryError::UnknownDirectory(normalize_relative(directory)))
    }

    /// Relative path of the first image in `directory`, or `None` if it holds
    /// no files and should be shown with the placeholder
    pub fn first_image_of(&self, directory: impl AsRef<Path>) -> Result<Option<PathBuf>> {
        let directory = directory.as_ref();
        let contents = self.directory(directory)?;

        Ok(contents.files.first().map(|name| join_relative(directory, name)))
    }

    /// Thumbnail representing `directory`: that of its first image, or the
    /// placeholder for a folder without files
    pub fn cover_thumbnail(&self, directory: impl AsRef<Path>) -> Result<PathBuf> {
        Ok(match self.first_image_of(directory)? {
            Some(image) => self.thumbnail(image),
            None => self.config.placeholder.clone(),
        })
    }

    /// Thumbnail of the image at `relative_path`, generated on first use
    pub fn thumbnail(&self, relative_path: impl AsRef<Path>) -> PathBuf {
        self.cache.get_or_create(relative_path)
    }

    /// Thumbnails of many images, generated in parallel; results in input order
    pub fn thumbnails<P, F>(&self, relative_paths: &[P], progress_callback: F) -> Vec<PathBuf>
    where
        P: AsRef<Path> + Sync,
        F: Fn(usize, usize) + Send + Sync,
    {
        self.cache.get_or_create_batch(relative_paths, progress_callback)
    }

    /// File names in `directory`.
    ///
    /// With `starting_from`, the list is rotated so that image comes first and
    /// the ones before it wrap around to the end.
    pub fn list_images(&self, directory: impl AsRef<Path>, starting_from: Option<&OsStr>) -> Result<Vec<OsString>> {
        let directory = directory.as_ref();
        let files = &self.directory(directory)?.files;

        let Some(first) = starting_from else {
            return Ok(files.clone());
        };

        let position = files
            .iter()
            .position(|name| name == first)
            .ok_or_else(|| LibraryError::ImageNotInDirectory {
                directory: normalize_relative(directory),
                image: PathBuf::from(first),
            })?;

        let ring = CircularList::new(files.len(), files.iter().cloned())?;
        (position..position + files.len())
            .map(|index| ring.get(index as isize).cloned().map_err(LibraryError::from))
            .collect()
    }

    /// Relative path of the image a thumbnail was made from
    fn thumbnail_relative<'a>(&self, thumbnail: &'a Path) -> Result<&'a Path> {
        match thumbnail.strip_prefix(self.thumbnail_root()) {
            Ok(relative) if !relative.as_os_str().is_empty() => Ok(relative),
            _ => Err(LibraryError::ForeignThumbnail(thumbnail.to_path_buf())),
        }
    }

    /// Absolute path of the original image behind `thumbnail`
    pub fn thumbnail_to_original(&self, thumbnail: impl AsRef<Path>) -> Result<PathBuf> {
        let relative = self.thumbnail_relative(thumbnail.as_ref())?;
        Ok(self.root.join(relative))
    }

    /// Relative directory holding the original image behind `thumbnail`
    pub fn thumbnail_to_directory(&self, thumbnail: impl AsRef<Path>) -> Result<PathBuf> {
        let relative = self.thumbnail_relative(thumbnail.as_ref())?;
        Ok(normalize_relative(relative.parent().unwrap_or(Path::new(""))))
    }

    /// Absolute paths of every image in the directory of `thumbnail`,
    /// beginning with the image the thumbnail shows
    pub fn carousel_for(&self, thumbnail: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
        let thumbnail = thumbnail.as_ref();
        let directory = self.thumbnail_to_directory(thumbnail)?;
        let name = self
            .thumbnail_relative(thumbnail)?
            .file_name()
            .ok_or_else(|| LibraryError::ForeignThumbnail(thumbnail.to_path_buf()))?;

        Ok(self
            .list_images(&directory, Some(name))?
            .iter()
            .map(|file| self.root.join(join_relative(&directory, file)))
            .collect())
    }

    /// Relative paths of every image in the library, directory by directory
    pub fn image_paths(&self) -> Vec<PathBuf> {
        self.contents
            .iter()
            .flat_map(|(directory, contents)| {
                contents
                    .files
                    .iter()
                    .map(move |file| join_relative(directory, file))
            })
            .collect()
    }
}

impl fmt::Display for ImageLibrary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.contents, f)
    }
}
