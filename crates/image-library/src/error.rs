use circular_list::CircularListError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("Library root cannot be opened: {}", .path.display())]
    RootNotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to create thumbnail cache directory: {}", .path.display())]
    CacheDirUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Directory is not part of the library: {}", .0.display())]
    UnknownDirectory(PathBuf),

    #[error("Image {} is not in directory {}", .image.display(), .directory.display())]
    ImageNotInDirectory { directory: PathBuf, image: PathBuf },

    #[error("Thumbnail is outside the library's thumbnail directory: {}", .0.display())]
    ForeignThumbnail(PathBuf),

    #[error("Circular list error: {0}")]
    CircularList(#[from] CircularListError),
}

pub type Result<T> = std::result::Result<T, LibraryError>;

/// Failures while producing a single thumbnail. These never leave the crate:
/// the cache logs them and hands out the placeholder instead.
#[derive(Debug, Error)]
pub(crate) enum ThumbnailError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Failed to move thumbnail into place: {0}")]
    Persist(#[from] tempfile::PersistError),

    #[error("Invalid image path: {}", .0.display())]
    InvalidPath(PathBuf),
}
