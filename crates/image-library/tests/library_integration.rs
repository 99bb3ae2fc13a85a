use anyhow::Result;
use filetime::FileTime;
use image::{GenericImageView, Rgb, RgbImage};
use image_library::{library_rows, ImageLibrary, LibraryConfig, LibraryError, PanelRow};
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use tempfile::{tempdir, TempDir};

fn write_jpeg(path: &Path, width: u32, height: u32) -> Result<()> {
    fs::create_dir_all(path.parent().unwrap())?;
    RgbImage::from_fn(width, height, |x, y| Rgb([(x % 256) as u8, (y % 256) as u8, 90])).save(path)?;
    Ok(())
}

/// Library root holding `a.jpg`, `b.jpg` and `sub/c.jpg`
fn scenario() -> Result<(TempDir, PathBuf, LibraryConfig)> {
    let dir = tempdir()?;
    let photos = dir.path().join("Pictures");
    write_jpeg(&photos.join("a.jpg"), 640, 480)?;
    write_jpeg(&photos.join("b.jpg"), 480, 640)?;
    write_jpeg(&photos.join("sub/c.jpg"), 320, 320)?;

    let config = LibraryConfig {
        sort_entries: true,
        ..LibraryConfig::with_cache_dir(dir.path().join("cache"))
    };
    Ok((dir, photos, config))
}

#[test]
fn test_index_and_navigation() -> Result<()> {
    let (_dir, photos, config) = scenario()?;
    let library = ImageLibrary::with_config(&photos, config)?;

    let entries: Vec<_> = library.contents().iter().map(|(dir, _)| dir.to_path_buf()).collect();
    assert_eq!(entries, vec![PathBuf::from("."), PathBuf::from("sub")]);

    let root = library.contents().get(".").unwrap();
    assert_eq!(root.subdirectories, vec!["sub"]);
    assert_eq!(root.files, vec!["a.jpg", "b.jpg"]);
    assert_eq!(library.contents().get("sub").unwrap().files, vec!["c.jpg"]);

    assert_eq!(library.first_image_of("sub")?, Some(PathBuf::from("sub/c.jpg")));
    assert_eq!(library.list_images(".", None)?, vec!["a.jpg", "b.jpg"]);
    assert_eq!(library.list_images(".", Some(OsStr::new("b.jpg")))?, vec!["b.jpg", "a.jpg"]);
    Ok(())
}

#[test]
fn test_thumbnail_is_created_once() -> Result<()> {
    let (_dir, photos, config) = scenario()?;
    let library = ImageLibrary::with_config(&photos, config)?;

    let first = library.thumbnail("a.jpg");
    assert_eq!(first, library.thumbnail_root().join("a.jpg"));
    assert_eq!(image::open(&first)?.dimensions(), (100, 75));

    // Backdate the thumbnail so a rewrite would be visible
    let old = FileTime::from_unix_time(1_000_000_000, 0);
    filetime::set_file_mtime(&first, old)?;

    let second = library.thumbnail("a.jpg");
    assert_eq!(first, second);
    assert_eq!(FileTime::from_last_modification_time(&fs::metadata(&second)?), old);
    Ok(())
}

#[test]
fn test_thumbnails_survive_reopening() -> Result<()> {
    let (_dir, photos, config) = scenario()?;

    let thumbnail = ImageLibrary::with_config(&photos, config.clone())?.thumbnail("sub/c.jpg");
    let reopened = ImageLibrary::with_config(&photos, config)?;

    assert!(thumbnail.starts_with(reopened.thumbnail_root()));
    assert_eq!(reopened.thumbnail_to_original(&thumbnail)?, reopened.root().join("sub/c.jpg"));
    assert_eq!(reopened.thumbnail_to_directory(&thumbnail)?, PathBuf::from("sub"));
    Ok(())
}

#[test]
fn test_cache_directory_name() -> Result<()> {
    let (dir, photos, config) = scenario()?;
    let library = ImageLibrary::with_config(&photos, config)?;

    let name = library
        .thumbnail_root()
        .parent()
        .and_then(Path::file_name)
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap();
    assert!(name.starts_with("Pictures-"));
    assert_eq!(name.len(), "Pictures-".len() + 8);
    assert!(library.thumbnail_root().ends_with("thumbnails"));
    assert!(library.thumbnail_root().starts_with(dir.path().join("cache")));
    Ok(())
}

#[test]
fn test_unreadable_image_falls_back_to_placeholder() -> Result<()> {
    let (_dir, photos, config) = scenario()?;
    fs::write(photos.join("broken.jpg"), b"not an image at all")?;
    let library = ImageLibrary::with_config(&photos, config)?;

    assert_eq!(library.thumbnail("broken.jpg"), library.config().placeholder);
    assert!(!library.thumbnail_root().join("broken.jpg").exists());
    Ok(())
}

#[test]
fn test_parallel_thumbnails_and_carousel() -> Result<()> {
    let (_dir, photos, config) = scenario()?;
    let library = ImageLibrary::with_config(&photos, config)?;

    let paths = library.image_paths();
    let progress = AtomicUsize::new(0);
    let thumbnails = library.thumbnails(&paths, |completed, total| {
        assert_eq!(total, 3);
        progress.fetch_max(completed, Ordering::Relaxed);
    });

    assert_eq!(progress.load(Ordering::Relaxed), 3);
    for (path, thumbnail) in paths.iter().zip(&thumbnails) {
        assert_eq!(thumbnail, &library.thumbnail_root().join(path));
    }

    let carousel = library.carousel_for(&thumbnails[1])?;
    assert_eq!(
        carousel,
        vec![library.root().join("b.jpg"), library.root().join("a.jpg")]
    );
    Ok(())
}

#[test]
fn test_foreign_thumbnail_is_rejected() -> Result<()> {
    let (_dir, photos, config) = scenario()?;
    let library = ImageLibrary::with_config(&photos, config)?;

    let result = library.thumbnail_to_original(photos.join("a.jpg"));
    assert!(matches!(result, Err(LibraryError::ForeignThumbnail(_))));
    Ok(())
}

#[test]
fn test_panel_rows() -> Result<()> {
    let (_dir, photos, config) = scenario()?;
    let library = ImageLibrary::with_config(&photos, config)?;

    let rows = library_rows(&library, 2)?;
    assert!(matches!(&rows[0], PanelRow::Label { main: true, .. }));
    assert_eq!(
        rows[1],
        PanelRow::ImageRow {
            columns: 2,
            image_paths: vec![
                library.thumbnail_root().join("a.jpg"),
                library.thumbnail_root().join("b.jpg"),
            ],
        }
    );
    assert_eq!(
        rows[2],
        PanelRow::Label {
            text: "sub".to_string(),
            main: false,
        }
    );
    assert_eq!(
        rows[3],
        PanelRow::FolderRow {
            columns: 2,
            directory: PathBuf::from("sub"),
            image_path: library.thumbnail_root().join("sub").join("c.jpg"),
        }
    );
    Ok(())
}
