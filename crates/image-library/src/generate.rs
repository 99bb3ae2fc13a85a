//! Thumbnail generation pipeline
//!
//! Decodes a source image with the `image` crate, applies its stored EXIF
//! orientation, shrinks it into the configured bounding box and writes the
//! result next to its final location before renaming it into place.

use crate::error::ThumbnailError;
use image::metadata::Orientation;
use image::{imageops::FilterType, ColorType, DynamicImage, GenericImageView, ImageDecoder, ImageFormat, ImageReader};
use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::debug;

/// Produce the thumbnail of `source` at `target`
pub(crate) fn generate_thumbnail(
    source: &Path,
    target: &Path,
    max_dimension: u32,
) -> Result<(), ThumbnailError> {
    let (img, source_format) = decode_oriented(source)?;
    let resized = resize_image(img, max_dimension);

    let format = ImageFormat::from_path(target)
        .ok()
        .or(source_format)
        .ok_or_else(|| ThumbnailError::InvalidPath(target.to_path_buf()))?;

    write_atomically(&resized, target, format)?;

    debug!(
        "Generated thumbnail {} ({}x{})",
        target.display(),
        resized.width(),
        resized.height()
    );
    Ok(())
}

/// Decode an image and rotate/flip it upright according to its metadata
fn decode_oriented(source: &Path) -> Result<(DynamicImage, Option<ImageFormat>), ThumbnailError> {
    let reader = ImageReader::open(source)?.with_guessed_format()?;
    let format = reader.format();

    let mut decoder = reader.into_decoder()?;
    let orientation = decoder.orientation().unwrap_or(Orientation::NoTransforms);

    let mut img = DynamicImage::from_decoder(decoder)?;
    img.apply_orientation(orientation);

    Ok((img, format))
}

/// Shrink an image to fit within `max_dim` on both sides, preserving aspect ratio
pub(crate) fn resize_image(img: DynamicImage, max_dim: u32) -> DynamicImage {
    let (width, height) = img.dimensions();
    let max_existing = width.max(height);

    // Never upscale
    if max_existing <= max_dim {
        return img;
    }

    let ratio = max_dim as f64 / max_existing as f64;
    let new_width = ((width as f64 * ratio).round() as u32).max(1);
    let new_height = ((height as f64 * ratio).round() as u32).max(1);

    img.resize_exact(new_width, new_height, FilterType::Lanczos3)
}

/// Encode into a temporary file beside `target`, then rename it over `target`
fn write_atomically(img: &DynamicImage, target: &Path, format: ImageFormat) -> Result<(), ThumbnailError> {
    let directory = target
        .parent()
        .ok_or_else(|| ThumbnailError::InvalidPath(target.to_path_buf()))?;
    fs::create_dir_all(directory)?;

    let encodable = match (format, img.color()) {
        (ImageFormat::Jpeg, ColorType::L8 | ColorType::Rgb8) => None,
        (ImageFormat::Jpeg, _) => Some(DynamicImage::ImageRgb8(img.to_rgb8())),
        _ => None,
    };
    let img = encodable.as_ref().unwrap_or(img);

    let mut temp = NamedTempFile::new_in(directory)?;
    {
        let mut writer = BufWriter::new(temp.as_file_mut());
        img.write_to(&mut writer, format)?;
        writer.flush()?;
    }
    temp.persist(target)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage, Rgba, RgbaImage};
    use tempfile::tempdir;

    #[test]
    fn test_resize_logic() {
        let img = DynamicImage::new_rgb8(1000, 800);

        let resized = resize_image(img, 100);
        assert_eq!(resized.dimensions(), (100, 80));

        let tall = resize_image(DynamicImage::new_rgb8(300, 1200), 100);
        assert_eq!(tall.dimensions(), (25, 100));

        // Small images are not upscaled
        let small_img = DynamicImage::new_rgb8(60, 40);
        let not_resized = resize_image(small_img.clone(), 100);
        assert_eq!(not_resized.dimensions(), small_img.dimensions());
    }

    #[test]
    fn test_resize_keeps_extreme_aspect_ratios_visible() {
        let sliver = resize_image(DynamicImage::new_rgb8(5000, 10), 100);
        assert_eq!(sliver.dimensions(), (100, 1));
    }

    #[test]
    fn test_generate_png_thumbnail() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("wide.png");
        RgbImage::from_pixel(400, 200, Rgb([10, 200, 30])).save(&source).unwrap();

        let target = dir.path().join("thumbs").join("nested").join("wide.png");
        generate_thumbnail(&source, &target, 100).unwrap();

        let thumb = image::open(&target).unwrap();
        assert_eq!(thumb.dimensions(), (100, 50));
    }

    #[test]
    fn test_generate_jpeg_from_rgba_source() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("alpha.png");
        RgbaImage::from_pixel(50, 50, Rgba([0, 0, 255, 128])).save(&source).unwrap();

        // The target extension decides the output format
        let target = dir.path().join("alpha.jpg");
        generate_thumbnail(&source, &target, 100).unwrap();

        let reader = ImageReader::open(&target).unwrap().with_guessed_format().unwrap();
        assert_eq!(reader.format(), Some(ImageFormat::Jpeg));
    }

    #[test]
    fn test_generate_fails_for_garbage() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("broken.jpg");
        fs::write(&source, b"definitely not a jpeg").unwrap();

        let target = dir.path().join("out").join("broken.jpg");
        assert!(generate_thumbnail(&source, &target, 100).is_err());
        assert!(!target.exists());
    }

    #[test]
    fn test_generate_fails_for_missing_source() {
        let dir = tempdir().unwrap();
        let result = generate_thumbnail(&dir.path().join("missing.png"), &dir.path().join("t.png"), 100);
        assert!(matches!(result, Err(ThumbnailError::Io(_))));
    }

    /// JPEG bytes with an EXIF APP1 segment carrying `orientation`
    fn jpeg_with_orientation(img: &RgbImage, orientation: u16) -> Vec<u8> {
        let mut jpeg = Vec::new();
        DynamicImage::ImageRgb8(img.clone())
            .write_to(&mut std::io::Cursor::new(&mut jpeg), ImageFormat::Jpeg)
            .unwrap();

        // Big-endian TIFF header, one IFD entry: tag 0x0112, SHORT, count 1
        let mut exif = b"Exif\0\0MM\0\x2a\0\0\0\x08\0\x01\x01\x12\0\x03\0\0\0\x01".to_vec();
        exif.extend_from_slice(&orientation.to_be_bytes());
        exif.extend_from_slice(&[0, 0, 0, 0, 0, 0]);

        let mut segment = vec![0xff, 0xe1];
        segment.extend_from_slice(&(exif.len() as u16 + 2).to_be_bytes());
        segment.extend_from_slice(&exif);

        // Right after the SOI marker
        jpeg.splice(2..2, segment);
        jpeg
    }

    #[test]
    fn test_exif_orientation_is_applied() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("rotated.jpg");
        let img = RgbImage::from_pixel(80, 40, Rgb([30, 30, 30]));
        fs::write(&source, jpeg_with_orientation(&img, 6)).unwrap();

        let target = dir.path().join("thumbs").join("rotated.png");
        generate_thumbnail(&source, &target, 100).unwrap();
        assert_eq!(image::open(&target).unwrap().dimensions(), (40, 80));

        // Orientation 1 leaves the image as stored
        let upright = dir.path().join("upright.jpg");
        fs::write(&upright, jpeg_with_orientation(&img, 1)).unwrap();
        let target = dir.path().join("thumbs").join("upright.png");
        generate_thumbnail(&upright, &target, 100).unwrap();
        assert_eq!(image::open(&target).unwrap().dimensions(), (80, 40));
    }
}
