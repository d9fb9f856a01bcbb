//! I/O helpers for RGBA images and JSON.
//!
//! - `load_rgba_image`: read a PNG/JPEG/etc. into an owned `PixelBuffer`.
//! - `save_rgba_image`: write a `PixelBuffer`, format chosen by extension.
//! - `write_json_file`: pretty-print a serializable value to disk.
use super::PixelBuffer;
use crate::error::{Result, StencilError};
use image::RgbaImage;
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Load an image from disk and convert to 8-bit RGBA.
pub fn load_rgba_image(path: &Path) -> Result<PixelBuffer> {
    let img = image::open(path)
        .map_err(|source| StencilError::Load {
            path: path.to_path_buf(),
            source,
        })?
        .into_rgba8();
    let width = img.width() as usize;
    let height = img.height() as usize;
    PixelBuffer::from_raw(width, height, img.into_raw())
}

/// Save an RGBA buffer, creating parent directories and overwriting `path`.
///
/// Formats without alpha (e.g. JPEG) receive the RGB channels only.
pub fn save_rgba_image(buffer: &PixelBuffer, path: &Path) -> Result<()> {
    ensure_parent_dir(path)?;
    let (width, height) = buffer.dims();
    let rgba = RgbaImage::from_raw(width as u32, height as u32, buffer.as_bytes().to_vec())
        .ok_or_else(|| StencilError::BufferSize {
            width,
            height,
            expected: width * height * super::CHANNELS,
            actual: buffer.as_bytes().len(),
        })?;
    let save_err = |source: image::ImageError| StencilError::Save {
        path: path.to_path_buf(),
        source,
    };
    match image::ImageFormat::from_path(path) {
        Ok(image::ImageFormat::Jpeg) => image::DynamicImage::ImageRgba8(rgba)
            .into_rgb8()
            .save(path)
            .map_err(save_err),
        _ => rgba.save(path).map_err(save_err),
    }
}

/// Serialize a value as pretty JSON to `path`, creating parent directories.
pub fn write_json_file<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    ensure_parent_dir(path)?;
    let json = serde_json::to_string_pretty(value).map_err(|source| StencilError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    fs::write(path, json).map_err(|source| StencilError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|source| StencilError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::ImageView;

    #[test]
    fn png_round_trip_preserves_pixels() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("grad.png");
        let img = PixelBuffer::from_fn(4, 3, |x, y| [x as u8 * 40, y as u8 * 70, 9, 200]);
        save_rgba_image(&img, &path).unwrap();
        let back = load_rgba_image(&path).unwrap();
        assert_eq!(back, img);
        assert_eq!(back.pixel(3, 2), [120, 140, 9, 200]);
    }

    #[test]
    fn missing_file_is_a_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_rgba_image(&dir.path().join("absent.png")).unwrap_err();
        assert!(matches!(err, StencilError::Load { .. }));
    }
}
