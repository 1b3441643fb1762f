// Export module
// Encodes the contrast-adjusted pixels read back from the GPU

use image::{DynamicImage, ImageFormat, RgbaImage};
use log::info;
use std::path::Path;
use thiserror::Error;

/// Default export location, relative to the working directory
pub const DEFAULT_OUTPUT: &str = "out.jpg";

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Failed to allocate read-back buffer: {0}")]
    ReadBackAlloc(String),

    #[error("Failed to map read-back buffer: {0}")]
    ReadBackMap(String),

    #[error("Read-back buffer has {actual} bytes, expected {expected}")]
    InvalidBuffer { expected: usize, actual: usize },

    #[error("Failed to encode image: {0}")]
    Encode(#[from] image::ImageError),
}

/// Pixels read back from the contrast target
#[derive(Debug, Clone)]
pub struct PixelBuffer {
    pub width: u32,
    pub height: u32,
    /// RGBA rows, bottom row first (same order as uploaded)
    pub rgba_data: Vec<u8>,
}

/// Write `pixels` to `path` with `channels` channels, restoring top-first rows
pub fn write_image(path: &Path, pixels: PixelBuffer, channels: u8) -> Result<(), ExportError> {
    let expected = pixels.width as usize * pixels.height as usize * 4;
    let actual = pixels.rgba_data.len();
    let rgba = RgbaImage::from_raw(pixels.width, pixels.height, pixels.rgba_data)
        .ok_or(ExportError::InvalidBuffer { expected, actual })?;
    let img = DynamicImage::ImageRgba8(rgba).flipv();

    // JPEG and friends cannot store alpha
    let keeps_alpha = ImageFormat::from_path(path)
        .map(|format| format != ImageFormat::Jpeg)
        .unwrap_or(true);
    let img = match (channels, keeps_alpha) {
        (1, _) | (2, false) => DynamicImage::ImageLuma8(img.into_luma8()),
        (2, true) => DynamicImage::ImageLumaA8(img.into_luma_alpha8()),
        (4, true) => img,
        _ => DynamicImage::ImageRgb8(img.into_rgb8()),
    };

    img.save(path)?;
    info!(
        "Saved {}x{} image to {}",
        img.width(),
        img.height(),
        path.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn out_dir() -> TempDir {
        tempfile::tempdir().unwrap()
    }

    fn solid(width: u32, height: u32, rgba: [u8; 4]) -> PixelBuffer {
        PixelBuffer {
            width,
            height,
            rgba_data: rgba.repeat((width * height) as usize),
        }
    }

    #[test]
    fn writes_png_with_alpha() {
        let dir = out_dir();
        let path = dir.path().join("alpha.png");
        write_image(&path, solid(5, 3, [10, 20, 30, 128]), 4).unwrap();
        let img = image::open(&path).unwrap();
        assert_eq!(img.color().channel_count(), 4);
        assert_eq!((img.width(), img.height()), (5, 3));
    }

    #[test]
    fn jpeg_drops_alpha() {
        let dir = out_dir();
        let path = dir.path().join("noalpha.jpg");
        write_image(&path, solid(8, 8, [200, 100, 50, 255]), 4).unwrap();
        let img = image::open(&path).unwrap();
        assert_eq!(img.color().channel_count(), 3);
    }

    #[test]
    fn gray_source_exports_gray() {
        let dir = out_dir();
        let path = dir.path().join("gray.png");
        write_image(&path, solid(4, 2, [90, 90, 90, 255]), 1).unwrap();
        let img = image::open(&path).unwrap();
        assert_eq!(img.color().channel_count(), 1);
    }

    #[test]
    fn rows_are_flipped_back() {
        let dir = out_dir();
        let path = dir.path().join("flip.png");
        let mut pixels = solid(1, 2, [0, 0, 0, 255]);
        // Bottom row first: the white pixel belongs at the bottom of the file
        pixels.rgba_data[..4].copy_from_slice(&[255, 255, 255, 255]);
        write_image(&path, pixels, 3).unwrap();
        let img = image::open(&path).unwrap().into_rgb8();
        assert_eq!(img.get_pixel(0, 1).0, [255, 255, 255]);
        assert_eq!(img.get_pixel(0, 0).0, [0, 0, 0]);
    }

    #[test]
    fn short_buffer_is_rejected() {
        let pixels = PixelBuffer {
            width: 4,
            height: 4,
            rgba_data: vec![0; 10],
        };
        let dir = out_dir();
        let err = write_image(&dir.path().join("short.png"), pixels, 4).unwrap_err();
        assert!(matches!(
            err,
            ExportError::InvalidBuffer {
                expected: 64,
                actual: 10
            }
        ));
    }

    #[test]
    fn unknown_extension_fails_to_encode() {
        let dir = out_dir();
        let path = dir.path().join("out.notaformat");
        let err = write_image(&path, solid(2, 2, [0; 4]), 4).unwrap_err();
        assert!(matches!(err, ExportError::Encode(_)));
    }
}
