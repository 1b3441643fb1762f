// Image loading module
// Decodes the input file into bottom-row-first RGBA pixels for the GPU

use anyhow::{Context, Result};
use image::DynamicImage;
use std::fs;
use std::io::Cursor;
use std::path::Path;

/// Loaded image data ready for upload
#[derive(Debug, Clone)]
pub struct ImageData {
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
    /// Channel count of the source file, restored on export
    pub channels: u8,
    /// RGBA pixel rows, bottom row first
    pub rgba_data: Vec<u8>,
}

/// Load an image file and flip it to the renderer's bottom-left origin
pub fn load_image(path: &Path) -> Result<ImageData> {
    let data = fs::read(path)
        .with_context(|| format!("Failed to read image file: {}", path.display()))?;
    let img = load_from_bytes(&data)
        .with_context(|| format!("Failed to load {}", path.display()))?;
    Ok(from_dynamic(img))
}

pub fn from_dynamic(img: DynamicImage) -> ImageData {
    let channels = img.color().channel_count();
    let rgba = img.flipv().into_rgba8();
    let (width, height) = rgba.dimensions();

    ImageData {
        width,
        height,
        channels,
        rgba_data: rgba.into_raw(),
    }
}

/// Load an image from raw bytes, auto-detecting the format
fn load_from_bytes(data: &[u8]) -> Result<DynamicImage> {
    let format = image::guess_format(data).context("Failed to detect image format")?;

    let cursor = Cursor::new(data);
    let img = image::load(cursor, format).context("Failed to decode image")?;

    Ok(img)
}
