//! Bytes in, PNG bytes out.
//!
//! The header is inspected before the full decode so an oversized image is
//! refused before anything large is allocated.

use image::{DynamicImage, ImageFormat, ImageReader, RgbaImage};
use std::io::Cursor;

use crate::config::PixelateConfig;
use crate::error::PixelizeError;
use crate::pixelizer::Pixelizer;

pub fn decode(bytes: &[u8], config: &PixelateConfig) -> Result<DynamicImage, PixelizeError> {
    let format = image::guess_format(bytes)
        .map_err(|e| PixelizeError::Decode(format!("unrecognized image format: {}", e)))?;

    let (width, height) = ImageReader::with_format(Cursor::new(bytes), format)
        .into_dimensions()
        .map_err(|e| PixelizeError::Decode(format!("unreadable image header: {}", e)))?;
    validate_pixel_limit(config, width, height)?;

    let img = image::load_from_memory_with_format(bytes, format)
        .map_err(|e| PixelizeError::Decode(format!("failed to decode image: {}", e)))?;
    if img.width() == 0 || img.height() == 0 {
        return Err(PixelizeError::Decode("image has no pixels".to_string()));
    }

    log::debug!("decoded {:?} image {}x{}", format, img.width(), img.height());
    Ok(img)
}

fn validate_pixel_limit(config: &PixelateConfig, width: u32, height: u32) -> Result<(), PixelizeError> {
    let pixels = width as u64 * height as u64;
    if pixels > config.max_decoded_pixels {
        return Err(PixelizeError::Render(format!(
            "image too large: {} pixels (limit {})",
            pixels, config.max_decoded_pixels
        )));
    }
    Ok(())
}

pub fn encode_png(buffer: &RgbaImage) -> Result<Vec<u8>, PixelizeError> {
    let mut out = Cursor::new(Vec::new());
    buffer
        .write_to(&mut out, ImageFormat::Png)
        .map_err(|e| PixelizeError::Render(format!("failed to encode png: {}", e)))?;
    Ok(out.into_inner())
}

/// Decode, pixelate at `config.scale` and re-encode one image.
pub fn pixelate_bytes<P: Pixelizer + ?Sized>(
    bytes: &[u8],
    pixelizer: &P,
    config: &PixelateConfig,
) -> Result<Vec<u8>, PixelizeError> {
    let img = decode(bytes, config)?;
    let out = pixelizer.pixelate(&img, config.scale)?;
    encode_png(&out)
}
