//! Tunables for the pixelation pipeline and the batch orchestrator.

use crate::pixelizer::Scale;

pub const MIN_SCALE: u32 = 1;
pub const MAX_SCALE: u32 = 30;
pub const DEFAULT_SCALE: u32 = 8;

/// Images per batch; anything beyond is dropped before processing.
pub const MAX_BATCH_SIZE: usize = 50;

#[derive(Debug, Clone)]
pub struct PixelateConfig {
    /// Block size in source pixels.
    pub scale: Scale,
    /// Upper bound on `width * height` of a decoded image. Checked against
    /// the header before the full decode allocates anything.
    pub max_decoded_pixels: u64,
    pub max_batch_size: usize,
}

impl Default for PixelateConfig {
    fn default() -> Self {
        Self {
            scale: Scale::DEFAULT,
            max_decoded_pixels: 40_000_000,
            max_batch_size: MAX_BATCH_SIZE,
        }
    }
}

impl PixelateConfig {
    pub fn with_scale(scale: Scale) -> Self {
        Self {
            scale,
            ..Self::default()
        }
    }
}
