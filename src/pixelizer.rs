use image::imageops::{self, FilterType};
use image::{DynamicImage, RgbaImage};

use crate::config::{DEFAULT_SCALE, MAX_SCALE, MIN_SCALE};
use crate::error::PixelizeError;

/// Block size: the side, in source pixels, that collapses into one color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scale(u32);

impl Scale {
    pub const DEFAULT: Scale = Scale(DEFAULT_SCALE);

    pub fn new(value: u32) -> Result<Self, PixelizeError> {
        if (MIN_SCALE..=MAX_SCALE).contains(&value) {
            Ok(Self(value))
        } else {
            Err(PixelizeError::InvalidScale {
                value,
                min: MIN_SCALE,
                max: MAX_SCALE,
            })
        }
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

/// Size of the reduced buffer, never smaller than 1x1.
pub fn scale_to_size(img: &DynamicImage, scale: Scale) -> (u32, u32) {
    let s = scale.get();
    ((img.width() / s).max(1), (img.height() / s).max(1))
}

pub trait Pixelizer {
    /// Reduce `img` to `width` x `height`, one color per output pixel.
    fn pixelize(&self, img: &DynamicImage, width: u32, height: u32) -> Result<RgbaImage, PixelizeError>;

    /// Reduce by `scale`, then blow the reduced buffer back up to the
    /// original size without smoothing.
    fn pixelate(&self, img: &DynamicImage, scale: Scale) -> Result<RgbaImage, PixelizeError> {
        let (w, h) = scale_to_size(img, scale);
        let reduced = self.pixelize(img, w, h)?;
        log::debug!(
            "pixelate: {}x{} -> {}x{} -> {}x{}",
            img.width(),
            img.height(),
            w,
            h,
            img.width(),
            img.height()
        );
        Ok(upscale_nearest(&reduced, img.width(), img.height()))
    }
}

/// Nearest-neighbor enlargement, no smoothing between blocks.
pub fn upscale_nearest(src: &RgbaImage, width: u32, height: u32) -> RgbaImage {
    imageops::resize(src, width, height, FilterType::Nearest)
}

pub mod block_pixelizer;
pub mod quantizer;
