use fast_image_resize as fr;
use image::{DynamicImage, RgbaImage};

use super::quantizer::Palette;
use super::Pixelizer;
use crate::error::PixelizeError;

/// Box-averages each block down to one pixel, then optionally snaps the
/// reduced buffer to a palette.
#[derive(Debug, Clone, Default)]
pub struct BlockPixelizer {
    palette: Palette,
}

impl BlockPixelizer {
    pub fn new(palette: Palette) -> Self {
        Self { palette }
    }
}

impl Pixelizer for BlockPixelizer {
    fn pixelize(&self, img: &DynamicImage, width: u32, height: u32) -> Result<RgbaImage, PixelizeError> {
        if width == 0 || height == 0 || img.width() == 0 || img.height() == 0 {
            return Err(PixelizeError::Render(format!(
                "cannot reduce {}x{} to {}x{}",
                img.width(),
                img.height(),
                width,
                height
            )));
        }

        let mut reduced = box_downsample(img.to_rgba8(), width, height)?;
        if !self.palette.is_empty() {
            log::debug!("quantizing {}x{} to {} colors", width, height, self.palette.len());
            self.palette.quantize(&mut reduced);
        }
        Ok(reduced)
    }
}

/// Box-filter shrink. Alpha is premultiplied during the convolution, so
/// transparent pixels do not bleed their color into the average.
pub fn box_downsample(src: RgbaImage, width: u32, height: u32) -> Result<RgbaImage, PixelizeError> {
    let (src_width, src_height) = src.dimensions();
    if (src_width, src_height) == (width, height) {
        return Ok(src);
    }

    let src_image = fr::images::Image::from_vec_u8(src_width, src_height, src.into_raw(), fr::PixelType::U8x4)
        .map_err(|e| PixelizeError::Render(format!("failed to wrap source buffer: {}", e)))?;
    let mut dst_image = fr::images::Image::new(width, height, fr::PixelType::U8x4);

    let mut resizer = fr::Resizer::new();
    let options = fr::ResizeOptions::new().resize_alg(fr::ResizeAlg::Convolution(fr::FilterType::Box));
    resizer
        .resize(&src_image, &mut dst_image, Some(&options))
        .map_err(|e| PixelizeError::Render(format!("box resize failed: {}", e)))?;

    RgbaImage::from_raw(width, height, dst_image.into_vec())
        .ok_or_else(|| PixelizeError::Render("resized buffer has the wrong length".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pixelizer::Scale;
    use image::Rgba;
    use palette::Srgb;

    fn quadrants() -> RgbaImage {
        RgbaImage::from_fn(4, 4, |x, y| match (x < 2, y < 2) {
            (true, true) => Rgba([255, 0, 0, 255]),
            (false, true) => Rgba([0, 255, 0, 255]),
            (true, false) => Rgba([0, 0, 255, 255]),
            (false, false) => Rgba([255, 255, 255, 255]),
        })
    }

    #[test]
    fn exact_blocks_average_to_their_color() {
        let reduced = box_downsample(quadrants(), 2, 2).unwrap();
        assert_eq!(reduced.get_pixel(0, 0), &Rgba([255, 0, 0, 255]));
        assert_eq!(reduced.get_pixel(1, 0), &Rgba([0, 255, 0, 255]));
        assert_eq!(reduced.get_pixel(0, 1), &Rgba([0, 0, 255, 255]));
        assert_eq!(reduced.get_pixel(1, 1), &Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn block_is_averaged_not_sampled() {
        let src = RgbaImage::from_fn(2, 1, |x, _| {
            if x == 0 {
                Rgba([0, 0, 0, 255])
            } else {
                Rgba([255, 255, 255, 255])
            }
        });
        let p = *box_downsample(src, 1, 1).unwrap().get_pixel(0, 0);
        for c in 0..3 {
            assert!((127..=128).contains(&p[c]), "channel {} = {}", c, p[c]);
        }
        assert_eq!(p[3], 255);
    }

    #[test]
    fn fractional_coverage_is_weighted() {
        // 3 -> 2: each output mixes only the source pixels under it
        let src = RgbaImage::from_fn(3, 1, |x, _| Rgba([(x * 90) as u8, 0, 0, 255]));
        let reduced = box_downsample(src, 2, 1).unwrap();
        let (left, right) = (reduced.get_pixel(0, 0)[0], reduced.get_pixel(1, 0)[0]);
        assert!(left <= 90, "left = {}", left);
        assert!(right >= 90, "right = {}", right);
        assert!(left < right);
    }

    #[test]
    fn transparent_pixels_do_not_tint() {
        let src = RgbaImage::from_fn(2, 1, |x, _| {
            if x == 0 {
                Rgba([255, 0, 0, 255])
            } else {
                Rgba([0, 0, 255, 0])
            }
        });
        let p = *box_downsample(src, 1, 1).unwrap().get_pixel(0, 0);
        assert!(p[0] >= 250, "red = {}", p[0]);
        assert!(p[2] <= 2, "blue = {}", p[2]);
        assert!((127..=128).contains(&p[3]), "alpha = {}", p[3]);
    }

    #[test]
    fn same_size_is_identity() {
        let src = RgbaImage::from_fn(3, 2, |x, y| Rgba([x as u8, y as u8, 7, (x * 40) as u8]));
        assert_eq!(box_downsample(src.clone(), 3, 2).unwrap(), src);
    }

    #[test]
    fn pixelate_keeps_dimensions_and_blocks() {
        let img = DynamicImage::ImageRgba8(quadrants());
        let out = BlockPixelizer::default()
            .pixelate(&img, Scale::new(2).unwrap())
            .unwrap();
        assert_eq!(out, quadrants());
    }

    #[test]
    fn pixelate_with_palette_only_emits_palette_colors() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_fn(9, 7, |x, y| {
            Rgba([(x * 28) as u8, (y * 36) as u8, 90, 255])
        }));
        let palette = Palette::parse("#0f380f,#306230,#8bac0f,#9bbc0f").palette;
        let out = BlockPixelizer::new(palette.clone())
            .pixelate(&img, Scale::new(3).unwrap())
            .unwrap();
        assert_eq!(out.dimensions(), (9, 7));
        for p in out.pixels() {
            let rgb = Srgb::new(p[0], p[1], p[2]);
            assert!(palette.colors().contains(&rgb));
        }
    }

    #[test]
    fn zero_target_is_a_render_error() {
        let img = DynamicImage::ImageRgba8(quadrants());
        assert!(matches!(
            BlockPixelizer::default().pixelize(&img, 0, 2),
            Err(PixelizeError::Render(_))
        ));
    }
}
