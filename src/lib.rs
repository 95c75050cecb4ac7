mod pixelizer;
pub use pixelizer::{scale_to_size, upscale_nearest, Pixelizer, Scale};
pub use pixelizer::block_pixelizer::{box_downsample, BlockPixelizer};
pub use pixelizer::quantizer::{Palette, PaletteParse, PaletteParseWarning, Preset};

pub mod archive;
pub mod batch;
pub mod config;
pub mod error;
pub mod pipeline;

pub use batch::{process, BatchReport, ProcessedImage, SourceImage};
pub use config::PixelateConfig;
pub use error::PixelizeError;
pub use pipeline::pixelate_bytes;
