/// Errors raised while turning one image into its pixelated counterpart.
///
/// Per-image errors (`Decode`, `Render`) are caught by the batch
/// orchestrator and turned into an empty result for that image.
#[derive(Debug, thiserror::Error)]
pub enum PixelizeError {
    #[error("decode error: {0}")]
    Decode(String),

    #[error("render error: {0}")]
    Render(String),

    #[error("invalid scale {value}: expected a value in {min}..={max}")]
    InvalidScale { value: u32, min: u32, max: u32 },

    #[error("archive error: {0}")]
    Archive(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<zip::result::ZipError> for PixelizeError {
    fn from(error: zip::result::ZipError) -> Self {
        PixelizeError::Archive(error.to_string())
    }
}
