//! Sequential batch processing with per-image error isolation.

use std::collections::HashSet;

use crate::config::PixelateConfig;
use crate::pipeline::pixelate_bytes;
use crate::pixelizer::Pixelizer;

/// One uploaded image. `name` is the original file name when known.
#[derive(Debug, Clone)]
pub struct SourceImage {
    pub name: Option<String>,
    pub bytes: Vec<u8>,
}

impl SourceImage {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: Some(name.into()),
            bytes,
        }
    }

    pub fn unnamed(bytes: Vec<u8>) -> Self {
        Self { name: None, bytes }
    }
}

/// Result slot for one input; `output` is `None` when the image failed.
#[derive(Debug, Clone)]
pub struct ProcessedImage {
    pub index: usize,
    pub name: Option<String>,
    pub output: Option<Vec<u8>>,
}

impl ProcessedImage {
    pub fn is_success(&self) -> bool {
        self.output.is_some()
    }

    pub fn output_name(&self) -> String {
        output_name(self.name.as_deref(), self.index)
    }
}

#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub items: Vec<ProcessedImage>,
}

impl BatchReport {
    pub fn succeeded(&self) -> impl Iterator<Item = &ProcessedImage> {
        self.items.iter().filter(|item| item.is_success())
    }

    pub fn failed(&self) -> impl Iterator<Item = &ProcessedImage> {
        self.items.iter().filter(|item| !item.is_success())
    }

    /// Successful outputs paired with their file names. Names that would
    /// collide get `-<n>` appended, starting from the image's position.
    pub fn named_outputs(&self) -> Vec<(String, &[u8])> {
        let mut used = HashSet::new();
        let mut named = Vec::new();
        for item in &self.items {
            let Some(png) = &item.output else { continue };

            let base = item.output_name();
            let stem = base.strip_suffix(".png").unwrap_or(&base);
            let mut name = base.clone();
            let mut n = item.index + 1;
            while used.contains(&name) {
                name = format!("{}-{}.png", stem, n);
                n += 1;
            }
            used.insert(name.clone());
            named.push((name, png.as_slice()));
        }
        named
    }

    /// Batch-level notice, `None` when everything went through.
    pub fn summary(&self) -> Option<String> {
        let failed = self.failed().count();
        if failed == 0 {
            None
        } else {
            Some(format!(
                "processing failed for {} of {} images",
                failed,
                self.items.len()
            ))
        }
    }
}

/// Pixelate `images` one after the other. A failing image leaves an empty
/// slot at its index; the rest of the batch carries on.
pub fn process<P: Pixelizer + ?Sized>(
    images: &[SourceImage],
    pixelizer: &P,
    config: &PixelateConfig,
) -> BatchReport {
    if images.len() > config.max_batch_size {
        log::warn!(
            "batch of {} images truncated to the first {}",
            images.len(),
            config.max_batch_size
        );
    }

    let items = images
        .iter()
        .take(config.max_batch_size)
        .enumerate()
        .map(|(index, image)| {
            let output = match pixelate_bytes(&image.bytes, pixelizer, config) {
                Ok(png) => {
                    log::debug!("image {} done ({} bytes)", index + 1, png.len());
                    Some(png)
                }
                Err(e) => {
                    log::error!(
                        "failed to process image {} ({}): {}",
                        index + 1,
                        image.name.as_deref().unwrap_or("unnamed"),
                        e
                    );
                    None
                }
            };
            ProcessedImage {
                index,
                name: image.name.clone(),
                output,
            }
        })
        .collect();

    BatchReport { items }
}

/// `pixelated-<stem>.png`, or `pixelated-image-<n>.png` without a name.
pub fn output_name(name: Option<&str>, index: usize) -> String {
    match name.map(strip_extension).filter(|stem| !stem.is_empty()) {
        Some(stem) => format!("pixelated-{}.png", stem),
        None => format!("pixelated-image-{}.png", index + 1),
    }
}

/// Drop the last `.ext`, unless the dot belongs to a directory part.
fn strip_extension(name: &str) -> &str {
    match name.rfind('.') {
        Some(dot) if !name[dot + 1..].is_empty() && !name[dot + 1..].contains('/') => &name[..dot],
        _ => name,
    }
}
