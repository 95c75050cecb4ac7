//! Packs the successful outputs of a batch into a single zip archive.

use std::io::{Cursor, Seek, Write};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::batch::BatchReport;
use crate::error::PixelizeError;

pub const DEFAULT_ARCHIVE_NAME: &str = "pixelated-images.zip";

/// Write one entry per successful image and return how many were written.
/// Failed images are left out.
pub fn write_zip<W: Write + Seek>(report: &BatchReport, writer: W) -> Result<usize, PixelizeError> {
    let mut zip = ZipWriter::new(writer);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let entries = report.named_outputs();
    for (name, png) in &entries {
        log::debug!("adding {} to archive", name);
        zip.start_file(name.as_str(), options)?;
        zip.write_all(png)?;
    }

    zip.finish()?;
    Ok(entries.len())
}

pub fn zip_to_vec(report: &BatchReport) -> Result<Vec<u8>, PixelizeError> {
    let mut buf = Cursor::new(Vec::new());
    write_zip(report, &mut buf)?;
    Ok(buf.into_inner())
}
