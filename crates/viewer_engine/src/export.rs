use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{DynamicImage, ExtendedColorType, ImageEncoder, RgbaImage};
use thiserror::Error;
use viewer_logging::{viewer_error, viewer_info};

use crate::persist::{DownloadDir, PersistError};
use crate::snapshot::{CaptureError, SnapshotSource};
use crate::{export_filename, RasterFormat};

/// Device pixels per logical pixel for every snapshot.
pub const SNAPSHOT_SCALE: u32 = 2;
const JPEG_QUALITY: u8 = 100;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("an export is already running")]
    Busy,
    #[error("capture failed: {0}")]
    Capture(#[from] CaptureError),
    #[error("encoding failed: {0}")]
    Encode(#[from] image::ImageError),
    #[error("saving failed: {0}")]
    Persist(#[from] PersistError),
}

/// Holds the exporter's busy flag; dropping it clears the flag on every
/// exit path, unwinding included.
#[derive(Debug)]
pub struct BusyGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> BusyGuard<'a> {
    pub fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// Captures a [`SnapshotSource`], encodes it and saves it to the download
/// directory. One export at a time.
#[derive(Debug)]
pub struct SnapshotExporter {
    busy: AtomicBool,
    downloads: DownloadDir,
}

impl SnapshotExporter {
    pub fn new(download_dir: PathBuf) -> Self {
        Self {
            busy: AtomicBool::new(false),
            downloads: DownloadDir::new(download_dir),
        }
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    pub fn export(
        &self,
        source: &dyn SnapshotSource,
        format: RasterFormat,
        filename_base: &str,
    ) -> Result<PathBuf, ExportError> {
        let _guard = BusyGuard::acquire(&self.busy).ok_or(ExportError::Busy)?;
        let filename = export_filename(filename_base, format);
        viewer_info!("Exporting {} as {}", filename, format.mime_type());

        let result = source
            .capture(SNAPSHOT_SCALE)
            .map_err(ExportError::from)
            .and_then(|image| encode_image(image, format).map_err(ExportError::from))
            .and_then(|bytes| self.downloads.save(&filename, &bytes).map_err(ExportError::from));

        match &result {
            Ok(path) => viewer_info!("Saved snapshot to {}", path.display()),
            Err(err) => viewer_error!("Error generating image {}: {}", filename, err),
        }
        result
    }
}

/// Encode a capture. PNG uses the default compression; JPEG is written at
/// maximum quality with the alpha channel dropped.
pub fn encode_image(image: RgbaImage, format: RasterFormat) -> Result<Vec<u8>, image::ImageError> {
    let mut bytes = Vec::new();
    match format {
        RasterFormat::Png => {
            PngEncoder::new(&mut bytes).write_image(
                image.as_raw(),
                image.width(),
                image.height(),
                ExtendedColorType::Rgba8,
            )?;
        }
        RasterFormat::Jpeg => {
            let rgb = DynamicImage::ImageRgba8(image).to_rgb8();
            JpegEncoder::new_with_quality(&mut bytes, JPEG_QUALITY).write_image(
                rgb.as_raw(),
                rgb.width(),
                rgb.height(),
                ExtendedColorType::Rgb8,
            )?;
        }
    }
    Ok(bytes)
}
