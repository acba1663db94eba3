//! Error types returned across the core crate boundary.

use sigframe_utils::RasterFormat;
use thiserror::Error;

/// Failures while turning a source image into an exported raster.
#[derive(Debug, Error)]
pub enum CropError {
    #[error("failed to decode headshot image: {0}")]
    Decode(#[source] image::ImageError),
    #[error("failed to encode headshot as {format}: {source}")]
    Encode {
        format: RasterFormat,
        #[source]
        source: image::ImageError,
    },
    #[error("headshot image has no pixels")]
    EmptySource,
    #[error("scaled headshot would be {width}x{height} pixels; use a less elongated image")]
    TooLarge { width: u32, height: u32 },
}

/// Failures reported by an [`Uploader`](crate::export::Uploader).
///
/// None of these abort an export; the raster is embedded inline instead.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("upload request failed: {0}")]
    Network(String),
    #[error("upload service rejected the file: {0}")]
    Service(String),
    #[error("failed to write uploaded file: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum ExportError {
    /// Another export is still running; the request was not started.
    #[error("an export is already in progress (request {in_flight})")]
    Busy { in_flight: u64 },
    #[error(transparent)]
    Crop(#[from] CropError),
    #[error("no headshot image is loaded")]
    NoHeadshot,
}
