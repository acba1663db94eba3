//! Core signature engine.
//!
//! One crop geometry drives three headshot renderers (CSS preview, raster export and remote
//! transform URL); this crate also owns the versioned signature record, the HTML renderer and
//! the background export session.

/// Error types for crop, upload and export failures.
pub mod error;
/// Background crop, encode and upload jobs.
pub mod export;
/// Crop parameters, plans and CSS adapters.
pub mod geometry;
/// Signature table markup and plain-text fallback.
pub mod html;
/// Pixel crop of the headshot source.
pub mod raster;
/// Server-side crop transform URLs.
pub mod remote;
/// Editing session and export coordination.
pub mod session;
/// Versioned signature record.
pub mod signature;

pub use error::{CropError, ExportError, UploadError};
pub use export::{
    AssetOrigin, ExportJob, ExportKey, ExportOutcome, ExportTicket, ExportedAsset,
    RemoteAssetReference, Uploader, spawn_export,
};
pub use geometry::{CropParameters, CropPlan, layout_size};
pub use html::{RenderInput, RenderTarget, SignatureArtifact, render_html, render_plain_text};
pub use raster::{SourceImage, crop, crop_and_encode};
pub use remote::RemoteCropUrlBuilder;
pub use session::{ExportCoordinator, ExportStatus, SessionSettings, SignatureSession};
pub use signature::{SignatureStore, Snapshot};

/// Returns the crate version for diagnostics.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
