//! Common helpers shared across sigframe crates.

/// Hex colors for the theme and raster flattening.
pub mod color;
/// Application settings and the signature record.
pub mod config;
/// Raster encoding (JPEG/PNG/WebP, data URIs).
pub mod output;
/// Shape catalog and alpha masking.
pub mod shape;
/// Instrumentation helpers for optional performance tracing.
pub mod telemetry;

#[cfg(test)]
mod shape_tests;

use std::path::Path;

use anyhow::Result;
use log::LevelFilter;

pub use color::{RgbaColor, parse_hex_color};
pub use config::{
    AppSettings, ExportSettings, HeadshotSettings, LogoMode, RemoteSettings, SignatureRecord,
    TelemetrySettings, ThemeSettings, UploadProvider, UploadSettings,
};
pub use output::{EncodeOptions, EncodedRaster, RasterFormat, data_uri, encode_raster};
pub use shape::{Length, MaskDescriptor, ShapeId, apply_shape_mask, lookup as lookup_shape};
pub use telemetry::{
    TimingGuard, configure as configure_telemetry, telemetry_allows, telemetry_enabled,
    timing_guard, timing_guard_if,
};

/// Initialize logging once for CLI environments.
///
/// `RUST_LOG` wins when set; otherwise `default_filter` applies.
pub fn init_logging(default_filter: LevelFilter) -> Result<()> {
    let mut builder = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(default_filter.as_str()),
    );
    builder.filter_module(telemetry::TARGET, LevelFilter::Trace);

    if builder.try_init().is_err() {
        // Logger already initialized; nothing to do.
    }
    Ok(())
}

/// Validate that a path exists and resolve it to an absolute path.
pub fn normalize_path<P: AsRef<Path>>(path: P) -> Result<std::path::PathBuf> {
    let path = path.as_ref();
    anyhow::ensure!(path.exists(), "path does not exist: {}", path.display());
    Ok(path.canonicalize()?)
}
