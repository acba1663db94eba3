//! Command-line argument definitions for sigframe.

use clap::{ArgAction, Parser};
use sigframe_utils::{LogoMode, ShapeId, UploadProvider};
use std::path::PathBuf;

/// Render an e-mail signature with a framed headshot.
///
/// Writes `preview.html`, `signature.html` and `signature.txt` into the output directory and,
/// when a headshot image is given, exports the cropped raster.
#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct SignatureArgs {
    /// Optional settings JSON. Defaults to `config/sigframe.json` when present, otherwise built-in values.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Write the effective settings (after overrides) to this path.
    #[arg(long, value_name = "PATH")]
    pub save_config: Option<PathBuf>,

    /// Directory receiving the rendered files.
    #[arg(short, long, default_value = "signature")]
    pub output_dir: PathBuf,

    /// Local headshot image to crop and export.
    #[arg(short = 'i', long, value_name = "IMAGE")]
    pub headshot: Option<PathBuf>,

    /// Hosted headshot URL used when no local image is exported.
    #[arg(long, value_name = "URL")]
    pub headshot_url: Option<String>,

    /// Leave the headshot column out entirely.
    #[arg(long, action = ArgAction::SetTrue)]
    pub no_headshot: bool,

    #[arg(long)]
    pub full_name: Option<String>,

    #[arg(long)]
    pub title: Option<String>,

    #[arg(long)]
    pub email: Option<String>,

    #[arg(long)]
    pub phone: Option<String>,

    /// Website without scheme, e.g. `www.example.com`.
    #[arg(long)]
    pub website: Option<String>,

    #[arg(long)]
    pub address: Option<String>,

    /// Vertical logo column: `show` or `none`.
    #[arg(long, value_name = "MODE")]
    pub logo: Option<LogoMode>,

    /// Headshot container size in pixels (1-1024).
    #[arg(long, value_name = "PX")]
    pub size: Option<u32>,

    /// Headshot zoom in percent (100-300).
    #[arg(long, value_name = "PERCENT")]
    pub scale: Option<u32>,

    /// Horizontal position (0-100, 50 = centered).
    #[arg(short, long)]
    pub x: Option<u32>,

    /// Vertical position (0-100, 50 = centered).
    #[arg(short, long)]
    pub y: Option<u32>,

    /// Headshot outline, e.g. `circle`, `squircle`, `hexagon`.
    #[arg(long, value_name = "SHAPE")]
    pub shape: Option<ShapeId>,

    /// Export format: jpeg, png or webp.
    #[arg(long, value_name = "FORMAT")]
    pub format: Option<String>,

    /// JPEG quality (1-100).
    #[arg(long, value_name = "QUALITY")]
    pub jpeg_quality: Option<u8>,

    /// Background for transparent pixels in opaque formats (e.g. `#FFFFFF`).
    #[arg(long, value_name = "HEX")]
    pub fill_color: Option<String>,

    /// Bake the shape mask into the exported raster's alpha channel.
    #[arg(long, action = ArgAction::SetTrue)]
    pub bake_mask: bool,

    /// Upload provider: none, directory or cloudinary.
    #[arg(long, value_name = "PROVIDER")]
    pub upload: Option<UploadProvider>,

    /// Target directory for the `directory` upload provider.
    #[arg(long, value_name = "DIR")]
    pub upload_dir: Option<PathBuf>,

    /// Public URL prefix the upload directory is served from.
    #[arg(long, value_name = "URL")]
    pub public_base_url: Option<String>,

    #[arg(long)]
    pub cloud_name: Option<String>,

    /// Unsigned upload preset for the `cloudinary` provider.
    #[arg(long)]
    pub upload_preset: Option<String>,

    /// Seconds to wait for the export (crop, encode and upload) to finish.
    #[arg(long, default_value_t = 60)]
    pub timeout: u64,

    /// Enable telemetry timing logs (defaults to settings file).
    #[arg(long, action = ArgAction::SetTrue)]
    pub telemetry: bool,

    /// Override telemetry logging level (error, warn, info, debug, trace).
    #[arg(long, value_name = "LEVEL")]
    pub telemetry_level: Option<String>,
}
