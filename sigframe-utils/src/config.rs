//! Settings shared by the signature engine and its front ends.
//!
//! The signature record, the headshot framing controls, and the export/remote/upload
//! preferences all serialize to a single JSON document that the CLI can load and save.

use crate::{color::RgbaColor, shape::ShapeId};

use anyhow::{Context, Result};
use log::LevelFilter;
use serde::{Deserialize, Serialize};
use std::{
    env, fmt, fs,
    path::{Path, PathBuf},
    str::FromStr,
};

/// Smallest and largest headshot zoom offered by the editor.
pub const MIN_IMAGE_SCALE: u32 = 100;
pub const MAX_IMAGE_SCALE: u32 = 300;

/// Largest headshot box, in pixels.
pub const MAX_CONTAINER_SIZE: u32 = 1024;

/// Whether the vertical company logo column is rendered.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum LogoMode {
    #[default]
    Show,
    None,
}

impl FromStr for LogoMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "show" => Ok(LogoMode::Show),
            "none" | "hide" => Ok(LogoMode::None),
            other => Err(format!("invalid logo mode '{other}'; expected 'show' or 'none'")),
        }
    }
}

/// Framing controls for the headshot.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(default)]
pub struct HeadshotSettings {
    /// Side length of the square headshot box, in pixels.
    pub container_size: u32,
    /// Zoom applied to the image, in percent (100-300).
    pub image_scale: u32,
    /// Outline the square is clipped to.
    pub shape: ShapeId,
    /// Horizontal position, 0-100 with 50 centered.
    pub x: u32,
    /// Vertical position, 0-100 with 50 centered.
    pub y: u32,
}

impl Default for HeadshotSettings {
    fn default() -> Self {
        Self {
            container_size: 135,
            image_scale: 100,
            shape: ShapeId::Circle,
            x: 50,
            y: 50,
        }
    }
}

impl HeadshotSettings {
    /// Clamp values into the ranges the editor exposes.
    pub fn sanitize(&mut self) {
        self.container_size = self.container_size.clamp(1, MAX_CONTAINER_SIZE);
        self.image_scale = self.image_scale.clamp(MIN_IMAGE_SCALE, MAX_IMAGE_SCALE);
        self.x = self.x.min(100);
        self.y = self.y.min(100);
    }
}

/// The editable signature record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SignatureRecord {
    pub full_name: String,
    pub title: String,
    pub email: String,
    pub phone: String,
    /// Host and path without scheme, e.g. `www.example.com`.
    pub website: String,
    pub address: String,
    pub logo: LogoMode,
    /// Hosted headshot URL; empty until an image is uploaded or captured.
    pub headshot_url: String,
    pub show_headshot: bool,
    pub headshot: HeadshotSettings,
}

impl Default for SignatureRecord {
    fn default() -> Self {
        Self {
            full_name: "John Doe".to_string(),
            title: "AI Solutions Engineer".to_string(),
            email: "john.doe@skyhi.ai".to_string(),
            phone: "555-0123".to_string(),
            website: "www.skyhi.ai".to_string(),
            address: "123 Innovation Drive, Suite 100".to_string(),
            logo: LogoMode::Show,
            headshot_url: String::new(),
            show_headshot: true,
            headshot: HeadshotSettings::default(),
        }
    }
}

impl SignatureRecord {
    pub fn sanitize(&mut self) {
        self.headshot.sanitize();
    }
}

/// Colors and typography of the rendered signature.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ThemeSettings {
    pub font_family: String,
    /// Divider bar, title and row labels.
    pub accent: RgbaColor,
    pub name_color: RgbaColor,
    pub text_color: RgbaColor,
    pub muted_color: RgbaColor,
}

impl Default for ThemeSettings {
    fn default() -> Self {
        Self {
            font_family: "Arial, sans-serif".to_string(),
            accent: RgbaColor::opaque(0x3B, 0x82, 0xF6),
            name_color: RgbaColor::opaque(0, 0, 0),
            text_color: RgbaColor::opaque(0x33, 0x33, 0x33),
            muted_color: RgbaColor::opaque(0x64, 0x74, 0x8B),
        }
    }
}

/// How exported headshot rasters are encoded.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ExportSettings {
    /// Output format: "jpeg", "png", or "webp".
    pub format: String,
    /// JPEG quality (1-100).
    pub jpeg_quality: u8,
    /// PNG compression strategy ("fast", "default", "best") or numeric level (0-9).
    pub png_compression: String,
    /// Background for uncovered or masked pixels when the format has no alpha.
    pub fill_color: RgbaColor,
    /// Bake the shape mask into the raster alpha channel.
    pub bake_mask: bool,
    /// Stem of uploaded file names; the request id is appended.
    pub file_stem: String,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            format: "jpeg".to_string(),
            jpeg_quality: 90,
            png_compression: "default".to_string(),
            fill_color: RgbaColor::WHITE,
            bake_mask: false,
            file_stem: "headshot".to_string(),
        }
    }
}

/// Remote image-transformation service the email fallback crop targets.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RemoteSettings {
    /// Host suffix a URL must match before transforms are injected.
    pub host_suffix: String,
    /// Hosted logo asset rotated into the vertical logo column.
    pub logo_url: String,
    pub logo_alt: String,
}

impl Default for RemoteSettings {
    fn default() -> Self {
        Self {
            host_suffix: "cloudinary.com".to_string(),
            logo_url: "https://res.cloudinary.com/dippj70ao/image/upload/v1763925891/skyhi-og-image-black_iychjj.png"
                .to_string(),
            logo_alt: "SkyHi AI".to_string(),
        }
    }
}

/// Where exported rasters are published.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum UploadProvider {
    /// No upload; exports embed the raster inline.
    #[default]
    None,
    /// Copy into a directory served under `public_base_url`.
    Directory,
    /// Unsigned upload to a Cloudinary cloud.
    Cloudinary,
}

impl fmt::Display for UploadProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            UploadProvider::None => "none",
            UploadProvider::Directory => "directory",
            UploadProvider::Cloudinary => "cloudinary",
        })
    }
}

impl FromStr for UploadProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(UploadProvider::None),
            "directory" | "dir" => Ok(UploadProvider::Directory),
            "cloudinary" => Ok(UploadProvider::Cloudinary),
            other => Err(format!(
                "invalid upload provider '{other}'; expected 'none', 'directory' or 'cloudinary'"
            )),
        }
    }
}

/// Upload collaborator configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct UploadSettings {
    pub provider: UploadProvider,
    /// Target directory for the `directory` provider.
    pub directory: Option<PathBuf>,
    /// Public URL prefix under which `directory` is served.
    pub public_base_url: String,
    pub cloud_name: String,
    pub upload_preset: String,
    /// Network timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for UploadSettings {
    fn default() -> Self {
        Self {
            provider: UploadProvider::None,
            directory: None,
            public_base_url: String::new(),
            cloud_name: String::new(),
            upload_preset: String::new(),
            timeout_secs: 30,
        }
    }
}

/// Settings controlling optional runtime telemetry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TelemetrySettings {
    /// Whether telemetry timing logs are enabled.
    pub enabled: bool,
    /// Logging level for telemetry output (error, warn, info, debug, trace).
    pub level: String,
}

impl Default for TelemetrySettings {
    fn default() -> Self {
        Self {
            enabled: false,
            level: "debug".to_string(),
        }
    }
}

impl TelemetrySettings {
    /// Resolve the configured level string into a `LevelFilter`.
    pub fn level_filter(&self) -> LevelFilter {
        match self.level.trim().to_ascii_lowercase().as_str() {
            "off" => LevelFilter::Off,
            "error" => LevelFilter::Error,
            "warn" | "warning" => LevelFilter::Warn,
            "info" => LevelFilter::Info,
            "trace" => LevelFilter::Trace,
            _ => LevelFilter::Debug,
        }
    }
}

/// Persistent application settings consumed by the CLI.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct AppSettings {
    pub record: SignatureRecord,
    pub theme: ThemeSettings,
    pub export: ExportSettings,
    pub remote: RemoteSettings,
    pub upload: UploadSettings,
    pub telemetry: TelemetrySettings,
}

impl AppSettings {
    /// Load settings from a JSON file, clamping out-of-range values.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read settings file {}", path.display()))?;
        let mut settings: AppSettings = serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse settings JSON at {}", path.display()))?;
        settings.record.sanitize();
        Ok(settings)
    }

    /// Serialize settings to disk in pretty-printed JSON, overwriting any existing file.
    pub fn save_to_path<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let payload =
            serde_json::to_string_pretty(self).context("failed to serialize settings JSON")?;
        fs::write(path, payload)
            .with_context(|| format!("failed to write settings file {}", path.display()))?;
        Ok(())
    }
}

/// Default location of the settings file (`config/sigframe.json`).
pub fn default_settings_path() -> PathBuf {
    env::current_dir()
        .map(|dir| dir.join("config/sigframe.json"))
        .unwrap_or_else(|_| PathBuf::from("config/sigframe.json"))
}
