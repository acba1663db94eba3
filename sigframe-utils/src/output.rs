//! Raster encoding for exported headshots.
//!
//! Centralizes format selection, compression tuning and alpha flattening so the export
//! worker and the CLI write identical bytes.

use crate::{color::RgbaColor, config::ExportSettings};

use anyhow::{Context, Result};
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use image::{
    ExtendedColorType, ImageEncoder, ImageResult, RgbImage, RgbaImage,
    codecs::{
        jpeg::JpegEncoder,
        png::{CompressionType, FilterType, PngEncoder},
        webp::WebPEncoder,
    },
};
use log::{debug, warn};
use std::{fmt, fs, path::Path, str::FromStr};

/// Formats the exporter can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RasterFormat {
    Png,
    #[default]
    Jpeg,
    Webp,
}

impl RasterFormat {
    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Webp => "image/webp",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::Webp => "webp",
        }
    }

    /// Whether the encoded bytes keep an alpha channel.
    pub fn supports_alpha(self) -> bool {
        !matches!(self, Self::Jpeg)
    }
}

impl fmt::Display for RasterFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for RasterFormat {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "png" => Ok(Self::Png),
            "jpg" | "jpeg" => Ok(Self::Jpeg),
            "webp" => Ok(Self::Webp),
            other => Err(format!("unknown image format '{other}'")),
        }
    }
}

/// Simplified PNG compression strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PngCompression {
    Fast,
    Default,
    Best,
}

impl PngCompression {
    /// Parse a strategy name or a zlib-style level (0-9).
    pub fn parse(input: &str) -> Self {
        let normalized = input.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "fast" => Self::Fast,
            "best" => Self::Best,
            "default" => Self::Default,
            _ => match normalized.parse::<u8>() {
                Ok(0..=3) => Self::Fast,
                Ok(7..=9) => Self::Best,
                Ok(_) => Self::Default,
                Err(_) => {
                    warn!("Unknown PNG compression '{input}', falling back to default strategy");
                    Self::Default
                }
            },
        }
    }

    fn into_image(self) -> CompressionType {
        match self {
            Self::Fast => CompressionType::Fast,
            Self::Default => CompressionType::Default,
            Self::Best => CompressionType::Best,
        }
    }
}

/// Immutable encoder configuration derived from [`ExportSettings`].
#[derive(Debug, Clone, PartialEq)]
pub struct EncodeOptions {
    pub format: RasterFormat,
    pub jpeg_quality: u8,
    pub png_compression: PngCompression,
    /// Background composited under translucent pixels for opaque formats.
    pub fill_color: RgbaColor,
}

impl EncodeOptions {
    pub fn from_export_settings(settings: &ExportSettings) -> Self {
        let format = settings.format.parse().unwrap_or_else(|err| {
            warn!("{err}; exporting JPEG instead");
            RasterFormat::Jpeg
        });
        Self {
            format,
            jpeg_quality: settings.jpeg_quality.clamp(1, 100),
            png_compression: PngCompression::parse(&settings.png_compression),
            fill_color: settings.fill_color,
        }
    }
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self::from_export_settings(&ExportSettings::default())
    }
}

/// Encoded image bytes plus the format they were written in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedRaster {
    pub bytes: Vec<u8>,
    pub format: RasterFormat,
    pub width: u32,
    pub height: u32,
}

impl EncodedRaster {
    /// Self-contained `data:` URI embedding the bytes.
    pub fn data_uri(&self) -> String {
        data_uri(&self.bytes, self.format.mime_type())
    }

    /// File name carrying the right extension for the format.
    pub fn file_name(&self, stem: &str) -> String {
        format!("{stem}.{}", self.format.extension())
    }

    /// Write the encoded bytes to disk, creating parent directories as needed.
    pub fn save(&self, destination: &Path) -> Result<()> {
        if let Some(parent) = destination.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        fs::write(destination, &self.bytes)
            .with_context(|| format!("failed to write {}", destination.display()))
    }
}

/// Encode an RGBA buffer according to `options`.
pub fn encode_raster(image: &RgbaImage, options: &EncodeOptions) -> ImageResult<EncodedRaster> {
    debug!(
        "Encoding {}x{} headshot as {}",
        image.width(),
        image.height(),
        options.format
    );
    let bytes = match options.format {
        RasterFormat::Png => encode_png(image, options.png_compression)?,
        RasterFormat::Jpeg => {
            encode_jpeg(&flatten(image, options.fill_color), options.jpeg_quality)?
        }
        RasterFormat::Webp => encode_webp(image)?,
    };
    Ok(EncodedRaster {
        bytes,
        format: options.format,
        width: image.width(),
        height: image.height(),
    })
}

/// Build a `data:` URI from raw bytes.
pub fn data_uri(bytes: &[u8], mime_type: &str) -> String {
    format!("data:{mime_type};base64,{}", BASE64.encode(bytes))
}

/// Composite translucent pixels over `background`, dropping alpha.
pub fn flatten(image: &RgbaImage, background: RgbaColor) -> RgbImage {
    let bg = [background.red, background.green, background.blue];
    RgbImage::from_fn(image.width(), image.height(), |x, y| {
        let px = image.get_pixel(x, y);
        let alpha = u16::from(px[3]);
        let blend = |fg: u8, bg: u8| {
            ((u16::from(fg) * alpha + u16::from(bg) * (255 - alpha) + 127) / 255) as u8
        };
        image::Rgb([
            blend(px[0], bg[0]),
            blend(px[1], bg[1]),
            blend(px[2], bg[2]),
        ])
    })
}

fn encode_png(image: &RgbaImage, compression: PngCompression) -> ImageResult<Vec<u8>> {
    let mut buffer = Vec::new();
    PngEncoder::new_with_quality(&mut buffer, compression.into_image(), FilterType::Adaptive)
        .write_image(
            image.as_raw(),
            image.width(),
            image.height(),
            ExtendedColorType::Rgba8,
        )?;
    Ok(buffer)
}

fn encode_jpeg(image: &RgbImage, quality: u8) -> ImageResult<Vec<u8>> {
    let mut buffer = Vec::new();
    JpegEncoder::new_with_quality(&mut buffer, quality).write_image(
        image.as_raw(),
        image.width(),
        image.height(),
        ExtendedColorType::Rgb8,
    )?;
    Ok(buffer)
}

fn encode_webp(image: &RgbaImage) -> ImageResult<Vec<u8>> {
    let mut buffer = Vec::new();
    WebPEncoder::new_lossless(&mut buffer).write_image(
        image.as_raw(),
        image.width(),
        image.height(),
        ExtendedColorType::Rgba8,
    )?;
    Ok(buffer)
}
