//! Pixel-level headshot crop.
//!
//! The raster path draws the scaled source onto a transparent `container_size` square at the
//! plan's offsets, mirroring what the preview's `overflow: hidden` container shows.

use std::path::Path;

use image::{DynamicImage, GenericImageView, RgbaImage, imageops, imageops::FilterType};
use log::{Level, debug};
use sigframe_utils::{EncodeOptions, EncodedRaster, apply_shape_mask, encode_raster, timing_guard};

use crate::{
    error::CropError,
    geometry::{CropParameters, CropPlan},
};

/// Upper bound on the scaled source drawn into the window.
pub const MAX_SCALED_PIXELS: u64 = 50_000_000;

/// A decoded headshot, immutable once loaded.
#[derive(Debug, Clone)]
pub struct SourceImage {
    pixels: RgbaImage,
}

impl SourceImage {
    /// Decode an uploaded file from memory, sniffing the format.
    pub fn decode(bytes: &[u8]) -> Result<Self, CropError> {
        let image = image::load_from_memory(bytes).map_err(CropError::Decode)?;
        Self::from_dynamic(image)
    }

    pub fn open(path: &Path) -> Result<Self, CropError> {
        let image = image::open(path).map_err(CropError::Decode)?;
        Self::from_dynamic(image)
    }

    pub fn from_rgba(pixels: RgbaImage) -> Result<Self, CropError> {
        if pixels.width() == 0 || pixels.height() == 0 {
            return Err(CropError::EmptySource);
        }
        Ok(Self { pixels })
    }

    fn from_dynamic(image: DynamicImage) -> Result<Self, CropError> {
        let (width, height) = image.dimensions();
        debug!("Decoded headshot source {width}x{height}");
        Self::from_rgba(image.into_rgba8())
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    /// Layout plan for this source under `params`.
    ///
    /// Fails with [`CropError::TooLarge`] when the scaled image would exceed
    /// [`MAX_SCALED_PIXELS`].
    pub fn plan(&self, params: &CropParameters) -> Result<CropPlan, CropError> {
        let plan = CropPlan::for_layout(params, self.width(), self.height())
            .ok_or(CropError::EmptySource)?;
        let (width, height) = plan.raster_size();
        if u64::from(width) * u64::from(height) > MAX_SCALED_PIXELS {
            return Err(CropError::TooLarge { width, height });
        }
        Ok(plan)
    }
}

/// Render the visible window of `source` under `plan`.
///
/// The result is always `container_size` square. Pixels the scaled image does not cover stay
/// fully transparent.
pub fn crop(source: &SourceImage, plan: &CropPlan) -> RgbaImage {
    let _guard = timing_guard("raster crop", Level::Debug);
    let size = plan.container_size.max(1);
    let mut canvas = RgbaImage::new(size, size);

    let (scaled_width, scaled_height) = plan.raster_size();
    let scaled = if (scaled_width, scaled_height) == (source.width(), source.height()) {
        source.pixels().clone()
    } else {
        imageops::resize(
            source.pixels(),
            scaled_width,
            scaled_height,
            FilterType::Lanczos3,
        )
    };

    imageops::replace(
        &mut canvas,
        &scaled,
        i64::from(plan.offset_x),
        i64::from(plan.offset_y),
    );
    canvas
}

/// Crop `source` for `params`, optionally bake the shape into alpha, and encode.
pub fn crop_and_encode(
    source: &SourceImage,
    params: &CropParameters,
    options: &EncodeOptions,
    bake_mask: bool,
) -> Result<EncodedRaster, CropError> {
    let plan = source.plan(params)?;
    let mut canvas = crop(source, &plan);
    if bake_mask {
        apply_shape_mask(&mut canvas, &params.shape.mask());
    }

    let _guard = timing_guard("raster encode", Level::Debug);
    encode_raster(&canvas, options).map_err(|source| CropError::Encode {
        format: options.format,
        source,
    })
}
