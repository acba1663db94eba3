//! Crop geometry for the framed headshot.
//!
//! The preview, the raster export and the remote transform URL all frame the headshot from
//! the same four numbers: container size, zoom, and the x/y position sliders. This module is
//! the single place those numbers are turned into pixels; the renderers only translate a
//! [`CropPlan`] into their own primitives.

use log::debug;
use sigframe_utils::{
    HeadshotSettings, ShapeId,
    config::{MAX_CONTAINER_SIZE, MAX_IMAGE_SCALE, MIN_IMAGE_SCALE},
};

/// Pixels the image moves per slider point away from center.
pub const POSITION_SENSITIVITY: i32 = 5;

/// Slider value that leaves the image centered.
pub const POSITION_CENTER: u8 = 50;

/// User-facing framing parameters; immutable per render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CropParameters {
    pub container_size: u32,
    pub scale_percent: u32,
    pub position_x: u8,
    pub position_y: u8,
    pub shape: ShapeId,
}

impl CropParameters {
    /// Build parameters, clamping each value into the range the editor exposes.
    pub fn new(
        container_size: u32,
        scale_percent: u32,
        position_x: u32,
        position_y: u32,
        shape: ShapeId,
    ) -> Self {
        let clamped = Self {
            container_size: container_size.clamp(1, MAX_CONTAINER_SIZE),
            scale_percent: scale_percent.clamp(MIN_IMAGE_SCALE, MAX_IMAGE_SCALE),
            position_x: position_x.min(100) as u8,
            position_y: position_y.min(100) as u8,
            shape,
        };
        if clamped.container_size != container_size
            || clamped.scale_percent != scale_percent
            || u32::from(clamped.position_x) != position_x
            || u32::from(clamped.position_y) != position_y
        {
            debug!(
                "Clamped crop parameters ({container_size}, {scale_percent}%, {position_x}, {position_y}) to {clamped:?}"
            );
        }
        clamped
    }

    /// Zoom as a factor (`scale_percent / 100`).
    pub fn zoom(&self) -> f64 {
        f64::from(self.scale_percent) / 100.0
    }

    /// Offsets of the enlarged image relative to the container origin.
    pub fn offsets(&self) -> (i32, i32) {
        let shift =
            |position: u8| (i32::from(position) - i32::from(POSITION_CENTER)) * POSITION_SENSITIVITY;
        (shift(self.position_x), shift(self.position_y))
    }
}

impl Default for CropParameters {
    fn default() -> Self {
        Self::from(&HeadshotSettings::default())
    }
}

impl From<&HeadshotSettings> for CropParameters {
    fn from(settings: &HeadshotSettings) -> Self {
        Self::new(
            settings.container_size,
            settings.image_scale,
            settings.x,
            settings.y,
            settings.shape,
        )
    }
}

/// Resolved drawing instruction in container-local pixels.
///
/// The scaled image is drawn with its top-left corner at `(offset_x, offset_y)` and the
/// visible window is `(0, 0)..(container_size, container_size)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CropPlan {
    pub display_width: f64,
    pub display_height: f64,
    pub offset_x: i32,
    pub offset_y: i32,
    pub container_size: u32,
}

impl CropPlan {
    /// Plan a crop of an image whose natural size is `natural_width` x `natural_height`.
    ///
    /// Returns `None` when either dimension is zero (no image loaded).
    ///
    /// ```rust
    /// # use sigframe_core::geometry::{CropParameters, CropPlan};
    /// # use sigframe_utils::ShapeId;
    /// let params = CropParameters::new(135, 150, 50, 50, ShapeId::Circle);
    /// let plan = CropPlan::compute(&params, 400, 300).unwrap();
    /// assert_eq!(plan.display_width, 600.0);
    /// assert_eq!(plan.display_height, 450.0);
    /// assert_eq!((plan.offset_x, plan.offset_y), (0, 0));
    /// ```
    pub fn compute(params: &CropParameters, natural_width: u32, natural_height: u32) -> Option<Self> {
        if natural_width == 0 || natural_height == 0 {
            return None;
        }
        let display_width = f64::from(natural_width) * f64::from(params.scale_percent) / 100.0;
        Some(Self::with_display_width(
            params,
            display_width,
            f64::from(natural_height) / f64::from(natural_width),
        ))
    }

    /// Plan a crop the way the browser lays the headshot out: the image is first fitted to
    /// the container width, then enlarged by the zoom.
    ///
    /// This is the plan every renderer must use so preview and exports agree.
    pub fn for_layout(params: &CropParameters, natural_width: u32, natural_height: u32) -> Option<Self> {
        let (layout_width, layout_height) =
            layout_size(params.container_size, natural_width, natural_height)?;
        let display_width = layout_width * f64::from(params.scale_percent) / 100.0;
        Some(Self::with_display_width(
            params,
            display_width,
            layout_height / layout_width,
        ))
    }

    fn with_display_width(params: &CropParameters, display_width: f64, aspect: f64) -> Self {
        let (offset_x, offset_y) = params.offsets();
        Self {
            display_width,
            display_height: display_width * aspect,
            offset_x,
            offset_y,
            container_size: params.container_size,
        }
    }

    /// Integer size the scaled image is rasterized at (at least 1x1).
    pub fn raster_size(&self) -> (u32, u32) {
        let px = |v: f64| v.round().clamp(1.0, f64::from(u32::MAX)) as u32;
        (px(self.display_width), px(self.display_height))
    }

    /// `true` when the scaled image covers the entire window.
    pub fn covers_window(&self) -> bool {
        let size = f64::from(self.container_size);
        let left = f64::from(self.offset_x);
        let top = f64::from(self.offset_y);
        left <= 0.0
            && top <= 0.0
            && left + self.display_width >= size
            && top + self.display_height >= size
    }
}

/// Size the browser lays an image out at inside the container before zooming:
/// width equals the container, height follows the aspect ratio.
pub fn layout_size(container_size: u32, natural_width: u32, natural_height: u32) -> Option<(f64, f64)> {
    if natural_width == 0 || natural_height == 0 {
        return None;
    }
    let width = f64::from(container_size);
    Some((
        width,
        width * f64::from(natural_height) / f64::from(natural_width),
    ))
}

/// Inline style for the `<img>` inside the preview container.
///
/// Percent width is relative to the container, so this matches [`CropPlan::for_layout`].
pub fn preview_image_declarations(params: &CropParameters) -> Vec<(&'static str, String)> {
    let (left, top) = params.offsets();
    vec![
        ("width", format!("{}%", params.scale_percent)),
        ("height", "auto".to_string()),
        ("max-width", "none".to_string()),
        ("position", "relative".to_string()),
        ("left", format!("{left}px")),
        ("top", format!("{top}px")),
        ("display", "block".to_string()),
    ]
}

/// Inline style for the clipping container of the preview.
pub fn preview_container_declarations(params: &CropParameters) -> Vec<(&'static str, String)> {
    let size = params.container_size;
    let mut declarations = vec![
        ("width", format!("{size}px")),
        ("height", format!("{size}px")),
        ("overflow", "hidden".to_string()),
        ("position", "relative".to_string()),
        ("display", "inline-block".to_string()),
    ];
    declarations.extend(params.shape.mask().css_declarations());
    declarations
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(size: u32, scale: u32, x: u32, y: u32) -> CropParameters {
        CropParameters::new(size, scale, x, y, ShapeId::Circle)
    }

    #[test]
    fn identical_inputs_give_identical_plans() {
        let p = params(135, 173, 12, 88);
        let a = CropPlan::compute(&p, 1024, 768).unwrap();
        let b = CropPlan::compute(&p, 1024, 768).unwrap();
        assert_eq!(a.display_width.to_bits(), b.display_width.to_bits());
        assert_eq!(a.display_height.to_bits(), b.display_height.to_bits());
        assert_eq!(a, b);
    }

    #[test]
    fn centered_position_has_zero_offset() {
        let plan = CropPlan::compute(&params(135, 220, 50, 50), 640, 480).unwrap();
        assert_eq!((plan.offset_x, plan.offset_y), (0, 0));
    }

    #[test]
    fn unit_scale_keeps_natural_width() {
        let plan = CropPlan::compute(&params(135, 100, 30, 70), 777, 500).unwrap();
        assert_eq!(plan.display_width, 777.0);
        assert_eq!(plan.display_height, 500.0);
    }

    #[test]
    fn one_and_a_half_zoom_centered() {
        let plan = CropPlan::compute(&params(135, 150, 50, 50), 800, 600).unwrap();
        assert_eq!(plan.display_width, 800.0 * 1.5);
        assert_eq!(plan.display_height, 900.0);
        assert_eq!((plan.offset_x, plan.offset_y), (0, 0));
        assert_eq!(plan.container_size, 135);
    }

    #[test]
    fn extreme_positions_use_fixed_sensitivity() {
        let plan = CropPlan::compute(&params(135, 100, 0, 100), 500, 500).unwrap();
        assert_eq!((plan.offset_x, plan.offset_y), (-250, 250));
    }

    #[test]
    fn offset_x_is_monotone_in_position() {
        let mut previous = i32::MIN;
        for x in 0..=100 {
            let plan = CropPlan::compute(&params(135, 120, x, 50), 300, 300).unwrap();
            assert!(plan.offset_x >= previous);
            previous = plan.offset_x;
        }
    }

    #[test]
    fn zero_natural_size_is_rejected() {
        assert!(CropPlan::compute(&params(135, 100, 50, 50), 0, 300).is_none());
        assert!(CropPlan::for_layout(&params(135, 100, 50, 50), 300, 0).is_none());
    }

    #[test]
    fn parameters_are_clamped() {
        let p = CropParameters::new(0, 40, 250, 101, ShapeId::Square);
        assert_eq!(p.container_size, 1);
        assert_eq!(p.scale_percent, 100);
        assert_eq!(p.position_x, 100);
        assert_eq!(p.position_y, 100);
        assert_eq!(CropParameters::new(135, 999, 0, 0, ShapeId::Square).scale_percent, 300);
        assert_eq!(
            CropParameters::new(u32::MAX, 100, 50, 50, ShapeId::Square).container_size,
            MAX_CONTAINER_SIZE
        );
    }

    #[test]
    fn layout_plan_fits_width_to_container() {
        let plan = CropPlan::for_layout(&params(135, 200, 50, 50), 1000, 1500).unwrap();
        assert_eq!(plan.display_width, 270.0);
        assert_eq!(plan.display_height, 405.0);
        assert!(plan.covers_window());
        assert_eq!(plan.raster_size(), (270, 405));
    }

    #[test]
    fn landscape_source_leaves_window_uncovered() {
        let plan = CropPlan::for_layout(&params(100, 100, 50, 50), 400, 200).unwrap();
        assert_eq!(plan.display_height, 50.0);
        assert!(!plan.covers_window());
    }

    #[test]
    fn preview_declarations_follow_offsets() {
        let decls = preview_image_declarations(&params(135, 150, 40, 60));
        assert!(decls.contains(&("width", "150%".to_string())));
        assert!(decls.contains(&("left", "-50px".to_string())));
        assert!(decls.contains(&("top", "50px".to_string())));
    }

    #[test]
    fn container_declarations_include_mask() {
        let decls = preview_container_declarations(&params(120, 100, 50, 50));
        assert!(decls.contains(&("width", "120px".to_string())));
        assert!(decls.contains(&("overflow", "hidden".to_string())));
        assert!(decls.contains(&("border-radius", "50%".to_string())));
    }
}
