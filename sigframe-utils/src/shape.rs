//! Shape catalog and masking helpers for the framed headshot.
//!
//! Every decorative outline the signature supports is a [`ShapeId`]. Looking a shape up
//! yields a [`MaskDescriptor`] that any renderer can consume: the HTML renderer turns it
//! into `border-radius` / `clip-path` declarations, the raster exporter turns it into an
//! alpha mask via [`apply_shape_mask`].

use image::RgbaImage;
use log::debug;
use serde::{Deserialize, Serialize};
use std::{f32::consts::PI, fmt, str::FromStr};
use tiny_skia::{FillRule, Paint, PathBuilder, Pixmap, Transform};

/// Named headshot outlines offered by the signature editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "&'static str")]
pub enum ShapeId {
    Circle,
    Rounded,
    Squircle,
    Leaf,
    LeafInverse,
    LeftRounded,
    TopLeftRound,
    BottomLeftRound,
    LeftSquircle,
    DiamondSquare,
    DiamondRounded,
    DiamondSquircle,
    OctagonSquare,
    OctagonRounded,
    OctagonSquircle,
    HexagonSquare,
    HexagonRounded,
    HexagonSquircle,
    Hexagon,
    Pentagon,
    Octagon,
    Message,
    MessageInverse,
    Diamond,
    #[default]
    Square,
}

impl ShapeId {
    /// Every shape in the order the editor lists them.
    pub const ALL: [ShapeId; 25] = [
        ShapeId::Circle,
        ShapeId::Rounded,
        ShapeId::Squircle,
        ShapeId::Leaf,
        ShapeId::LeafInverse,
        ShapeId::LeftRounded,
        ShapeId::TopLeftRound,
        ShapeId::BottomLeftRound,
        ShapeId::LeftSquircle,
        ShapeId::DiamondSquare,
        ShapeId::DiamondRounded,
        ShapeId::DiamondSquircle,
        ShapeId::OctagonSquare,
        ShapeId::OctagonRounded,
        ShapeId::OctagonSquircle,
        ShapeId::HexagonSquare,
        ShapeId::HexagonRounded,
        ShapeId::HexagonSquircle,
        ShapeId::Hexagon,
        ShapeId::Pentagon,
        ShapeId::Octagon,
        ShapeId::Message,
        ShapeId::MessageInverse,
        ShapeId::Diamond,
        ShapeId::Square,
    ];

    /// Identifier used in settings files and form values.
    pub fn as_str(self) -> &'static str {
        match self {
            ShapeId::Circle => "circle",
            ShapeId::Rounded => "rounded",
            ShapeId::Squircle => "squircle",
            ShapeId::Leaf => "leaf",
            ShapeId::LeafInverse => "leaf-inverse",
            ShapeId::LeftRounded => "left-rounded",
            ShapeId::TopLeftRound => "top-left-round",
            ShapeId::BottomLeftRound => "bottom-left-round",
            ShapeId::LeftSquircle => "left-squircle",
            ShapeId::DiamondSquare => "diamond-square",
            ShapeId::DiamondRounded => "diamond-rounded",
            ShapeId::DiamondSquircle => "diamond-squircle",
            ShapeId::OctagonSquare => "octagon-square",
            ShapeId::OctagonRounded => "octagon-rounded",
            ShapeId::OctagonSquircle => "octagon-squircle",
            ShapeId::HexagonSquare => "hexagon-square",
            ShapeId::HexagonRounded => "hexagon-rounded",
            ShapeId::HexagonSquircle => "hexagon-squircle",
            ShapeId::Hexagon => "hexagon",
            ShapeId::Pentagon => "pentagon",
            ShapeId::Octagon => "octagon",
            ShapeId::Message => "message",
            ShapeId::MessageInverse => "message-inverse",
            ShapeId::Diamond => "diamond",
            ShapeId::Square => "square",
        }
    }

    /// Human readable label for menus and CLI help.
    pub fn label(self) -> &'static str {
        match self {
            ShapeId::Circle => "Circle",
            ShapeId::Rounded => "Rounded Corners",
            ShapeId::Squircle => "Squircle",
            ShapeId::Leaf => "Leaf",
            ShapeId::LeafInverse => "Leaf Inverse",
            ShapeId::LeftRounded => "Left Rounded",
            ShapeId::TopLeftRound => "Top-Left Round",
            ShapeId::BottomLeftRound => "Bottom-Left Round",
            ShapeId::LeftSquircle => "Left Squircle",
            ShapeId::DiamondSquare => "Diamond-Square",
            ShapeId::DiamondRounded => "Diamond-Rounded",
            ShapeId::DiamondSquircle => "Diamond-Squircle",
            ShapeId::OctagonSquare => "Octagon-Square",
            ShapeId::OctagonRounded => "Octagon-Rounded",
            ShapeId::OctagonSquircle => "Octagon-Squircle",
            ShapeId::HexagonSquare => "Hexagon-Square",
            ShapeId::HexagonRounded => "Hexagon-Rounded",
            ShapeId::HexagonSquircle => "Hexagon-Squircle",
            ShapeId::Hexagon => "Hexagon",
            ShapeId::Pentagon => "Pentagon",
            ShapeId::Octagon => "Octagon",
            ShapeId::Message => "Message Bubble",
            ShapeId::MessageInverse => "Message Bubble Inverse",
            ShapeId::Diamond => "Diamond",
            ShapeId::Square => "Square",
        }
    }

    /// Parse an identifier, falling back to [`ShapeId::Square`] when it is not in the catalog.
    pub fn parse_lenient(value: &str) -> Self {
        value.parse().unwrap_or_else(|_| {
            debug!("Unrecognized shape '{value}', using square mask");
            ShapeId::Square
        })
    }

    /// Mask descriptor for this shape.
    pub fn mask(self) -> MaskDescriptor {
        use Length::{Percent as P, Px};
        match self {
            ShapeId::Circle => MaskDescriptor::uniform(P(50.0)),
            ShapeId::Rounded => MaskDescriptor::uniform(Px(15.0)),
            ShapeId::Squircle => MaskDescriptor::uniform(P(25.0)),
            ShapeId::Leaf => MaskDescriptor::corners(Px(0.0), P(50.0), P(50.0), P(50.0)),
            ShapeId::LeafInverse => MaskDescriptor::corners(P(50.0), Px(0.0), P(50.0), P(50.0)),
            ShapeId::LeftRounded => MaskDescriptor::corners(P(50.0), Px(0.0), Px(0.0), P(50.0)),
            ShapeId::TopLeftRound => MaskDescriptor::corners(P(50.0), Px(0.0), Px(0.0), Px(0.0)),
            ShapeId::BottomLeftRound => {
                MaskDescriptor::corners(Px(0.0), Px(0.0), Px(0.0), P(50.0))
            }
            ShapeId::LeftSquircle => MaskDescriptor::corners(P(25.0), Px(0.0), Px(0.0), P(25.0)),
            ShapeId::Message => MaskDescriptor::corners(P(50.0), P(50.0), P(50.0), Px(0.0)),
            ShapeId::MessageInverse => {
                MaskDescriptor::corners(P(50.0), P(50.0), Px(0.0), P(50.0))
            }
            ShapeId::Square => MaskDescriptor::uniform(Px(0.0)),
            ShapeId::DiamondSquare => MaskDescriptor::Polygon {
                points: &[(0.0, 50.0), (25.0, 0.0), (100.0, 0.0), (100.0, 100.0), (25.0, 100.0)],
            },
            ShapeId::DiamondRounded => MaskDescriptor::Polygon {
                points: &[
                    (0.0, 50.0),
                    (25.0, 0.0),
                    (90.0, 0.0),
                    (100.0, 10.0),
                    (100.0, 90.0),
                    (90.0, 100.0),
                    (25.0, 100.0),
                ],
            },
            ShapeId::DiamondSquircle => MaskDescriptor::Polygon {
                points: &[
                    (0.0, 50.0),
                    (25.0, 0.0),
                    (85.0, 0.0),
                    (100.0, 15.0),
                    (100.0, 85.0),
                    (85.0, 100.0),
                    (25.0, 100.0),
                ],
            },
            ShapeId::OctagonSquare => MaskDescriptor::Polygon {
                points: &[
                    (0.0, 30.0),
                    (0.0, 70.0),
                    (15.0, 85.0),
                    (15.0, 100.0),
                    (100.0, 100.0),
                    (100.0, 0.0),
                    (15.0, 0.0),
                    (15.0, 15.0),
                ],
            },
            ShapeId::OctagonRounded => MaskDescriptor::Polygon {
                points: &[
                    (0.0, 30.0),
                    (0.0, 70.0),
                    (15.0, 85.0),
                    (15.0, 100.0),
                    (90.0, 100.0),
                    (100.0, 90.0),
                    (100.0, 10.0),
                    (90.0, 0.0),
                    (15.0, 0.0),
                    (15.0, 15.0),
                ],
            },
            ShapeId::OctagonSquircle => MaskDescriptor::Polygon {
                points: &[
                    (0.0, 30.0),
                    (0.0, 70.0),
                    (15.0, 85.0),
                    (15.0, 100.0),
                    (85.0, 100.0),
                    (100.0, 85.0),
                    (100.0, 15.0),
                    (85.0, 0.0),
                    (15.0, 0.0),
                    (15.0, 15.0),
                ],
            },
            ShapeId::HexagonSquare => MaskDescriptor::Polygon {
                points: &[
                    (0.0, 25.0),
                    (0.0, 75.0),
                    (25.0, 100.0),
                    (100.0, 100.0),
                    (100.0, 0.0),
                    (25.0, 0.0),
                ],
            },
            ShapeId::HexagonRounded => MaskDescriptor::Polygon {
                points: &[
                    (0.0, 25.0),
                    (0.0, 75.0),
                    (25.0, 100.0),
                    (90.0, 100.0),
                    (100.0, 90.0),
                    (100.0, 10.0),
                    (90.0, 0.0),
                    (25.0, 0.0),
                ],
            },
            ShapeId::HexagonSquircle => MaskDescriptor::Polygon {
                points: &[
                    (0.0, 25.0),
                    (0.0, 75.0),
                    (25.0, 100.0),
                    (85.0, 100.0),
                    (100.0, 85.0),
                    (100.0, 15.0),
                    (85.0, 0.0),
                    (25.0, 0.0),
                ],
            },
            ShapeId::Hexagon => MaskDescriptor::Polygon {
                points: &[
                    (50.0, 0.0),
                    (100.0, 25.0),
                    (100.0, 75.0),
                    (50.0, 100.0),
                    (0.0, 75.0),
                    (0.0, 25.0),
                ],
            },
            ShapeId::Pentagon => MaskDescriptor::Polygon {
                points: &[(50.0, 0.0), (100.0, 38.0), (82.0, 100.0), (18.0, 100.0), (0.0, 38.0)],
            },
            ShapeId::Octagon => MaskDescriptor::Polygon {
                points: &[
                    (30.0, 0.0),
                    (70.0, 0.0),
                    (100.0, 30.0),
                    (100.0, 70.0),
                    (70.0, 100.0),
                    (30.0, 100.0),
                    (0.0, 70.0),
                    (0.0, 30.0),
                ],
            },
            ShapeId::Diamond => MaskDescriptor::Polygon {
                points: &[(50.0, 0.0), (100.0, 50.0), (50.0, 100.0), (0.0, 50.0)],
            },
        }
    }
}

impl fmt::Display for ShapeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ShapeId {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        ShapeId::ALL
            .into_iter()
            .find(|shape| shape.as_str() == normalized)
            .ok_or_else(|| format!("unknown shape '{value}'"))
    }
}

impl From<String> for ShapeId {
    fn from(value: String) -> Self {
        ShapeId::parse_lenient(&value)
    }
}

impl From<ShapeId> for &'static str {
    fn from(shape: ShapeId) -> Self {
        shape.as_str()
    }
}

/// Look up the mask for a shape identifier.
///
/// Identifiers outside the catalog resolve to the `square` descriptor.
pub fn lookup(shape_id: &str) -> MaskDescriptor {
    ShapeId::parse_lenient(shape_id).mask()
}

/// CSS length used for corner radii.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Length {
    Px(f32),
    Percent(f32),
}

impl Length {
    /// Resolve against the box dimension the percentage refers to.
    pub fn resolve(self, reference: f32) -> f32 {
        match self {
            Length::Px(px) => px,
            Length::Percent(pct) => reference * pct / 100.0,
        }
    }

    fn is_zero(self) -> bool {
        match self {
            Length::Px(v) | Length::Percent(v) => v == 0.0,
        }
    }
}

impl fmt::Display for Length {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            _ if self.is_zero() => f.write_str("0"),
            Length::Px(px) => write!(f, "{px}px"),
            Length::Percent(pct) => write!(f, "{pct}%"),
        }
    }
}

/// Clip outline for the headshot square.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MaskDescriptor {
    /// Rounded corners, ordered top-left, top-right, bottom-right, bottom-left.
    Radius { corners: [Length; 4] },
    /// Polygon vertices as `(x%, y%)` of the box.
    Polygon { points: &'static [(f32, f32)] },
}

impl MaskDescriptor {
    const fn uniform(radius: Length) -> Self {
        MaskDescriptor::Radius {
            corners: [radius; 4],
        }
    }

    const fn corners(tl: Length, tr: Length, br: Length, bl: Length) -> Self {
        MaskDescriptor::Radius {
            corners: [tl, tr, br, bl],
        }
    }

    /// Returns `true` when the mask leaves the square untouched.
    pub fn is_unmasked(&self) -> bool {
        matches!(self, MaskDescriptor::Radius { corners } if corners.iter().all(|c| c.is_zero()))
    }

    /// Value of the CSS `border-radius` property, collapsed when all corners agree.
    pub fn border_radius(&self) -> String {
        match self {
            MaskDescriptor::Radius { corners } => {
                if corners.iter().all(|c| *c == corners[0]) {
                    corners[0].to_string()
                } else {
                    let [tl, tr, br, bl] = corners;
                    format!("{tl} {tr} {br} {bl}")
                }
            }
            MaskDescriptor::Polygon { .. } => "0".to_string(),
        }
    }

    /// Value of the CSS `clip-path` property, if the mask is polygonal.
    pub fn clip_path(&self) -> Option<String> {
        match self {
            MaskDescriptor::Radius { .. } => None,
            MaskDescriptor::Polygon { points } => {
                let coords: Vec<String> = points
                    .iter()
                    .map(|(x, y)| format!("{x}% {y}%"))
                    .collect();
                Some(format!("polygon({})", coords.join(", ")))
            }
        }
    }

    /// Inline style declarations reproducing the mask in a browser.
    pub fn css_declarations(&self) -> Vec<(&'static str, String)> {
        let mut declarations = Vec::with_capacity(3);
        if let Some(clip) = self.clip_path() {
            declarations.push(("clip-path", clip.clone()));
            declarations.push(("-webkit-clip-path", clip));
        }
        declarations.push(("border-radius", self.border_radius()));
        declarations
    }

    /// Outline of the mask in pixel coordinates for a `width` x `height` box.
    pub fn outline_points(&self, width: u32, height: u32) -> Vec<(f32, f32)> {
        let w = width.max(1) as f32;
        let h = height.max(1) as f32;
        match self {
            MaskDescriptor::Polygon { points } => points
                .iter()
                .map(|(x, y)| (x / 100.0 * w, y / 100.0 * h))
                .collect(),
            MaskDescriptor::Radius { corners } => {
                let radii = resolve_corner_radii(corners, w, h);
                rounded_rect_points(w, h, radii, 16)
            }
        }
    }
}

/// Resolved elliptical radii `(rx, ry)` per corner (tl, tr, br, bl).
type CornerRadii = [(f32, f32); 4];

/// Resolve CSS radii against the box and shrink them when adjacent corners overlap,
/// the way browsers scale overlapping `border-radius` corners.
fn resolve_corner_radii(corners: &[Length; 4], w: f32, h: f32) -> CornerRadii {
    let corners = *corners;
    let mut radii = corners.map(|c| (c.resolve(w), c.resolve(h)));
    let [tl, tr, br, bl] = radii;
    let factor = [
        w / (tl.0 + tr.0),
        h / (tr.1 + br.1),
        w / (br.0 + bl.0),
        h / (bl.1 + tl.1),
    ]
    .into_iter()
    .filter(|f| f.is_finite())
    .fold(1.0_f32, f32::min);

    if factor < 1.0 {
        for (rx, ry) in radii.iter_mut() {
            *rx *= factor;
            *ry *= factor;
        }
    }
    radii
}

fn rounded_rect_points(width: f32, height: f32, radii: CornerRadii, segments: usize) -> Vec<(f32, f32)> {
    let [tl, tr, br, bl] = radii;
    let mut points = Vec::with_capacity((segments + 1) * 4);
    // `inward` points from the corner towards the arc centre.
    let mut add_corner = |corner: (f32, f32), inward: (f32, f32), (rx, ry): (f32, f32), start: f32| {
        if rx <= 0.0 || ry <= 0.0 {
            points.push(corner);
            return;
        }
        let cx = inward.0.mul_add(rx, corner.0);
        let cy = inward.1.mul_add(ry, corner.1);
        let steps = segments.max(3);
        let delta = (PI / 2.0) / steps as f32;
        for i in 0..=steps {
            let angle = delta.mul_add(i as f32, start);
            points.push((angle.cos().mul_add(rx, cx), angle.sin().mul_add(ry, cy)));
        }
    };

    add_corner((width, 0.0), (-1.0, 1.0), tr, -PI / 2.0);
    add_corner((width, height), (-1.0, -1.0), br, 0.0);
    add_corner((0.0, height), (1.0, -1.0), bl, PI / 2.0);
    add_corner((0.0, 0.0), (1.0, 1.0), tl, PI);

    points
}

fn build_path(width: u32, height: u32, mask: &MaskDescriptor) -> Option<tiny_skia::Path> {
    let points = mask.outline_points(width, height);
    let (first, rest) = points.split_first()?;

    let mut builder = PathBuilder::new();
    builder.move_to(first.0, first.1);
    for (x, y) in rest {
        builder.line_to(*x, *y);
    }
    builder.close();
    builder.finish()
}

/// Multiply the image alpha by the rasterized mask, clearing color outside the outline.
pub fn apply_shape_mask(image: &mut RgbaImage, mask: &MaskDescriptor) {
    if mask.is_unmasked() {
        return;
    }

    let (width, height) = image.dimensions();
    let Some(mut pixmap) = Pixmap::new(width, height) else {
        return;
    };
    pixmap.fill(tiny_skia::Color::TRANSPARENT);

    let Some(path) = build_path(width, height, mask) else {
        return;
    };
    let mut paint = Paint::default();
    paint.set_color_rgba8(255, 255, 255, 255);
    paint.anti_alias = true;
    pixmap.fill_path(
        &path,
        &paint,
        FillRule::Winding,
        Transform::identity(),
        None,
    );

    for (pixel, coverage) in image.pixels_mut().zip(pixmap.data().chunks_exact(4)) {
        let alpha = coverage[3];
        if alpha == 0 {
            pixel.0 = [0, 0, 0, 0];
        } else {
            pixel[3] = ((u16::from(pixel[3]) * u16::from(alpha) + 127) / 255) as u8;
        }
    }
}
