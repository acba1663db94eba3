#[cfg(test)]
mod tests {
    use crate::shape::{Length, MaskDescriptor, ShapeId, apply_shape_mask, lookup};
    use image::{Rgba, RgbaImage};

    #[test]
    fn unknown_shape_falls_back_to_square() {
        assert_eq!(lookup("blob"), lookup("square"));
        assert_eq!(lookup(""), lookup("square"));
        assert!(lookup("blob").is_unmasked());
    }

    #[test]
    fn every_catalog_entry_round_trips_through_its_identifier() {
        for shape in ShapeId::ALL {
            assert_eq!(shape.as_str().parse::<ShapeId>(), Ok(shape));
            assert_eq!(lookup(shape.as_str()), shape.mask());
        }
    }

    #[test]
    fn identifiers_are_case_insensitive() {
        assert_eq!(ShapeId::parse_lenient("Leaf-Inverse"), ShapeId::LeafInverse);
        assert_eq!(ShapeId::parse_lenient("  CIRCLE "), ShapeId::Circle);
    }

    #[test]
    fn radius_css_collapses_uniform_corners() {
        assert_eq!(ShapeId::Circle.mask().border_radius(), "50%");
        assert_eq!(ShapeId::Rounded.mask().border_radius(), "15px");
        assert_eq!(ShapeId::Square.mask().border_radius(), "0");
        assert_eq!(ShapeId::Leaf.mask().border_radius(), "0 50% 50% 50%");
        assert_eq!(ShapeId::LeftSquircle.mask().border_radius(), "25% 0 0 25%");
    }

    #[test]
    fn polygon_css_emits_prefixed_clip_path() {
        let declarations = ShapeId::Diamond.mask().css_declarations();
        assert_eq!(
            declarations,
            vec![
                ("clip-path", "polygon(50% 0%, 100% 50%, 50% 100%, 0% 50%)".to_string()),
                (
                    "-webkit-clip-path",
                    "polygon(50% 0%, 100% 50%, 50% 100%, 0% 50%)".to_string()
                ),
                ("border-radius", "0".to_string()),
            ]
        );
    }

    #[test]
    fn polygon_outline_scales_percentages() {
        let points = ShapeId::Diamond.mask().outline_points(200, 200);
        assert_eq!(
            points,
            vec![(100.0, 0.0), (200.0, 100.0), (100.0, 200.0), (0.0, 100.0)]
        );
    }

    #[test]
    fn circle_outline_stays_inside_bounds() {
        let points = ShapeId::Circle.mask().outline_points(100, 100);
        // 4 corners * (16 segments + 1)
        assert_eq!(points.len(), 68);
        for (x, y) in &points {
            assert!(*x >= -0.01 && *x <= 100.01);
            assert!(*y >= -0.01 && *y <= 100.01);
        }
    }

    #[test]
    fn sharp_corners_emit_a_single_vertex() {
        let mask = MaskDescriptor::Radius {
            corners: [Length::Percent(50.0), Length::Px(0.0), Length::Px(0.0), Length::Px(0.0)],
        };
        let points = mask.outline_points(100, 100);
        assert_eq!(points.len(), 3 + 17);
        assert!(points.contains(&(100.0, 0.0)));
        assert!(points.contains(&(100.0, 100.0)));
        assert!(points.contains(&(0.0, 100.0)));
    }

    #[test]
    fn oversized_pixel_radii_are_scaled_down() {
        let mask = MaskDescriptor::Radius {
            corners: [Length::Px(80.0); 4],
        };
        let points = mask.outline_points(100, 100);
        for (x, y) in &points {
            assert!(*x >= -0.01 && *x <= 100.01);
            assert!(*y >= -0.01 && *y <= 100.01);
        }
    }

    #[test]
    fn circle_mask_clears_corners_and_keeps_center() {
        let mut img = RgbaImage::from_pixel(100, 100, Rgba([255, 255, 255, 255]));
        apply_shape_mask(&mut img, &ShapeId::Circle.mask());

        let corner = img.get_pixel(0, 0);
        assert_eq!(corner.0, [0, 0, 0, 0], "corner should be cleared");

        let center = img.get_pixel(50, 50);
        assert_eq!(center[3], 255, "center should stay opaque");
    }

    #[test]
    fn square_mask_leaves_pixels_untouched() {
        let mut img = RgbaImage::from_pixel(10, 10, Rgba([10, 20, 30, 200]));
        let before = img.clone();
        apply_shape_mask(&mut img, &lookup("square"));
        assert_eq!(img, before);
    }

    #[test]
    fn mask_preserves_existing_transparency() {
        let mut img = RgbaImage::from_pixel(50, 50, Rgba([255, 0, 0, 0]));
        apply_shape_mask(&mut img, &ShapeId::Hexagon.mask());
        assert_eq!(img.get_pixel(25, 25)[3], 0);
    }

    #[test]
    fn diamond_mask_clears_top_left_quadrant_corner() {
        let mut img = RgbaImage::from_pixel(64, 64, Rgba([0, 128, 255, 255]));
        apply_shape_mask(&mut img, &ShapeId::Diamond.mask());
        assert_eq!(img.get_pixel(2, 2)[3], 0);
        assert_eq!(img.get_pixel(32, 32)[3], 255);
    }

    #[test]
    fn shape_serializes_as_identifier() {
        let json = serde_json::to_string(&ShapeId::MessageInverse).unwrap();
        assert_eq!(json, "\"message-inverse\"");
        let parsed: ShapeId = serde_json::from_str("\"not-a-shape\"").unwrap();
        assert_eq!(parsed, ShapeId::Square);
    }
}
