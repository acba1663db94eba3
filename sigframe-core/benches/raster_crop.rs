use criterion::{Criterion, criterion_group, criterion_main};
use image::RgbaImage;
use sigframe_core::{CropParameters, SourceImage, crop, crop_and_encode};
use sigframe_utils::{EncodeOptions, RasterFormat, ShapeId};
use std::hint::black_box;

fn build_source_image() -> SourceImage {
    let img = RgbaImage::from_fn(2048, 1536, |x, y| {
        let val = ((x + y) % 255) as u8;
        image::Rgba([val, 255u8.saturating_sub(val), val / 2 + 60, 255])
    });
    SourceImage::from_rgba(img).expect("non-empty source")
}

fn raster_crop_benchmark(c: &mut Criterion) {
    let source = build_source_image();
    let params = CropParameters::new(135, 220, 35, 65, ShapeId::Squircle);
    let plan = source.plan(&params).expect("plan");

    c.bench_function("raster_crop_135", |b| {
        b.iter(|| black_box(crop(black_box(&source), black_box(&plan))));
    });

    let jpeg = EncodeOptions::default();
    c.bench_function("crop_and_encode_jpeg", |b| {
        b.iter(|| black_box(crop_and_encode(&source, black_box(&params), &jpeg, false)));
    });

    let png = EncodeOptions {
        format: RasterFormat::Png,
        ..EncodeOptions::default()
    };
    c.bench_function("crop_and_encode_png_masked", |b| {
        b.iter(|| black_box(crop_and_encode(&source, black_box(&params), &png, true)));
    });
}

criterion_group!(benches, raster_crop_benchmark);
criterion_main!(benches);
