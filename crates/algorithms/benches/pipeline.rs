//! Benchmarks for the tile processing pipeline

use std::collections::BTreeMap;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use viridia_algorithms::contour::{trace_contours, TraceParams};
use viridia_algorithms::harmonize::upsample;
use viridia_algorithms::imagery::ndvi;
use viridia_algorithms::masking::{validity_mask, MaskParams};
use viridia_algorithms::morphology::StructuringElement;
use viridia_algorithms::pipeline::{zone_features, PipelineParams, TileBands};
use viridia_algorithms::zones::{classify_zones, ZoneParams};
use viridia_core::{BandId, GeoTransform, MaskClass, Raster, SceneClass};

fn reflectance_raster(size: usize, a: usize, b: usize, scale: f64) -> Raster<f64> {
    let mut r = Raster::new(size, size);
    r.set_transform(GeoTransform::new(0.0, size as f64, 1.0, -1.0));
    // Varied surface with some structure
    for row in 0..size {
        for col in 0..size {
            let v = ((row * a + col * b) % 256) as f64 / 255.0 * scale;
            r.set(row, col, v).unwrap();
        }
    }
    r
}

fn scene_raster(size: usize) -> Raster<u16> {
    let mut r = Raster::filled(size, size, SceneClass::Vegetation.code());
    // Cloud block over one corner
    for row in 0..size / 4 {
        for col in 0..size / 4 {
            r.set(row, col, SceneClass::CloudHighProbability.code()).unwrap();
        }
    }
    r
}

fn blocky_mask(size: usize) -> Raster<u8> {
    let mut r = Raster::new(size, size);
    for row in 0..size {
        for col in 0..size {
            if (row / 8 + col / 8) % 2 == 0 {
                r.set(row, col, 1).unwrap();
            }
        }
    }
    r
}

fn tile(size: usize) -> TileBands {
    let mut bands = BTreeMap::new();
    bands.insert(BandId::B08, reflectance_raster(size, 7, 13, 0.9));
    bands.insert(BandId::B04, reflectance_raster(size, 11, 3, 0.3));
    TileBands {
        bands,
        scl: Some(scene_raster(size / 2)),
    }
}

fn tile_params() -> PipelineParams {
    PipelineParams {
        mask: MaskParams {
            classes: vec![MaskClass::Cloud],
            buffer: Some(StructuringElement::Square(2)),
        },
        ..PipelineParams::default()
    }
}

fn bench_upsample(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline/upsample");
    for size in [256, 512, 1024] {
        let band = reflectance_raster(size, 7, 13, 0.9);
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| upsample(black_box(&band), 2).unwrap())
        });
    }
    group.finish();
}

fn bench_ndvi(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline/ndvi");
    for size in [256, 512, 1024] {
        let nir = reflectance_raster(size, 7, 13, 0.9);
        let red = reflectance_raster(size, 11, 3, 0.3);
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| ndvi(black_box(&nir), black_box(&red)).unwrap())
        });
    }
    group.finish();
}

fn bench_validity_mask(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline/validity_mask");
    let params = MaskParams {
        classes: vec![MaskClass::Cloud],
        buffer: Some(StructuringElement::Square(2)),
    };
    for size in [256, 512, 1024] {
        let scl = scene_raster(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| validity_mask(black_box(&scl), &params).unwrap())
        });
    }
    group.finish();
}

fn bench_classify_zones(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline/classify_zones");
    let params = ZoneParams::default();
    for size in [256, 512, 1024] {
        let index = reflectance_raster(size, 7, 13, 1.0);
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| classify_zones(black_box(&index), &params).unwrap())
        });
    }
    group.finish();
}

fn bench_trace_contours(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline/trace_contours");
    let params = TraceParams::default();
    for size in [256, 512, 1024] {
        let mask = blocky_mask(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| trace_contours(black_box(&mask), &params).unwrap())
        });
    }
    group.finish();
}

fn bench_zone_features(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline/zone_features");
    group.sample_size(10);
    let params = tile_params();
    for size in [256, 512, 1024] {
        let tile = tile(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| zone_features(black_box(&tile), &params).unwrap())
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_upsample,
    bench_ndvi,
    bench_validity_mask,
    bench_classify_zones,
    bench_trace_contours,
    bench_zone_features,
);
criterion_main!(benches);
