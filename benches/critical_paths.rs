//! Criterion benchmarks for Rasterfx critical paths
//!
//! Benchmarks the per-frame operations:
//! - Aggregator: palette merging and the cached no-change path
//! - Viewport: resolution computation for every scale mode
//! - CpuFilter: nearest-color quantization and the downscale/upscale blit
//! - Color: CSS color parsing (hex and functional)

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use image::{Rgba, RgbaImage};
use rasterfx::color::{parse_color, ColorSpace};
use rasterfx::quantize::{rebuild, PaletteAggregator};
use rasterfx::registry::{PaletteId, PaletteRegistry};
use rasterfx::sink::{CpuFilter, FilterSink};
use rasterfx::viewport::{resolve, ScaleMode, ViewportConfig, ViewportScaler};

// =============================================================================
// Test Data Generators
// =============================================================================

/// Registry holding every built-in palette, plus the resolved list
fn builtin_registry() -> (PaletteRegistry, Vec<Option<PaletteId>>) {
    let mut registry = PaletteRegistry::new();
    let refs = ["@pico8", "@nes", "@grayscale", "@gameboy", "@1bit"];
    let list = registry
        .resolve_all(&refs, std::path::Path::new("."))
        .expect("built-in palettes resolve");
    (registry, list)
}

/// Generate a frame with a smooth color gradient
fn make_frame(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_fn(width, height, |x, y| {
        Rgba([(x * 255 / width) as u8, (y * 255 / height) as u8, ((x + y) % 256) as u8, 255])
    })
}

// =============================================================================
// Aggregator Benchmarks
// =============================================================================

fn bench_aggregator(c: &mut Criterion) {
    let mut group = c.benchmark_group("aggregator");
    let (registry, list) = builtin_registry();

    group.bench_function("rebuild_gamma", |b| {
        b.iter(|| rebuild(black_box(&list), &registry, ColorSpace::Gamma))
    });

    group.bench_function("rebuild_linear", |b| {
        b.iter(|| rebuild(black_box(&list), &registry, ColorSpace::Linear))
    });

    // Steady state: same list every frame
    let mut aggregator = PaletteAggregator::new();
    aggregator.update(&list, &registry, ColorSpace::Gamma);
    group.bench_function("update_unchanged", |b| {
        b.iter(|| aggregator.update(black_box(&list), &registry, ColorSpace::Gamma).len())
    });

    group.finish();
}

// =============================================================================
// Viewport Benchmarks
// =============================================================================

fn bench_resolve(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolve");

    for mode in [
        ScaleMode::ConstantDownscale,
        ScaleMode::ScaleVerticalInteger,
        ScaleMode::ExactVertical,
    ] {
        let config = ViewportConfig::new(mode, 3.0, 360);
        group.bench_with_input(BenchmarkId::new("resolve", format!("{:?}", mode)), &config, |b, config| {
            b.iter(|| resolve(black_box(3840), black_box(2160), config))
        });
    }

    group.finish();
}

// =============================================================================
// CpuFilter Benchmarks
// =============================================================================

fn bench_cpu_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("cpu_filter");
    let (registry, list) = builtin_registry();

    for (width, height) in [(320, 180), (1280, 720)] {
        let frame = make_frame(width, height);
        group.throughput(Throughput::Elements(u64::from(width) * u64::from(height)));

        for space in [ColorSpace::Gamma, ColorSpace::Linear] {
            let colors = rebuild(&list, &registry, space);
            let mut sink = CpuFilter::new(space);
            let mut destination = RgbaImage::new(width, height);
            let name = format!("quantize_{:?}", space).to_lowercase();
            group.bench_function(BenchmarkId::new(name, format!("{}x{}", width, height)), |b| {
                b.iter(|| {
                    sink.apply_color_quantization(black_box(&frame), &colors, &mut destination)
                })
            });
        }

        let scaler = ViewportScaler::new(ViewportConfig::default());
        let mut sink = CpuFilter::new(ColorSpace::Gamma);
        let mut destination = RgbaImage::new(width, height);
        group.bench_function(BenchmarkId::new("viewport", format!("{}x{}", width, height)), |b| {
            b.iter(|| scaler.render(&mut sink, black_box(&frame), &mut destination, (width, height)))
        });
    }

    group.finish();
}

// =============================================================================
// Color Parsing Benchmarks
// =============================================================================

fn bench_color(c: &mut Criterion) {
    let mut group = c.benchmark_group("color");

    for input in ["#F0A", "#FF00AA", "#FF00AA80", "rgb(255, 0, 170)", "hsl(320deg 100% 50%)", "coral"] {
        group.bench_with_input(BenchmarkId::new("parse_color", input), input, |b, input| {
            b.iter(|| parse_color(black_box(input)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_aggregator, bench_resolve, bench_cpu_filter, bench_color);

criterion_main!(benches);
