//! Benchmarks for the analyze pipeline (FFT, classification, bucketing).
//!
//! One second of 44.1 kHz audio pads to a 65536-point transform per channel.

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use hm_audio::analyze;
use hm_audio::bucket::Bucketizer;
use hm_core::config::{ChartConfig, MonitorConfig};
use hm_core::spectrum::Spectrum;
use hm_core::status::ChannelStatus;

const RATE: u32 = 44_100;

/// Interleaved tone plus a little 60 Hz hum on every channel.
fn test_signal(channels: usize) -> Vec<f32> {
    use std::f64::consts::PI;
    let frames = RATE as usize;
    (0..frames)
        .flat_map(|i| {
            let t = i as f64 / f64::from(RATE);
            (0..channels).map(move |ch| {
                let tone = (2.0 * PI * (440.0 * (ch + 1) as f64) * t).sin();
                let hum = 0.05 * (2.0 * PI * 60.0 * t).sin();
                (0.4 * tone + hum) as f32
            })
        })
        .collect()
}

fn bench_analyze(c: &mut Criterion) {
    let config = MonitorConfig::default();
    let mut group = c.benchmark_group("analyze_1s");
    group.sample_size(20);

    for channels in [1usize, 2] {
        let pcm = test_signal(channels);
        group.bench_with_input(BenchmarkId::new("channels", channels), &pcm, |b, pcm| {
            b.iter(|| analyze(pcm, RATE, channels, ChannelStatus::Online, &config));
        });
    }
    group.finish();
}

fn bench_bucketize(c: &mut Criterion) {
    let bucketizer = Bucketizer::new(&ChartConfig::default());
    let bin_hz = f64::from(RATE) / 65_536.0;
    let spectrum = Spectrum::from_magnitudes((0..32_768).map(|i| f64::from(i % 97)), bin_hz);

    c.bench_function("bucketize_32768_bins", |b| {
        b.iter(|| bucketizer.bucketize(&spectrum));
    });
}

criterion_group!(benches, bench_analyze, bench_bucketize);
criterion_main!(benches);
