//! Performance benchmarks for the analysis path
//!
//! Covers the three per-lead stages separately and the full 12-lead
//! `analyze_all` over records of increasing length.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ecg_processing::{HeartRateAnalyzer, PeakDetector, RateEstimator, SignalConditioner};
use ecg_simulation::{EcgConfig, EcgSimulator, SyntheticRecord};

fn record(seconds: f64) -> SyntheticRecord {
    let config = EcgConfig {
        seed: Some(1),
        ..EcgConfig::default()
    };
    EcgSimulator::new(config)
        .and_then(|mut sim| sim.generate(seconds))
        .expect("simulated record")
}

/// Benchmark each stage on lead II
fn bench_stages(c: &mut Criterion) {
    let mut group = c.benchmark_group("stages");

    for &seconds in &[10.0, 60.0] {
        let record = record(seconds);
        let lead = record.lead_set.get("II").expect("lead II");
        let conditioner = SignalConditioner::default();
        let detector = PeakDetector::default();
        let conditioned = conditioner.condition(lead).expect("conditioned");
        let peaks = detector.detect(&conditioned).expect("peaks");

        group.bench_with_input(
            BenchmarkId::new("condition", format!("{seconds}s")),
            lead,
            |b, lead| b.iter(|| black_box(conditioner.condition(black_box(lead)))),
        );

        group.bench_with_input(
            BenchmarkId::new("detect", format!("{seconds}s")),
            &conditioned,
            |b, conditioned| b.iter(|| black_box(detector.detect(black_box(conditioned)))),
        );

        group.bench_with_input(
            BenchmarkId::new("estimate", format!("{seconds}s")),
            &peaks,
            |b, peaks| {
                b.iter(|| black_box(RateEstimator::new().estimate(black_box(peaks), 500.0, "II")))
            },
        );
    }

    group.finish();
}

/// Benchmark all twelve leads end to end
fn bench_analyze_all(c: &mut Criterion) {
    let mut group = c.benchmark_group("analyze_all");
    group.sample_size(20);

    let analyzer = HeartRateAnalyzer::default();
    for &seconds in &[10.0, 30.0] {
        let record = record(seconds);
        group.bench_with_input(
            BenchmarkId::new("12_leads", format!("{seconds}s")),
            &record.lead_set,
            |b, lead_set| b.iter(|| black_box(analyzer.analyze_all(black_box(lead_set)))),
        );
    }

    group.finish();
}

criterion_group!(benches, bench_stages, bench_analyze_all);
criterion_main!(benches);
