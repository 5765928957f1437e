// benches/stimulus_core.rs

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use hfac_core::config::TimingParameters;
use hfac_core::engine::{ProtocolSequencer, StimulusEngine};

const SAMPLE_PERIODS: &[f64] = &[1e-4, 1e-5, 1e-6];

fn benchmark_tick_path(c: &mut Criterion) {
    let mut group = c.benchmark_group("tick");
    group.throughput(Throughput::Elements(1000));

    group.bench_function("idle_hfac_on", |b| {
        let mut seq = ProtocolSequencer::new(TimingParameters::default(), 1e-5).unwrap();
        seq.set_hfac_enabled(true);
        b.iter(|| {
            for _ in 0..1000 {
                black_box(seq.tick());
            }
        });
    });

    group.bench_function("protocol_running", |b| {
        // Long trial so the protocol never completes inside an iteration.
        let params = TimingParameters {
            trial_duration_s: 1e9,
            ..Default::default()
        };
        let mut seq = ProtocolSequencer::new(params, 1e-5).unwrap();
        seq.run_protocol();
        b.iter(|| {
            for _ in 0..1000 {
                black_box(seq.tick());
            }
        });
    });

    group.finish();
}

fn benchmark_resynthesis(c: &mut Criterion) {
    let mut group = c.benchmark_group("reconfigure");

    for &dt in SAMPLE_PERIODS {
        group.bench_with_input(BenchmarkId::new("rebuild", format!("dt_{dt}")), &dt, |b, &dt| {
            let params = TimingParameters::default();
            let mut engine = StimulusEngine::new(params, dt).unwrap();
            b.iter(|| {
                engine.reconfigure(black_box(params), black_box(dt)).unwrap();
            });
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_tick_path, benchmark_resynthesis);
criterion_main!(benches);
