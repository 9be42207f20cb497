use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use stride_core::{RawSample, StrideEngine};
use stride_core::detector::StepDetector;
use stride_core::{DetectorCfg, MotionComponents};
use stride_sensors::GaitProfile;

// Gait trace with additive white noise on every axis
fn noisy_gait(duration_ms: u64, noise_amp: f64, seed: u32) -> Vec<RawSample> {
    // tiny PRNG
    let mut state = seed.max(1);
    let mut next = || {
        let mut x = state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        state = x;
        (f64::from(x) / (f64::from(u32::MAX) + 1.0)) * 2.0 - 1.0
    };
    GaitProfile::default()
        .trace(duration_ms)
        .into_iter()
        .map(|(t, a)| {
            RawSample::new(
                t,
                a.x + next() * noise_amp,
                a.y + next() * noise_amp,
                a.z + next() * noise_amp,
            )
        })
        .collect()
}

fn bench_engine_ingest(c: &mut Criterion) {
    let trace = noisy_gait(60_000, 0.05, 0xC0FFEE);
    c.bench_function("engine_ingest_60s_gait", |b| {
        b.iter_batched(
            || StrideEngine::builder().build().expect("defaults"),
            |mut engine| {
                for s in &trace {
                    black_box(engine.ingest(black_box(s)));
                    engine.publish_if_due(s.timestamp_ms);
                }
                engine.totals().steps
            },
            BatchSize::SmallInput,
        );
    });
}

fn bench_detector_update(c: &mut Criterion) {
    let motions: Vec<MotionComponents> = (0..3000)
        .map(|i| {
            let h = (1.2 * (std::f64::consts::TAU * f64::from(i) * 20.0 / 3000.0).sin()).abs();
            MotionComponents {
                total: h,
                horizontal: h,
                vertical: 0.1,
            }
        })
        .collect();
    c.bench_function("detector_update_3000", |b| {
        b.iter_batched(
            || StepDetector::new(DetectorCfg::default()),
            |mut d| {
                for (i, m) in motions.iter().enumerate() {
                    black_box(d.update(i as u64 * 20, black_box(m)));
                }
                d.threshold()
            },
            BatchSize::SmallInput,
        );
    });
}

criterion_group!(benches, bench_engine_ingest, bench_detector_update);
criterion_main!(benches);
