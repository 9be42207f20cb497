#![no_main]
use libfuzzer_sys::arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use stride_core::{RawSample, StrideEngine};

#[derive(Debug, Arbitrary)]
struct Sample {
    dt_ms: u16,
    ax: f64,
    ay: f64,
    az: f64,
}

fuzz_target!(|samples: Vec<Sample>| {
    let Ok(mut engine) = StrideEngine::builder().build() else {
        return;
    };
    let mut t = 0u64;
    let mut last_step: Option<u64> = None;
    for s in samples {
        t = t.saturating_add(u64::from(s.dt_ms));
        let out = engine.ingest(&RawSample::new(t, s.ax, s.ay, s.az));
        if let Some(ev) = out.step() {
            if let Some(prev) = last_step {
                assert!(ev.timestamp_ms - prev > 2500);
            }
            last_step = Some(ev.timestamp_ms);
        }
        let thr = engine.threshold();
        assert!((0.85..=1.15).contains(&thr), "threshold escaped: {thr}");
        engine.publish_if_due(t);
    }
    assert!(engine.history().len() <= 720);
});
