#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    // Arbitrary TOML must either fail to parse, fail validation, or map into
    // an engine config the builder accepts. None of it may panic.
    if let Ok(cfg) = stride_config::load_toml(data) {
        if cfg.validate().is_ok() {
            let engine_cfg = stride_core::EngineCfg::from(&cfg);
            let _ = stride_core::StrideEngine::builder()
                .with_cfg(engine_cfg)
                .build();
        }
    }
});
