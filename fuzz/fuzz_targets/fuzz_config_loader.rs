#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    // Parse errors are fine; panics are not. Env overrides go through the
    // same slots, so feed a fixed lookup too.
    if let Ok(mut cfg) = pmon_config::load_toml(data) {
        let _ = cfg.validate();
        cfg.apply_env(|k| (k == "SERVER_POST_URL").then(|| data.to_string()));
        let _ = cfg.validate();
    }
});
