#![no_main]

use appscout::config::AppConfig;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Any parsed config must survive sanitizing with an in-range threshold
    if let Ok(s) = std::str::from_utf8(data) {
        if let Ok(mut config) = serde_json::from_str::<AppConfig>(s) {
            config.sanitize();
            assert!((0.0..=1.0).contains(&config.detection.threshold));
        }
    }
});
