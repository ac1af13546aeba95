#![no_main]

use appscout::api::models::{ApiEnvelope, AppNameEntry, LoginData};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Response bodies come from the network; parsing must never panic
    if let Ok(s) = std::str::from_utf8(data) {
        let _names = serde_json::from_str::<ApiEnvelope<Vec<AppNameEntry>>>(s);
        let _login = serde_json::from_str::<ApiEnvelope<LoginData>>(s);
    }
});
