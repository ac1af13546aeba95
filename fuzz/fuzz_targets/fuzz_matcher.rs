#![no_main]

use appscout::find_similar;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // First byte picks the threshold, the rest is "installed|reference" with
    // comma-separated names on each side
    let Some((&first, rest)) = data.split_first() else {
        return;
    };
    let Ok(text) = std::str::from_utf8(rest) else {
        return;
    };
    let (installed, reference) = text.split_once('|').unwrap_or((text, ""));
    let installed: Vec<&str> = installed.split(',').collect();
    let reference: Vec<&str> = reference.split(',').collect();

    let threshold = f64::from(first) / 255.0;
    let loose = find_similar(&installed, &reference, threshold);
    let strict = find_similar(&installed, &reference, threshold / 2.0);

    assert!(strict.is_subset(&loose));
    assert!(loose.iter().all(|name| installed.contains(&name.as_str())));
});
