#![no_main]
use libfuzzer_sys::fuzz_target;
use once_cell::sync::Lazy;

use cloudshield::triage::strings::scan_bytes;
use cloudshield::IndicatorSet;

static INDICATORS: Lazy<IndicatorSet> = Lazy::new(|| {
    IndicatorSet::from_lists(
        Vec::<&str>::new(),
        ["malware-signature", "eval(", "\u{e9}t\u{e9}", "a", "aa"],
        Vec::<&str>::new(),
    )
    .expect("fuzz indicators")
});

fuzz_target!(|data: &[u8]| {
    let found = scan_bytes(data, &INDICATORS);
    assert!(found.len() <= INDICATORS.bad_strings().len());
});
