#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|name: &str| {
    let ext = cloudshield::triage::extension::extension_of(name);
    assert!(ext.is_empty() || ext.starts_with('.'));
    assert!(name.ends_with(ext));
});
