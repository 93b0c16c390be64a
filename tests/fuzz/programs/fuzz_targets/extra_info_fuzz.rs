#![no_main]
use augur_core::extra_info::parse_extra_info;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    if let Some(info) = parse_extra_info(text) {
        let json = info.to_json().expect("parsed extra info serializes");
        assert_eq!(parse_extra_info(&json), Some(info));
    }
});
