#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(markup) = std::str::from_utf8(data) else {
        return;
    };
    let once = html::parse(markup).to_html();
    let twice = html::parse(&once).to_html();
    assert_eq!(once, twice, "serialized markup is not a fixed point");
});
