#![no_main]

use libfuzzer_sys::fuzz_target;
use serde_json::json;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let model = json!({ "a": 1, "s": "str", "list": [1, "two", null], "obj": { "k": true } });
    let helpers = engine::builtin_helpers();
    // Any outcome is fine; the evaluator must not panic.
    let _ = expr::interpolate(text, &model, &helpers);
    let _ = expr::evaluate(text, &model);
});
