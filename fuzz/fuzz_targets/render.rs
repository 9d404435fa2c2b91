#![no_main]

use engine::{Config, Engine};
use libfuzzer_sys::fuzz_target;
use serde_json::json;

fuzz_target!(|data: &[u8]| {
    let Ok(markup) = std::str::from_utf8(data) else {
        return;
    };
    let engine = Engine::new(Config::development());
    let model = json!({ "items": ["a", "b"], "flag": true, "map": { "x": 1 } });
    let _ = engine.render_html(markup, model);
});
