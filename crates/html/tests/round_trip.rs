use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

const ROUND_TRIP_FORMAT_V1: &str = "pearl-round-trip-v1";

#[derive(Debug, Deserialize)]
struct Manifest {
    format: String,
    cases: Vec<Case>,
}

#[derive(Debug, Deserialize)]
struct Case {
    id: String,
    input: String,
    expected: Option<String>,
}

fn load_manifest() -> Manifest {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/round_trip.toml");
    let content = fs::read_to_string(&path)
        .unwrap_or_else(|err| panic!("failed to read round-trip fixtures {path:?}: {err}"));
    toml::from_str(&content)
        .unwrap_or_else(|err| panic!("failed to parse round-trip fixtures {path:?}: {err}"))
}

#[test]
fn parse_then_serialize_matches_fixtures() {
    let manifest = load_manifest();
    assert_eq!(manifest.format, ROUND_TRIP_FORMAT_V1);
    assert!(!manifest.cases.is_empty(), "fixture manifest has no cases");

    let mut failures = Vec::new();
    for case in &manifest.cases {
        let expected = case.expected.as_deref().unwrap_or(&case.input);
        let actual = html::parse(&case.input).to_html();
        if actual != expected {
            failures.push(format!(
                "[{}]\n  expected: {expected}\n    actual: {actual}",
                case.id
            ));
        }
    }
    assert!(failures.is_empty(), "round-trip mismatches:\n{}", failures.join("\n"));
}

#[test]
fn serialized_output_is_a_fixed_point() {
    for case in load_manifest().cases {
        let once = html::parse(&case.input).to_html();
        let twice = html::parse(&once).to_html();
        assert_eq!(once, twice, "[{}] second round trip changed output", case.id);
    }
}
