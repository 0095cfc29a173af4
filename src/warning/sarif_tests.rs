use serde_json::json;

use super::*;

#[test]
fn converts_results_with_locations() {
    let document = json!({
        "version": "2.1.0",
        "runs": [{
            "tool": { "driver": { "name": "diktat" } },
            "results": [{
                "ruleId": "WRONG_INDENTATION",
                "message": { "text": "[WRONG_INDENTATION] expected 4 but was 2" },
                "locations": [{
                    "physicalLocation": {
                        "artifactLocation": { "uri": "file:///tmp/suite/IndentTest.kt" },
                        "region": { "startLine": 3, "startColumn": 1 }
                    }
                }]
            }]
        }]
    });

    let warnings = warnings_from_sarif(&document, "fallback.kt").unwrap();

    assert_eq!(
        warnings,
        vec![Warning::new(
            "[WRONG_INDENTATION] expected 4 but was 2",
            Some(3),
            Some(1),
            "IndentTest.kt"
        )]
    );
}

#[test]
fn result_without_location_uses_default_file() {
    let document = json!({
        "runs": [{ "results": [{ "message": { "text": "file is empty" } }] }]
    });

    let warnings = warnings_from_sarif(&document, "EmptyTest.kt").unwrap();

    assert_eq!(
        warnings,
        vec![Warning::new("file is empty", None, None, "EmptyTest.kt")]
    );
}

#[test]
fn collects_results_of_every_run() {
    let document = json!({
        "runs": [
            { "results": [{ "message": { "text": "a" } }] },
            { "results": [] },
            { "results": [{ "message": { "text": "b" } }] }
        ]
    });

    let messages: Vec<String> = warnings_from_sarif(&document, "f")
        .unwrap()
        .into_iter()
        .map(|w| w.message)
        .collect();
    assert_eq!(messages, vec!["a", "b"]);
}

#[test]
fn windows_uris_keep_file_name() {
    assert_eq!(file_name_of_uri("C:\\work\\LongTest.kt"), "LongTest.kt");
    assert_eq!(file_name_of_uri("relative/path/ATest.kt"), "ATest.kt");
}

#[test]
fn missing_runs_is_an_error() {
    let err = warnings_from_sarif(&json!({ "version": "2.1.0" }), "f").unwrap_err();
    assert!(err.to_string().contains("runs"));
}
