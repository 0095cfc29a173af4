use serde_json::Value;

use super::super::tests::collected;
use super::*;

#[test]
fn suites_serialize_as_array() {
    let collector = collected();
    let text = JsonFormatter
        .format(&collector.reports(), collector.statistics())
        .unwrap();
    let value: Value = serde_json::from_str(&text).unwrap();

    let suites = value.as_array().unwrap();
    assert_eq!(suites.len(), 2);
    assert_eq!(suites[0]["testSuite"], "smoke");

    let fix = &suites[1]["pluginExecutions"][0];
    assert_eq!(fix["plugin"], "fix");
    let failed = &fix["testResults"][0];
    assert_eq!(failed["status"]["type"], "Fail");
    assert_eq!(
        failed["status"]["shortReason"],
        "2 line(s) differ from FooExpected.kt"
    );
    assert_eq!(failed["resources"]["type"], "TestAndExpected");
    assert_eq!(failed["debugInfo"]["durationMillis"], 1500);

    let crashed = &fix["testResults"][1];
    assert_eq!(crashed["status"]["errorType"], "ProcessTimeoutException");
}

#[test]
fn empty_report_is_empty_array() {
    let text = JsonFormatter.format(&[], &Statistics::default()).unwrap();
    assert_eq!(text, "[]");
}
