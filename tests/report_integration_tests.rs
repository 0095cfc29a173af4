//! Report formats and destinations.

mod common;

use std::fs;

use common::{ECHO_WARN_CONFIG, ECHO_WARN_TEST, TestFixture};
use predicates::prelude::*;

fn echo_suite() -> TestFixture {
    let fixture = TestFixture::new();
    fixture.create_config("", ECHO_WARN_CONFIG);
    fixture.create_file("ATest.kt", ECHO_WARN_TEST);
    fixture
}

#[cfg(unix)]
#[test]
fn json_report_has_suites_plugins_and_results() {
    let fixture = echo_suite();

    let output = save!()
        .arg(fixture.path())
        .args(["--report-type", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let suite = &json[0];
    assert_eq!(suite["testSuite"], "smoke");
    let execution = &suite["pluginExecutions"][0];
    assert_eq!(execution["plugin"], "warn");
    let result = &execution["testResults"][0];
    assert_eq!(result["status"]["type"], "Pass");
    assert_eq!(result["debugInfo"]["counters"]["matched"], 1);
}

#[cfg(unix)]
#[test]
fn toml_report_nests_under_reports() {
    let fixture = echo_suite();

    let output = save!()
        .arg(fixture.path())
        .args(["--report-type", "toml"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: toml::Table = toml::from_str(&String::from_utf8(output.stdout).unwrap()).unwrap();
    let reports = report["reports"].as_array().unwrap();
    assert_eq!(reports[0]["testSuite"].as_str(), Some("smoke"));
}

#[cfg(unix)]
#[test]
fn xml_report_is_junit_style() {
    let fixture = echo_suite();

    save!()
        .arg(fixture.path())
        .args(["--report-type", "xml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("<testsuites"))
        .stdout(predicate::str::contains("name=\"smoke.warn\""));
}

#[cfg(unix)]
#[test]
fn file_output_writes_into_report_dir() {
    let fixture = echo_suite();
    let report_dir = fixture.path().join("out");

    save!()
        .arg(fixture.path())
        .args(["--report-type", "json", "--result-output", "file", "--report-dir"])
        .arg(&report_dir)
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let written = fs::read_to_string(report_dir.join("save-report.json")).unwrap();
    assert!(written.contains("\"testSuite\": \"smoke\""));
}

#[cfg(unix)]
#[test]
fn stderr_output_leaves_stdout_empty() {
    let fixture = echo_suite();

    save!()
        .arg(fixture.path())
        .args(["--result-output", "stderr"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Suite: smoke"));
}
