//! Option handling, properties files and configuration errors.

mod common;

use common::{ECHO_WARN_CONFIG, ECHO_WARN_TEST, TestFixture};
use predicates::prelude::*;

#[test]
fn help_lists_exit_codes() {
    save!()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration error"));
}

#[test]
fn missing_config_exits_with_config_error() {
    let fixture = TestFixture::new();

    save!()
        .arg(fixture.path())
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Configuration error"))
        .stderr(predicate::str::contains("save.toml"))
        .stderr(predicate::str::contains("Configuration error: Configuration error").not());
}

#[test]
fn unknown_section_is_rejected() {
    let fixture = TestFixture::new();
    fixture.create_config("", "[general]\nexec_cmd = \"echo\"\n\n[lint]\nfoo = 1\n");

    save!()
        .arg(fixture.path())
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Configuration error"));
}

#[test]
fn invalid_regex_is_rejected() {
    let fixture = TestFixture::new();
    fixture.create_config(
        "",
        "[general]\nexec_cmd = \"echo\"\n\n[warn]\ntest_name_regex = \"(unclosed\"\n",
    );

    save!()
        .arg(fixture.path())
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Configuration error"));
}

#[test]
fn unknown_report_type_is_a_usage_error() {
    save!()
        .args(["--report-type", "yaml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("yaml"));
}

#[test]
fn test_root_in_properties_is_rejected() {
    let fixture = TestFixture::new();
    fixture.create_config("", ECHO_WARN_CONFIG);
    fixture.create_file("save.properties", "testRootDir=elsewhere\n");

    save!()
        .arg(fixture.path())
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Configuration error"));
}

#[test]
fn missing_properties_file_is_rejected() {
    let fixture = TestFixture::new();
    fixture.create_config("", ECHO_WARN_CONFIG);

    save!()
        .arg(fixture.path())
        .args(["--properties-file", "/nonexistent/save.properties"])
        .assert()
        .code(2);
}

#[cfg(unix)]
#[test]
fn properties_select_the_report_type() {
    let fixture = TestFixture::new();
    fixture.create_config("", ECHO_WARN_CONFIG);
    fixture.create_file("ATest.kt", ECHO_WARN_TEST);
    fixture.create_file("save.properties", "# defaults\nreportType=json\n");

    save!()
        .arg(fixture.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("\"testSuite\": \"smoke\""));
}

#[cfg(unix)]
#[test]
fn command_line_overrides_properties() {
    let fixture = TestFixture::new();
    fixture.create_config("", ECHO_WARN_CONFIG);
    fixture.create_file("ATest.kt", ECHO_WARN_TEST);
    fixture.create_file("save.properties", "reportType=json\n");

    save!()
        .arg(fixture.path())
        .args(["--report-type", "plain"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Suite: smoke"));
}

#[cfg(unix)]
#[test]
fn unknown_property_is_logged_as_a_warning() {
    let fixture = TestFixture::new();
    fixture.create_config("", ECHO_WARN_CONFIG);
    fixture.create_file("ATest.kt", ECHO_WARN_TEST);
    fixture.create_file("save.properties", "reportTyp=json\n");

    save!()
        .arg(fixture.path())
        .env_remove("RUST_LOG")
        .assert()
        .success()
        .stderr(predicate::str::contains("ignoring unknown property"))
        .stderr(predicate::str::contains("reportTyp"));
}
