use std::path::PathBuf;

use super::*;
use crate::discovery::TestFiles;
use crate::result::{DebugInfo, Event, EventSink, PluginEvent, TestEvent, TestResult, TestStatus};

/// Two suites: one passing warn unit, one failing fix unit and one crash.
pub(super) fn collected() -> ReportCollector {
    let mut collector = ReportCollector::new();
    let events = [
        Event::Plugin(PluginEvent::Init {
            suite: "smoke".to_string(),
        }),
        Event::Plugin(PluginEvent::Start {
            suite: "smoke".to_string(),
            plugin: "warn".to_string(),
        }),
        test_event(
            "smoke",
            "warn",
            TestFiles::Test {
                test: PathBuf::from("ATest.kt"),
            },
            TestStatus::Pass { message: None },
        ),
        Event::Plugin(PluginEvent::End {
            suite: "smoke".to_string(),
            plugin: "warn".to_string(),
        }),
        test_event(
            "fixes",
            "fix",
            TestFiles::TestAndExpected {
                test: PathBuf::from("FooTest.kt"),
                expected: PathBuf::from("FooExpected.kt"),
            },
            TestStatus::Fail {
                reason: "-1: a & b\n+1: a<b".to_string(),
                short_reason: "2 line(s) differ from FooExpected.kt".to_string(),
            },
        ),
        test_event(
            "fixes",
            "fix",
            TestFiles::TestAndExpected {
                test: PathBuf::from("BarTest.kt"),
                expected: PathBuf::from("BarExpected.kt"),
            },
            TestStatus::Crash {
                error_type: "ProcessTimeoutException".to_string(),
                message: "timed out".to_string(),
            },
        ),
        Event::Finished,
    ];
    for event in &events {
        collector.handle(event).unwrap();
    }
    collector
}

fn test_event(suite: &str, plugin: &str, resources: TestFiles, status: TestStatus) -> Event {
    Event::Test(TestEvent::Result {
        suite: suite.to_string(),
        plugin: plugin.to_string(),
        result: TestResult::new(
            resources,
            status,
            Some(DebugInfo {
                exec_cmd: "tool".to_string(),
                duration_millis: 1500,
                ..DebugInfo::default()
            }),
        ),
    })
}

#[test]
fn report_type_from_str() {
    assert_eq!("plain".parse::<ReportType>(), Ok(ReportType::Plain));
    assert_eq!("JSON".parse::<ReportType>(), Ok(ReportType::Json));
    assert_eq!("toml".parse::<ReportType>(), Ok(ReportType::Toml));
    assert_eq!("junit".parse::<ReportType>(), Ok(ReportType::Xml));
    assert!("yaml".parse::<ReportType>().is_err());
}

#[test]
fn report_type_extension() {
    assert_eq!(ReportType::Json.extension(), "json");
    assert_eq!(ReportType::Plain.extension(), "txt");
}

#[test]
fn every_report_type_formats() {
    let collector = collected();
    let reports = collector.reports();
    for report_type in [
        ReportType::Plain,
        ReportType::Json,
        ReportType::Toml,
        ReportType::Xml,
    ] {
        let text = report_type
            .formatter(false)
            .format(&reports, collector.statistics())
            .unwrap();
        assert!(text.contains("FooTest.kt"), "{report_type:?}: {text}");
    }
}
