use std::path::PathBuf;

use super::*;

#[test]
fn error_display_config() {
    let err = SaveError::Config("missing exec_cmd".to_string());
    assert_eq!(err.to_string(), "missing exec_cmd");
}

#[test]
fn error_display_config_parse_names_file_and_line() {
    let err = SaveError::ConfigParse {
        path: PathBuf::from("suite/save.toml"),
        line: 4,
        message: "expected `=`".to_string(),
    };
    let text = err.to_string();
    assert!(text.contains("suite/save.toml"));
    assert!(text.contains("line 4"));
}

#[test]
fn error_display_plugin_names_section() {
    let err = SaveError::Plugin {
        path: PathBuf::from("save.toml"),
        section: "wran".to_string(),
    };
    assert_eq!(err.to_string(), "Unknown section [wran] in save.toml");
}

#[test]
fn error_display_timeout() {
    let err = SaveError::ProcessTimeout {
        command: "sleep 10".to_string(),
        timeout_millis: 100,
    };
    assert_eq!(
        err.to_string(),
        "Process 'sleep 10' exceeded timeout of 100 ms"
    );
}

#[test]
fn error_type_returns_correct_type() {
    assert_eq!(
        SaveError::Config("test".to_string()).error_type(),
        "ConfigError"
    );
    assert_eq!(
        SaveError::ProcessExecution("empty".to_string()).error_type(),
        "ProcessExecutionException"
    );
    assert_eq!(
        SaveError::InvalidDelimiters("{{".to_string()).error_type(),
        "IllegalArgument"
    );
    assert_eq!(
        SaveError::Io(std::io::Error::other("test")).error_type(),
        "IOError"
    );
}

#[test]
fn config_errors_are_classified() {
    assert!(SaveError::Config("x".to_string()).is_config_error());
    assert!(
        SaveError::Plugin {
            path: PathBuf::from("save.toml"),
            section: "x".to_string(),
        }
        .is_config_error()
    );
    assert!(!SaveError::ProcessExecution("x".to_string()).is_config_error());
    assert!(
        !SaveError::ProcessTimeout {
            command: "x".to_string(),
            timeout_millis: 1,
        }
        .is_config_error()
    );
}

#[test]
fn io_error_converts_via_from() {
    let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
    let err: SaveError = io.into();
    assert!(matches!(err, SaveError::Io(_)));
}
