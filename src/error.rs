use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SaveError {
    #[error("{0}")]
    Config(String),

    #[error("Failed to parse {path} at line {line}: {message}")]
    ConfigParse {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("Unknown section [{section}] in {path}")]
    Plugin { path: PathBuf, section: String },

    #[error("Invalid regex pattern: {pattern}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Invalid glob pattern: {pattern}")]
    InvalidGlob {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    #[error("Invalid warning pattern delimiters: {0}")]
    InvalidDelimiters(String),

    #[error("Process execution failed: {0}")]
    ProcessExecution(String),

    #[error("Process '{command}' exceeded timeout of {timeout_millis} ms")]
    ProcessTimeout {
        command: String,
        timeout_millis: u64,
    },

    #[error("Failed to read file: {path}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to walk {path}: {source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    JsonSerialize(#[from] serde_json::Error),

    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Properties error: {0}")]
    Properties(String),
}

impl SaveError {
    /// Short, stable name of the error kind. Crash results carry it as their type.
    #[must_use]
    pub const fn error_type(&self) -> &'static str {
        match self {
            Self::Config(_) => "ConfigError",
            Self::ConfigParse { .. } => "ConfigParseError",
            Self::Plugin { .. } => "PluginError",
            Self::InvalidPattern { .. } | Self::InvalidGlob { .. } => "PatternError",
            Self::InvalidDelimiters(_) => "IllegalArgument",
            Self::ProcessExecution(_) => "ProcessExecutionException",
            Self::ProcessTimeout { .. } => "ProcessTimeoutException",
            Self::FileRead { .. } | Self::Walk { .. } | Self::Io(_) => "IOError",
            Self::JsonSerialize(_) | Self::TomlSerialize(_) => "SerializationError",
            Self::Properties(_) => "PropertiesError",
        }
    }

    /// Whether the error belongs to configuration discovery rather than test execution.
    #[must_use]
    pub const fn is_config_error(&self) -> bool {
        matches!(
            self,
            Self::Config(_)
                | Self::ConfigParse { .. }
                | Self::Plugin { .. }
                | Self::InvalidPattern { .. }
                | Self::InvalidGlob { .. }
                | Self::InvalidDelimiters(_)
                | Self::Properties(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, SaveError>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
