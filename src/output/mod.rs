mod collector;
mod json;
mod plain;
mod toml;
mod xml;

pub use collector::{PluginExecution, ReportCollector, SuiteReport};
pub use json::JsonFormatter;
pub use plain::PlainFormatter;
pub use toml::TomlFormatter;
pub use xml::XmlFormatter;

use crate::error::Result;
use crate::result::Statistics;

/// Trait for rendering collected suite reports.
pub trait OutputFormatter {
    /// Format the reports into a string.
    ///
    /// # Errors
    /// Returns an error if the formatting fails.
    fn format(&self, reports: &[SuiteReport], statistics: &Statistics) -> Result<String>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportType {
    #[default]
    Plain,
    Json,
    Toml,
    Xml,
}

impl ReportType {
    #[must_use]
    pub fn formatter(self, use_colors: bool) -> Box<dyn OutputFormatter> {
        match self {
            Self::Plain => Box::new(PlainFormatter::new(use_colors)),
            Self::Json => Box::new(JsonFormatter),
            Self::Toml => Box::new(TomlFormatter),
            Self::Xml => Box::new(XmlFormatter),
        }
    }

    /// File extension used when the report is written to a file.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Plain => "txt",
            Self::Json => "json",
            Self::Toml => "toml",
            Self::Xml => "xml",
        }
    }
}

impl std::str::FromStr for ReportType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "plain" | "text" => Ok(Self::Plain),
            "json" => Ok(Self::Json),
            "toml" => Ok(Self::Toml),
            "xml" | "junit" => Ok(Self::Xml),
            _ => Err(format!("Unknown report type: {s}")),
        }
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
