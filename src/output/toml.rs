use serde::Serialize;

use crate::error::Result;
use crate::result::Statistics;

use super::{OutputFormatter, SuiteReport};

/// The report as TOML; suites live under a top-level `reports` array.
pub struct TomlFormatter;

#[derive(Serialize)]
struct TomlReport<'a> {
    reports: &'a [SuiteReport],
}

impl OutputFormatter for TomlFormatter {
    fn format(&self, reports: &[SuiteReport], _statistics: &Statistics) -> Result<String> {
        Ok(::toml::to_string(&TomlReport { reports })?)
    }
}

#[cfg(test)]
#[path = "toml_tests.rs"]
mod tests;
