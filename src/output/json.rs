use crate::error::Result;
use crate::result::Statistics;

use super::{OutputFormatter, SuiteReport};

/// The report as a JSON array of suites.
pub struct JsonFormatter;

impl OutputFormatter for JsonFormatter {
    fn format(&self, reports: &[SuiteReport], _statistics: &Statistics) -> Result<String> {
        Ok(serde_json::to_string_pretty(reports)?)
    }
}

#[cfg(test)]
#[path = "json_tests.rs"]
mod tests;
