mod comparator;
mod extract;
mod sarif;

pub use comparator::{Comparison, Delimiters, MatchOptions, compare};
pub use extract::{extract_actual, extract_expected};
pub use sarif::warnings_from_sarif;

use std::fmt;

use serde::Serialize;

/// A single diagnostic, either expected (from an annotation) or actual (from tool output).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Warning {
    pub message: String,
    pub line: Option<u32>,
    pub column: Option<u32>,
    pub file_name: String,
}

impl Warning {
    #[must_use]
    pub fn new(
        message: impl Into<String>,
        line: Option<u32>,
        column: Option<u32>,
        file_name: impl Into<String>,
    ) -> Self {
        Self {
            message: message.into(),
            line,
            column,
            file_name: file_name.into(),
        }
    }

    /// Position used to pair expected and actual warnings.
    #[must_use]
    pub fn key(&self) -> (Option<u32>, Option<u32>, &str) {
        (self.line, self.column, &self.file_name)
    }

    /// Drop the parts of the position the tool does not report.
    #[must_use]
    pub fn with_position_parts(mut self, keep_line: bool, keep_column: bool) -> Self {
        if !keep_line {
            self.line = None;
        }
        if !keep_column {
            self.column = None;
        }
        self
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.file_name)?;
        if let Some(line) = self.line {
            write!(f, ":{line}")?;
        }
        if let Some(column) = self.column {
            write!(f, ":{column}")?;
        }
        write!(f, ": {}", self.message)
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
