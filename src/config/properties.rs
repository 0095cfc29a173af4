//! `save.properties`: optional `key=value` defaults for command-line options.

use std::path::Path;

use crate::error::{Result, SaveError};

pub const PROPERTIES_FILE_NAME: &str = "save.properties";

/// Option values read from a properties file. Command-line values win over these.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Properties {
    pub config_name: Option<String>,
    pub report_type: Option<String>,
    pub result_output: Option<String>,
    pub report_dir: Option<String>,
    pub include_suites: Vec<String>,
    pub language: Option<String>,
    pub timeout_millis: Option<u64>,
    pub debug: Option<bool>,
    pub quiet: Option<bool>,
    /// Keys that name no option, in file order. Logged once logging is up.
    pub ignored_keys: Vec<String>,
}

impl Properties {
    /// Load `path`, or return empty properties if it does not exist.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|source| SaveError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content, path)
    }

    /// Keys are matched ignoring case, `-` and `_`, so `reportType`,
    /// `report-type` and `report_type` are the same key.
    ///
    /// # Errors
    /// Returns an error on malformed lines, invalid values, or a `testRootDir` key.
    pub fn parse(content: &str, path: &Path) -> Result<Self> {
        let mut properties = Self::default();
        for (index, raw) in content.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                return Err(SaveError::Properties(format!(
                    "{}:{}: expected key=value, got '{line}'",
                    path.display(),
                    index + 1
                )));
            };
            properties.set(key.trim(), value.trim(), path)?;
        }
        Ok(properties)
    }

    fn set(&mut self, key: &str, value: &str, path: &Path) -> Result<()> {
        let invalid = |expected: &str| {
            SaveError::Properties(format!(
                "{}: '{key}' expects {expected}, got '{value}'",
                path.display()
            ))
        };
        let owned = || Some(value.to_string());

        match normalize_key(key).as_str() {
            "testrootdir" => {
                return Err(SaveError::Properties(format!(
                    "{}: '{key}' may only be given on the command line",
                    path.display()
                )));
            }
            "configname" | "config" => self.config_name = owned(),
            "reporttype" => self.report_type = owned(),
            "resultoutput" => self.result_output = owned(),
            "reportdir" => self.report_dir = owned(),
            "includesuites" => {
                self.include_suites = value
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(String::from)
                    .collect();
            }
            "language" => self.language = owned(),
            "timeoutmillis" | "timeout" => {
                self.timeout_millis = Some(value.parse().map_err(|_| invalid("a number"))?);
            }
            "debug" => self.debug = Some(value.parse().map_err(|_| invalid("true or false"))?),
            "quiet" => self.quiet = Some(value.parse().map_err(|_| invalid("true or false"))?),
            _ => self.ignored_keys.push(key.to_string()),
        }
        Ok(())
    }
}

fn normalize_key(key: &str) -> String {
    key.chars()
        .filter(|c| *c != '-' && *c != '_')
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

#[cfg(test)]
#[path = "properties_tests.rs"]
mod tests;
