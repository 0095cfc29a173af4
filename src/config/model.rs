use serde::{Deserialize, Serialize};

use crate::error::{Result, SaveError};

/// Default config file name, also the marker that turns a directory into a suite.
pub const DEFAULT_CONFIG_NAME: &str = "save.toml";

/// Default per-invocation timeout.
pub const DEFAULT_TIMEOUT_MILLIS: u64 = 10_000;

/// Default suffix that marks a file as a test resource.
pub const DEFAULT_TEST_SUFFIX: &str = "Test";

/// Default suffix that marks the golden file of a fix test.
pub const DEFAULT_EXPECTED_SUFFIX: &str = "Expected";

/// Default annotation pattern for expected warnings inside fixtures.
pub const DEFAULT_EXPECTED_WARNINGS_PATTERN: &str =
    r"// ;warn:(?P<line>\$line(?:[+-]\d+)?|\d*):(?P<column>\d*): (?P<message>.*)";

/// Default pattern for warnings printed by the tool under test.
pub const DEFAULT_ACTUAL_WARNINGS_PATTERN: &str =
    r"(?P<line>\d+):(?P<column>\d+): (?P<message>.+)$";

/// Raw `[general]` table. Every field is optional so that child configs can
/// leave values to their ancestors.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct GeneralSection {
    /// Base command of the tool under test.
    pub exec_cmd: Option<String>,
    /// Free-form tags, unioned down the tree.
    pub tags: Option<Vec<String>>,
    pub description: Option<String>,
    /// Suite name shown in reports (defaults to the directory name).
    pub suite_name: Option<String>,
    pub language: Option<String>,
    /// Globs relative to the config directory; matches are reported as ignored.
    pub excluded_tests: Option<Vec<String>>,
    /// Regex with one capture group locating `// RUN:` flags in fixtures.
    pub run_config_pattern: Option<String>,
    pub expected_warnings_pattern: Option<String>,
    pub timeout_millis: Option<u64>,
}

/// Format of the warnings the tool reports.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ActualWarningsFormat {
    /// Lines of stdout matched by `actual_warnings_pattern`.
    #[default]
    Plain,
    /// A SARIF report written by the tool.
    Sarif,
}

/// Raw `[warn]` table.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct WarnSection {
    pub exec_cmd: Option<String>,
    /// Command line template, may contain `$args1`, `$fileName`, `$args2`, `$resources`.
    pub exec_flags: Option<String>,
    pub resource_name_test_suffix: Option<String>,
    pub test_name_regex: Option<String>,
    /// Sibling files matching this regex are attached to every test in a directory.
    pub resource_pattern: Option<String>,
    pub expected_warnings_pattern: Option<String>,
    pub actual_warnings_pattern: Option<String>,
    pub actual_warnings_format: Option<ActualWarningsFormat>,
    pub sarif_file: Option<String>,
    pub exact_warnings_match: Option<bool>,
    pub partial_warn_text_match: Option<bool>,
    pub pattern_delimiters: Option<Vec<String>>,
    pub warning_text_has_line: Option<bool>,
    pub warning_text_has_column: Option<bool>,
    pub ignore_lines: Option<Vec<String>>,
    pub timeout_millis: Option<u64>,
    pub batch_size: Option<usize>,
    pub batch_separator: Option<String>,
}

/// Raw `[fix]` table.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct FixSection {
    pub exec_cmd: Option<String>,
    pub exec_flags: Option<String>,
    pub resource_name_test_suffix: Option<String>,
    pub resource_name_expected_suffix: Option<String>,
    /// When set, the tool writes its result next to the input with this suffix.
    pub destination_file_suffix: Option<String>,
    pub ignore_lines: Option<Vec<String>>,
    pub timeout_millis: Option<u64>,
    pub batch_size: Option<usize>,
    pub batch_separator: Option<String>,
}

/// Raw `["fix and warn"]` table with its nested `fix` and `warn` tables.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct FixAndWarnSection {
    pub fix: Option<FixSection>,
    pub warn: Option<WarnSection>,
}

/// Whole `save.toml` document.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub general: Option<GeneralSection>,
    pub warn: Option<WarnSection>,
    pub fix: Option<FixSection>,
    #[serde(rename = "fix and warn", alias = "fix_and_warn")]
    pub fix_and_warn: Option<FixAndWarnSection>,
}

impl ConfigFile {
    /// Declared sections in canonical order.
    #[must_use]
    pub fn into_sections(self) -> Vec<PluginSection> {
        let mut sections = Vec::new();
        if let Some(general) = self.general {
            sections.push(PluginSection::General(general));
        }
        if let Some(warn) = self.warn {
            sections.push(PluginSection::Warn(warn));
        }
        if let Some(fix) = self.fix {
            sections.push(PluginSection::Fix(fix));
        }
        if let Some(fix_and_warn) = self.fix_and_warn {
            sections.push(PluginSection::FixAndWarn(fix_and_warn));
        }
        sections
    }
}

/// Kind of a top-level section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SectionKind {
    General,
    Warn,
    Fix,
    FixAndWarn,
}

impl SectionKind {
    pub const ALL: [Self; 4] = [Self::General, Self::Warn, Self::Fix, Self::FixAndWarn];

    /// Table names accepted at the top level of `save.toml`.
    pub const TABLE_NAMES: [&'static str; 5] =
        ["general", "warn", "fix", "fix and warn", "fix_and_warn"];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Warn => "warn",
            Self::Fix => "fix",
            Self::FixAndWarn => "fix and warn",
        }
    }

    #[must_use]
    pub fn from_table_name(name: &str) -> Option<Self> {
        match name {
            "general" => Some(Self::General),
            "warn" => Some(Self::Warn),
            "fix" => Some(Self::Fix),
            "fix and warn" | "fix_and_warn" => Some(Self::FixAndWarn),
            _ => None,
        }
    }
}

/// One decoded top-level section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PluginSection {
    General(GeneralSection),
    Warn(WarnSection),
    Fix(FixSection),
    FixAndWarn(FixAndWarnSection),
}

impl PluginSection {
    #[must_use]
    pub const fn kind(&self) -> SectionKind {
        match self {
            Self::General(_) => SectionKind::General,
            Self::Warn(_) => SectionKind::Warn,
            Self::Fix(_) => SectionKind::Fix,
            Self::FixAndWarn(_) => SectionKind::FixAndWarn,
        }
    }

    /// Merge `self` (child) over `parent`. Both must be the same kind.
    ///
    /// # Errors
    /// Returns an error if the sections are of different kinds.
    pub fn merge_with(&self, parent: &Self) -> Result<Self> {
        match (self, parent) {
            (Self::General(c), Self::General(p)) => Ok(Self::General(c.merge_with(p))),
            (Self::Warn(c), Self::Warn(p)) => Ok(Self::Warn(c.merge_with(p))),
            (Self::Fix(c), Self::Fix(p)) => Ok(Self::Fix(c.merge_with(p))),
            (Self::FixAndWarn(c), Self::FixAndWarn(p)) => Ok(Self::FixAndWarn(c.merge_with(p))),
            (child, parent) => Err(SaveError::Config(format!(
                "cannot merge [{}] with [{}]",
                child.kind().name(),
                parent.kind().name()
            ))),
        }
    }
}

fn prefer<T: Clone>(child: Option<&T>, parent: Option<&T>) -> Option<T> {
    child.or(parent).cloned()
}

/// Order-preserving union: parent entries first, then new child entries.
fn union(child: Option<&Vec<String>>, parent: Option<&Vec<String>>) -> Option<Vec<String>> {
    match (child, parent) {
        (None, None) => None,
        (child, parent) => {
            let mut merged: Vec<String> = Vec::new();
            for item in parent.into_iter().flatten().chain(child.into_iter().flatten()) {
                if !merged.contains(item) {
                    merged.push(item.clone());
                }
            }
            Some(merged)
        }
    }
}

fn merge_nested<T: Clone>(
    child: Option<&T>,
    parent: Option<&T>,
    merge: impl Fn(&T, &T) -> T,
) -> Option<T> {
    match (child, parent) {
        (Some(c), Some(p)) => Some(merge(c, p)),
        (c, p) => c.or(p).cloned(),
    }
}

impl GeneralSection {
    #[must_use]
    pub fn merge_with(&self, parent: &Self) -> Self {
        Self {
            exec_cmd: prefer(self.exec_cmd.as_ref(), parent.exec_cmd.as_ref()),
            tags: union(self.tags.as_ref(), parent.tags.as_ref()),
            description: prefer(self.description.as_ref(), parent.description.as_ref()),
            suite_name: prefer(self.suite_name.as_ref(), parent.suite_name.as_ref()),
            language: prefer(self.language.as_ref(), parent.language.as_ref()),
            excluded_tests: union(self.excluded_tests.as_ref(), parent.excluded_tests.as_ref()),
            run_config_pattern: prefer(
                self.run_config_pattern.as_ref(),
                parent.run_config_pattern.as_ref(),
            ),
            expected_warnings_pattern: prefer(
                self.expected_warnings_pattern.as_ref(),
                parent.expected_warnings_pattern.as_ref(),
            ),
            timeout_millis: self.timeout_millis.or(parent.timeout_millis),
        }
    }
}

impl WarnSection {
    #[must_use]
    pub fn merge_with(&self, parent: &Self) -> Self {
        Self {
            exec_cmd: prefer(self.exec_cmd.as_ref(), parent.exec_cmd.as_ref()),
            exec_flags: prefer(self.exec_flags.as_ref(), parent.exec_flags.as_ref()),
            resource_name_test_suffix: prefer(
                self.resource_name_test_suffix.as_ref(),
                parent.resource_name_test_suffix.as_ref(),
            ),
            test_name_regex: prefer(self.test_name_regex.as_ref(), parent.test_name_regex.as_ref()),
            resource_pattern: prefer(
                self.resource_pattern.as_ref(),
                parent.resource_pattern.as_ref(),
            ),
            expected_warnings_pattern: prefer(
                self.expected_warnings_pattern.as_ref(),
                parent.expected_warnings_pattern.as_ref(),
            ),
            actual_warnings_pattern: prefer(
                self.actual_warnings_pattern.as_ref(),
                parent.actual_warnings_pattern.as_ref(),
            ),
            actual_warnings_format: self.actual_warnings_format.or(parent.actual_warnings_format),
            sarif_file: prefer(self.sarif_file.as_ref(), parent.sarif_file.as_ref()),
            exact_warnings_match: self.exact_warnings_match.or(parent.exact_warnings_match),
            partial_warn_text_match: self
                .partial_warn_text_match
                .or(parent.partial_warn_text_match),
            pattern_delimiters: prefer(
                self.pattern_delimiters.as_ref(),
                parent.pattern_delimiters.as_ref(),
            ),
            warning_text_has_line: self.warning_text_has_line.or(parent.warning_text_has_line),
            warning_text_has_column: self
                .warning_text_has_column
                .or(parent.warning_text_has_column),
            ignore_lines: prefer(self.ignore_lines.as_ref(), parent.ignore_lines.as_ref()),
            timeout_millis: self.timeout_millis.or(parent.timeout_millis),
            batch_size: self.batch_size.or(parent.batch_size),
            batch_separator: prefer(self.batch_separator.as_ref(), parent.batch_separator.as_ref()),
        }
    }
}

impl FixSection {
    #[must_use]
    pub fn merge_with(&self, parent: &Self) -> Self {
        Self {
            exec_cmd: prefer(self.exec_cmd.as_ref(), parent.exec_cmd.as_ref()),
            exec_flags: prefer(self.exec_flags.as_ref(), parent.exec_flags.as_ref()),
            resource_name_test_suffix: prefer(
                self.resource_name_test_suffix.as_ref(),
                parent.resource_name_test_suffix.as_ref(),
            ),
            resource_name_expected_suffix: prefer(
                self.resource_name_expected_suffix.as_ref(),
                parent.resource_name_expected_suffix.as_ref(),
            ),
            destination_file_suffix: prefer(
                self.destination_file_suffix.as_ref(),
                parent.destination_file_suffix.as_ref(),
            ),
            ignore_lines: prefer(self.ignore_lines.as_ref(), parent.ignore_lines.as_ref()),
            timeout_millis: self.timeout_millis.or(parent.timeout_millis),
            batch_size: self.batch_size.or(parent.batch_size),
            batch_separator: prefer(self.batch_separator.as_ref(), parent.batch_separator.as_ref()),
        }
    }
}

impl FixAndWarnSection {
    #[must_use]
    pub fn merge_with(&self, parent: &Self) -> Self {
        Self {
            fix: merge_nested(self.fix.as_ref(), parent.fix.as_ref(), FixSection::merge_with),
            warn: merge_nested(self.warn.as_ref(), parent.warn.as_ref(), WarnSection::merge_with),
        }
    }
}

#[cfg(test)]
#[path = "model_tests.rs"]
mod tests;
