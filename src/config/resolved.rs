//! Effective, validated configuration of one config node.
//!
//! Merged sections are turned into concrete configs with defaults applied and
//! every pattern compiled, so that a bad config is rejected before any test runs.

use std::path::{Path, PathBuf};
use std::time::Duration;

use globset::{Glob, GlobSet, GlobSetBuilder};
use regex::Regex;

use crate::error::{Result, SaveError};
use crate::warning::{Delimiters, MatchOptions};

use super::model::{
    ActualWarningsFormat, DEFAULT_ACTUAL_WARNINGS_PATTERN, DEFAULT_EXPECTED_SUFFIX,
    DEFAULT_EXPECTED_WARNINGS_PATTERN, DEFAULT_TEST_SUFFIX, DEFAULT_TIMEOUT_MILLIS,
    FixAndWarnSection, FixSection, GeneralSection, PluginSection, WarnSection,
};

const DEFAULT_BATCH_SEPARATOR: &str = " ";

#[derive(Debug, Clone)]
pub struct GeneralConfig {
    pub exec_cmd: Option<String>,
    pub tags: Vec<String>,
    pub description: String,
    pub suite_name: String,
    pub language: Option<String>,
    pub excluded_tests: Vec<String>,
    excluded_set: GlobSet,
    pub run_config_pattern: Option<Regex>,
    pub expected_warnings_pattern: Regex,
    pub timeout: Duration,
}

impl GeneralConfig {
    /// Whether `relative` (relative to the config directory) is excluded.
    #[must_use]
    pub fn is_excluded(&self, relative: &Path) -> bool {
        self.excluded_set.is_match(relative)
    }
}

#[derive(Debug, Clone)]
pub struct WarnConfig {
    pub command_template: String,
    pub resource_name_test_suffix: String,
    pub test_name_regex: Regex,
    pub resource_pattern: Option<Regex>,
    pub expected_warnings_pattern: Regex,
    pub actual_warnings_pattern: Regex,
    pub actual_warnings_format: ActualWarningsFormat,
    pub sarif_file: Option<PathBuf>,
    pub match_options: MatchOptions,
    pub warning_text_has_line: bool,
    pub warning_text_has_column: bool,
    pub ignore_lines: Vec<Regex>,
    pub timeout: Duration,
    pub batch_size: usize,
    pub batch_separator: String,
}

#[derive(Debug, Clone)]
pub struct FixConfig {
    pub command_template: String,
    pub resource_name_test_suffix: String,
    pub resource_name_expected_suffix: String,
    pub destination_file_suffix: Option<String>,
    pub ignore_lines: Vec<Regex>,
    pub timeout: Duration,
    pub batch_size: usize,
    pub batch_separator: String,
}

#[derive(Debug, Clone)]
pub struct FixAndWarnConfig {
    pub fix: FixConfig,
    pub warn: WarnConfig,
}

/// Resolved configuration of one execution mode.
#[derive(Debug, Clone)]
pub enum PluginConfig {
    Warn(WarnConfig),
    Fix(FixConfig),
    FixAndWarn(FixAndWarnConfig),
}

impl PluginConfig {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Warn(_) => "warn",
            Self::Fix(_) => "fix",
            Self::FixAndWarn(_) => "fix and warn",
        }
    }

    #[must_use]
    pub const fn batch_size(&self) -> usize {
        match self {
            Self::Warn(warn) => warn.batch_size,
            Self::Fix(fix) | Self::FixAndWarn(FixAndWarnConfig { fix, .. }) => fix.batch_size,
        }
    }

    /// Same plugin with every timeout replaced.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        match &mut self {
            Self::Warn(warn) => warn.timeout = timeout,
            Self::Fix(fix) => fix.timeout = timeout,
            Self::FixAndWarn(both) => {
                both.fix.timeout = timeout;
                both.warn.timeout = timeout;
            }
        }
        self
    }
}

/// Everything a node needs to run its tests.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub dir: PathBuf,
    pub general: GeneralConfig,
    pub plugins: Vec<PluginConfig>,
}

impl ResolvedConfig {
    /// Resolve merged sections of the config at `location`.
    ///
    /// # Errors
    /// Returns an error naming `location` if any value is invalid.
    pub fn resolve(location: &Path, merged: &[PluginSection]) -> Result<Self> {
        let dir = location
            .parent()
            .map_or_else(PathBuf::new, Path::to_path_buf);
        let ctx = Ctx { location };

        let general_section = merged
            .iter()
            .find_map(|s| match s {
                PluginSection::General(g) => Some(g.clone()),
                _ => None,
            })
            .unwrap_or_default();
        let general = ctx.general(&general_section, &dir)?;

        let fix_section = merged.iter().find_map(|s| match s {
            PluginSection::Fix(f) => Some(f),
            _ => None,
        });
        let warn_section = merged.iter().find_map(|s| match s {
            PluginSection::Warn(w) => Some(w),
            _ => None,
        });

        let mut plugins = Vec::new();
        for section in merged {
            match section {
                PluginSection::General(_) => {}
                PluginSection::Warn(warn) => {
                    plugins.push(PluginConfig::Warn(ctx.warn(warn, &general, &dir)?));
                }
                PluginSection::Fix(fix) => {
                    plugins.push(PluginConfig::Fix(ctx.fix(fix, &general)?));
                }
                PluginSection::FixAndWarn(section) => {
                    plugins.push(PluginConfig::FixAndWarn(ctx.fix_and_warn(
                        section,
                        fix_section,
                        warn_section,
                        &general,
                        &dir,
                    )?));
                }
            }
        }

        Ok(Self {
            dir,
            general,
            plugins,
        })
    }
}

struct Ctx<'a> {
    location: &'a Path,
}

impl Ctx<'_> {
    fn error(&self, message: impl std::fmt::Display) -> SaveError {
        SaveError::Config(format!("{}: {message}", self.location.display()))
    }

    fn regex(&self, pattern: &str) -> Result<Regex> {
        Regex::new(pattern).map_err(|source| SaveError::InvalidPattern {
            pattern: format!("{pattern} (in {})", self.location.display()),
            source,
        })
    }

    fn regexes(&self, patterns: Option<&Vec<String>>) -> Result<Vec<Regex>> {
        patterns
            .into_iter()
            .flatten()
            .map(|p| self.regex(p))
            .collect()
    }

    fn general(&self, section: &GeneralSection, dir: &Path) -> Result<GeneralConfig> {
        let excluded_tests = section.excluded_tests.clone().unwrap_or_default();
        let mut builder = GlobSetBuilder::new();
        for pattern in &excluded_tests {
            let glob = Glob::new(pattern).map_err(|source| SaveError::InvalidGlob {
                pattern: pattern.clone(),
                source,
            })?;
            builder.add(glob);
        }
        let excluded_set = builder.build().map_err(|source| SaveError::InvalidGlob {
            pattern: "combined patterns".to_string(),
            source,
        })?;

        let run_config_pattern = match &section.run_config_pattern {
            Some(pattern) => {
                let regex = self.regex(pattern)?;
                if regex.captures_len() < 2 {
                    return Err(self.error(format!(
                        "run_config_pattern '{pattern}' needs a capture group"
                    )));
                }
                Some(regex)
            }
            None => None,
        };

        let expected = self.expected_pattern(section.expected_warnings_pattern.as_deref())?;

        let suite_name = section.suite_name.clone().unwrap_or_else(|| {
            dir.file_name()
                .map_or_else(|| "root".to_string(), |n| n.to_string_lossy().into_owned())
        });

        Ok(GeneralConfig {
            exec_cmd: section.exec_cmd.clone(),
            tags: section.tags.clone().unwrap_or_default(),
            description: section.description.clone().unwrap_or_default(),
            suite_name,
            language: section.language.clone(),
            excluded_tests,
            excluded_set,
            run_config_pattern,
            expected_warnings_pattern: expected,
            timeout: Duration::from_millis(
                section.timeout_millis.unwrap_or(DEFAULT_TIMEOUT_MILLIS),
            ),
        })
    }

    fn expected_pattern(&self, pattern: Option<&str>) -> Result<Regex> {
        let pattern = pattern.unwrap_or(DEFAULT_EXPECTED_WARNINGS_PATTERN);
        let regex = self.regex(pattern)?;
        if !regex.capture_names().flatten().any(|name| name == "message") {
            return Err(self.error(format!(
                "expected_warnings_pattern '{pattern}' needs a 'message' group"
            )));
        }
        Ok(regex)
    }

    fn command_template(
        &self,
        section: &str,
        exec_cmd: Option<&String>,
        exec_flags: Option<&String>,
        general: &GeneralConfig,
    ) -> Result<String> {
        let exec_cmd = exec_cmd
            .or(general.exec_cmd.as_ref())
            .map(|cmd| cmd.trim())
            .filter(|cmd| !cmd.is_empty())
            .ok_or_else(|| self.error(format!("no exec_cmd configured for [{section}]")))?;
        Ok(match exec_flags.map(|flags| flags.trim()) {
            Some(flags) if !flags.is_empty() => format!("{exec_cmd} {flags}"),
            _ => exec_cmd.to_string(),
        })
    }

    fn batch(&self, section: &str, size: Option<usize>) -> Result<usize> {
        match size.unwrap_or(1) {
            0 => Err(self.error(format!("batch_size of [{section}] must be at least 1"))),
            size => Ok(size),
        }
    }

    fn warn(&self, section: &WarnSection, general: &GeneralConfig, dir: &Path) -> Result<WarnConfig> {
        let command_template = self.command_template(
            "warn",
            section.exec_cmd.as_ref(),
            section.exec_flags.as_ref(),
            general,
        )?;
        let suffix = section
            .resource_name_test_suffix
            .clone()
            .unwrap_or_else(|| DEFAULT_TEST_SUFFIX.to_string());
        let test_name_regex = match &section.test_name_regex {
            Some(pattern) => self.regex(pattern)?,
            None => self.regex(&format!(".*{}.*", regex::escape(&suffix)))?,
        };
        let resource_pattern = section
            .resource_pattern
            .as_deref()
            .map(|p| self.regex(p))
            .transpose()?;
        let expected_warnings_pattern = match &section.expected_warnings_pattern {
            Some(pattern) => self.expected_pattern(Some(pattern))?,
            None => general.expected_warnings_pattern.clone(),
        };
        let actual_warnings_pattern = self.regex(
            section
                .actual_warnings_pattern
                .as_deref()
                .unwrap_or(DEFAULT_ACTUAL_WARNINGS_PATTERN),
        )?;

        let exact = section.exact_warnings_match.unwrap_or(true);
        let delimiters = match &section.pattern_delimiters {
            Some(list) => Delimiters::from_list(list)?,
            None => Delimiters::default(),
        };

        let actual_warnings_format = section.actual_warnings_format.unwrap_or_default();
        let sarif_file = section.sarif_file.as_ref().map(|f| dir.join(f));
        if actual_warnings_format == ActualWarningsFormat::Sarif && sarif_file.is_none() {
            return Err(self.error("actual_warnings_format = \"sarif\" requires sarif_file"));
        }

        let batch_size = self.batch("warn", section.batch_size)?;
        let has_file_group = actual_warnings_pattern
            .capture_names()
            .flatten()
            .any(|name| name == "file");
        if batch_size > 1
            && actual_warnings_format == ActualWarningsFormat::Plain
            && !has_file_group
        {
            return Err(self.error(
                "batch_size > 1 requires a 'file' group in actual_warnings_pattern",
            ));
        }

        Ok(WarnConfig {
            command_template,
            resource_name_test_suffix: suffix,
            test_name_regex,
            resource_pattern,
            expected_warnings_pattern,
            actual_warnings_pattern,
            actual_warnings_format,
            sarif_file,
            match_options: MatchOptions {
                exact,
                partial: section.partial_warn_text_match.unwrap_or(false),
                delimiters: Some(delimiters),
            },
            warning_text_has_line: section.warning_text_has_line.unwrap_or(true),
            warning_text_has_column: section.warning_text_has_column.unwrap_or(true),
            ignore_lines: self.regexes(section.ignore_lines.as_ref())?,
            timeout: section
                .timeout_millis
                .map_or(general.timeout, Duration::from_millis),
            batch_size,
            batch_separator: section
                .batch_separator
                .clone()
                .unwrap_or_else(|| DEFAULT_BATCH_SEPARATOR.to_string()),
        })
    }

    fn fix(&self, section: &FixSection, general: &GeneralConfig) -> Result<FixConfig> {
        let command_template = self.command_template(
            "fix",
            section.exec_cmd.as_ref(),
            section.exec_flags.as_ref(),
            general,
        )?;
        let test_suffix = section
            .resource_name_test_suffix
            .clone()
            .unwrap_or_else(|| DEFAULT_TEST_SUFFIX.to_string());
        let expected_suffix = section
            .resource_name_expected_suffix
            .clone()
            .unwrap_or_else(|| DEFAULT_EXPECTED_SUFFIX.to_string());
        if test_suffix.is_empty() || expected_suffix.is_empty() {
            return Err(self.error("fix resource suffixes must not be empty"));
        }
        if test_suffix == expected_suffix {
            return Err(self.error(format!(
                "fix test and expected suffixes are both '{test_suffix}'"
            )));
        }

        Ok(FixConfig {
            command_template,
            resource_name_test_suffix: test_suffix,
            resource_name_expected_suffix: expected_suffix,
            destination_file_suffix: section
                .destination_file_suffix
                .clone()
                .filter(|s| !s.is_empty()),
            ignore_lines: self.regexes(section.ignore_lines.as_ref())?,
            timeout: section
                .timeout_millis
                .map_or(general.timeout, Duration::from_millis),
            batch_size: self.batch("fix", section.batch_size)?,
            batch_separator: section
                .batch_separator
                .clone()
                .unwrap_or_else(|| DEFAULT_BATCH_SEPARATOR.to_string()),
        })
    }

    /// Nested tables fall back to the node's own `[fix]` / `[warn]` sections.
    fn fix_and_warn(
        &self,
        section: &FixAndWarnSection,
        fix_section: Option<&FixSection>,
        warn_section: Option<&WarnSection>,
        general: &GeneralConfig,
        dir: &Path,
    ) -> Result<FixAndWarnConfig> {
        let nested_fix = merge_optional(section.fix.as_ref(), fix_section, FixSection::merge_with);
        let nested_warn =
            merge_optional(section.warn.as_ref(), warn_section, WarnSection::merge_with);

        let fix = self.fix(&nested_fix, general)?;
        let warn = self.warn(&nested_warn, general, dir)?;

        if fix.resource_name_test_suffix != warn.resource_name_test_suffix {
            return Err(self.error(format!(
                "[fix and warn] fix and warn disagree on resource_name_test_suffix ('{}' vs '{}')",
                fix.resource_name_test_suffix, warn.resource_name_test_suffix
            )));
        }
        if fix.batch_size != warn.batch_size {
            return Err(self.error(format!(
                "[fix and warn] fix and warn disagree on batch_size ({} vs {})",
                fix.batch_size, warn.batch_size
            )));
        }

        Ok(FixAndWarnConfig { fix, warn })
    }
}

fn merge_optional<T: Clone + Default>(
    nested: Option<&T>,
    fallback: Option<&T>,
    merge: impl Fn(&T, &T) -> T,
) -> T {
    match (nested, fallback) {
        (Some(n), Some(f)) => merge(n, f),
        (n, f) => n.or(f).cloned().unwrap_or_default(),
    }
}

#[cfg(test)]
#[path = "resolved_tests.rs"]
mod tests;
