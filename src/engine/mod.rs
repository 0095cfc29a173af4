//! Running one plugin of one suite over its discovered units.
//!
//! Units are taken lazily from the discovery iterator, grouped into batches of
//! the plugin's `batch_size`, executed through a [`ProcessRunner`] and checked.
//! Anything that goes wrong inside a batch becomes a `Crash` result for every
//! unit of that batch; it never aborts the rest of the run.

mod diff;
mod fix_check;
mod flags;
mod warn_check;

pub use diff::{DiffLine, delta_count, line_diff, render};
pub use flags::{ExtraFlags, Placeholders};

use std::collections::VecDeque;
use std::path::Path;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::config::{GeneralConfig, PluginConfig};
use crate::discovery::TestFiles;
use crate::error::{Result, SaveError};
use crate::process::{ExecutionResult, ProcessRunner};
use crate::result::{DebugInfo, TestResult, TestStatus, WarningCounters};

/// Checked status of one unit, with warning counters when warnings were compared.
type UnitOutcome = (TestStatus, Option<WarningCounters>);

pub struct PluginEngine<'a, R: ProcessRunner + ?Sized> {
    runner: &'a R,
    general: &'a GeneralConfig,
    plugin: &'a PluginConfig,
    config_dir: &'a Path,
}

impl<'a, R: ProcessRunner + ?Sized> PluginEngine<'a, R> {
    #[must_use]
    pub const fn new(
        runner: &'a R,
        general: &'a GeneralConfig,
        plugin: &'a PluginConfig,
        config_dir: &'a Path,
    ) -> Self {
        Self {
            runner,
            general,
            plugin,
            config_dir,
        }
    }

    /// Lazily run every unit of `units`, yielding one result per unit.
    pub fn execute<I>(self, units: I) -> Execution<'a, R, I::IntoIter>
    where
        I: IntoIterator<Item = TestFiles>,
    {
        Execution {
            engine: self,
            units: units.into_iter(),
            pending: VecDeque::new(),
        }
    }

    fn is_excluded(&self, unit: &TestFiles) -> bool {
        let test = unit.test();
        let relative = test.strip_prefix(self.config_dir).unwrap_or(test);
        self.general.is_excluded(relative)
    }

    fn run_batch(&self, batch: Vec<TestFiles>) -> Vec<TestResult> {
        let started = Instant::now();
        let mut command = String::new();
        let checked = self.check_batch(&batch, &mut command);
        let duration_millis = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        match checked {
            Ok((execution, outcomes)) => batch
                .into_iter()
                .zip(outcomes)
                .map(|(unit, (status, counters))| {
                    let debug_info = DebugInfo {
                        exec_cmd: command.clone(),
                        stdout: execution.stdout.join("\n"),
                        stderr: execution.stderr.join("\n"),
                        duration_millis,
                        counters,
                    };
                    TestResult::new(unit, status, Some(debug_info))
                })
                .collect(),
            Err(err) => {
                warn!(
                    plugin = self.plugin.name(),
                    error_type = err.error_type(),
                    %err,
                    "test execution crashed"
                );
                let status = TestStatus::from_error(&err);
                batch
                    .into_iter()
                    .map(|unit| {
                        let debug_info = DebugInfo {
                            exec_cmd: command.clone(),
                            duration_millis,
                            ..DebugInfo::default()
                        };
                        TestResult::new(unit, status.clone(), Some(debug_info))
                    })
                    .collect()
            }
        }
    }

    fn check_batch(
        &self,
        batch: &[TestFiles],
        command: &mut String,
    ) -> Result<(ExecutionResult, Vec<UnitOutcome>)> {
        let contents = batch
            .iter()
            .map(|unit| read_to_string(unit.test()))
            .collect::<Result<Vec<_>>>()?;
        let flags = match (&self.general.run_config_pattern, contents.first()) {
            (Some(pattern), Some(content)) => ExtraFlags::from_content(content, pattern),
            _ => ExtraFlags::default(),
        };

        match self.plugin {
            PluginConfig::Warn(cfg) => {
                *command = Placeholders {
                    flags,
                    file_name: join_paths(batch.iter().map(TestFiles::test), &cfg.batch_separator),
                    resources: join_paths(batch.iter().flat_map(TestFiles::resources), " "),
                }
                .apply(&cfg.command_template);
                let execution = self.exec(command.as_str(), cfg.timeout)?;
                let outcomes = warn_check::check(cfg, batch, &contents, &execution)?;
                Ok((execution, outcomes))
            }
            PluginConfig::Fix(cfg) => {
                let workspace = fix_check::Workspace::copy(batch)?;
                *command = Placeholders {
                    flags,
                    file_name: join_paths(workspace.copies(), &cfg.batch_separator),
                    resources: String::new(),
                }
                .apply(&cfg.command_template);
                let execution = self.exec(command.as_str(), cfg.timeout)?;
                let outcomes = fix_check::check(cfg, batch, &workspace)?
                    .into_iter()
                    .map(|status| (status, None))
                    .collect();
                Ok((execution, outcomes))
            }
            PluginConfig::FixAndWarn(cfg) => {
                let workspace = fix_check::Workspace::copy(batch)?;
                *command = Placeholders {
                    flags,
                    file_name: join_paths(workspace.copies(), &cfg.fix.batch_separator),
                    resources: String::new(),
                }
                .apply(&cfg.fix.command_template);
                let execution = self.exec(command.as_str(), cfg.fix.timeout)?;
                let fixed = fix_check::check(&cfg.fix, batch, &workspace)?;
                let warned = warn_check::check(&cfg.warn, batch, &contents, &execution)?;
                let outcomes = fixed
                    .into_iter()
                    .zip(warned)
                    .map(|(fix_status, (warn_status, counters))| {
                        (fix_status.combine(warn_status), counters)
                    })
                    .collect();
                Ok((execution, outcomes))
            }
        }
    }

    fn exec(&self, command: &str, timeout: Duration) -> Result<ExecutionResult> {
        debug!(plugin = self.plugin.name(), command, "running tool");
        self.runner.exec(command, None, timeout)
    }
}

/// Iterator returned by [`PluginEngine::execute`].
pub struct Execution<'a, R: ProcessRunner + ?Sized, I> {
    engine: PluginEngine<'a, R>,
    units: I,
    pending: VecDeque<TestResult>,
}

impl<R, I> Iterator for Execution<'_, R, I>
where
    R: ProcessRunner + ?Sized,
    I: Iterator<Item = TestFiles>,
{
    type Item = TestResult;

    fn next(&mut self) -> Option<TestResult> {
        let batch_size = self.engine.plugin.batch_size().max(1);
        loop {
            if let Some(result) = self.pending.pop_front() {
                return Some(result);
            }

            let mut batch = Vec::with_capacity(batch_size);
            while batch.len() < batch_size {
                let Some(unit) = self.units.next() else {
                    break;
                };
                if self.engine.is_excluded(&unit) {
                    debug!(test = %unit.test().display(), "excluded");
                    self.pending.push_back(TestResult::new(
                        unit,
                        TestStatus::Ignored {
                            reason: "Excluded by configuration".to_string(),
                        },
                        None,
                    ));
                    continue;
                }
                batch.push(unit);
            }

            if batch.is_empty() {
                if self.pending.is_empty() {
                    return None;
                }
                continue;
            }
            let results = self.engine.run_batch(batch);
            self.pending.extend(results);
        }
    }
}

fn read_to_string(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|source| SaveError::FileRead {
        path: path.to_path_buf(),
        source,
    })
}

fn read_lines(path: &Path) -> Result<Vec<String>> {
    Ok(read_to_string(path)?.lines().map(String::from).collect())
}

fn join_paths<P: AsRef<Path>>(paths: impl IntoIterator<Item = P>, separator: &str) -> String {
    paths
        .into_iter()
        .map(|p| p.as_ref().display().to_string())
        .collect::<Vec<_>>()
        .join(separator)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map_or_else(String::new, |n| n.to_string_lossy().into_owned())
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
