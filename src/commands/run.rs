use std::collections::HashSet;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::cli::{Cli, ResultOutput};
use crate::config::{
    ConfigTree, DEFAULT_CONFIG_NAME, PROPERTIES_FILE_NAME, PluginConfig, Properties,
    ResolvedConfig,
};
use crate::discovery::{TestFiles, discover};
use crate::engine::PluginEngine;
use crate::error::{Result, SaveError};
use crate::output::{ReportCollector, ReportType};
use crate::process::{ProcessRunner, ShellProcessRunner};
use crate::result::{Event, EventSink, PluginEvent, TestEvent};
use crate::{EXIT_SUCCESS, EXIT_TEST_FAILURE};

const REPORT_FILE_STEM: &str = "save-report";

/// Command-line options merged with `save.properties`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    pub test_root: PathBuf,
    pub test_files: Vec<PathBuf>,
    pub config_name: String,
    pub debug: bool,
    pub quiet: bool,
    pub report_type: ReportType,
    pub result_output: ResultOutput,
    pub report_dir: PathBuf,
    pub include_suites: Vec<String>,
    pub language: Option<String>,
    pub timeout: Option<Duration>,
    /// Unknown keys found in the properties file.
    pub ignored_properties: Vec<String>,
}

impl RunOptions {
    /// Merge `cli` over the properties file. Command-line values win.
    ///
    /// # Errors
    /// Returns an error if the properties file is invalid or names an unknown value.
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let properties = match &cli.properties_file {
            Some(path) if !path.is_file() => {
                return Err(SaveError::Config(format!(
                    "properties file {} does not exist",
                    path.display()
                )));
            }
            Some(path) => Properties::load(path)?,
            None => Properties::load(&cli.test_root.join(PROPERTIES_FILE_NAME))?,
        };
        Self::merge(cli, properties)
    }

    fn merge(cli: &Cli, properties: Properties) -> Result<Self> {
        let report_type = match (cli.report_type, &properties.report_type) {
            (Some(report_type), _) => report_type,
            (None, Some(raw)) => raw.parse().map_err(SaveError::Properties)?,
            (None, None) => ReportType::default(),
        };
        let result_output = match (cli.result_output, &properties.result_output) {
            (Some(output), _) => output,
            (None, Some(raw)) => raw.parse().map_err(SaveError::Properties)?,
            (None, None) => ResultOutput::default(),
        };

        Ok(Self {
            test_root: cli.test_root.clone(),
            test_files: cli.test_files.clone(),
            config_name: cli
                .config_name
                .clone()
                .or(properties.config_name)
                .unwrap_or_else(|| DEFAULT_CONFIG_NAME.to_string()),
            debug: cli.debug || properties.debug.unwrap_or(false),
            quiet: cli.quiet || properties.quiet.unwrap_or(false),
            report_type,
            result_output,
            report_dir: cli
                .report_dir
                .clone()
                .or_else(|| properties.report_dir.map(PathBuf::from))
                .unwrap_or_else(|| PathBuf::from(".")),
            include_suites: if cli.include_suites.is_empty() {
                properties.include_suites
            } else {
                cli.include_suites.clone()
            },
            language: cli.language.clone().or(properties.language),
            timeout: cli
                .timeout_millis
                .or(properties.timeout_millis)
                .map(Duration::from_millis),
            ignored_properties: properties.ignored_keys,
        })
    }

    fn selects(&self, config: &ResolvedConfig) -> bool {
        let suite_ok = self.include_suites.is_empty()
            || self.include_suites.contains(&config.general.suite_name);
        let language_ok = match (&self.language, &config.general.language) {
            (Some(wanted), Some(language)) => wanted.eq_ignore_ascii_case(language),
            (Some(_), None) => false,
            (None, _) => true,
        };
        suite_ok && language_ok
    }
}

/// Run every selected suite under the test root and write the report.
///
/// # Errors
/// Returns an error if the configuration is invalid or the report cannot be written.
/// Failing or crashing tests are not errors; they are reflected in the exit code.
pub fn run(options: &RunOptions) -> Result<i32> {
    for key in &options.ignored_properties {
        warn!(key = %key, "ignoring unknown property");
    }
    let runner = ShellProcessRunner::default();
    let mut collector = ReportCollector::new();
    execute(options, &runner, &mut collector)?;

    let reports = collector.reports();
    let use_colors = options.result_output == ResultOutput::Stdout
        && options.report_type == ReportType::Plain
        && std::io::IsTerminal::is_terminal(&std::io::stdout())
        && std::env::var_os("NO_COLOR").is_none();
    let rendered = options
        .report_type
        .formatter(use_colors)
        .format(&reports, collector.statistics())?;
    write_report(options, &rendered)?;

    for error in collector.errors() {
        tracing::error!("{error}");
    }
    let statistics = collector.statistics();
    info!(
        total = statistics.total,
        passed = statistics.passed,
        failed = statistics.failed,
        skipped = statistics.skipped,
        crashed = statistics.crashed,
        "run finished"
    );
    Ok(exit_code(&collector))
}

/// Failures, crashes and plugin errors all fail the run.
fn exit_code(collector: &ReportCollector) -> i32 {
    if collector.statistics().all_passed() && collector.errors().is_empty() {
        EXIT_SUCCESS
    } else {
        EXIT_TEST_FAILURE
    }
}

/// Discover and resolve the config tree, then stream every result into `sink`.
///
/// # Errors
/// Returns configuration errors, and errors raised by the sink.
pub fn execute<R: ProcessRunner + ?Sized>(
    options: &RunOptions,
    runner: &R,
    sink: &mut dyn EventSink,
) -> Result<()> {
    let root = dunce::canonicalize(&options.test_root).map_err(|e| {
        SaveError::Config(format!(
            "test root {} is not accessible: {e}",
            options.test_root.display()
        ))
    })?;
    let mut tree = ConfigTree::discover(&root, &options.config_name)?;
    tree.process_in_place()?;

    let selected_files = selected_files(&root, &options.test_files);

    for id in tree.ids() {
        let node = tree.get(id);
        let Some(config) = node.resolved() else {
            continue;
        };
        if !options.selects(config) {
            debug!(suite = %config.general.suite_name, "suite not selected");
            continue;
        }
        run_suite(options, runner, config, selected_files.as_ref(), sink)?;
    }

    sink.handle(&Event::Finished)
}

fn run_suite<R: ProcessRunner + ?Sized>(
    options: &RunOptions,
    runner: &R,
    config: &ResolvedConfig,
    selected_files: Option<&HashSet<PathBuf>>,
    sink: &mut dyn EventSink,
) -> Result<()> {
    let mut announced = false;

    for plugin in &config.plugins {
        let plugin = match options.timeout {
            Some(timeout) => plugin.clone().with_timeout(timeout),
            None => plugin.clone(),
        };
        let units = discover(&config.dir, &plugin, &options.config_name).filter(|unit| match unit {
            Ok(unit) => selected_files.is_none_or(|files| files.contains(unit.test())),
            Err(_) => true,
        });
        run_plugin(runner, config, &plugin, units, sink, &mut announced)?;
    }
    Ok(())
}

/// Stream the results of one plugin over `units`. Units that could not be
/// discovered become plugin errors. Nothing is emitted for a plugin with
/// neither results nor errors.
fn run_plugin<R, I>(
    runner: &R,
    config: &ResolvedConfig,
    plugin: &PluginConfig,
    units: I,
    sink: &mut dyn EventSink,
    announced: &mut bool,
) -> Result<()>
where
    R: ProcessRunner + ?Sized,
    I: Iterator<Item = Result<TestFiles>>,
{
    let suite = &config.general.suite_name;
    let name = plugin.name();
    let mut walk_errors = Vec::new();
    let mut started = false;
    {
        let units = units.filter_map(|unit| unit.map_err(|error| walk_errors.push(error)).ok());
        for result in PluginEngine::new(runner, &config.general, plugin, &config.dir).execute(units) {
            if !started {
                announce(config, sink, announced)?;
                sink.handle(&Event::Plugin(PluginEvent::Start {
                    suite: suite.clone(),
                    plugin: name.to_string(),
                }))?;
                started = true;
            }
            debug!(suite = %suite, plugin = %name, test = %result.resources.test().display(), status = result.status.label());
            sink.handle(&Event::Test(TestEvent::Result {
                suite: suite.clone(),
                plugin: name.to_string(),
                result,
            }))?;
        }
    }

    for error in walk_errors {
        warn!(suite = %suite, plugin = %name, error = %error, "test discovery failed");
        announce(config, sink, announced)?;
        sink.handle(&Event::Plugin(PluginEvent::Error {
            suite: suite.clone(),
            plugin: name.to_string(),
            message: error.to_string(),
        }))?;
    }
    if started {
        sink.handle(&Event::Plugin(PluginEvent::End {
            suite: suite.clone(),
            plugin: name.to_string(),
        }))?;
    }
    Ok(())
}

/// Emit the suite's `Init` event once, before its first plugin event.
fn announce(config: &ResolvedConfig, sink: &mut dyn EventSink, announced: &mut bool) -> Result<()> {
    if !*announced {
        let suite = &config.general.suite_name;
        info!(suite = %suite, dir = %config.dir.display(), "running suite");
        sink.handle(&Event::Plugin(PluginEvent::Init {
            suite: suite.clone(),
        }))?;
        *announced = true;
    }
    Ok(())
}

/// Canonical paths of explicitly requested test files, or `None` to run everything.
fn selected_files(root: &Path, files: &[PathBuf]) -> Option<HashSet<PathBuf>> {
    if files.is_empty() {
        return None;
    }
    Some(
        files
            .iter()
            .map(|file| {
                let path = if file.is_absolute() {
                    file.clone()
                } else {
                    root.join(file)
                };
                dunce::canonicalize(&path).unwrap_or(path)
            })
            .collect(),
    )
}

fn write_report(options: &RunOptions, rendered: &str) -> Result<()> {
    match options.result_output {
        ResultOutput::Stdout => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(rendered.as_bytes())?;
            if !rendered.ends_with('\n') {
                stdout.write_all(b"\n")?;
            }
        }
        ResultOutput::Stderr => eprintln!("{}", rendered.trim_end()),
        ResultOutput::File => {
            std::fs::create_dir_all(&options.report_dir)?;
            let path = options.report_dir.join(format!(
                "{REPORT_FILE_STEM}.{}",
                options.report_type.extension()
            ));
            std::fs::write(&path, rendered)?;
            info!(report = %path.display(), "report written");
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "run_tests.rs"]
mod tests;
