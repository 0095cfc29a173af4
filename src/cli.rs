use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::output::ReportType;

/// Where the report goes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ResultOutput {
    #[default]
    Stdout,
    Stderr,
    /// `save-report.<ext>` in the report directory
    File,
}

impl std::str::FromStr for ResultOutput {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        <Self as ValueEnum>::from_str(s, true).map_err(|_| format!("Unknown result output: {s}"))
    }
}

#[derive(Parser, Debug, Default)]
#[command(name = "save")]
#[command(author, version, about = "Static analysis conformance test runner")]
#[command(long_about = "Runs static analysis tools against annotated fixture files and \
    checks that they report exactly the expected warnings and fixes.\n\n\
    Exit codes:\n  \
    0 - All tests passed\n  \
    1 - Some tests failed or crashed\n  \
    2 - Configuration error")]
pub struct Cli {
    /// Root directory of the test suites
    #[arg(default_value = ".")]
    pub test_root: PathBuf,

    /// Only run these test files (relative to the test root)
    pub test_files: Vec<PathBuf>,

    /// Name of the per-directory config file
    #[arg(long)]
    pub config_name: Option<String>,

    /// Properties file with option defaults [default: <TEST_ROOT>/save.properties]
    #[arg(long)]
    pub properties_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    pub debug: bool,

    /// Only log errors
    #[arg(short, long, conflicts_with = "debug")]
    pub quiet: bool,

    /// Report format [possible values: plain, json, toml, xml]
    #[arg(long)]
    pub report_type: Option<ReportType>,

    /// Where to write the report
    #[arg(long, value_enum)]
    pub result_output: Option<ResultOutput>,

    /// Directory for `--result-output file`
    #[arg(long)]
    pub report_dir: Option<PathBuf>,

    /// Only run suites with these names (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub include_suites: Vec<String>,

    /// Only run suites configured for this language
    #[arg(long)]
    pub language: Option<String>,

    /// Override every configured timeout (milliseconds)
    #[arg(long)]
    pub timeout_millis: Option<u64>,
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
