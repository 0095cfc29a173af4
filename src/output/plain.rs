use std::fmt::Write;

use crate::error::Result;
use crate::result::{Statistics, TestStatus};

use super::{OutputFormatter, SuiteReport};

mod ansi {
    pub const RED: &str = "\x1b[31m";
    pub const GREEN: &str = "\x1b[32m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const MAGENTA: &str = "\x1b[35m";
    pub const RESET: &str = "\x1b[0m";
}

pub struct PlainFormatter {
    use_colors: bool,
}

impl PlainFormatter {
    #[must_use]
    pub const fn new(use_colors: bool) -> Self {
        Self { use_colors }
    }

    fn label(&self, status: &TestStatus) -> String {
        if !self.use_colors {
            return status.label().to_string();
        }
        let color = match status {
            TestStatus::Pass { .. } => ansi::GREEN,
            TestStatus::Fail { .. } => ansi::RED,
            TestStatus::Ignored { .. } => ansi::YELLOW,
            TestStatus::Crash { .. } => ansi::MAGENTA,
        };
        format!("{color}{}{}", status.label(), ansi::RESET)
    }
}

impl OutputFormatter for PlainFormatter {
    fn format(&self, reports: &[SuiteReport], statistics: &Statistics) -> Result<String> {
        let mut out = String::new();
        for report in reports {
            let _ = writeln!(out, "Suite: {}", report.test_suite);
            for execution in &report.plugin_executions {
                let _ = writeln!(out, "  [{}]", execution.plugin);
                for result in &execution.test_results {
                    let _ = write!(
                        out,
                        "    {} {}",
                        self.label(&result.status),
                        result.resources.test().display()
                    );
                    if let Some(detail) = result.status.detail() {
                        let _ = write!(out, ": {detail}");
                    }
                    out.push('\n');
                    if let TestStatus::Fail { reason, .. } = &result.status {
                        for line in reason.lines() {
                            let _ = writeln!(out, "        {line}");
                        }
                    }
                }
            }
        }

        let _ = writeln!(
            out,
            "Total: {}, passed: {}, failed: {}, skipped: {}, crashed: {}",
            statistics.total,
            statistics.passed,
            statistics.failed,
            statistics.skipped,
            statistics.crashed
        );
        Ok(out)
    }
}

#[cfg(test)]
#[path = "plain_tests.rs"]
mod tests;
