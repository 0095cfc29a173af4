//! JUnit-style XML: one `<testsuite>` per suite and plugin, one `<testcase>` per unit.

use std::fmt::Write;

use crate::error::Result;
use crate::result::{Statistics, TestStatus};

use super::{OutputFormatter, SuiteReport};

pub struct XmlFormatter;

impl OutputFormatter for XmlFormatter {
    fn format(&self, reports: &[SuiteReport], statistics: &Statistics) -> Result<String> {
        let mut out = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        let _ = writeln!(
            out,
            "<testsuites name=\"save\" tests=\"{}\" failures=\"{}\" errors=\"{}\" skipped=\"{}\">",
            statistics.total, statistics.failed, statistics.crashed, statistics.skipped
        );

        for report in reports {
            for execution in &report.plugin_executions {
                let count = |pred: fn(&TestStatus) -> bool| {
                    execution
                        .test_results
                        .iter()
                        .filter(|r| pred(&r.status))
                        .count()
                };
                let _ = writeln!(
                    out,
                    "  <testsuite name=\"{}\" tests=\"{}\" failures=\"{}\" errors=\"{}\" skipped=\"{}\">",
                    escape_xml(&format!("{}.{}", report.test_suite, execution.plugin)),
                    execution.test_results.len(),
                    count(TestStatus::is_fail),
                    count(TestStatus::is_crash),
                    count(TestStatus::is_ignored)
                );

                for result in &execution.test_results {
                    let duration = result
                        .debug_info
                        .as_ref()
                        .map_or(0, |d| d.duration_millis);
                    let _ = write!(
                        out,
                        "    <testcase classname=\"{}\" name=\"{}\" time=\"{}.{:03}\"",
                        escape_xml(&report.test_suite),
                        escape_xml(&result.resources.test().display().to_string()),
                        duration / 1000,
                        duration % 1000
                    );
                    match &result.status {
                        TestStatus::Pass { .. } => out.push_str(" />\n"),
                        TestStatus::Fail {
                            reason,
                            short_reason,
                        } => {
                            let _ = writeln!(
                                out,
                                ">\n      <failure message=\"{}\">{}</failure>\n    </testcase>",
                                escape_xml(short_reason),
                                escape_xml(reason)
                            );
                        }
                        TestStatus::Ignored { reason } => {
                            let _ = writeln!(
                                out,
                                ">\n      <skipped message=\"{}\" />\n    </testcase>",
                                escape_xml(reason)
                            );
                        }
                        TestStatus::Crash {
                            error_type,
                            message,
                        } => {
                            let _ = writeln!(
                                out,
                                ">\n      <error type=\"{}\" message=\"{}\" />\n    </testcase>",
                                escape_xml(error_type),
                                escape_xml(message)
                            );
                        }
                    }
                }
                out.push_str("  </testsuite>\n");
            }
        }

        out.push_str("</testsuites>\n");
        Ok(out)
    }
}

fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
#[path = "xml_tests.rs"]
mod tests;
