use indexmap::IndexMap;
use serde::Serialize;

use crate::error::Result;
use crate::result::{Event, EventSink, PluginEvent, Statistics, TestEvent, TestResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginExecution {
    pub plugin: String,
    pub test_results: Vec<TestResult>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SuiteReport {
    pub test_suite: String,
    pub plugin_executions: Vec<PluginExecution>,
}

/// Groups results by suite and plugin in the order they arrive.
#[derive(Debug, Default)]
pub struct ReportCollector {
    suites: IndexMap<String, IndexMap<String, Vec<TestResult>>>,
    statistics: Statistics,
    errors: Vec<String>,
}

impl ReportCollector {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn statistics(&self) -> &Statistics {
        &self.statistics
    }

    /// Plugins that could not run at all.
    #[must_use]
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    #[must_use]
    pub fn reports(&self) -> Vec<SuiteReport> {
        self.suites
            .iter()
            .map(|(suite, plugins)| SuiteReport {
                test_suite: suite.clone(),
                plugin_executions: plugins
                    .iter()
                    .map(|(plugin, results)| PluginExecution {
                        plugin: plugin.clone(),
                        test_results: results.clone(),
                    })
                    .collect(),
            })
            .collect()
    }
}

impl EventSink for ReportCollector {
    fn handle(&mut self, event: &Event) -> Result<()> {
        match event {
            Event::Plugin(PluginEvent::Init { suite }) => {
                self.suites.entry(suite.clone()).or_default();
            }
            Event::Plugin(PluginEvent::Start { suite, plugin }) => {
                self.suites
                    .entry(suite.clone())
                    .or_default()
                    .entry(plugin.clone())
                    .or_default();
            }
            Event::Plugin(PluginEvent::End { .. }) => {}
            Event::Plugin(PluginEvent::Error {
                suite,
                plugin,
                message,
            }) => {
                self.errors.push(format!("[{suite}] {plugin}: {message}"));
            }
            Event::Test(TestEvent::Result {
                suite,
                plugin,
                result,
            }) => {
                self.statistics.record(&result.status);
                self.suites
                    .entry(suite.clone())
                    .or_default()
                    .entry(plugin.clone())
                    .or_default()
                    .push(result.clone());
            }
            Event::Finished => {}
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "collector_tests.rs"]
mod tests;
