//! Typed results and the event stream consumed by reporters.

use serde::Serialize;

use crate::discovery::TestFiles;
use crate::error::{Result, SaveError};

/// Outcome of one execution unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all_fields = "camelCase")]
pub enum TestStatus {
    Pass {
        message: Option<String>,
    },
    Fail {
        reason: String,
        short_reason: String,
    },
    Ignored {
        reason: String,
    },
    Crash {
        error_type: String,
        message: String,
    },
}

impl TestStatus {
    #[must_use]
    pub fn from_error(error: &SaveError) -> Self {
        Self::Crash {
            error_type: error.error_type().to_string(),
            message: error.to_string(),
        }
    }

    #[must_use]
    pub const fn is_pass(&self) -> bool {
        matches!(self, Self::Pass { .. })
    }

    #[must_use]
    pub const fn is_fail(&self) -> bool {
        matches!(self, Self::Fail { .. })
    }

    #[must_use]
    pub const fn is_ignored(&self) -> bool {
        matches!(self, Self::Ignored { .. })
    }

    #[must_use]
    pub const fn is_crash(&self) -> bool {
        matches!(self, Self::Crash { .. })
    }

    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Pass { .. } => "PASS",
            Self::Fail { .. } => "FAIL",
            Self::Ignored { .. } => "IGNORED",
            Self::Crash { .. } => "CRASH",
        }
    }

    /// One-line human-readable detail, if any.
    #[must_use]
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::Pass { message } => message.as_deref(),
            Self::Fail { short_reason, .. } => Some(short_reason),
            Self::Ignored { reason } => Some(reason),
            Self::Crash { message, .. } => Some(message),
        }
    }

    /// Combine two statuses of the same unit; the worse one wins, failure
    /// reasons are concatenated.
    #[must_use]
    pub fn combine(self, other: Self) -> Self {
        match (self, other) {
            (crash @ Self::Crash { .. }, _) | (_, crash @ Self::Crash { .. }) => crash,
            (
                Self::Fail {
                    reason: r1,
                    short_reason: s1,
                },
                Self::Fail {
                    reason: r2,
                    short_reason: s2,
                },
            ) => Self::Fail {
                reason: format!("{r1}\n{r2}"),
                short_reason: format!("{s1}; {s2}"),
            },
            (fail @ Self::Fail { .. }, _) | (_, fail @ Self::Fail { .. }) => fail,
            (Self::Pass { message: m1 }, Self::Pass { message: m2 }) => Self::Pass {
                message: match (m1, m2) {
                    (Some(a), Some(b)) => Some(format!("{a}; {b}")),
                    (a, b) => a.or(b),
                },
            },
            (ignored @ Self::Ignored { .. }, _) | (_, ignored @ Self::Ignored { .. }) => ignored,
        }
    }
}

/// Warning counts of a warn check.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WarningCounters {
    pub matched: usize,
    pub missing: usize,
    pub unexpected: usize,
}

/// What was run and what it printed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DebugInfo {
    pub exec_cmd: String,
    pub stdout: String,
    pub stderr: String,
    pub duration_millis: u64,
    pub counters: Option<WarningCounters>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TestResult {
    pub resources: TestFiles,
    pub status: TestStatus,
    pub debug_info: Option<DebugInfo>,
}

impl TestResult {
    #[must_use]
    pub const fn new(resources: TestFiles, status: TestStatus, debug_info: Option<DebugInfo>) -> Self {
        Self {
            resources,
            status,
            debug_info,
        }
    }
}

/// Lifecycle of one plugin execution inside a suite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PluginEvent {
    /// A suite (config node) is about to run.
    Init { suite: String },
    Start { suite: String, plugin: String },
    End { suite: String, plugin: String },
    /// The plugin could not run at all (e.g. its directory could not be walked).
    Error {
        suite: String,
        plugin: String,
        message: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TestEvent {
    Result {
        suite: String,
        plugin: String,
        result: TestResult,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Plugin(PluginEvent),
    Test(TestEvent),
    /// No more events will follow.
    Finished,
}

/// Consumer of the event stream.
pub trait EventSink {
    /// # Errors
    /// Returns an error if the sink cannot record the event.
    fn handle(&mut self, event: &Event) -> Result<()>;
}

/// Aggregate counters, updated as results arrive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Statistics {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub crashed: usize,
}

impl Statistics {
    pub fn record(&mut self, status: &TestStatus) {
        self.total += 1;
        match status {
            TestStatus::Pass { .. } => self.passed += 1,
            TestStatus::Fail { .. } => self.failed += 1,
            TestStatus::Ignored { .. } => self.skipped += 1,
            TestStatus::Crash { .. } => self.crashed += 1,
        }
    }

    #[must_use]
    pub const fn all_passed(&self) -> bool {
        self.failed == 0 && self.crashed == 0
    }
}

impl EventSink for Statistics {
    fn handle(&mut self, event: &Event) -> Result<()> {
        if let Event::Test(TestEvent::Result { result, .. }) = event {
            self.record(&result.status);
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "result_tests.rs"]
mod tests;
