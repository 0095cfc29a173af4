use std::fmt::Write;

use regex::Regex;

use crate::error::{Result, SaveError};
use crate::result::{TestStatus, WarningCounters};

use super::Warning;

/// Markers that embed a raw regex inside an expected warning message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delimiters {
    open: String,
    close: String,
}

impl Default for Delimiters {
    fn default() -> Self {
        Self {
            open: "{{".to_string(),
            close: "}}".to_string(),
        }
    }
}

impl Delimiters {
    /// # Errors
    /// Returns an error if either delimiter is empty or both are identical.
    pub fn new(open: impl Into<String>, close: impl Into<String>) -> Result<Self> {
        let open = open.into();
        let close = close.into();
        if open.is_empty() || close.is_empty() {
            return Err(SaveError::InvalidDelimiters(
                "delimiters must not be empty".to_string(),
            ));
        }
        if open == close {
            return Err(SaveError::InvalidDelimiters(format!(
                "opening and closing delimiters must differ, got '{open}' twice"
            )));
        }
        Ok(Self { open, close })
    }

    /// Build from a `[open, close]` config list.
    ///
    /// # Errors
    /// Returns an error unless the list holds exactly two valid delimiters.
    pub fn from_list(list: &[String]) -> Result<Self> {
        match list {
            [open, close] => Self::new(open.as_str(), close.as_str()),
            _ => Err(SaveError::InvalidDelimiters(format!(
                "expected exactly two delimiters, got {}",
                list.len()
            ))),
        }
    }

    #[must_use]
    pub fn open(&self) -> &str {
        &self.open
    }

    #[must_use]
    pub fn close(&self) -> &str {
        &self.close
    }

    /// Compile `message` into an anchored regex: delimited spans are raw regex,
    /// everything else is literal. Returns `None` when the message has no span.
    ///
    /// # Errors
    /// Returns an error on an unbalanced span or an invalid embedded regex.
    pub fn compile(&self, message: &str) -> Result<Option<Regex>> {
        if !message.contains(&self.open) {
            if message.contains(&self.close) {
                return Err(self.unbalanced(message));
            }
            return Ok(None);
        }

        let mut source = String::from("^");
        let mut rest = message;
        while let Some(start) = rest.find(&self.open) {
            let literal = &rest[..start];
            if literal.contains(&self.close) {
                return Err(self.unbalanced(message));
            }
            source.push_str(&regex::escape(literal));
            let after_open = &rest[start + self.open.len()..];
            let Some(end) = after_open.find(&self.close) else {
                return Err(self.unbalanced(message));
            };
            let _ = write!(source, "(?:{})", &after_open[..end]);
            rest = &after_open[end + self.close.len()..];
        }
        if rest.contains(&self.close) {
            return Err(self.unbalanced(message));
        }
        source.push_str(&regex::escape(rest));
        source.push('$');

        Regex::new(&source)
            .map(Some)
            .map_err(|source_err| SaveError::InvalidPattern {
                pattern: message.to_string(),
                source: source_err,
            })
    }

    fn unbalanced(&self, message: &str) -> SaveError {
        SaveError::InvalidDelimiters(format!(
            "unbalanced '{}'/'{}' in warning '{message}'",
            self.open, self.close
        ))
    }
}

/// How expected and actual messages are compared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchOptions {
    /// Require identical messages and fail on unexpected warnings.
    pub exact: bool,
    /// In non-exact mode, accept an actual message that contains the expected one.
    pub partial: bool,
    /// In non-exact mode, markers of embedded regex spans.
    pub delimiters: Option<Delimiters>,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            exact: true,
            partial: false,
            delimiters: Some(Delimiters::default()),
        }
    }
}

enum MessageMatcher {
    Equal,
    Contains,
    Pattern(Regex),
}

impl MessageMatcher {
    fn for_warning(expected: &Warning, options: &MatchOptions) -> Result<Self> {
        if options.exact {
            return Ok(Self::Equal);
        }
        if let Some(delimiters) = &options.delimiters
            && let Some(regex) = delimiters.compile(&expected.message)?
        {
            return Ok(Self::Pattern(regex));
        }
        Ok(if options.partial {
            Self::Contains
        } else {
            Self::Equal
        })
    }

    fn matches(&self, expected: &str, actual: &str) -> bool {
        match self {
            Self::Equal => expected == actual,
            Self::Contains => actual.contains(expected),
            Self::Pattern(regex) => regex.is_match(actual),
        }
    }
}

/// Outcome of pairing expected warnings with actual ones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comparison {
    pub matched: Vec<Warning>,
    pub missing: Vec<Warning>,
    pub unexpected: Vec<Warning>,
    exact: bool,
}

/// Pair every expected warning with at most one actual warning sharing its
/// `(line, column, file)` key and a matching message.
///
/// # Errors
/// Returns an error if an expected message embeds an unbalanced or invalid pattern.
pub fn compare(
    expected: &[Warning],
    actual: &[Warning],
    options: &MatchOptions,
) -> Result<Comparison> {
    let mut used = vec![false; actual.len()];
    let mut matched = Vec::new();
    let mut missing = Vec::new();

    for warning in expected {
        let matcher = MessageMatcher::for_warning(warning, options)?;
        let found = actual.iter().enumerate().position(|(index, candidate)| {
            !used[index]
                && candidate.key() == warning.key()
                && matcher.matches(&warning.message, &candidate.message)
        });
        match found {
            Some(index) => {
                used[index] = true;
                matched.push(warning.clone());
            }
            None => missing.push(warning.clone()),
        }
    }

    let unexpected = actual
        .iter()
        .zip(&used)
        .filter(|(_, used)| !**used)
        .map(|(warning, _)| warning.clone())
        .collect();

    Ok(Comparison {
        matched,
        missing,
        unexpected,
        exact: options.exact,
    })
}

impl Comparison {
    #[must_use]
    pub fn counters(&self) -> WarningCounters {
        WarningCounters {
            matched: self.matched.len(),
            missing: self.missing.len(),
            unexpected: self.unexpected.len(),
        }
    }

    #[must_use]
    pub fn status(&self) -> TestStatus {
        let matched = self.matched.len();
        if !self.missing.is_empty() {
            let mut reason = format!(
                "(MISSING WARNINGS): {} (MATCHED WARNINGS): {matched}",
                render_list(&self.missing)
            );
            if !self.unexpected.is_empty() {
                let _ = write!(
                    reason,
                    " (UNEXPECTED WARNINGS): {}",
                    render_list(&self.unexpected)
                );
            }
            return TestStatus::Fail {
                reason,
                short_reason: format!(
                    "Some warnings were expected but not received: {}",
                    self.missing.len()
                ),
            };
        }

        if self.unexpected.is_empty() {
            return TestStatus::Pass { message: None };
        }

        let unexpected = render_list(&self.unexpected);
        if self.exact {
            TestStatus::Fail {
                reason: format!(
                    "(UNEXPECTED WARNINGS): {unexpected} (MATCHED WARNINGS): {matched}"
                ),
                short_reason: format!(
                    "Some warnings were unexpected: {}",
                    self.unexpected.len()
                ),
            }
        } else {
            // Non-exact mode tolerates extra diagnostics but still surfaces them.
            TestStatus::Pass {
                message: Some(format!("(UNEXPECTED WARNINGS): {unexpected}")),
            }
        }
    }
}

fn render_list(warnings: &[Warning]) -> String {
    let items: Vec<String> = warnings.iter().map(ToString::to_string).collect();
    format!("[{}]", items.join(", "))
}

#[cfg(test)]
#[path = "comparator_tests.rs"]
mod tests;
