//! Turning a config node's directory into execution units.

use std::path::{Path, PathBuf};

use regex::Regex;
use serde::Serialize;
use walkdir::WalkDir;

use crate::config::{FixConfig, PluginConfig};
use crate::error::{Result, SaveError};

/// One execution unit: the files a single check is about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all_fields = "camelCase")]
pub enum TestFiles {
    Test {
        test: PathBuf,
    },
    TestAndExpected {
        test: PathBuf,
        expected: PathBuf,
    },
    TestAndResources {
        test: PathBuf,
        resources: Vec<PathBuf>,
    },
}

impl TestFiles {
    #[must_use]
    pub fn test(&self) -> &Path {
        match self {
            Self::Test { test }
            | Self::TestAndExpected { test, .. }
            | Self::TestAndResources { test, .. } => test,
        }
    }

    /// `(expected, test)` for paired units.
    #[must_use]
    pub fn pair(&self) -> Option<(&Path, &Path)> {
        match self {
            Self::TestAndExpected { test, expected } => Some((expected, test)),
            _ => None,
        }
    }

    #[must_use]
    pub fn resources(&self) -> &[PathBuf] {
        match self {
            Self::TestAndResources { resources, .. } => resources,
            _ => &[],
        }
    }

    /// File name of the test file, as passed to the tool.
    #[must_use]
    pub fn file_name(&self) -> String {
        self.test()
            .file_name()
            .map_or_else(String::new, |n| n.to_string_lossy().into_owned())
    }
}

/// How files of a directory become units.
#[derive(Debug, Clone)]
pub enum DiscoveryRule {
    Warn {
        test_name: Regex,
        resources: Option<Regex>,
    },
    Fix {
        test_suffix: String,
        expected_suffix: String,
    },
}

impl DiscoveryRule {
    #[must_use]
    pub fn for_plugin(plugin: &PluginConfig) -> Self {
        match plugin {
            PluginConfig::Warn(warn) => Self::Warn {
                test_name: warn.test_name_regex.clone(),
                resources: warn.resource_pattern.clone(),
            },
            PluginConfig::Fix(fix) => Self::fix(fix),
            PluginConfig::FixAndWarn(both) => Self::fix(&both.fix),
        }
    }

    fn fix(fix: &FixConfig) -> Self {
        Self::Fix {
            test_suffix: fix.resource_name_test_suffix.clone(),
            expected_suffix: fix.resource_name_expected_suffix.clone(),
        }
    }

    fn unit_for(&self, path: &Path) -> Option<TestFiles> {
        let name = path.file_name()?.to_str()?;
        match self {
            Self::Warn {
                test_name,
                resources,
            } => {
                if !test_name.is_match(name) {
                    return None;
                }
                let resources = resources
                    .as_ref()
                    .map(|pattern| sibling_resources(path, pattern))
                    .unwrap_or_default();
                Some(if resources.is_empty() {
                    TestFiles::Test {
                        test: path.to_path_buf(),
                    }
                } else {
                    TestFiles::TestAndResources {
                        test: path.to_path_buf(),
                        resources,
                    }
                })
            }
            Self::Fix {
                test_suffix,
                expected_suffix,
            } => {
                let expected_name = paired_name(name, test_suffix, expected_suffix)?;
                let expected = path.with_file_name(expected_name);
                expected.is_file().then(|| TestFiles::TestAndExpected {
                    test: path.to_path_buf(),
                    expected,
                })
            }
        }
    }
}

/// Swap `from` for `to` in `<Name><from>.<ext>`. The name is split at the
/// last occurrence of `from` and the extension must follow it directly.
#[must_use]
pub fn paired_name(file_name: &str, from: &str, to: &str) -> Option<String> {
    let (stem, extension) = match file_name.rsplit_once('.') {
        Some((stem, extension)) if !stem.is_empty() => (stem, Some(extension)),
        _ => (file_name, None),
    };
    let name = stem.strip_suffix(from)?;
    if name.is_empty() {
        return None;
    }
    Some(match extension {
        Some(extension) => format!("{name}{to}.{extension}"),
        None => format!("{name}{to}"),
    })
}

fn sibling_resources(test: &Path, pattern: &Regex) -> Vec<PathBuf> {
    let Some(dir) = test.parent() else {
        return Vec::new();
    };
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut resources: Vec<PathBuf> = entries
        .filter_map(std::result::Result::ok)
        .filter(|e| e.file_type().is_ok_and(|t| t.is_file()))
        .map(|e| e.path())
        .filter(|p| p != test)
        .filter(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| pattern.is_match(n))
        })
        .collect();
    resources.sort();
    resources
}

/// Lazy walk over one node's directory yielding units in file-name order.
///
/// Directories that cannot be read are yielded as errors and the walk carries on.
pub struct TestDiscovery {
    entries: Box<dyn Iterator<Item = walkdir::Result<PathBuf>>>,
    root: PathBuf,
    rule: DiscoveryRule,
}

impl std::fmt::Debug for TestDiscovery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TestDiscovery")
            .field("root", &self.root)
            .field("rule", &self.rule)
            .finish_non_exhaustive()
    }
}

impl Iterator for TestDiscovery {
    type Item = Result<TestFiles>;

    fn next(&mut self) -> Option<Result<TestFiles>> {
        for entry in self.entries.by_ref() {
            match entry {
                Ok(path) => {
                    if let Some(unit) = self.rule.unit_for(&path) {
                        return Some(Ok(unit));
                    }
                }
                Err(source) => {
                    return Some(Err(SaveError::Walk {
                        path: source.path().unwrap_or(&self.root).to_path_buf(),
                        source,
                    }));
                }
            }
        }
        None
    }
}

/// Walk `node_dir` for units of `plugin`. Subdirectories holding their own
/// `marker` belong to child nodes and are skipped, as is the marker itself.
#[must_use]
pub fn discover(node_dir: &Path, plugin: &PluginConfig, marker: &str) -> TestDiscovery {
    discover_with(node_dir, DiscoveryRule::for_plugin(plugin), marker)
}

#[must_use]
pub fn discover_with(node_dir: &Path, rule: DiscoveryRule, marker: &str) -> TestDiscovery {
    let prune_marker = marker.to_string();
    let skip_marker = marker.to_string();
    let entries = WalkDir::new(node_dir)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(move |e| {
            e.depth() == 0 || !e.file_type().is_dir() || !e.path().join(&prune_marker).is_file()
        })
        .filter(move |entry| match entry {
            Ok(e) => e.file_type().is_file() && e.file_name().to_str() != Some(skip_marker.as_str()),
            Err(_) => true,
        })
        .map(|entry| entry.map(walkdir::DirEntry::into_path));

    TestDiscovery {
        entries: Box::new(entries),
        root: node_dir.to_path_buf(),
        rule,
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
