use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::config::FixConfig;
use crate::discovery::TestFiles;
use crate::error::{Result, SaveError};
use crate::result::TestStatus;

use super::diff::{delta_count, line_diff, render};
use super::{file_name, read_lines};

/// Private copies of a batch's test files. The tool only ever touches these.
pub(super) struct Workspace {
    _dir: TempDir,
    copies: Vec<PathBuf>,
}

impl Workspace {
    /// Copy each test file, under its own name, into a fresh temp directory.
    pub(super) fn copy(batch: &[TestFiles]) -> Result<Self> {
        let dir = TempDir::new()?;
        let mut copies = Vec::with_capacity(batch.len());
        for (index, unit) in batch.iter().enumerate() {
            let slot = dir.path().join(index.to_string());
            std::fs::create_dir(&slot)?;
            let copy = slot.join(unit.file_name());
            std::fs::copy(unit.test(), &copy).map_err(|source| SaveError::FileRead {
                path: unit.test().to_path_buf(),
                source,
            })?;
            copies.push(copy);
        }
        Ok(Self { _dir: dir, copies })
    }

    pub(super) fn copies(&self) -> &[PathBuf] {
        &self.copies
    }
}

/// Diff each fixed copy against its expected file.
pub(super) fn check(
    cfg: &FixConfig,
    batch: &[TestFiles],
    workspace: &Workspace,
) -> Result<Vec<TestStatus>> {
    batch
        .iter()
        .zip(workspace.copies())
        .map(|(unit, copy)| {
            let (expected, _) = unit.pair().ok_or_else(|| {
                SaveError::Config(format!(
                    "{} has no expected file to compare against",
                    unit.test().display()
                ))
            })?;
            let fixed = destination(copy, cfg.destination_file_suffix.as_deref());
            let actual = filtered(read_lines(&fixed)?, cfg);
            let expected_lines = filtered(read_lines(expected)?, cfg);

            let diff = line_diff(&expected_lines, &actual);
            let deltas = delta_count(&diff);
            Ok(if deltas == 0 {
                TestStatus::Pass { message: None }
            } else {
                TestStatus::Fail {
                    reason: render(&diff),
                    short_reason: format!(
                        "{deltas} line(s) differ from {}",
                        file_name(expected)
                    ),
                }
            })
        })
        .collect()
}

/// Where the tool leaves its result: the copy itself, or
/// `<stem><suffix>.<ext>` next to it.
fn destination(copy: &Path, suffix: Option<&str>) -> PathBuf {
    let Some(suffix) = suffix else {
        return copy.to_path_buf();
    };
    let stem = copy
        .file_stem()
        .map_or_else(String::new, |s| s.to_string_lossy().into_owned());
    let name = match copy.extension() {
        Some(ext) => format!("{stem}{suffix}.{}", ext.to_string_lossy()),
        None => format!("{stem}{suffix}"),
    };
    copy.with_file_name(name)
}

fn filtered(lines: Vec<String>, cfg: &FixConfig) -> Vec<String> {
    if cfg.ignore_lines.is_empty() {
        return lines;
    }
    lines
        .into_iter()
        .filter(|line| !cfg.ignore_lines.iter().any(|re| re.is_match(line)))
        .collect()
}
