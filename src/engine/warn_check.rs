use crate::config::{ActualWarningsFormat, WarnConfig};
use crate::discovery::TestFiles;
use crate::error::Result;
use crate::process::ExecutionResult;
use crate::warning::{Warning, compare, extract_actual, extract_expected, warnings_from_sarif};

use super::{UnitOutcome, file_name, read_to_string};

/// Compare the warnings annotated in each unit with what the tool reported.
///
/// Reported warnings are attributed to units by file name. Output without a
/// file name belongs to the first unit of the batch.
pub(super) fn check(
    cfg: &WarnConfig,
    batch: &[TestFiles],
    contents: &[String],
    execution: &ExecutionResult,
) -> Result<Vec<UnitOutcome>> {
    let default_file = batch.first().map(TestFiles::file_name).unwrap_or_default();
    let actual = actual_warnings(cfg, execution, &default_file)?;

    batch
        .iter()
        .zip(contents)
        .map(|(unit, content)| {
            let name = unit.file_name();
            let expected: Vec<Warning> =
                extract_expected(content, &name, &cfg.expected_warnings_pattern)?
                    .into_iter()
                    .map(|w| trim_position(cfg, w))
                    .collect();
            let own: Vec<Warning> = actual
                .iter()
                .filter(|w| w.file_name == name)
                .cloned()
                .map(|w| trim_position(cfg, w))
                .collect();

            let comparison = compare(&expected, &own, &cfg.match_options)?;
            Ok((comparison.status(), Some(comparison.counters())))
        })
        .collect()
}

fn actual_warnings(
    cfg: &WarnConfig,
    execution: &ExecutionResult,
    default_file: &str,
) -> Result<Vec<Warning>> {
    match (cfg.actual_warnings_format, &cfg.sarif_file) {
        (ActualWarningsFormat::Sarif, Some(path)) => {
            let document = serde_json::from_str(&read_to_string(path)?)?;
            Ok(warnings_from_sarif(&document, default_file)?
                .into_iter()
                .filter(|w| !cfg.ignore_lines.iter().any(|re| re.is_match(&w.message)))
                .map(|w| {
                    // SARIF URIs may carry directories.
                    let file = file_name(std::path::Path::new(&w.file_name));
                    Warning { file_name: file, ..w }
                })
                .collect())
        }
        _ => Ok(extract_actual(
            &execution.stdout,
            default_file,
            &cfg.actual_warnings_pattern,
            &cfg.ignore_lines,
        )),
    }
}

fn trim_position(cfg: &WarnConfig, warning: Warning) -> Warning {
    warning.with_position_parts(cfg.warning_text_has_line, cfg.warning_text_has_column)
}
