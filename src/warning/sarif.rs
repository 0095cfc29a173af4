//! Conversion of an already-parsed SARIF 2.1 document into warnings.

use serde_json::Value;

use crate::error::{Result, SaveError};

use super::Warning;

/// Convert every `runs[].results[]` entry into a [`Warning`].
///
/// Only the first location of a result is used. Results without a location
/// are attributed to `default_file`.
///
/// # Errors
/// Returns an error if the document has no `runs` array.
pub fn warnings_from_sarif(document: &Value, default_file: &str) -> Result<Vec<Warning>> {
    let runs = document
        .get("runs")
        .and_then(Value::as_array)
        .ok_or_else(|| SaveError::Config("SARIF document has no 'runs' array".to_string()))?;

    let warnings = runs
        .iter()
        .filter_map(|run| run.get("results").and_then(Value::as_array))
        .flatten()
        .map(|result| convert_result(result, default_file))
        .collect();
    Ok(warnings)
}

fn convert_result(result: &Value, default_file: &str) -> Warning {
    let message = result
        .pointer("/message/text")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .trim_end()
        .to_string();

    let location = result.pointer("/locations/0/physicalLocation");
    let file_name = location
        .and_then(|loc| loc.pointer("/artifactLocation/uri"))
        .and_then(Value::as_str)
        .map_or_else(|| default_file.to_string(), file_name_of_uri);
    let region = location.and_then(|loc| loc.get("region"));

    Warning::new(
        message,
        region.and_then(|r| number(r, "startLine")),
        region.and_then(|r| number(r, "startColumn")),
        file_name,
    )
}

fn number(region: &Value, key: &str) -> Option<u32> {
    region
        .get(key)
        .and_then(Value::as_u64)
        .and_then(|n| u32::try_from(n).ok())
}

fn file_name_of_uri(uri: &str) -> String {
    let path = uri.strip_prefix("file://").unwrap_or(uri);
    path.rsplit(['/', '\\'])
        .next()
        .filter(|name| !name.is_empty())
        .unwrap_or(path)
        .to_string()
}

#[cfg(test)]
#[path = "sarif_tests.rs"]
mod tests;
