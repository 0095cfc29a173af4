use std::path::Path;

use regex::{Captures, Regex};

use crate::error::{Result, SaveError};

use super::Warning;

const LINE_REFERENCE: &str = "$line";

/// Collect the warnings annotated in a fixture.
///
/// `pattern` must expose a `message` group and may expose `line` and `column`.
/// A `line` of `$line`, `$line+N` or `$line-N` is relative to the annotation's
/// own (1-based) line; an empty group means "no line".
///
/// # Errors
/// Returns an error if a relative line reference points before the first line
/// or a number does not fit.
pub fn extract_expected(content: &str, file_name: &str, pattern: &Regex) -> Result<Vec<Warning>> {
    let mut warnings = Vec::new();
    for (index, text) in content.lines().enumerate() {
        let Some(caps) = pattern.captures(text) else {
            continue;
        };
        let own_line = u32::try_from(index + 1).map_err(|_| {
            SaveError::Config(format!("{file_name}: annotation line {} out of range", index + 1))
        })?;
        let line = match caps.name("line").map(|m| m.as_str().trim()) {
            None | Some("") => None,
            Some(raw) => Some(resolve_line(raw, own_line, file_name)?),
        };
        let column = parse_number(caps.name("column").map(|m| m.as_str()));
        warnings.push(Warning::new(message_of(&caps), line, column, file_name));
    }
    Ok(warnings)
}

/// Collect the warnings a tool printed.
///
/// Lines matching any of `ignore` are skipped. When the pattern has a `file`
/// group its file name component is used, otherwise `default_file`.
#[must_use]
pub fn extract_actual(
    lines: &[String],
    default_file: &str,
    pattern: &Regex,
    ignore: &[Regex],
) -> Vec<Warning> {
    lines
        .iter()
        .filter(|line| !ignore.iter().any(|re| re.is_match(line)))
        .filter_map(|line| pattern.captures(line))
        .map(|caps| {
            let file_name = caps
                .name("file")
                .map(|m| m.as_str().trim())
                .filter(|f| !f.is_empty())
                .map_or_else(|| default_file.to_string(), file_name_of);
            Warning::new(
                message_of(&caps),
                parse_number(caps.name("line").map(|m| m.as_str())),
                parse_number(caps.name("column").map(|m| m.as_str())),
                file_name,
            )
        })
        .collect()
}

fn message_of(caps: &Captures<'_>) -> String {
    caps.name("message")
        .or_else(|| caps.get(0))
        .map_or_else(String::new, |m| m.as_str().trim_end().to_string())
}

fn parse_number(raw: Option<&str>) -> Option<u32> {
    raw.and_then(|s| s.trim().parse().ok())
}

fn file_name_of(path: &str) -> String {
    Path::new(path)
        .file_name()
        .map_or_else(|| path.to_string(), |name| name.to_string_lossy().into_owned())
}

fn resolve_line(raw: &str, own_line: u32, file_name: &str) -> Result<u32> {
    let invalid = || SaveError::Config(format!("{file_name}:{own_line}: invalid line reference '{raw}'"));

    let Some(offset) = raw.strip_prefix(LINE_REFERENCE) else {
        return raw.parse().map_err(|_| invalid());
    };
    let offset = offset.trim();
    if offset.is_empty() {
        return Ok(own_line);
    }
    let (sign, amount) = offset.split_at(1);
    let amount: u32 = amount.trim().parse().map_err(|_| invalid())?;
    match sign {
        "+" => own_line.checked_add(amount).ok_or_else(invalid),
        "-" => own_line
            .checked_sub(amount)
            .filter(|line| *line > 0)
            .ok_or_else(invalid),
        _ => Err(invalid()),
    }
}

#[cfg(test)]
#[path = "extract_tests.rs"]
mod tests;
