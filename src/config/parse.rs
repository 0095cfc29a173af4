//! Decoding of a single `save.toml` into its declared sections.
//!
//! Decoding happens in two passes: the document is first read as a generic
//! table so that unknown top-level sections can be reported by name, then it
//! is decoded into [`ConfigFile`] so that field errors keep their spans.

use std::path::Path;

use crate::error::{Result, SaveError};

use super::model::{ConfigFile, PluginSection, SectionKind};

/// Read and decode the config file at `path`.
///
/// # Errors
/// Returns an error if the file cannot be read, is not valid TOML, declares an
/// unknown section or contains unknown or mistyped fields.
pub fn parse_config_file(path: &Path) -> Result<Vec<PluginSection>> {
    let content = std::fs::read_to_string(path).map_err(|source| SaveError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    parse_config_str(path, &content)
}

/// Decode config `content`; `path` is only used for diagnostics.
///
/// # Errors
/// See [`parse_config_file`].
pub fn parse_config_str(path: &Path, content: &str) -> Result<Vec<PluginSection>> {
    let table: toml::Table =
        toml::from_str(content).map_err(|e| parse_error(path, content, &e))?;

    for (name, value) in &table {
        if SectionKind::from_table_name(name).is_none() || !value.is_table() {
            return Err(SaveError::Plugin {
                path: path.to_path_buf(),
                section: name.clone(),
            });
        }
    }

    let file: ConfigFile = toml::from_str(content).map_err(|e| parse_error(path, content, &e))?;
    Ok(file.into_sections())
}

fn parse_error(path: &Path, content: &str, error: &toml::de::Error) -> SaveError {
    let line = error
        .span()
        .map_or(1, |span| line_of_offset(content, span.start));
    SaveError::ConfigParse {
        path: path.to_path_buf(),
        line,
        message: error.message().trim().to_string(),
    }
}

/// 1-based line number of a byte offset.
fn line_of_offset(content: &str, offset: usize) -> usize {
    let end = offset.min(content.len());
    content.as_bytes()[..end].iter().filter(|b| **b == b'\n').count() + 1
}

#[cfg(test)]
#[path = "parse_tests.rs"]
mod tests;
