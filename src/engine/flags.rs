//! Per-file extra flags (`// RUN:` directives) and command template placeholders.

use std::fmt;

use regex::Regex;

const ARGS1_KEY: &str = "args1=";
const ARGS2_KEY: &str = "args2=";
const CONTINUATION: char = '\\';

/// Flags placed before (`args1`) and after (`args2`) the file name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtraFlags {
    pub args1: String,
    pub args2: String,
}

impl ExtraFlags {
    #[must_use]
    pub fn new(args1: impl Into<String>, args2: impl Into<String>) -> Self {
        Self {
            args1: args1.into(),
            args2: args2.into(),
        }
    }

    /// Parse `args1=X,args2=Y`; either part may be absent and `=` inside a
    /// value is written `\=`. Returns `None` for anything else.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        if text.is_empty() {
            return Some(Self::default());
        }
        if let Some(rest) = text.strip_prefix(ARGS1_KEY) {
            return Some(match rest.find(&format!(",{ARGS2_KEY}")) {
                Some(split) => Self::new(
                    unescape(&rest[..split]),
                    unescape(&rest[split + 1 + ARGS2_KEY.len()..]),
                ),
                None => Self::new(unescape(rest), ""),
            });
        }
        text.strip_prefix(ARGS2_KEY)
            .map(|rest| Self::new("", unescape(rest)))
    }

    /// Flags declared in `content` by the first line matching `pattern`.
    ///
    /// A directive ending in `\` continues on the next line, whose leading
    /// whitespace and `//` are stripped. Missing or malformed directives
    /// yield empty flags.
    #[must_use]
    pub fn from_content(content: &str, pattern: &Regex) -> Self {
        let mut lines = content.lines();
        let directive = lines.by_ref().find_map(|line| {
            pattern
                .captures(line)
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str().trim_end().to_string())
        });
        let Some(mut text) = directive else {
            return Self::default();
        };

        while text.ends_with(CONTINUATION) {
            text.pop();
            let Some(next) = lines.next() else {
                break;
            };
            let next = next.trim_start();
            let next = next.strip_prefix("//").unwrap_or(next).trim_start();
            text.push_str(next.trim_end());
        }

        Self::parse(text.trim()).unwrap_or_default()
    }
}

impl fmt::Display for ExtraFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::with_capacity(2);
        if !self.args1.is_empty() {
            parts.push(format!("{ARGS1_KEY}{}", escape(&self.args1)));
        }
        if !self.args2.is_empty() {
            parts.push(format!("{ARGS2_KEY}{}", escape(&self.args2)));
        }
        f.write_str(&parts.join(","))
    }
}

fn escape(value: &str) -> String {
    value.replace('=', "\\=")
}

fn unescape(value: &str) -> String {
    value.replace("\\=", "=")
}

/// Values substituted into a command template.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Placeholders {
    pub flags: ExtraFlags,
    pub file_name: String,
    pub resources: String,
}

impl Placeholders {
    /// Replace `$args1`, `$fileName`, `$args2` and `$resources` in `template`.
    ///
    /// An empty value removes its placeholder together with one adjacent
    /// space, so no doubled or dangling separators are left behind.
    #[must_use]
    pub fn apply(&self, template: &str) -> String {
        let values = [
            ("$args1", self.flags.args1.as_str()),
            ("$args2", self.flags.args2.as_str()),
            ("$fileName", self.file_name.as_str()),
            ("$resources", self.resources.as_str()),
        ];

        let mut out = String::with_capacity(template.len());
        let mut rest = template;
        let mut skip_space = false;
        while let Some(ch) = rest.chars().next() {
            if skip_space {
                skip_space = false;
                if ch == ' ' {
                    rest = &rest[1..];
                    continue;
                }
            }
            let hit = values
                .iter()
                .find(|(name, _)| rest.starts_with(name));
            match hit {
                Some((name, value)) => {
                    if value.is_empty() {
                        if out.ends_with(' ') {
                            out.pop();
                        } else {
                            skip_space = true;
                        }
                    } else {
                        out.push_str(value);
                    }
                    rest = &rest[name.len()..];
                }
                None => {
                    out.push(ch);
                    rest = &rest[ch.len_utf8()..];
                }
            }
        }
        out.trim().to_string()
    }
}

#[cfg(test)]
#[path = "flags_tests.rs"]
mod tests;
