//! Line diff between an expected file and a fixed file.

use std::fmt::Write;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiffLine {
    Same(String),
    Missing(String),
    Extra(String),
}

/// Longest-common-subsequence diff of `expected` against `actual`.
///
/// Shared leading and trailing lines are matched directly; the rest is split
/// recursively (Hirschberg), so memory stays linear in the input size.
#[must_use]
pub fn line_diff(expected: &[String], actual: &[String]) -> Vec<DiffLine> {
    let prefix = expected
        .iter()
        .zip(actual)
        .take_while(|(e, a)| e == a)
        .count();
    let suffix = expected[prefix..]
        .iter()
        .rev()
        .zip(actual[prefix..].iter().rev())
        .take_while(|(e, a)| e == a)
        .count();

    let mut diff = Vec::with_capacity(expected.len().max(actual.len()));
    diff.extend(expected[..prefix].iter().cloned().map(DiffLine::Same));
    split_diff(
        &expected[prefix..expected.len() - suffix],
        &actual[prefix..actual.len() - suffix],
        &mut diff,
    );
    diff.extend(
        expected[expected.len() - suffix..]
            .iter()
            .cloned()
            .map(DiffLine::Same),
    );
    diff
}

fn split_diff(expected: &[String], actual: &[String], out: &mut Vec<DiffLine>) {
    match (expected, actual) {
        ([], _) => out.extend(actual.iter().cloned().map(DiffLine::Extra)),
        (_, []) => out.extend(expected.iter().cloned().map(DiffLine::Missing)),
        ([line], _) => match actual.iter().position(|a| a == line) {
            Some(at) => {
                out.extend(actual[..at].iter().cloned().map(DiffLine::Extra));
                out.push(DiffLine::Same(line.clone()));
                out.extend(actual[at + 1..].iter().cloned().map(DiffLine::Extra));
            }
            None => {
                out.push(DiffLine::Missing(line.clone()));
                out.extend(actual.iter().cloned().map(DiffLine::Extra));
            }
        },
        _ => {
            let mid = expected.len() / 2;
            let head = lcs_prefix_lengths(&expected[..mid], actual);
            let tail = lcs_suffix_lengths(&expected[mid..], actual);
            let mut cut = 0;
            let mut best = 0;
            for (j, (h, t)) in head.iter().zip(&tail).enumerate() {
                if h + t > best {
                    best = h + t;
                    cut = j;
                }
            }
            split_diff(&expected[..mid], &actual[..cut], out);
            split_diff(&expected[mid..], &actual[cut..], out);
        }
    }
}

/// `lengths[j]` is the LCS length of `a` and `b[..j]`.
fn lcs_prefix_lengths(a: &[String], b: &[String]) -> Vec<usize> {
    let mut prev = vec![0; b.len() + 1];
    let mut cur = vec![0; b.len() + 1];
    for x in a {
        for (j, y) in b.iter().enumerate() {
            cur[j + 1] = if x == y {
                prev[j] + 1
            } else {
                cur[j].max(prev[j + 1])
            };
        }
        std::mem::swap(&mut prev, &mut cur);
    }
    prev
}

/// `lengths[j]` is the LCS length of `a` and `b[j..]`.
fn lcs_suffix_lengths(a: &[String], b: &[String]) -> Vec<usize> {
    let mut prev = vec![0; b.len() + 1];
    let mut cur = vec![0; b.len() + 1];
    for x in a.iter().rev() {
        for j in (0..b.len()).rev() {
            cur[j] = if *x == b[j] {
                prev[j + 1] + 1
            } else {
                cur[j + 1].max(prev[j])
            };
        }
        std::mem::swap(&mut prev, &mut cur);
    }
    prev
}

/// Number of lines that are not shared by both sides.
#[must_use]
pub fn delta_count(diff: &[DiffLine]) -> usize {
    diff.iter()
        .filter(|line| !matches!(line, DiffLine::Same(_)))
        .count()
}

/// Render only the changed lines, `-` for expected and `+` for actual,
/// each prefixed with its 1-based line number on its own side.
#[must_use]
pub fn render(diff: &[DiffLine]) -> String {
    let mut out = String::new();
    let (mut expected_line, mut actual_line) = (0usize, 0usize);
    for line in diff {
        match line {
            DiffLine::Same(_) => {
                expected_line += 1;
                actual_line += 1;
            }
            DiffLine::Missing(text) => {
                expected_line += 1;
                let _ = writeln!(out, "-{expected_line}: {text}");
            }
            DiffLine::Extra(text) => {
                actual_line += 1;
                let _ = writeln!(out, "+{actual_line}: {text}");
            }
        }
    }
    out.trim_end().to_string()
}

#[cfg(test)]
#[path = "diff_tests.rs"]
mod tests;
