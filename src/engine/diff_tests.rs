use super::*;

fn lines(text: &str) -> Vec<String> {
    text.lines().map(String::from).collect()
}

#[test]
fn identical_inputs_have_no_delta() {
    let text = lines("a\nb\nc");
    let diff = line_diff(&text, &text);
    assert_eq!(delta_count(&diff), 0);
    assert_eq!(render(&diff), "");
}

#[test]
fn single_changed_line() {
    let diff = line_diff(&lines("a\nb\nc"), &lines("a\nB\nc"));
    assert_eq!(delta_count(&diff), 2);
    assert_eq!(render(&diff), "-2: b\n+2: B");
}

#[test]
fn insertions_and_deletions() {
    let diff = line_diff(&lines("a\nb\nc"), &lines("b\nc\nd"));
    assert_eq!(
        diff,
        vec![
            DiffLine::Missing("a".to_string()),
            DiffLine::Same("b".to_string()),
            DiffLine::Same("c".to_string()),
            DiffLine::Extra("d".to_string()),
        ]
    );
    assert_eq!(render(&diff), "-1: a\n+3: d");
}

#[test]
fn empty_sides() {
    assert_eq!(delta_count(&line_diff(&[], &lines("x\ny"))), 2);
    assert_eq!(delta_count(&line_diff(&lines("x"), &[])), 1);
    assert!(line_diff(&[], &[]).is_empty());
}

#[test]
fn reordered_lines_keep_longest_common_run() {
    let diff = line_diff(&lines("x\na\nb\nc\ny"), &lines("a\nb\nz\nc"));
    assert_eq!(delta_count(&diff), 3);
    assert_eq!(render(&diff), "-1: x\n+3: z\n-5: y");
}

#[test]
fn large_files_with_one_change() {
    let expected: Vec<String> = (0..20_000).map(|i| format!("line {i}")).collect();
    let mut actual = expected.clone();
    actual[12_345] = "changed".to_string();

    let diff = line_diff(&expected, &actual);

    assert_eq!(diff.len(), 20_001);
    assert_eq!(render(&diff), "-12346: line 12345\n+12346: changed");
}

#[test]
fn large_disjoint_files_stay_bounded() {
    let expected: Vec<String> = (0..3_000).map(|i| format!("old {i}")).collect();
    let actual: Vec<String> = (0..3_000).map(|i| format!("new {i}")).collect();

    let diff = line_diff(&expected, &actual);

    assert_eq!(delta_count(&diff), 6_000);
    assert!(!diff.iter().any(|line| matches!(line, DiffLine::Same(_))));
}
