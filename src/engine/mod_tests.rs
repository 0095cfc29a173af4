use std::cell::RefCell;
use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;

use super::*;
use crate::config::{ResolvedConfig, parse_config_file};
use crate::discovery::discover;

struct FakeRunner<F> {
    respond: F,
    commands: RefCell<Vec<String>>,
}

impl<F> FakeRunner<F>
where
    F: Fn(&str) -> Result<ExecutionResult>,
{
    fn new(respond: F) -> Self {
        Self {
            respond,
            commands: RefCell::new(Vec::new()),
        }
    }

    fn commands(&self) -> Vec<String> {
        self.commands.borrow().clone()
    }
}

impl<F> ProcessRunner for FakeRunner<F>
where
    F: Fn(&str) -> Result<ExecutionResult>,
{
    fn exec(
        &self,
        command: &str,
        _stdin: Option<&Path>,
        _timeout: Duration,
    ) -> Result<ExecutionResult> {
        self.commands.borrow_mut().push(command.to_string());
        (self.respond)(command)
    }
}

fn stdout(lines: &[&str]) -> Result<ExecutionResult> {
    Ok(ExecutionResult {
        code: 0,
        stdout: lines.iter().map(|l| (*l).to_string()).collect(),
        stderr: Vec::new(),
    })
}

struct Suite {
    temp: TempDir,
}

impl Suite {
    fn new(config: &str) -> Self {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("save.toml"), config).unwrap();
        Self { temp }
    }

    fn dir(&self) -> &Path {
        self.temp.path()
    }

    fn file(&self, name: &str, content: &str) -> PathBuf {
        let path = self.dir().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    fn resolved(&self) -> ResolvedConfig {
        let location = self.dir().join("save.toml");
        let sections = parse_config_file(&location).unwrap();
        ResolvedConfig::resolve(&location, &sections).unwrap()
    }

    fn run<R: ProcessRunner + ?Sized>(&self, runner: &R) -> Vec<TestResult> {
        let config = self.resolved();
        let plugin = &config.plugins[0];
        let units = discover(&config.dir, plugin, "save.toml").map(Result::unwrap);
        PluginEngine::new(runner, &config.general, plugin, &config.dir)
            .execute(units)
            .collect()
    }
}

#[cfg(unix)]
#[test]
fn echo_warning_matches_annotation() {
    let suite = Suite::new("[general]\nexec_cmd = \"echo\"\n\n[warn]\nexec_flags = '\";warn:1:1: hello\"'\n");
    suite.file("ATest.kt", "// ;warn:1:1: hello\n");

    let results = suite.run(&crate::process::ShellProcessRunner::default());

    assert_eq!(results.len(), 1);
    assert!(results[0].status.is_pass(), "{:?}", results[0].status);
    let debug = results[0].debug_info.as_ref().unwrap();
    assert_eq!(debug.exec_cmd, "echo \";warn:1:1: hello\"");
    assert_eq!(
        debug.counters,
        Some(WarningCounters {
            matched: 1,
            missing: 0,
            unexpected: 0
        })
    );
}

#[test]
fn missing_warning_fails() {
    let suite = Suite::new("[general]\nexec_cmd = \"lint\"\n\n[warn]\nexec_flags = \"$fileName\"\n");
    suite.file("ATest.kt", "// ;warn:2:5: Unused import\nimport x\n");

    let runner = FakeRunner::new(|_: &str| stdout(&[]));
    let results = suite.run(&runner);

    assert_eq!(results.len(), 1);
    match &results[0].status {
        TestStatus::Fail { short_reason, .. } => {
            assert_eq!(short_reason, "Some warnings were expected but not received: 1");
        }
        other => panic!("expected a failure, got {other:?}"),
    }
    let file = suite.dir().join("ATest.kt");
    assert_eq!(runner.commands(), vec![format!("lint {}", file.display())]);
}

#[test]
fn crashes_are_contained_per_unit() {
    let suite = Suite::new("[general]\nexec_cmd = \"lint\"\n\n[warn]\nexec_flags = \"$fileName\"\n");
    suite.file("ATest.kt", "");
    suite.file("BTest.kt", "");

    let runner = FakeRunner::new(|command: &str| {
        if command.contains("ATest") {
            Err(SaveError::ProcessTimeout {
                command: command.to_string(),
                timeout_millis: 10,
            })
        } else {
            stdout(&[])
        }
    });
    let results = suite.run(&runner);

    assert_eq!(results.len(), 2);
    match &results[0].status {
        TestStatus::Crash { error_type, .. } => assert_eq!(error_type, "ProcessTimeoutException"),
        other => panic!("expected a crash, got {other:?}"),
    }
    assert!(results[1].status.is_pass());
}

#[test]
fn excluded_tests_are_ignored_without_running() {
    let suite = Suite::new(
        "[general]\nexec_cmd = \"lint\"\nexcluded_tests = [\"Skip*\"]\n\n[warn]\nexec_flags = \"$fileName\"\n",
    );
    suite.file("ATest.kt", "");
    suite.file("SkipTest.kt", "");

    let runner = FakeRunner::new(|_: &str| stdout(&[]));
    let results = suite.run(&runner);

    assert_eq!(results.len(), 2);
    assert!(results[0].status.is_pass());
    assert!(results[1].status.is_ignored());
    assert!(results[1].debug_info.is_none());
    assert_eq!(runner.commands().len(), 1);
}

#[test]
fn run_directive_flags_reach_the_command() {
    let suite = Suite::new(
        "[general]\nexec_cmd = \"lint\"\nrun_config_pattern = '// RUN: (.*)'\n\n[warn]\nexec_flags = \"$args1 $fileName $args2\"\n",
    );
    suite.file("ATest.kt", "// RUN: args1=--strict\nfun main() {}\n");

    let runner = FakeRunner::new(|_: &str| stdout(&[]));
    suite.run(&runner);

    let file = suite.dir().join("ATest.kt");
    assert_eq!(
        runner.commands(),
        vec![format!("lint --strict {}", file.display())]
    );
}

#[test]
fn batches_split_warnings_by_file() {
    let suite = Suite::new(
        r#"[general]
exec_cmd = "lint"

[warn]
exec_flags = "$fileName"
batch_size = 2
batch_separator = ","
actual_warnings_pattern = '(?P<file>[^:]+):(?P<line>\d+):(?P<column>\d+): (?P<message>.+)$'
"#,
    );
    suite.file("ATest.kt", "// ;warn:1:1: a\n");
    suite.file("BTest.kt", "// ;warn:1:1: b\n");
    suite.file("CTest.kt", "// ;warn:1:1: c\n");

    let runner = FakeRunner::new(|_: &str| stdout(&["ATest.kt:1:1: a", "BTest.kt:1:1: b", "CTest.kt:1:1: c"]));
    let results = suite.run(&runner);

    assert_eq!(results.len(), 3);
    assert!(results.iter().all(|r| r.status.is_pass()), "{results:?}");
    let commands = runner.commands();
    assert_eq!(commands.len(), 2);
    assert_eq!(
        commands[0],
        format!(
            "lint {},{}",
            suite.dir().join("ATest.kt").display(),
            suite.dir().join("BTest.kt").display()
        )
    );
}

#[test]
fn non_exact_match_reports_unexpected_in_pass() {
    let suite = Suite::new(
        "[general]\nexec_cmd = \"lint\"\n\n[warn]\nexec_flags = \"$fileName\"\nexact_warnings_match = false\n",
    );
    suite.file("ATest.kt", "// ;warn:1:1: Value {{.*}} is unused\n");

    let runner = FakeRunner::new(|_: &str| stdout(&["1:1: Value x is unused", "3:1: extra"]));
    let results = suite.run(&runner);

    match &results[0].status {
        TestStatus::Pass { message } => {
            assert!(message.as_deref().unwrap_or_default().contains("(UNEXPECTED WARNINGS)"));
        }
        other => panic!("expected a pass, got {other:?}"),
    }
}

#[cfg(unix)]
fn fix_suite(fixed_content: &str) -> (Suite, TempDir) {
    let source = TempDir::new().unwrap();
    let fixed = source.path().join("fixed.kt");
    fs::write(&fixed, fixed_content).unwrap();

    let suite = Suite::new(&format!(
        "[general]\nexec_cmd = \"cp\"\n\n[fix]\nexec_flags = '{} $fileName'\n",
        fixed.display()
    ));
    suite.file("FooTest.kt", "val x=1\nval y=2\n");
    suite.file("FooExpected.kt", "val x = 1\nval y = 2\n");
    (suite, source)
}

#[cfg(unix)]
#[test]
fn fix_identical_output_passes() {
    let (suite, _source) = fix_suite("val x = 1\nval y = 2\n");
    let results = suite.run(&crate::process::ShellProcessRunner::default());

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].status, TestStatus::Pass { message: None });
    // The fixture itself is never modified.
    assert_eq!(
        fs::read_to_string(suite.dir().join("FooTest.kt")).unwrap(),
        "val x=1\nval y=2\n"
    );
}

#[cfg(unix)]
#[test]
fn fix_single_differing_line_fails() {
    let (suite, _source) = fix_suite("val x = 1\nval y=2\n");
    let results = suite.run(&crate::process::ShellProcessRunner::default());

    match &results[0].status {
        TestStatus::Fail {
            reason,
            short_reason,
        } => {
            assert_eq!(reason, "-2: val y = 2\n+2: val y=2");
            assert_eq!(short_reason, "2 line(s) differ from FooExpected.kt");
        }
        other => panic!("expected a failure, got {other:?}"),
    }
}

#[cfg(unix)]
#[test]
fn fix_reads_destination_file() {
    let source = TempDir::new().unwrap();
    let fixed = source.path().join("fixed.kt");
    fs::write(&fixed, "ok\n").unwrap();
    let suite = Suite::new(&format!(
        "[general]\nexec_cmd = \"sh\"\n\n[fix]\nexec_flags = '''-c 'cp {} \"$(dirname \"$0\")/FooTest_fixed.kt\"' $fileName'''\ndestination_file_suffix = \"_fixed\"\n",
        fixed.display()
    ));
    suite.file("FooTest.kt", "broken\n");
    suite.file("FooExpected.kt", "ok\n");

    let results = suite.run(&crate::process::ShellProcessRunner::default());
    assert!(results[0].status.is_pass(), "{:?}", results[0].status);
}

#[cfg(unix)]
#[test]
fn missing_fix_result_crashes() {
    let suite = Suite::new(
        "[general]\nexec_cmd = \"true\"\n\n[fix]\ndestination_file_suffix = \"_fixed\"\n",
    );
    suite.file("FooTest.kt", "broken\n");
    suite.file("FooExpected.kt", "ok\n");

    let results = suite.run(&crate::process::ShellProcessRunner::default());
    match &results[0].status {
        TestStatus::Crash { error_type, .. } => assert_eq!(error_type, "IOError"),
        other => panic!("expected a crash, got {other:?}"),
    }
}

#[cfg(unix)]
#[test]
fn fix_and_warn_combines_both_checks() {
    let source = TempDir::new().unwrap();
    let fixed = source.path().join("fixed.kt");
    fs::write(&fixed, "// ;warn:1:1: hello\nval x = 1\n").unwrap();
    let suite = Suite::new(&format!(
        "[general]\nexec_cmd = \"cp\"\n\n[\"fix and warn\"]\n[\"fix and warn\".fix]\nexec_flags = '{} $fileName && echo 1:1: hello'\n",
        fixed.display()
    ));
    suite.file("FooTest.kt", "// ;warn:1:1: hello\nval x=1\n");
    suite.file("FooExpected.kt", "// ;warn:1:1: hello\nval x = 1\n");

    let results = suite.run(&crate::process::ShellProcessRunner::default());
    assert_eq!(results.len(), 1);
    assert!(results[0].status.is_pass(), "{:?}", results[0].status);
    assert_eq!(
        results[0].debug_info.as_ref().unwrap().counters.unwrap().matched,
        1
    );
}
