#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// Creates an `assert_cmd` Command for the save binary.
#[macro_export]
macro_rules! save {
    () => {
        assert_cmd::Command::new(assert_cmd::cargo::cargo_bin!("save"))
    };
}

/// A temporary test root with helpers for writing suites.
pub struct TestFixture {
    pub dir: TempDir,
}

impl TestFixture {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Writes `content` to `relative_path`, creating parent directories.
    pub fn create_file(&self, relative_path: &str, content: &str) -> PathBuf {
        let path = self.dir.path().join(relative_path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directories");
        }
        fs::write(&path, content).expect("Failed to write file");
        path
    }

    /// Writes `save.toml` into `relative_dir` ("" for the root).
    pub fn create_config(&self, relative_dir: &str, content: &str) {
        let relative = if relative_dir.is_empty() {
            "save.toml".to_string()
        } else {
            format!("{relative_dir}/save.toml")
        };
        self.create_file(&relative, content);
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// A warn suite whose analyzer echoes one warning back.
pub const ECHO_WARN_CONFIG: &str = r#"
[general]
exec_cmd = "echo"
suite_name = "smoke"

[warn]
exec_flags = '";warn:1:1: hello"'
"#;

/// A fixture expecting exactly the warning `ECHO_WARN_CONFIG` prints.
pub const ECHO_WARN_TEST: &str = "// ;warn:1:1: hello\nval x = 1\n";

/// A fix suite that "fixes" each test file by copying `source` over it.
pub fn copy_fix_config(source: &Path) -> String {
    format!(
        "[general]\nexec_cmd = \"cp\"\nsuite_name = \"fixes\"\n\n[fix]\nexec_flags = '{} $fileName'\n",
        source.display()
    )
}
