//! TestWorld: an isolated data directory and a configured `aichemy` binary.

use anyhow::Result;
use assert_cmd::Command;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const ISOLATED_VARS: [&str; 4] = [
    "AICHEMY_PATH",
    "AICHEMY_ENDPOINT",
    "AICHEMY_TOKEN",
    "AICHEMY_USER_ID",
];

/// Declarative test environment builder.
///
/// # Example
/// ```no_run
/// use aichemy_testing::TestWorld;
///
/// let world = TestWorld::new();
/// let result = world.run(&["chat", "--mock", "--prompt", "hello"]).unwrap();
/// assert!(result.success());
/// ```
pub struct TestWorld {
    temp_dir: TempDir,
    data_dir: PathBuf,
    env_vars: HashMap<String, String>,
}

impl Default for TestWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl TestWorld {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let data_dir = temp_dir.path().join(".aichemy");
        std::fs::create_dir_all(&data_dir).expect("Failed to create data dir");

        Self {
            temp_dir,
            data_dir,
            env_vars: HashMap::new(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn temp_dir(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env_vars.insert(key.into(), value.into());
        self
    }

    /// Write `config.toml` into the data directory
    pub fn with_config(self, toml: &str) -> Self {
        std::fs::write(self.data_dir.join("config.toml"), toml).expect("Failed to write config");
        self
    }

    /// Add a skill folder under `<data_dir>/skills`
    pub fn with_skill(self, folder: &str, frontmatter: &str, body: &str) -> Self {
        let dir = self.data_dir.join("skills").join(folder);
        std::fs::create_dir_all(&dir).expect("Failed to create skill dir");
        std::fs::write(dir.join("SKILL.md"), format!("---\n{}\n---\n{}", frontmatter, body))
            .expect("Failed to write skill");
        self
    }

    /// Write `<data_dir>/tools.txt`
    pub fn with_tools(self, listing: &str) -> Self {
        std::fs::write(self.data_dir.join("tools.txt"), listing).expect("Failed to write tools");
        self
    }

    /// Point a command at this world's data directory with the given output
    /// format. Ambient `AICHEMY_*` variables are cleared.
    pub fn configure_command<'a>(&self, cmd: &'a mut Command, format: &str) -> &'a mut Command {
        cmd.arg("--data-dir")
            .arg(self.data_dir())
            .arg("--format")
            .arg(format);

        cmd.current_dir(self.temp_dir.path());
        cmd.env("HOME", self.temp_dir.path());
        for key in ISOLATED_VARS {
            cmd.env_remove(key);
        }
        for (key, value) in &self.env_vars {
            cmd.env(key, value);
        }
        cmd
    }

    #[allow(deprecated)]
    fn execute(&self, args: &[&str], format: &str) -> Result<CliResult> {
        let mut cmd = Command::cargo_bin("aichemy")
            .map_err(|e| anyhow::anyhow!("Failed to find aichemy binary: {}", e))?;
        self.configure_command(&mut cmd, format);
        cmd.args(args);

        let output = cmd.output()?;
        Ok(CliResult {
            status: output.status,
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }

    /// Run with plain output
    pub fn run(&self, args: &[&str]) -> Result<CliResult> {
        self.execute(args, "plain")
    }

    /// Run with JSON output
    pub fn run_json(&self, args: &[&str]) -> Result<CliResult> {
        self.execute(args, "json")
    }
}

/// Result of a CLI command execution.
#[derive(Debug)]
pub struct CliResult {
    pub status: std::process::ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

impl CliResult {
    pub fn success(&self) -> bool {
        self.status.success()
    }

    pub fn json(&self) -> Result<serde_json::Value> {
        Ok(serde_json::from_str(&self.stdout)?)
    }

    pub fn stdout(&self) -> &str {
        &self.stdout
    }

    pub fn stderr(&self) -> &str {
        &self.stderr
    }
}
