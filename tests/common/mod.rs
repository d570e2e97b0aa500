use std::path::PathBuf;

use assert_cmd::Command;
use tempfile::TempDir;

/// Isolated config and store files for one CLI test.
pub struct CliEnv {
    _dir: TempDir,
    pub config: PathBuf,
    pub data: PathBuf,
}

impl CliEnv {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("create temp dir");
        let config = dir.path().join("config.json");
        let data = dir.path().join("tally.json");
        Self {
            _dir: dir,
            config,
            data,
        }
    }

    /// A `tally_cli` invocation pointed at this environment, in plain output mode.
    pub fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("tally_cli").expect("binary exists");
        cmd.env_remove("RUST_LOG")
            .arg("--plain")
            .arg("--config")
            .arg(&self.config)
            .arg("--data")
            .arg(&self.data);
        cmd
    }

    pub fn store_json(&self) -> serde_json::Value {
        let raw = std::fs::read_to_string(&self.data).expect("read store");
        serde_json::from_str(&raw).expect("parse store")
    }
}
