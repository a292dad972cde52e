//! Shared test infrastructure for integration tests.

use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};
use tempfile::TempDir;

/// Scratch directory seeded with a manifest and a set of files.
pub struct CaveFixture {
    pub dir: TempDir,
}

impl CaveFixture {
    pub fn new(manifest: &str, files: &[&str]) -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        fs::write(dir.path().join("cave.json"), manifest).expect("write manifest");
        for name in files {
            fs::write(dir.path().join(name), name.as_bytes()).expect("seed file");
        }
        Self { dir }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    #[allow(dead_code)]
    pub fn exists(&self, name: &str) -> bool {
        self.path().join(name).exists()
    }

    #[allow(dead_code)]
    pub fn contents(&self, name: &str) -> String {
        fs::read_to_string(self.path().join(name)).expect("read seeded file")
    }

    /// Run `cavrec <args> --dir <fixture>` with `stdin` piped in.
    pub fn run(&self, args: &[&str], stdin: &str) -> Output {
        let mut child = Command::new(env!("CARGO_BIN_EXE_cavrec"))
            .args(args)
            .arg("--dir")
            .arg(self.path())
            .env_remove("RUST_LOG")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .expect("spawn cavrec");
        if let Some(mut handle) = child.stdin.take() {
            // Commands that never prompt may exit before reading; ignore EPIPE.
            let _ = handle.write_all(stdin.as_bytes());
        }
        child.wait_with_output().expect("wait for cavrec")
    }

    pub fn run_json(&self, args: &[&str]) -> serde_json::Value {
        let mut args = args.to_vec();
        args.push("--json");
        let output = self.run(&args, "");
        assert!(
            output.status.success(),
            "cavrec failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        serde_json::from_slice(&output.stdout).expect("parse JSON output")
    }
}

pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

pub fn strings(value: &serde_json::Value) -> Vec<String> {
    value
        .as_array()
        .map(|arr| {
            arr.iter()
                .filter_map(|v| v.as_str().map(String::from))
                .collect()
        })
        .unwrap_or_default()
}
