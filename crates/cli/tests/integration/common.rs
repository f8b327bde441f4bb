//! Shared test helpers for CLI integration tests.

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use tempfile::TempDir;

/// Isolated test environment.
///
/// Each test gets its own temporary directory with isolated data, build and
/// tool paths. `PATH` only contains the test's own `bin` directory, so no real
/// container runtime or backend is ever reached.
pub struct TestEnv {
  pub temp: TempDir,
}

impl TestEnv {
  pub fn new() -> Self {
    let temp = TempDir::new().unwrap();
    Self { temp }
  }

  /// Write a file relative to the temp directory.
  pub fn write_file(&self, relative_path: &str, content: &str) -> PathBuf {
    let path = self.temp.path().join(relative_path);
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, content).unwrap();
    path
  }

  /// Install an executable script into the isolated `bin` directory.
  #[cfg(unix)]
  pub fn install_script(&self, name: &str, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = self.write_file(&format!("bin/{}", name), &format!("#!/bin/sh\n{}\n", body));
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
  }

  fn ensure_dir(&self, name: &str) -> PathBuf {
    let p = self.temp.path().join(name);
    std::fs::create_dir_all(&p).unwrap();
    p
  }

  /// Directory holding `translations.csv`.
  pub fn csv_dir(&self) -> PathBuf {
    self.ensure_dir("csv")
  }

  /// Output directory for exported archives (not created up front).
  pub fn build_dir(&self) -> PathBuf {
    self.temp.path().join("build")
  }

  pub fn bin_dir(&self) -> PathBuf {
    self.ensure_dir("bin")
  }

  pub fn path(&self) -> &Path {
    self.temp.path()
  }

  /// Get a pre-configured Command for the aprendo-deploy binary.
  ///
  /// Sets environment variables for isolated testing:
  /// - `PATH`: only the isolated `bin` directory
  /// - `APRENDO_BUILD_DIR`: isolated archive output
  /// - `APRENDO_CONTEXT_DIR`: the temp directory
  /// - `APRENDO_CSV_DIR` and `APRENDO_BACKEND_ARGS` removed
  pub fn deploy_cmd(&self) -> Command {
    let mut cmd: Command = cargo_bin_cmd!("aprendo-deploy");
    cmd.env("PATH", self.bin_dir());
    cmd.env("APRENDO_BUILD_DIR", self.build_dir());
    cmd.env("APRENDO_CONTEXT_DIR", self.path());
    cmd.env_remove("APRENDO_CSV_DIR");
    cmd.env_remove("APRENDO_BACKEND_ARGS");
    cmd.env_remove("APRENDO_CONTAINER_RUNTIME");
    cmd
  }
}
