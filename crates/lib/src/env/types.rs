//! Types for startup environment validation.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::consts::{CSV_DIR_VAR, TRANSLATIONS_FILE};

/// A required file located relative to a directory named by an environment variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentRequirement {
  /// Name of the environment variable holding the directory.
  pub variable: String,
  /// File expected inside that directory.
  pub relative_path: PathBuf,
}

impl EnvironmentRequirement {
  pub fn new(variable: impl Into<String>, relative_path: impl Into<PathBuf>) -> Self {
    Self {
      variable: variable.into(),
      relative_path: relative_path.into(),
    }
  }

  /// The translations data file the backend loads at startup.
  pub fn translations() -> Self {
    Self::new(CSV_DIR_VAR, TRANSLATIONS_FILE)
  }
}

/// Startup configuration failure. Always fatal.
#[derive(Debug, Error)]
pub enum ConfigurationError {
  #[error("{variable} is not set or empty")]
  MissingVariable { variable: String },

  #[error("required file not found: {} (from {variable})", .path.display())]
  MissingFile { variable: String, path: PathBuf },

  #[error("required path is not a regular file: {}", .path.display())]
  NotAFile { path: PathBuf },

  #[error("required file is not readable: {}: {source}", .path.display())]
  Unreadable {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },
}

/// Proof that validation succeeded.
///
/// Only [`validate`](super::validate) constructs this, so anything that takes it
/// cannot run before the environment was checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedEnvironment {
  pub(super) resolved: PathBuf,
}

impl ValidatedEnvironment {
  /// The resolved, readable required file.
  pub fn resolved(&self) -> &Path {
    &self.resolved
  }
}
