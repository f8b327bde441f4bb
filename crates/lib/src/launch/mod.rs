//! Backend process launch.
//!
//! The backend command line is a fixed program plus fixed mode flags, followed by
//! whatever extra arguments the operator supplied. On Unix the current process is
//! replaced so the backend owns the process identity, signals and exit status.

use std::convert::Infallible;
use std::process::Command;

use thiserror::Error;
use tracing::info;

use crate::config::DeployConfig;
use crate::consts::{BACKEND_MODE_ARGS, BACKEND_PROGRAM};
use crate::env::ValidatedEnvironment;

#[derive(Debug, Error)]
pub enum LaunchError {
  /// Replacing the current process failed. The OS error is passed through unchanged.
  #[error("failed to exec {program}: {source}")]
  Exec {
    program: String,
    #[source]
    source: std::io::Error,
  },

  #[error("failed to spawn {program}: {source}")]
  Spawn {
    program: String,
    #[source]
    source: std::io::Error,
  },
}

/// Split a raw argument string on whitespace, dropping empty pieces.
pub fn split_args(raw: &str) -> Vec<String> {
  raw.split_whitespace().map(str::to_string).collect()
}

/// The complete description of how to start the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchSpec {
  pub program: String,
  pub leading_args: Vec<String>,
  pub extra_args: Vec<String>,
}

impl LaunchSpec {
  pub fn new(program: impl Into<String>, leading_args: Vec<String>, extra_args: Vec<String>) -> Self {
    Self {
      program: program.into(),
      leading_args,
      extra_args,
    }
  }

  /// The Aprendo backend server in production backend-only mode.
  pub fn backend(config: &DeployConfig) -> Self {
    Self::new(
      BACKEND_PROGRAM,
      BACKEND_MODE_ARGS.iter().map(|s| s.to_string()).collect(),
      config.backend_args.clone(),
    )
  }

  /// Arguments passed to the program: leading flags, then extras, in order.
  pub fn args(&self) -> impl Iterator<Item = &str> {
    self.leading_args.iter().chain(&self.extra_args).map(String::as_str)
  }

  /// Full argument vector including the program name.
  pub fn argv(&self) -> Vec<String> {
    std::iter::once(self.program.as_str())
      .chain(self.args())
      .map(str::to_string)
      .collect()
  }

  fn command(&self) -> Command {
    let mut command = Command::new(&self.program);
    command.args(self.args());
    command
  }

  /// Start the backend. Returns only on failure.
  ///
  /// Taking a [`ValidatedEnvironment`] ties the launch to a successful validation.
  #[cfg(unix)]
  pub fn launch(&self, validated: &ValidatedEnvironment) -> Result<Infallible, LaunchError> {
    use std::os::unix::process::CommandExt;

    info!(
      argv = ?self.argv(),
      data = %validated.resolved().display(),
      "replacing process with backend"
    );

    let source = self.command().exec();
    Err(LaunchError::Exec {
      program: self.program.clone(),
      source,
    })
  }

  /// Start the backend. Returns only on failure.
  ///
  /// Without exec, the child is awaited and its exit code becomes ours.
  #[cfg(not(unix))]
  pub fn launch(&self, validated: &ValidatedEnvironment) -> Result<Infallible, LaunchError> {
    info!(
      argv = ?self.argv(),
      data = %validated.resolved().display(),
      "spawning backend"
    );

    let spawn_err = |source| LaunchError::Spawn {
      program: self.program.clone(),
      source,
    };

    let mut child = self.command().spawn().map_err(spawn_err)?;
    let status = child.wait().map_err(spawn_err)?;
    std::process::exit(status.code().unwrap_or(1));
  }
}
