//! Deployment configuration.
//!
//! All environment-driven settings are read once into a [`DeployConfig`] at startup
//! and passed by reference to the components that need them.

use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

use crate::consts::{
  BACKEND_ARGS_VAR, BACKEND_PORT_VAR, BUILD_DIR_VAR, CONTAINER_RUNTIME_VAR, CONTEXT_DIR_VAR, CSV_DIR_VAR,
  DEFAULT_BACKEND_PORT, DEFAULT_BUILD_DIR, DEFAULT_CONTEXT_DIR, DEFAULT_SERVER_NAME, SERVER_NAME_VAR,
};
use crate::launch::split_args;

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("invalid value for {var}: {value:?} ({reason})")]
  InvalidValue {
    var: &'static str,
    value: String,
    reason: String,
  },
}

/// Settings resolved from the environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeployConfig {
  /// Directory expected to contain the translations file. `None` when unset or empty.
  pub csv_dir: Option<PathBuf>,

  /// Extra backend arguments, already split on whitespace.
  pub backend_args: Vec<String>,

  /// Where exported image archives are written.
  pub build_dir: PathBuf,

  /// Build context handed to the container runtime.
  pub context_dir: PathBuf,

  /// Forced container runtime (`docker` or `podman`), probed when `None`.
  pub runtime: Option<String>,

  /// TLS server name of the reverse proxy.
  pub server_name: String,

  /// Port the backend listens on inside its container.
  pub backend_port: u16,
}

impl Default for DeployConfig {
  fn default() -> Self {
    Self {
      csv_dir: None,
      backend_args: Vec::new(),
      build_dir: PathBuf::from(DEFAULT_BUILD_DIR),
      context_dir: PathBuf::from(DEFAULT_CONTEXT_DIR),
      runtime: None,
      server_name: DEFAULT_SERVER_NAME.to_string(),
      backend_port: DEFAULT_BACKEND_PORT,
    }
  }
}

impl DeployConfig {
  /// Read the configuration from the process environment.
  pub fn from_env() -> Result<Self, ConfigError> {
    Self::from_lookup(|key| std::env::var(key).ok())
  }

  /// Build the configuration from an arbitrary key lookup.
  ///
  /// Empty values are treated the same as unset ones.
  pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
  where
    F: Fn(&str) -> Option<String>,
  {
    let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
    let defaults = Self::default();

    let backend_port = match get(BACKEND_PORT_VAR) {
      Some(raw) => raw.trim().parse::<u16>().map_err(|e| ConfigError::InvalidValue {
        var: BACKEND_PORT_VAR,
        value: raw.clone(),
        reason: e.to_string(),
      })?,
      None => defaults.backend_port,
    };

    let runtime = match get(CONTAINER_RUNTIME_VAR) {
      Some(raw) => {
        let name = raw.trim().to_lowercase();
        if name != "docker" && name != "podman" {
          return Err(ConfigError::InvalidValue {
            var: CONTAINER_RUNTIME_VAR,
            value: raw,
            reason: "expected docker or podman".to_string(),
          });
        }
        Some(name)
      }
      None => None,
    };

    Ok(Self {
      csv_dir: get(CSV_DIR_VAR).map(PathBuf::from),
      backend_args: get(BACKEND_ARGS_VAR).map(|raw| split_args(&raw)).unwrap_or_default(),
      build_dir: get(BUILD_DIR_VAR).map(PathBuf::from).unwrap_or(defaults.build_dir),
      context_dir: get(CONTEXT_DIR_VAR).map(PathBuf::from).unwrap_or(defaults.context_dir),
      runtime,
      server_name: get(SERVER_NAME_VAR).unwrap_or(defaults.server_name),
      backend_port,
    })
  }

  /// Directory carried for a directory-valued variable, if it was set.
  ///
  /// Variables the configuration does not load resolve to `None`.
  pub fn directory(&self, variable: &str) -> Option<&Path> {
    match variable {
      CSV_DIR_VAR => self.csv_dir.as_deref(),
      _ => None,
    }
  }
}
