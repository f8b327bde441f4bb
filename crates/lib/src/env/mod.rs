//! Startup gate for the backend process.
//!
//! Checks that the data directory variable is set and that the required file
//! inside it exists, is a regular file and can be opened. There is no retry:
//! the first failed check is returned and the caller is expected to exit.

pub mod types;

use std::fs::File;

use tracing::{debug, info};

use crate::config::DeployConfig;

pub use types::{ConfigurationError, EnvironmentRequirement, ValidatedEnvironment};

/// Validate a requirement against the loaded configuration.
///
/// The directory comes from [`DeployConfig::directory`]; the process environment
/// is never consulted here.
pub fn validate(
  config: &DeployConfig,
  requirement: &EnvironmentRequirement,
) -> Result<ValidatedEnvironment, ConfigurationError> {
  let Some(dir) = config.directory(&requirement.variable) else {
    return Err(ConfigurationError::MissingVariable {
      variable: requirement.variable.clone(),
    });
  };

  let path = dir.join(&requirement.relative_path);
  debug!(variable = %requirement.variable, path = %path.display(), "checking required file");

  let metadata = match std::fs::metadata(&path) {
    Ok(m) => m,
    Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
      return Err(ConfigurationError::MissingFile {
        variable: requirement.variable.clone(),
        path,
      });
    }
    Err(source) => return Err(ConfigurationError::Unreadable { path, source }),
  };

  if !metadata.is_file() {
    return Err(ConfigurationError::NotAFile { path });
  }

  if let Err(source) = File::open(&path) {
    return Err(ConfigurationError::Unreadable { path, source });
  }

  info!(path = %path.display(), "environment validated");
  Ok(ValidatedEnvironment { resolved: path })
}
