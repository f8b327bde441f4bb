//! Implementation of the `launch` and `check-env` commands.
//!
//! `launch` is the backend container's entrypoint: it validates the data directory
//! and then replaces itself with the backend server.

use anyhow::Result;

use aprendo_deploy::config::DeployConfig;
use aprendo_deploy::env::{EnvironmentRequirement, ValidatedEnvironment, validate};
use aprendo_deploy::launch::LaunchSpec;

use crate::output::{print_error, print_success};

/// Validate or exit with status 1 after a single line on stderr.
fn validate_or_exit(config: &DeployConfig) -> ValidatedEnvironment {
  match validate(config, &EnvironmentRequirement::translations()) {
    Ok(validated) => validated,
    Err(e) => {
      print_error(&e.to_string());
      std::process::exit(1);
    }
  }
}

pub fn cmd_check_env(config: &DeployConfig) -> Result<()> {
  let validated = validate_or_exit(config);
  print_success(&format!("Found {}", validated.resolved().display()));
  Ok(())
}

pub fn cmd_launch(config: &DeployConfig) -> Result<()> {
  let validated = validate_or_exit(config);
  let spec = LaunchSpec::backend(config);

  // Only returns if the backend could not be started.
  let err = match spec.launch(&validated) {
    Ok(never) => match never {},
    Err(e) => e,
  };
  Err(err.into())
}
