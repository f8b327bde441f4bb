//! Implementation of the `info` command.
//!
//! Shows the configuration resolved from the environment.

use anyhow::Result;

use aprendo_deploy::config::DeployConfig;

use crate::output::{print_info, print_json, print_stat};

pub fn cmd_info(config: &DeployConfig, json: bool) -> Result<()> {
  if json {
    return print_json(config);
  }

  print_info(&format!("aprendo-deploy v{}", env!("CARGO_PKG_VERSION")));
  let csv_dir = config
    .csv_dir
    .as_ref()
    .map(|p| p.display().to_string())
    .unwrap_or_else(|| "(unset)".to_string());
  print_stat("CSV dir", &csv_dir);
  print_stat("Backend args", &config.backend_args.join(" "));
  print_stat("Build dir", &config.build_dir.display().to_string());
  print_stat("Context dir", &config.context_dir.display().to_string());
  print_stat("Runtime", config.runtime.as_deref().unwrap_or("auto"));
  print_stat("Server name", &config.server_name);
  print_stat("Backend port", &config.backend_port.to_string());

  Ok(())
}
