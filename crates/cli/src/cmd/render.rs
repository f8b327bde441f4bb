//! Implementation of the `render` command.
//!
//! Writes generated deployment files to stdout.

use anyhow::{Context, Result};

use aprendo_deploy::config::DeployConfig;
use aprendo_deploy::image::StageSet;
use aprendo_deploy::route::Router;

pub fn cmd_render_nginx(config: &DeployConfig) -> Result<()> {
  print!("{}", Router::aprendo(config).render_nginx());
  Ok(())
}

pub fn cmd_render_dockerfile(config: &DeployConfig, stage: &str) -> Result<()> {
  let dockerfile = StageSet::aprendo(config)
    .render_dockerfile(stage)
    .with_context(|| format!("Failed to render Dockerfile for stage {}", stage))?;
  print!("{}", dockerfile);
  Ok(())
}
