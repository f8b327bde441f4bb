//! Implementation of the target commands (`build`, `export-images`, `clean`, `target`).
//!
//! Runs a target after its dependencies through the container runtime, stopping at
//! the first failure.

use std::time::Instant;

use anyhow::{Context, Result, bail};
use tracing::info;

use aprendo_deploy::config::DeployConfig;
use aprendo_deploy::image::{ContainerRuntime, ImageBuilder, ImageError};
use aprendo_deploy::orchestrate::{
  BuildTarget, DeployRunner, OrchestrateError, TargetAction, TargetDag, TargetSet, run,
};

use crate::output::{self, format_elapsed, print_error, print_success, print_warning};

/// Whether any planned target needs a container runtime.
fn needs_runtime(plan: &[&BuildTarget]) -> bool {
  plan
    .iter()
    .any(|t| matches!(t.action, TargetAction::BuildImage(_) | TargetAction::ExportImages))
}

/// Exit code of the container runtime command behind a failure, if any.
fn tool_exit_code(err: &OrchestrateError) -> Option<i32> {
  match err {
    OrchestrateError::Image(ImageError::CommandFailed { code: Some(code), .. }) if *code != 0 => Some(*code),
    _ => None,
  }
}

pub fn cmd_target(config: &DeployConfig, name: &str, dry_run: bool) -> Result<()> {
  let dag = TargetDag::new(&TargetSet::aprendo()).context("Invalid target graph")?;
  let plan = dag.plan(name)?;

  if dry_run {
    return super::cmd_plan(name, false);
  }

  let rt = tokio::runtime::Runtime::new().context("Failed to create async runtime")?;

  let builder = if needs_runtime(&plan) {
    let runtime = rt
      .block_on(ContainerRuntime::detect(config.runtime.as_deref()))
      .context("Container runtime required")?;
    ImageBuilder::new(runtime, &config.context_dir)
  } else {
    // Never invoked: nothing in the plan builds or saves images.
    ImageBuilder::new(ContainerRuntime::Docker, &config.context_dir)
  };
  let mut runner = DeployRunner::from_config(config, builder);

  let started = Instant::now();
  let result = rt.block_on(run(&dag, name, &mut runner))?;
  let elapsed = format_elapsed(started.elapsed());

  for target in &result.completed {
    print_success(target);
  }

  if let Some((failed, ref err)) = result.failed {
    print_error(&format!("{}: {}", failed, err));
    for (skipped, _) in &result.skipped {
      print_warning(&format!("{} {} (skipped)", output::symbols::SKIP, skipped));
    }
    if let Some(code) = tool_exit_code(err) {
      print_error(&format!("target {} failed after {}", name, elapsed));
      std::process::exit(code);
    }
    bail!("target {} failed after {}", name, elapsed);
  }

  info!(name = %name, elapsed = %elapsed, "target finished");
  println!();
  println!("Target {} complete in {}", name, elapsed);

  Ok(())
}
