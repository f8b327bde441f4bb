//! Build orchestration.
//!
//! This module provides the entry point for running a named target:
//! - DAG-based dependency ordering
//! - Sequential execution, one target at a time
//! - Fail-fast: the first failure stops the run and the rest of the plan is skipped

pub mod dag;
pub mod runner;
pub mod types;

use std::future::Future;

use tracing::{debug, error, info, warn};

pub use dag::TargetDag;
pub use runner::DeployRunner;
pub use types::{
  BACKEND_TARGET, BUILD_ALL_TARGET, BuildTarget, CLEAN_TARGET, EXPORT_IMAGES_TARGET, FRONTEND_TARGET,
  OrchestrateError, RunResult, TargetAction, TargetSet, VENV_TARGET,
};

/// Performs the action of a single target.
pub trait ActionRunner {
  fn run_action(&mut self, target: &BuildTarget) -> impl Future<Output = Result<(), OrchestrateError>>;
}

/// Run `name` after all of its dependencies.
///
/// Planning errors (unknown target) are returned as `Err`; action failures are
/// recorded in the [`RunResult`].
pub async fn run<R: ActionRunner>(dag: &TargetDag, name: &str, runner: &mut R) -> Result<RunResult, OrchestrateError> {
  let plan = dag.plan(name)?;
  info!(name = %name, steps = plan.len(), "starting run");

  let mut result = RunResult::default();

  for (i, target) in plan.iter().enumerate() {
    debug!(name = %target.name, action = ?target.action, "running target");

    match runner.run_action(target).await {
      Ok(()) => {
        info!(name = %target.name, "target succeeded");
        result.completed.push(target.name.clone());
      }
      Err(e) => {
        error!(name = %target.name, error = %e, "target failed");
        for skipped in &plan[i + 1..] {
          warn!(name = %skipped.name, failed = %target.name, "skipping target after failure");
          result.skipped.push((skipped.name.clone(), target.name.clone()));
        }
        result.failed = Some((target.name.clone(), e));
        break;
      }
    }
  }

  info!(
    completed = result.completed.len(),
    failed = result.failed.is_some(),
    skipped = result.skipped.len(),
    "run complete"
  );

  Ok(result)
}
