//! Types for target orchestration.

use serde::Serialize;
use thiserror::Error;

use crate::image::{BACKEND_STAGE, FRONTEND_STAGE, ImageError, VENV_STAGE};

pub const VENV_TARGET: &str = "venv";
pub const BACKEND_TARGET: &str = "backend";
pub const FRONTEND_TARGET: &str = "frontend";
pub const BUILD_ALL_TARGET: &str = "build-all";
pub const EXPORT_IMAGES_TARGET: &str = "export-images";
pub const CLEAN_TARGET: &str = "clean";

/// Errors that can occur while planning or running targets.
#[derive(Debug, Error)]
pub enum OrchestrateError {
  #[error("duplicate target: {0}")]
  DuplicateTarget(String),

  #[error("unknown target: {0}")]
  UnknownTarget(String),

  #[error("target {target} depends on unknown target {dependency}")]
  UnknownDependency { target: String, dependency: String },

  #[error("dependency cycle detected")]
  CycleDetected,

  /// A build stage failed.
  #[error("build stage failed: {0}")]
  Image(#[from] ImageError),

  #[error("io error: {0}")]
  Io(#[from] std::io::Error),
}

/// What running a target does once its dependencies are done.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum TargetAction {
  /// Aggregate target with no work of its own.
  None,
  /// Build and tag the named image stage.
  BuildImage(String),
  /// Save the backend and frontend images as archives.
  ExportImages,
  /// Remove exported archives.
  Clean,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildTarget {
  pub name: String,
  pub dependencies: Vec<String>,
  pub action: TargetAction,
}

impl BuildTarget {
  pub fn new(name: impl Into<String>, dependencies: &[&str], action: TargetAction) -> Self {
    Self {
      name: name.into(),
      dependencies: dependencies.iter().map(|d| d.to_string()).collect(),
      action,
    }
  }
}

/// Declared targets, in declaration order.
#[derive(Debug, Clone, Default)]
pub struct TargetSet {
  pub targets: Vec<BuildTarget>,
}

impl TargetSet {
  pub fn new(targets: Vec<BuildTarget>) -> Self {
    Self { targets }
  }

  /// The deployment targets.
  pub fn aprendo() -> Self {
    Self::new(vec![
      BuildTarget::new(VENV_TARGET, &[], TargetAction::BuildImage(VENV_STAGE.to_string())),
      BuildTarget::new(
        BACKEND_TARGET,
        &[VENV_TARGET],
        TargetAction::BuildImage(BACKEND_STAGE.to_string()),
      ),
      BuildTarget::new(
        FRONTEND_TARGET,
        &[VENV_TARGET],
        TargetAction::BuildImage(FRONTEND_STAGE.to_string()),
      ),
      BuildTarget::new(
        BUILD_ALL_TARGET,
        &[VENV_TARGET, BACKEND_TARGET, FRONTEND_TARGET],
        TargetAction::None,
      ),
      BuildTarget::new(EXPORT_IMAGES_TARGET, &[BUILD_ALL_TARGET], TargetAction::ExportImages),
      BuildTarget::new(CLEAN_TARGET, &[], TargetAction::Clean),
    ])
  }

  pub fn get(&self, name: &str) -> Option<&BuildTarget> {
    self.targets.iter().find(|t| t.name == name)
  }
}

/// Outcome of running a target and its dependencies.
#[derive(Debug, Default)]
pub struct RunResult {
  /// Targets that finished, in execution order.
  pub completed: Vec<String>,

  /// The target that failed (at most one, stops execution).
  pub failed: Option<(String, OrchestrateError)>,

  /// Planned targets that never ran, with the failed target that stopped them.
  pub skipped: Vec<(String, String)>,
}

impl RunResult {
  pub fn is_success(&self) -> bool {
    self.failed.is_none() && self.skipped.is_empty()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn run_result_success_when_empty() {
    assert!(RunResult::default().is_success());
  }

  #[test]
  fn run_result_failure_with_failed_target() {
    let result = RunResult {
      completed: vec!["venv".to_string()],
      failed: Some(("backend".to_string(), OrchestrateError::CycleDetected)),
      skipped: vec![("build-all".to_string(), "backend".to_string())],
    };
    assert!(!result.is_success());
  }

  #[test]
  fn aprendo_targets_depend_on_venv() {
    let set = TargetSet::aprendo();
    assert_eq!(set.get(BACKEND_TARGET).unwrap().dependencies, vec![VENV_TARGET]);
    assert_eq!(set.get(FRONTEND_TARGET).unwrap().dependencies, vec![VENV_TARGET]);
    assert_eq!(
      set.get(EXPORT_IMAGES_TARGET).unwrap().dependencies,
      vec![BUILD_ALL_TARGET]
    );
    assert!(set.get(CLEAN_TARGET).unwrap().dependencies.is_empty());
    assert!(set.get("deploy").is_none());
  }
}
