//! Types for image build stages.

use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

/// Errors from declaring, rendering or building image stages.
#[derive(Debug, Error)]
pub enum ImageError {
  #[error("unknown stage: {0}")]
  UnknownStage(String),

  #[error("duplicate stage: {0}")]
  DuplicateStage(String),

  /// Only tagged stages produce a final image that can be built on its own.
  #[error("stage {0} has no tag and cannot be built directly")]
  UntaggedStage(String),

  #[error("no container runtime available (install podman or docker)")]
  NoRuntimeAvailable,

  /// A build or save command exited unsuccessfully.
  #[error("command failed with exit code {code:?}: {cmd}")]
  CommandFailed { cmd: String, code: Option<i32> },

  #[error("io error: {0}")]
  Io(#[from] std::io::Error),
}

/// What a stage starts from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ImageRef {
  /// A registry image such as `python:3.12-slim`.
  External(String),
  /// Another declared stage, by name.
  Stage(String),
}

/// A single instruction inside a stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum StageOp {
  Workdir(String),
  Env { key: String, value: String },
  Copy { src: String, dst: String },
  CopyFrom { stage: String, src: String, dst: String },
  Run(String),
  Expose(u16),
  Cmd(Vec<String>),
}

/// The immutable result of a stage: where it came from and which files it put in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageArtifact {
  pub name: String,
  pub base: ImageRef,
  pub files: Vec<PathBuf>,
}

/// A named build stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Stage {
  pub name: String,
  pub base: ImageRef,
  pub ops: Vec<StageOp>,
  /// Image tag applied on success. Intermediate stages are untagged.
  pub tag: Option<String>,
}

impl Stage {
  pub fn new(name: impl Into<String>, base: ImageRef) -> Self {
    Self {
      name: name.into(),
      base,
      ops: Vec::new(),
      tag: None,
    }
  }

  pub fn tagged(mut self, tag: impl Into<String>) -> Self {
    self.tag = Some(tag.into());
    self
  }

  pub fn op(mut self, op: StageOp) -> Self {
    self.ops.push(op);
    self
  }

  /// Stages this one reads from, either as its base or through `COPY --from`.
  pub fn stage_dependencies(&self) -> impl Iterator<Item = &str> {
    let base = match &self.base {
      ImageRef::Stage(name) => Some(name.as_str()),
      ImageRef::External(_) => None,
    };
    base.into_iter().chain(self.ops.iter().filter_map(|op| match op {
      StageOp::CopyFrom { stage, .. } => Some(stage.as_str()),
      _ => None,
    }))
  }

  pub fn artifact(&self) -> ImageArtifact {
    let files = self
      .ops
      .iter()
      .filter_map(|op| match op {
        StageOp::Copy { dst, .. } | StageOp::CopyFrom { dst, .. } => Some(PathBuf::from(dst)),
        _ => None,
      })
      .collect();

    ImageArtifact {
      name: self.name.clone(),
      base: self.base.clone(),
      files,
    }
  }
}
