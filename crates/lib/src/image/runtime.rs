//! Container runtime driver.
//!
//! Builds stages and exports images by shelling out to `podman` or `docker`.
//! Output of the runtime is passed straight through to the terminal so its own
//! diagnostics reach the operator.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, info};

use super::stages::StageSet;
use super::types::ImageError;

/// Supported container runtimes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerRuntime {
  Podman,
  Docker,
}

impl ContainerRuntime {
  pub fn command(&self) -> &'static str {
    match self {
      ContainerRuntime::Podman => "podman",
      ContainerRuntime::Docker => "docker",
    }
  }

  pub fn from_name(name: &str) -> Option<Self> {
    match name {
      "podman" => Some(ContainerRuntime::Podman),
      "docker" => Some(ContainerRuntime::Docker),
      _ => None,
    }
  }

  /// Pick a runtime: the forced one if given, otherwise the first of podman and
  /// docker that answers `--version`.
  pub async fn detect(preference: Option<&str>) -> Result<Self, ImageError> {
    if let Some(runtime) = preference.and_then(Self::from_name) {
      debug!(runtime = runtime.command(), "using configured container runtime");
      return Ok(runtime);
    }

    for runtime in [ContainerRuntime::Podman, ContainerRuntime::Docker] {
      let probe = Command::new(runtime.command())
        .arg("--version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await;

      if matches!(probe, Ok(status) if status.success()) {
        info!(runtime = runtime.command(), "detected container runtime");
        return Ok(runtime);
      }
    }

    Err(ImageError::NoRuntimeAvailable)
  }
}

/// Arguments for building an image from a Dockerfile read on stdin.
pub fn build_args(tag: &str, context: &Path) -> Vec<String> {
  vec![
    "build".to_string(),
    "-t".to_string(),
    tag.to_string(),
    "-f".to_string(),
    "-".to_string(),
    context.to_string_lossy().into_owned(),
  ]
}

/// Arguments for writing an image to a tar archive.
pub fn save_args(tag: &str, archive: &Path) -> Vec<String> {
  vec![
    "save".to_string(),
    "-o".to_string(),
    archive.to_string_lossy().into_owned(),
    tag.to_string(),
  ]
}

/// Builds and exports images through a container runtime binary.
#[derive(Debug, Clone)]
pub struct ImageBuilder {
  program: String,
  context_dir: PathBuf,
}

impl ImageBuilder {
  pub fn new(runtime: ContainerRuntime, context_dir: impl Into<PathBuf>) -> Self {
    Self::with_program(runtime.command(), context_dir)
  }

  /// Use an explicit runtime binary, e.g. a wrapper script.
  pub fn with_program(program: impl Into<String>, context_dir: impl Into<PathBuf>) -> Self {
    Self {
      program: program.into(),
      context_dir: context_dir.into(),
    }
  }

  /// Build stage `name` and tag the result.
  ///
  /// The runtime only applies the tag when every instruction succeeds.
  pub async fn build(&self, stages: &StageSet, name: &str) -> Result<String, ImageError> {
    let stage = stages.get(name)?;
    let tag = stage
      .tag
      .clone()
      .ok_or_else(|| ImageError::UntaggedStage(name.to_string()))?;
    let dockerfile = stages.render_dockerfile(name)?;

    info!(stage = %name, tag = %tag, "building image");
    debug!(dockerfile = %dockerfile, "rendered dockerfile");

    self.run(&build_args(&tag, &self.context_dir), Some(&dockerfile)).await?;

    let artifact = stage.artifact();
    info!(stage = %artifact.name, tag = %tag, files = ?artifact.files, "image built");
    Ok(tag)
  }

  /// Save a tagged image to `archive`.
  pub async fn save(&self, tag: &str, archive: &Path) -> Result<(), ImageError> {
    info!(tag = %tag, archive = %archive.display(), "exporting image");
    self.run(&save_args(tag, archive), None).await
  }

  async fn run(&self, args: &[String], stdin: Option<&str>) -> Result<(), ImageError> {
    let cmd = format!("{} {}", self.program, args.join(" "));
    debug!(cmd = %cmd, "spawning container runtime");

    let mut command = Command::new(&self.program);
    command
      .args(args)
      .stdin(if stdin.is_some() { Stdio::piped() } else { Stdio::null() });

    let mut child = command.spawn()?;

    if let Some(input) = stdin
      && let Some(mut pipe) = child.stdin.take()
    {
      // A runtime that exits early closes the pipe; its exit status is what matters.
      if let Err(e) = pipe.write_all(input.as_bytes()).await
        && e.kind() != std::io::ErrorKind::BrokenPipe
      {
        return Err(e.into());
      }
      drop(pipe);
    }

    let status = child.wait().await?;
    if !status.success() {
      return Err(ImageError::CommandFailed {
        cmd,
        code: status.code(),
      });
    }

    Ok(())
  }
}
