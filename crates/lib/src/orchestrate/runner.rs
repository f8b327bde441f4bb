//! Production action runner backed by a container runtime.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::config::DeployConfig;
use crate::consts::{BACKEND_ARCHIVE, BACKEND_TAG, FRONTEND_ARCHIVE, FRONTEND_TAG};
use crate::image::{ImageBuilder, StageSet};

use super::ActionRunner;
use super::types::{BuildTarget, OrchestrateError, TargetAction};

/// Image archives produced by `export-images`, as (tag, file name).
pub const EXPORTS: [(&str, &str); 2] = [(BACKEND_TAG, BACKEND_ARCHIVE), (FRONTEND_TAG, FRONTEND_ARCHIVE)];

pub struct DeployRunner {
  stages: StageSet,
  builder: ImageBuilder,
  build_dir: PathBuf,
}

impl DeployRunner {
  pub fn new(stages: StageSet, builder: ImageBuilder, build_dir: impl Into<PathBuf>) -> Self {
    Self {
      stages,
      builder,
      build_dir: build_dir.into(),
    }
  }

  pub fn from_config(config: &DeployConfig, builder: ImageBuilder) -> Self {
    Self::new(StageSet::aprendo(config), builder, &config.build_dir)
  }

  /// Archive paths written by `export-images`.
  pub fn archives(&self) -> Vec<PathBuf> {
    EXPORTS.iter().map(|(_, file)| self.build_dir.join(file)).collect()
  }

  async fn export_images(&self) -> Result<(), OrchestrateError> {
    tokio::fs::create_dir_all(&self.build_dir).await?;

    // Every archive is saved next to its destination before any is renamed, so a
    // failed save never leaves a fresh archive beside a stale or missing one.
    let mut saved = Vec::with_capacity(EXPORTS.len());
    for (tag, file) in EXPORTS {
      let archive = self.build_dir.join(file);
      let partial = partial_path(&archive);
      if let Err(e) = self.builder.save(tag, &partial).await {
        for (partial, _) in &saved {
          let _ = tokio::fs::remove_file(partial).await;
        }
        let _ = tokio::fs::remove_file(&partial).await;
        return Err(e.into());
      }
      saved.push((partial, archive));
    }

    for (partial, archive) in saved {
      tokio::fs::rename(&partial, &archive).await?;
      info!(archive = %archive.display(), "image exported");
    }

    Ok(())
  }

  async fn clean(&self) -> Result<(), OrchestrateError> {
    for archive in self.archives() {
      for path in [partial_path(&archive), archive] {
        match tokio::fs::remove_file(&path).await {
          Ok(()) => info!(path = %path.display(), "removed"),
          Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "nothing to remove");
          }
          Err(e) => return Err(e.into()),
        }
      }
    }
    Ok(())
  }
}

fn partial_path(archive: &Path) -> PathBuf {
  let mut name = archive.as_os_str().to_owned();
  name.push(".partial");
  PathBuf::from(name)
}

impl ActionRunner for DeployRunner {
  async fn run_action(&mut self, target: &BuildTarget) -> Result<(), OrchestrateError> {
    match &target.action {
      TargetAction::None => Ok(()),
      TargetAction::BuildImage(stage) => {
        self.builder.build(&self.stages, stage).await?;
        Ok(())
      }
      TargetAction::ExportImages => self.export_images().await,
      TargetAction::Clean => self.clean().await,
    }
  }
}
