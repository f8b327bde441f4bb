//! Declared build stages and Dockerfile rendering.

use std::collections::HashSet;

use serde_json::Value;

use crate::config::DeployConfig;
use crate::consts::{BACKEND_TAG, FRONTEND_TAG, VENV_TAG};

use super::types::{ImageError, ImageRef, Stage, StageOp};

pub const VENV_STAGE: &str = "venv";
pub const DEPLOY_BUILDER_STAGE: &str = "deploy-builder";
pub const BACKEND_STAGE: &str = "backend";
pub const FRONTEND_BUILDER_STAGE: &str = "frontend-builder";
pub const FRONTEND_STAGE: &str = "frontend";

const PYTHON_IMAGE: &str = "python:3.12-slim";
/// Same Debian release as `PYTHON_IMAGE`, so the binary links against the same glibc.
const RUST_IMAGE: &str = "rust:1-slim-bookworm";
const NGINX_IMAGE: &str = "nginx:alpine";
const APP_DIR: &str = "/app";
const DEPLOY_SRC_DIR: &str = "/src";
const DEPLOY_BINARY: &str = "aprendo-deploy";
const STATIC_EXPORT_DIR: &str = "/app/.web/_static";
const NGINX_HTML_DIR: &str = "/usr/share/nginx/html";

/// An ordered, validated set of stages.
///
/// Every stage reference points at a stage declared earlier, so declaration order
/// is always a valid build order.
#[derive(Debug, Clone)]
pub struct StageSet {
  stages: Vec<Stage>,
}

impl StageSet {
  pub fn new(stages: Vec<Stage>) -> Result<Self, ImageError> {
    let mut seen = HashSet::new();

    for stage in &stages {
      for dep in stage.stage_dependencies() {
        if !seen.contains(dep) {
          return Err(ImageError::UnknownStage(dep.to_string()));
        }
      }
      if !seen.insert(stage.name.as_str()) {
        return Err(ImageError::DuplicateStage(stage.name.clone()));
      }
    }

    Ok(Self { stages })
  }

  /// The Aprendo images: a shared dependency environment, the backend with the
  /// deployment tool as its entrypoint, and the static frontend built in two stages.
  pub fn aprendo(config: &DeployConfig) -> Self {
    let venv = Stage::new(VENV_STAGE, ImageRef::External(PYTHON_IMAGE.to_string()))
      .tagged(VENV_TAG)
      .op(StageOp::Workdir(APP_DIR.to_string()))
      .op(StageOp::Copy {
        src: "requirements.txt".to_string(),
        dst: format!("{APP_DIR}/requirements.txt"),
      })
      .op(StageOp::Run(
        "python -m venv /app/.venv && /app/.venv/bin/pip install --no-cache-dir -r requirements.txt".to_string(),
      ))
      .op(StageOp::Env {
        key: "PATH".to_string(),
        value: "/app/.venv/bin:$PATH".to_string(),
      });

    let deploy_builder = Stage::new(DEPLOY_BUILDER_STAGE, ImageRef::External(RUST_IMAGE.to_string()))
      .op(StageOp::Workdir(DEPLOY_SRC_DIR.to_string()))
      .op(StageOp::Copy {
        src: "deploy".to_string(),
        dst: DEPLOY_SRC_DIR.to_string(),
      })
      .op(StageOp::Run("cargo build --release -p aprendo-deploy-cli".to_string()));

    let backend = Stage::new(BACKEND_STAGE, ImageRef::Stage(VENV_STAGE.to_string()))
      .tagged(BACKEND_TAG)
      .op(StageOp::Copy {
        src: "app".to_string(),
        dst: APP_DIR.to_string(),
      })
      .op(StageOp::CopyFrom {
        stage: DEPLOY_BUILDER_STAGE.to_string(),
        src: format!("{DEPLOY_SRC_DIR}/target/release/{DEPLOY_BINARY}"),
        dst: format!("/usr/local/bin/{DEPLOY_BINARY}"),
      })
      .op(StageOp::Expose(config.backend_port))
      .op(StageOp::Cmd(vec![DEPLOY_BINARY.to_string(), "launch".to_string()]));

    let frontend_builder = Stage::new(FRONTEND_BUILDER_STAGE, ImageRef::Stage(VENV_STAGE.to_string()))
      .op(StageOp::Copy {
        src: "app".to_string(),
        dst: APP_DIR.to_string(),
      })
      .op(StageOp::Run("reflex export --frontend-only --no-zip".to_string()));

    let frontend = Stage::new(FRONTEND_STAGE, ImageRef::External(NGINX_IMAGE.to_string()))
      .tagged(FRONTEND_TAG)
      .op(StageOp::CopyFrom {
        stage: FRONTEND_BUILDER_STAGE.to_string(),
        src: STATIC_EXPORT_DIR.to_string(),
        dst: NGINX_HTML_DIR.to_string(),
      })
      .op(StageOp::Expose(80));

    Self {
      stages: vec![venv, deploy_builder, backend, frontend_builder, frontend],
    }
  }

  pub fn get(&self, name: &str) -> Result<&Stage, ImageError> {
    self
      .stages
      .iter()
      .find(|s| s.name == name)
      .ok_or_else(|| ImageError::UnknownStage(name.to_string()))
  }

  pub fn iter(&self) -> impl Iterator<Item = &Stage> {
    self.stages.iter()
  }

  /// Stages that end up in the Dockerfile for `name`.
  ///
  /// Tagged dependencies are referenced by tag and built separately; untagged
  /// ones are inlined ahead of the stage as intermediate build stages.
  fn file_stages<'a>(&'a self, name: &str) -> Result<Vec<&'a Stage>, ImageError> {
    let mut out: Vec<&Stage> = Vec::new();
    self.collect_file_stages(name, &mut out)?;
    Ok(out)
  }

  fn collect_file_stages<'a>(&'a self, name: &str, out: &mut Vec<&'a Stage>) -> Result<(), ImageError> {
    let stage = self.get(name)?;
    for dep in stage.stage_dependencies() {
      let dep_stage = self.get(dep)?;
      if dep_stage.tag.is_none() && !out.iter().any(|s| s.name == dep_stage.name) {
        self.collect_file_stages(dep, out)?;
      }
    }
    if !out.iter().any(|s| s.name == stage.name) {
      out.push(stage);
    }
    Ok(())
  }

  /// How a stage reference is written inside a Dockerfile.
  fn reference(&self, name: &str) -> Result<String, ImageError> {
    let stage = self.get(name)?;
    Ok(stage.tag.clone().unwrap_or_else(|| stage.name.clone()))
  }

  /// Render the Dockerfile that produces the image of stage `name`.
  pub fn render_dockerfile(&self, name: &str) -> Result<String, ImageError> {
    let mut out = String::new();

    for (i, stage) in self.file_stages(name)?.into_iter().enumerate() {
      if i > 0 {
        out.push('\n');
      }

      let base = match &stage.base {
        ImageRef::External(image) => image.clone(),
        ImageRef::Stage(dep) => self.reference(dep)?,
      };
      out.push_str(&format!("FROM {} AS {}\n", base, stage.name));

      for op in &stage.ops {
        let line = match op {
          StageOp::Workdir(dir) => format!("WORKDIR {dir}"),
          StageOp::Env { key, value } => format!("ENV {}={}", key, Value::String(value.clone())),
          StageOp::Copy { src, dst } => format!("COPY {src} {dst}"),
          StageOp::CopyFrom { stage: from, src, dst } => {
            format!("COPY --from={} {} {}", self.reference(from)?, src, dst)
          }
          StageOp::Run(cmd) => format!("RUN {cmd}"),
          StageOp::Expose(port) => format!("EXPOSE {port}"),
          StageOp::Cmd(args) => format!("CMD {}", Value::from(args.clone())),
        };
        out.push_str(&line);
        out.push('\n');
      }
    }

    Ok(out)
  }
}
