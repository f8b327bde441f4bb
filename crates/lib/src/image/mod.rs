//! Image build stages.
//!
//! Stages are declared as data, rendered to Dockerfiles and built through a
//! container runtime. A stage may only reference stages declared before it.

pub mod runtime;
pub mod stages;
pub mod types;

pub use runtime::{ContainerRuntime, ImageBuilder};
pub use stages::{BACKEND_STAGE, DEPLOY_BUILDER_STAGE, FRONTEND_BUILDER_STAGE, FRONTEND_STAGE, StageSet, VENV_STAGE};
pub use types::{ImageArtifact, ImageError, ImageRef, Stage, StageOp};
