//! aprendo-deploy-lib: deployment topology for Aprendo
//!
//! This crate describes how the Aprendo application is built, shipped and started:
//! - `image`: build stages for the shared venv, backend and static frontend images
//! - `orchestrate`: the target graph driving image builds and exports
//! - `env` and `launch`: the startup gate and exec of the backend process
//! - `route`: reverse proxy rules in front of the frontend and backend

pub mod config;
pub mod consts;
pub mod env;
pub mod image;
pub mod launch;
pub mod orchestrate;
pub mod route;
