//! Names, paths and defaults shared across the deployment tool.

/// Directory holding the translations data file.
pub const CSV_DIR_VAR: &str = "APRENDO_CSV_DIR";
/// Extra whitespace-separated arguments appended to the backend command line.
pub const BACKEND_ARGS_VAR: &str = "APRENDO_BACKEND_ARGS";
pub const BUILD_DIR_VAR: &str = "APRENDO_BUILD_DIR";
pub const CONTEXT_DIR_VAR: &str = "APRENDO_CONTEXT_DIR";
pub const CONTAINER_RUNTIME_VAR: &str = "APRENDO_CONTAINER_RUNTIME";
pub const SERVER_NAME_VAR: &str = "APRENDO_SERVER_NAME";
pub const BACKEND_PORT_VAR: &str = "APRENDO_BACKEND_PORT";

pub const TRANSLATIONS_FILE: &str = "translations.csv";

pub const DEFAULT_BUILD_DIR: &str = "../build";
pub const DEFAULT_CONTEXT_DIR: &str = "..";
pub const DEFAULT_SERVER_NAME: &str = "aprendo.localhost";
pub const DEFAULT_BACKEND_PORT: u16 = 8000;

pub const VENV_TAG: &str = "aprendo-venv";
pub const BACKEND_TAG: &str = "aprendo-backend";
pub const FRONTEND_TAG: &str = "aprendo-frontend";

pub const BACKEND_ARCHIVE: &str = "aprendo-backend.tar";
pub const FRONTEND_ARCHIVE: &str = "aprendo-frontend.tar";

/// Backend server executable, resolved through `PATH` inside the image.
pub const BACKEND_PROGRAM: &str = "reflex";
pub const BACKEND_MODE_ARGS: &[&str] = &["run", "--env", "prod", "--backend-only"];
