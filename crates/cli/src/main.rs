mod cmd;
mod output;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use aprendo_deploy::config::DeployConfig;
use aprendo_deploy::orchestrate::{BUILD_ALL_TARGET, CLEAN_TARGET, EXPORT_IMAGES_TARGET};

/// aprendo-deploy - Build, ship and start the Aprendo application
#[derive(Parser)]
#[command(name = "aprendo-deploy")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Enable debug logging
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Build the venv, backend and frontend images
  Build {
    /// Print the plan without running it
    #[arg(long)]
    dry_run: bool,
  },

  /// Build all images and save backend and frontend archives
  ExportImages {
    /// Print the plan without running it
    #[arg(long)]
    dry_run: bool,
  },

  /// Remove exported image archives
  Clean {
    /// Print the plan without running it
    #[arg(long)]
    dry_run: bool,
  },

  /// Run a single target and its dependencies
  Target {
    /// Target name (venv, backend, frontend, build-all, export-images, clean)
    name: String,

    /// Print the plan without running it
    #[arg(long)]
    dry_run: bool,
  },

  /// Show the execution order for a target
  Plan {
    /// Target name
    #[arg(default_value = BUILD_ALL_TARGET)]
    name: String,

    /// Output as JSON
    #[arg(long)]
    json: bool,
  },

  /// Validate the environment and start the backend server
  Launch,

  /// Validate the environment without starting anything
  CheckEnv,

  /// Show which upstream serves a request path
  Route {
    /// Request path, e.g. /event
    path: String,
  },

  /// Print a generated deployment file
  Render {
    #[command(subcommand)]
    file: RenderFile,
  },

  /// Show the resolved configuration
  Info {
    /// Output as JSON
    #[arg(long)]
    json: bool,
  },
}

#[derive(Subcommand)]
enum RenderFile {
  /// The TLS reverse proxy server block
  Nginx,

  /// The Dockerfile for an image stage
  Dockerfile {
    /// Stage name (venv, backend, frontend)
    stage: String,
  },
}

fn main() -> Result<()> {
  let cli = Cli::parse();

  let filter = if cli.verbose {
    EnvFilter::new("debug")
  } else {
    EnvFilter::from_default_env()
  };
  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .without_time()
    .init();

  let config = DeployConfig::from_env().context("Invalid configuration")?;

  match cli.command {
    Commands::Build { dry_run } => cmd::cmd_target(&config, BUILD_ALL_TARGET, dry_run),
    Commands::ExportImages { dry_run } => cmd::cmd_target(&config, EXPORT_IMAGES_TARGET, dry_run),
    Commands::Clean { dry_run } => cmd::cmd_target(&config, CLEAN_TARGET, dry_run),
    Commands::Target { name, dry_run } => cmd::cmd_target(&config, &name, dry_run),
    Commands::Plan { name, json } => cmd::cmd_plan(&name, json),
    Commands::Launch => cmd::cmd_launch(&config),
    Commands::CheckEnv => cmd::cmd_check_env(&config),
    Commands::Route { path } => cmd::cmd_route(&config, &path),
    Commands::Render { file } => match file {
      RenderFile::Nginx => cmd::cmd_render_nginx(&config),
      RenderFile::Dockerfile { stage } => cmd::cmd_render_dockerfile(&config, &stage),
    },
    Commands::Info { json } => cmd::cmd_info(&config, json),
  }
}
