//! Implementation of the `route` command.

use anyhow::Result;

use aprendo_deploy::config::DeployConfig;
use aprendo_deploy::route::Router;

use crate::output::{print_stat, print_success, print_warning};

pub fn cmd_route(config: &DeployConfig, path: &str) -> Result<()> {
  let router = Router::aprendo(config);

  match router.route(path) {
    Ok(rule) => {
      print_success(&format!("{} -> {}", path, rule.upstream));
      print_stat("Location", &rule.prefix);
      print_stat("WebSocket", &rule.websocket.to_string());
      print_stat("HTTPS redirects", &rule.redirect_to_https.to_string());
      Ok(())
    }
    Err(e) => {
      print_warning(&format!("{} (served by the shared error pages)", e));
      Err(e.into())
    }
  }
}
