//! Reverse proxy routing.
//!
//! Rules are kept most-specific first and evaluated first-match-wins, so every
//! request path resolves to at most one upstream. The same rules render the
//! nginx server block that runs in front of the frontend and backend containers.

pub mod types;

use std::collections::HashSet;
use std::fmt::{self, Write};

use tracing::debug;

use crate::config::DeployConfig;

pub use types::{RouteError, RouteRule, TlsSettings, Upstream};

/// Prefix of the backend's live event channel.
pub const EVENT_PREFIX: &str = "/event";
pub const ROOT_PREFIX: &str = "/";

const ERROR_PAGES_INCLUDE: &str = "/etc/nginx/error_pages.conf";

#[derive(Debug, Clone)]
pub struct Router {
  tls: TlsSettings,
  rules: Vec<RouteRule>,
}

impl Router {
  /// Validate and order the rules by descending prefix length.
  pub fn new(tls: TlsSettings, mut rules: Vec<RouteRule>) -> Result<Self, RouteError> {
    let mut seen = HashSet::new();
    for rule in &rules {
      if !rule.prefix.starts_with('/') {
        return Err(RouteError::InvalidPrefix(rule.prefix.clone()));
      }
      if !seen.insert(rule.prefix.as_str()) {
        return Err(RouteError::DuplicatePrefix(rule.prefix.clone()));
      }
    }

    rules.sort_by(|a, b| b.prefix.len().cmp(&a.prefix.len()));
    Ok(Self { tls, rules })
  }

  /// `/event` to the backend, everything else to the frontend.
  pub fn aprendo(config: &DeployConfig) -> Self {
    let frontend = Upstream::new("frontend", "frontend", 80);
    let backend = Upstream::new("backend", "backend", config.backend_port);

    Self {
      tls: TlsSettings::for_server(&config.server_name),
      rules: vec![
        RouteRule::new(EVENT_PREFIX, backend).websocket(),
        RouteRule::new(ROOT_PREFIX, frontend).websocket().redirect_to_https(),
      ],
    }
  }

  /// Rules in evaluation order.
  pub fn rules(&self) -> &[RouteRule] {
    &self.rules
  }

  /// The rule handling `path`.
  pub fn route(&self, path: &str) -> Result<&RouteRule, RouteError> {
    let rule = self
      .rules
      .iter()
      .find(|rule| rule.matches(path))
      .ok_or_else(|| RouteError::NoMatch(path.to_string()))?;

    debug!(path = %path, prefix = %rule.prefix, upstream = %rule.upstream.name, "route matched");
    Ok(rule)
  }

  /// Render the TLS server block.
  pub fn render_nginx(&self) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = self.write_nginx(&mut out);
    out
  }

  fn write_nginx(&self, out: &mut String) -> fmt::Result {
    let tls = &self.tls;

    writeln!(out, "server {{")?;
    writeln!(out, "    listen {} ssl;", tls.port)?;
    writeln!(out, "    server_name {};", tls.server_name)?;
    writeln!(out)?;
    writeln!(out, "    ssl_certificate {};", tls.certificate.display())?;
    writeln!(out, "    ssl_certificate_key {};", tls.certificate_key.display())?;

    for rule in &self.rules {
      writeln!(out)?;
      writeln!(out, "    location {} {{", rule.prefix)?;
      writeln!(out, "        proxy_pass {};", rule.upstream.url())?;
      writeln!(out, "        proxy_http_version 1.1;")?;
      if rule.websocket {
        writeln!(out, "        proxy_set_header Upgrade $http_upgrade;")?;
        writeln!(out, "        proxy_set_header Connection \"upgrade\";")?;
      }
      writeln!(out, "        proxy_set_header Host $host;")?;
      writeln!(out, "        proxy_set_header X-Forwarded-Proto $scheme;")?;
      if rule.redirect_to_https {
        writeln!(out, "        proxy_redirect http:// https://;")?;
      }
      writeln!(out, "    }}")?;
    }

    writeln!(out)?;
    writeln!(out, "    include {ERROR_PAGES_INCLUDE};")?;
    writeln!(out, "}}")
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn router() -> Router {
    Router::aprendo(&DeployConfig::default())
  }

  #[test]
  fn root_goes_to_frontend() {
    let rule = router().route("/").unwrap().clone();
    assert_eq!(rule.upstream.name, "frontend");
    assert!(rule.redirect_to_https);

    assert_eq!(router().route("/collections/42").unwrap().upstream.name, "frontend");
  }

  #[test]
  fn event_goes_to_backend() {
    let router = router();
    let rule = router.route("/event").unwrap();
    assert_eq!(rule.upstream.name, "backend");
    assert_eq!(rule.upstream.port, 8000);
    assert!(rule.websocket);

    assert_eq!(router.route("/event/socket").unwrap().upstream.name, "backend");
  }

  #[test]
  fn each_path_resolves_to_one_upstream() {
    let router = router();
    for path in ["/", "/event", "/event/", "/login", "/_next/static/app.js", "/eventual"] {
      let rule = router.route(path).unwrap();
      let first = router.rules().iter().find(|r| r.matches(path)).unwrap();
      assert_eq!(rule, first);
    }
    assert_ne!(
      router.route("/").unwrap().upstream,
      router.route("/event").unwrap().upstream
    );
  }

  #[test]
  fn relative_path_has_no_route() {
    assert_eq!(
      router().route("event").unwrap_err(),
      RouteError::NoMatch("event".to_string())
    );
  }

  #[test]
  fn new_orders_most_specific_first() {
    let up = Upstream::new("u", "u", 1);
    let router = Router::new(
      TlsSettings::for_server("example.test"),
      vec![
        RouteRule::new("/", up.clone()),
        RouteRule::new("/api/v1", up.clone()),
        RouteRule::new("/api", up),
      ],
    )
    .unwrap();

    let prefixes: Vec<_> = router.rules().iter().map(|r| r.prefix.as_str()).collect();
    assert_eq!(prefixes, vec!["/api/v1", "/api", "/"]);
  }

  #[test]
  fn new_rejects_bad_rules() {
    let up = Upstream::new("u", "u", 1);
    let tls = TlsSettings::for_server("example.test");

    let err = Router::new(tls.clone(), vec![RouteRule::new("api", up.clone())]).unwrap_err();
    assert_eq!(err, RouteError::InvalidPrefix("api".to_string()));

    let err = Router::new(tls, vec![RouteRule::new("/", up.clone()), RouteRule::new("/", up)]).unwrap_err();
    assert_eq!(err, RouteError::DuplicatePrefix("/".to_string()));
  }

  #[test]
  fn render_nginx_server_block() {
    let config = DeployConfig {
      server_name: "aprendo.example.org".to_string(),
      ..DeployConfig::default()
    };
    let nginx = Router::aprendo(&config).render_nginx();

    assert!(nginx.contains("listen 443 ssl;"));
    assert!(nginx.contains("server_name aprendo.example.org;"));
    assert!(nginx.contains("ssl_certificate /etc/nginx/certs/aprendo.example.org.crt;"));
    assert!(nginx.contains("proxy_pass http://backend:8000;"));
    assert!(nginx.contains("proxy_pass http://frontend:80;"));
    assert!(nginx.contains("proxy_redirect http:// https://;"));
    assert_eq!(nginx.matches("proxy_set_header Upgrade $http_upgrade;").count(), 2);
    assert!(nginx.contains("include /etc/nginx/error_pages.conf;"));
    assert!(nginx.starts_with("server {\n"));
    assert!(nginx.ends_with("    include /etc/nginx/error_pages.conf;\n}\n"));

    let event = nginx.find("location /event {").unwrap();
    let root = nginx.find("location / {").unwrap();
    assert!(event < root);
  }
}
