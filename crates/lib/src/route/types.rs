//! Types for reverse proxy routing.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RouteError {
  #[error("route prefix must start with '/': {0:?}")]
  InvalidPrefix(String),

  #[error("duplicate route prefix: {0}")]
  DuplicatePrefix(String),

  /// No rule applies; the request falls through to the shared error pages.
  #[error("no route matches {0:?}")]
  NoMatch(String),
}

/// A service a matched request is forwarded to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Upstream {
  pub name: String,
  pub host: String,
  pub port: u16,
}

impl Upstream {
  pub fn new(name: impl Into<String>, host: impl Into<String>, port: u16) -> Self {
    Self {
      name: name.into(),
      host: host.into(),
      port,
    }
  }

  pub fn url(&self) -> String {
    format!("http://{}:{}", self.host, self.port)
  }
}

impl fmt::Display for Upstream {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{} ({})", self.name, self.url())
  }
}

/// One path-prefix rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteRule {
  pub prefix: String,
  pub upstream: Upstream,
  /// Forward `Upgrade`/`Connection` headers for WebSocket traffic.
  pub websocket: bool,
  /// Rewrite plaintext redirects from the upstream to `https://`.
  pub redirect_to_https: bool,
}

impl RouteRule {
  pub fn new(prefix: impl Into<String>, upstream: Upstream) -> Self {
    Self {
      prefix: prefix.into(),
      upstream,
      websocket: false,
      redirect_to_https: false,
    }
  }

  pub fn websocket(mut self) -> Self {
    self.websocket = true;
    self
  }

  pub fn redirect_to_https(mut self) -> Self {
    self.redirect_to_https = true;
    self
  }

  /// Prefix match as performed by an nginx prefix `location`.
  pub fn matches(&self, path: &str) -> bool {
    path.starts_with(&self.prefix)
  }
}

/// TLS termination settings for the single served name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TlsSettings {
  pub server_name: String,
  pub port: u16,
  pub certificate: PathBuf,
  pub certificate_key: PathBuf,
}

impl TlsSettings {
  /// Certificates are expected under `/etc/nginx/certs/<server_name>.{crt,key}`.
  pub fn for_server(server_name: impl Into<String>) -> Self {
    let server_name = server_name.into();
    let certs = PathBuf::from("/etc/nginx/certs");
    Self {
      certificate: certs.join(format!("{server_name}.crt")),
      certificate_key: certs.join(format!("{server_name}.key")),
      server_name,
      port: 443,
    }
  }
}
