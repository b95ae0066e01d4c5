//! Runtime configuration, deserialised from `config.toml` and `DETAX_*`
//! environment variables.

use std::{
  path::{Path, PathBuf},
  time::Duration,
};

use detax_core::channel::{Channel, ChannelCatalog};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:                String,
  #[serde(default = "default_port")]
  pub port:                u16,
  #[serde(default = "default_store_path")]
  pub store_path:          PathBuf,
  /// Seconds between background audit checks. Unset or `0` disables them.
  #[serde(default)]
  pub audit_interval_secs: Option<u64>,
  /// Replaces the built-in channel catalog when present.
  #[serde(default)]
  pub channels:            Option<Vec<Channel>>,
}

fn default_host() -> String { "127.0.0.1".to_owned() }

fn default_port() -> u16 { 8080 }

fn default_store_path() -> PathBuf { PathBuf::from("detax.sqlite3") }

impl ServerConfig {
  /// Layer the optional TOML file at `path` under `DETAX_`-prefixed
  /// environment variables.
  pub fn load(path: &Path) -> Result<Self, config::ConfigError> {
    config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(config::Environment::with_prefix("DETAX"))
      .build()?
      .try_deserialize()
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }

  pub fn audit_interval(&self) -> Option<Duration> {
    self
      .audit_interval_secs
      .filter(|secs| *secs > 0)
      .map(Duration::from_secs)
  }

  pub fn catalog(&self) -> detax_core::Result<ChannelCatalog> {
    match &self.channels {
      Some(channels) => ChannelCatalog::new(channels.clone()),
      None => Ok(ChannelCatalog::default()),
    }
  }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

#[cfg(test)]
mod tests {
  use config::{File, FileFormat};

  use super::*;

  fn parse(toml: &str) -> ServerConfig {
    config::Config::builder()
      .add_source(File::from_str(toml, FileFormat::Toml))
      .build()
      .unwrap()
      .try_deserialize()
      .unwrap()
  }

  #[test]
  fn empty_file_uses_defaults() {
    let cfg = parse("");
    assert_eq!(cfg.address(), "127.0.0.1:8080");
    assert_eq!(cfg.store_path, PathBuf::from("detax.sqlite3"));
    assert!(cfg.audit_interval().is_none());
    assert_eq!(cfg.catalog().unwrap(), ChannelCatalog::default());
  }

  #[test]
  fn zero_interval_disables_audit() {
    assert!(parse("audit_interval_secs = 0").audit_interval().is_none());
    assert_eq!(
      parse("audit_interval_secs = 300").audit_interval(),
      Some(Duration::from_secs(300))
    );
  }

  #[test]
  fn channels_override_the_catalog() {
    let cfg = parse(
      r#"
      [[channels]]
      id = "default"
      name = "General"

      [[channels]]
      id = "cit"
      name = "CIT"
      keywords = ["CIT", "zaliczka"]
      "#,
    );
    let catalog = cfg.catalog().unwrap();
    let ids: Vec<&str> = catalog.channels().iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, ["default", "cit"]);
    assert!(catalog.classify("Zaliczka na podatek").contains("cit"));
  }

  #[test]
  fn catalog_without_default_is_an_error() {
    let cfg = parse(
      r#"
      [[channels]]
      id = "vat"
      name = "VAT"
      "#,
    );
    assert!(cfg.catalog().is_err());
  }

  #[test]
  fn tilde_expands_to_home() {
    let plain = Path::new("/var/lib/detax.sqlite3");
    assert_eq!(expand_tilde(plain), plain);
    if let Ok(home) = std::env::var("HOME") {
      assert_eq!(
        expand_tilde(Path::new("~/detax.sqlite3")),
        PathBuf::from(home).join("detax.sqlite3")
      );
    }
  }
}
