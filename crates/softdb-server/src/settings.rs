//! Runtime configuration, layered from defaults, an optional TOML file and
//! `SOFTDB_*` environment variables (later sources win).

use std::path::{Path, PathBuf};

use serde::Deserialize;

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ServerConfig {
  pub host:          String,
  pub port:          u16,
  pub database_path: PathBuf,
  /// Prepended to every table name.
  pub table_prefix:  String,
}

impl ServerConfig {
  pub fn load(file: &Path) -> Result<Self, config::ConfigError> {
    config::Config::builder()
      .set_default("host", "127.0.0.1")?
      .set_default("port", 8080)?
      .set_default("database_path", "softdb.sqlite3")?
      .set_default("table_prefix", "")?
      .add_source(config::File::from(file).required(false))
      .add_source(config::Environment::with_prefix("SOFTDB"))
      .build()?
      .try_deserialize()
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
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
