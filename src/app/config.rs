use serde::de::Deserialize;

use std::path::PathBuf;

use clap::ArgMatches;
use config::{Config, ConfigError, Environment, File, FileFormat};

use crate::error::*;

#[derive(Debug, Clone)]
pub struct AppConfig {
  pub conf: Config
}

impl AppConfig {
  pub fn new_clap(cli: &ArgMatches) -> Result<Self> {
    // Load defaults
    let mut builder = Config::builder()
      .add_source(File::with_name("conf/default"));

    if let Some(config_file) = cli.get_one::<String>("config") {
      builder = builder.add_source(File::with_name(config_file));
    } else {
      // Get RUN_MODE from environment
      let env = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".into());
      builder = builder
        .add_source(File::with_name(&format!("conf/{}", env)).required(false))
        // Allow overrides from environment
        .add_source(Environment::with_prefix("app").separator("_"));
    }

    Ok(AppConfig {
      conf: builder.build()?,
    })
  }

  /// Build config from an in-memory toml document.
  pub fn from_toml(toml: &str) -> Result<Self> {
    let conf = Config::builder()
      .add_source(File::from_str(toml, FileFormat::Toml))
      .build()?;
    Ok(AppConfig {
      conf,
    })
  }

  pub fn get<'de, T: Deserialize<'de>>(&self, key: &str) -> Result<Option<T>> {
    Ok(self.conf.get(key).map(Some).or_else(|e| {
      match e {
        ConfigError::NotFound(_) => Ok(None),
        err => Err(err),
      }
    })?)
  }

  pub fn get_str(&self, key: &str) -> Result<Option<String>> {
    self.get::<String>(key)
  }

  pub fn get_path(&self, key: &str) -> Result<Option<PathBuf>> {
    Ok(self.get_str(key)?.map(PathBuf::from))
  }

  pub fn get_int(&self, key: &str) -> Result<Option<i64>> {
    self.get::<i64>(key)
  }

  pub fn get_bool(&self, key: &str) -> Result<Option<bool>> {
    self.get::<bool>(key)
  }

  pub fn get_array(&self, key: &str) -> Result<Option<Vec<String>>> {
    self.get::<Vec<String>>(key)
  }

  /// Get a required string value.
  pub fn require_str(&self, key: &str) -> Result<String> {
    self.get_str(key)?.ok_or_else(|| Error::InvalidConfig(format!("{} must be set", key)))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  const CONF: &str = r#"
debug = true
servers = ["api"]

[api]
listen = "127.0.0.1:8080"
workers = 2
services = ["Health", "Article"]

[db]
backend = "memory"
"#;

  #[test]
  fn typed_getters() {
    let config = AppConfig::from_toml(CONF).unwrap();
    assert_eq!(config.get_bool("debug").unwrap(), Some(true));
    assert_eq!(config.get_int("api.workers").unwrap(), Some(2));
    assert_eq!(config.get_str("api.listen").unwrap().as_deref(), Some("127.0.0.1:8080"));
    assert_eq!(config.get_array("api.services").unwrap(),
      Some(vec!["Health".to_string(), "Article".to_string()]));
  }

  #[test]
  fn missing_keys_are_none() {
    let config = AppConfig::from_toml(CONF).unwrap();
    assert_eq!(config.get_str("db.url").unwrap(), None);
    assert_eq!(config.get_path("images.upload_dir").unwrap(), None);
    assert!(matches!(config.require_str("db.url"), Err(Error::InvalidConfig(_))));
  }
}
