use std::sync::Arc;

use crate::app::AppConfig;
use crate::error::*;

pub mod util;

mod repository;
pub use repository::*;

mod client;
pub use client::*;

mod author;
mod article;
mod comment;
mod interaction;
pub use self::{
  author::*,
  article::*,
  comment::*,
  interaction::*,
};

mod service;
pub use service::*;

mod memory;
pub use memory::*;

/// Which storage the workers use.
#[derive(Clone)]
pub enum Backend {
  /// Each worker opens its own connection to this url.
  Postgres(String),
  /// One store shared by all workers.
  Memory(Arc<MemoryStore>),
}

impl Backend {
  pub fn from_config(config: &AppConfig) -> Result<Backend> {
    let backend = config.get_str("db.backend")?.unwrap_or_else(|| "postgres".to_string());
    match backend.as_str() {
      "postgres" => Ok(Backend::Postgres(config.require_str("db.url")?)),
      "memory" => Ok(Backend::Memory(Arc::new(MemoryStore::new()))),
      other => Err(Error::InvalidConfig(format!("unknown db.backend: {}", other))),
    }
  }

  /// Create the repository for one worker.
  pub fn repository(&self) -> Arc<dyn Repository> {
    match self {
      Backend::Postgres(url) => Arc::new(DbService::new(url)),
      Backend::Memory(store) => store.clone(),
    }
  }
}
