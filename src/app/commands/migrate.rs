use log::*;

use anyhow::Context;

use actix_rt::System;

use crate::{
  error::*,
  app::*,
  db::connect_once,
};

/// Schema of every table, safe to apply more than once.
pub const SCHEMA: &str = include_str!("../../../migrations/schema.sql");

async fn apply_schema(url: String) -> Result<()> {
  let cl = connect_once(&url).await?;
  cl.batch_execute(SCHEMA).await
    .context("applying migrations/schema.sql")?;
  Ok(())
}

pub fn execute(config: AppConfig) -> Result<()> {
  let url = config.require_str("db.url")?;
  info!("Migrate: applying schema.");
  System::new().block_on(apply_schema(url))?;
  info!("Migrate: finished.");
  Ok(())
}
