use log::*;

use crate::error::*;

use super::{
  SharedClient,
  AuthorService,
  ArticleService,
  CommentService,
  InteractionService,
};

/// PostgreSQL backed repository: one set of prepared statements per table
/// group, all sharing the worker's connection.
#[derive(Clone)]
pub struct DbService {
  pub shared_cl: SharedClient,
  pub author: AuthorService,
  pub article: ArticleService,
  pub comment: CommentService,
  pub interaction: InteractionService,
}

impl DbService {
  pub fn new(db_url: &str) -> DbService {
    let shared_cl = SharedClient::new(db_url);

    DbService {
      author: AuthorService::new(shared_cl.clone()),
      article: ArticleService::new(shared_cl.clone()),
      comment: CommentService::new(shared_cl.clone()),
      interaction: InteractionService::new(shared_cl.clone()),
      shared_cl,
    }
  }

  /// Prepare every statement up front, to catch broken queries at startup.
  pub async fn prepare(&self) -> Result<()> {
    info!("DBService: Prepare AuthorService.");
    self.author.prepare().await?;
    info!("DBService: Prepare ArticleService.");
    self.article.prepare().await?;
    info!("DBService: Prepare CommentService.");
    self.comment.prepare().await?;
    info!("DBService: Prepare InteractionService.");
    self.interaction.prepare().await?;

    info!("DBService: finished.");
    Ok(())
  }
}
