use async_trait::async_trait;

use crate::error::*;
use crate::models::*;

#[async_trait(?Send)]
pub trait AuthorRepo {
  async fn author_by_id(&self, author_id: i32) -> Result<Option<Author>>;

  async fn author_by_email(&self, email: &str) -> Result<Option<Author>>;

  async fn all_authors(&self) -> Result<Vec<Author>>;

  async fn store_author(&self, author: &NewAuthor) -> Result<Author>;

  /// Store changed name/email.
  async fn update_author(&self, author: &Author) -> Result<u64>;

  /// Delete an author with everything they published or did.
  async fn delete_author(&self, author_id: i32) -> Result<u64>;

  async fn author_stats(&self, author_id: i32) -> Result<AuthorStats>;
}

#[async_trait(?Send)]
pub trait ArticleRepo {
  async fn article_by_id(&self, article_id: i32) -> Result<Option<Article>>;

  /// All articles, or only those of one author. Ordered by id.
  async fn all_articles(&self, author_id: Option<i32>) -> Result<Vec<Article>>;

  async fn store_article(&self, article: &NewArticle) -> Result<Article>;

  /// Store title, text, image, date_edited and tags.
  async fn update_article(&self, article: &Article) -> Result<u64>;

  /// Delete an article with its comments and interactions.
  async fn delete_article(&self, article_id: i32) -> Result<u64>;

  async fn article_stats(&self, article_id: i32) -> Result<ArticleStats>;

  /// Distinct articles an author has liked/bookmarked/viewed/shared.
  async fn articles_by_interaction(&self, kind: InteractionKind, author_id: i32) -> Result<Vec<Article>>;

  /// Distinct articles an author has commented on.
  async fn articles_commented(&self, author_id: i32) -> Result<Vec<Article>>;
}

#[async_trait(?Send)]
pub trait CommentRepo {
  async fn comment_by_id(&self, comment_id: i32) -> Result<Option<Comment>>;

  async fn store_comment(&self, comment: &NewComment) -> Result<Comment>;

  async fn delete_comment(&self, comment_id: i32) -> Result<u64>;

  async fn article_comments(&self, article_id: i32, author_id: Option<i32>) -> Result<Vec<Comment>>;
}

#[async_trait(?Send)]
pub trait InteractionRepo {
  async fn find_interaction(&self, kind: InteractionKind, author_id: i32, article_id: i32) -> Result<Option<Interaction>>;

  async fn store_interaction(&self, kind: InteractionKind, author_id: i32, article_id: i32) -> Result<Interaction>;

  async fn delete_interaction(&self, kind: InteractionKind, interaction_id: i32) -> Result<u64>;

  async fn article_interactions(&self, kind: InteractionKind, article_id: i32, author_id: Option<i32>) -> Result<Vec<Interaction>>;

  async fn store_report(&self, report: &NewReport) -> Result<Report>;
}

/// Everything the controllers need from storage.
pub trait Repository: AuthorRepo + ArticleRepo + CommentRepo + InteractionRepo {}

impl<T> Repository for T
where
  T: AuthorRepo + ArticleRepo + CommentRepo + InteractionRepo,
{
}
