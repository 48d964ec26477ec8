use log::*;

use crate::db::Repository;
use crate::error::*;
use crate::forms::*;
use crate::images::ImageService;

use super::*;

async fn check_email_free(db: &dyn Repository, email: &str, author_id: Option<i32>) -> Result<()> {
  match db.author_by_email(email).await? {
    Some(other) if Some(other.id) != author_id => {
      Err(Error::Invalid(format!("The user with email address {} exists", email)))
    },
    _ => Ok(()),
  }
}

pub async fn create(db: &dyn Repository, fields: &FormFields) -> Result<Author> {
  let form: CreateAuthor = parse_form(fields)?;
  check_email_free(db, &form.email_address, None).await?;

  let author = db.store_author(&NewAuthor {
    name: form.name,
    email_address: form.email_address,
  }).await?;
  info!("Author created: id={}", author.id);
  Ok(author)
}

pub async fn get(db: &dyn Repository, id: Option<&str>) -> Result<Author> {
  let author_id = require_id(id, "id")?;
  existing_author(db, author_id).await
}

pub async fn update(db: &dyn Repository, id: Option<&str>, fields: &FormFields) -> Result<Author> {
  let author_id = require_id(id, "id")?;
  let mut author = existing_author(db, author_id).await?;
  let form: UpdateAuthor = parse_form(fields)?;

  if let Some(name) = form.name {
    author.name = name;
  }
  if let Some(email_address) = form.email_address {
    check_email_free(db, &email_address, Some(author_id)).await?;
    author.email_address = email_address;
  }
  db.update_author(&author).await?;
  Ok(author)
}

/// Delete an author, the images of their articles and (cascading) all their rows.
pub async fn delete(db: &dyn Repository, images: &ImageService, id: Option<&str>) -> Result<Author> {
  let author_id = require_id(id, "id")?;
  let author = existing_author(db, author_id).await?;

  let articles = db.all_articles(Some(author_id)).await?;
  db.delete_author(author_id).await?;
  for image in articles.iter().filter_map(|article| article.image.as_deref()) {
    images.discard(image).await;
  }
  info!("Author deleted: id={}", author_id);
  Ok(author)
}

pub async fn list(db: &dyn Repository) -> Result<Vec<Author>> {
  db.all_authors().await
}

pub async fn articles_published(db: &dyn Repository, id: Option<&str>) -> Result<Vec<Article>> {
  let author_id = require_id(id, "id")?;
  existing_author(db, author_id).await?;
  db.all_articles(Some(author_id)).await
}

/// Articles the author liked, bookmarked, viewed or shared.
pub async fn articles_interacted(db: &dyn Repository, kind: InteractionKind, id: Option<&str>) -> Result<Vec<Article>> {
  let author_id = require_id(id, "id")?;
  existing_author(db, author_id).await?;
  db.articles_by_interaction(kind, author_id).await
}

pub async fn articles_commented(db: &dyn Repository, id: Option<&str>) -> Result<Vec<Article>> {
  let author_id = require_id(id, "id")?;
  existing_author(db, author_id).await?;
  db.articles_commented(author_id).await
}

pub async fn stats(db: &dyn Repository, id: Option<&str>) -> Result<AuthorStats> {
  let author_id = require_id(id, "id")?;
  existing_author(db, author_id).await?;
  db.author_stats(author_id).await
}
