use log::*;

use crate::db::Repository;
use crate::error::*;
use crate::forms::*;
use crate::images::{ImageService, Upload};
use crate::util::now;

use super::*;

/// Ids of an (article, reader) pair, both checked to exist.
async fn article_and_author(db: &dyn Repository, article_id: Option<&str>, author_id: Option<&str>) -> Result<(Article, Author)> {
  let article_id = require_id(article_id, "article id")?;
  let author_id = require_id(author_id, "author id")?;
  let article = existing_article(db, article_id).await?;
  let author = existing_author(db, author_id).await?;
  Ok((article, author))
}

async fn optional_author(db: &dyn Repository, author_id: Option<&str>) -> Result<Option<i32>> {
  match optional_id(author_id, "author id")? {
    Some(author_id) => Ok(Some(existing_author(db, author_id).await?.id)),
    None => Ok(None),
  }
}

pub async fn create(
  db: &dyn Repository,
  images: &ImageService,
  id: Option<&str>,
  fields: &FormFields,
  image: Option<&Upload>,
) -> Result<Article> {
  let author_id = require_id(id, "id")?;
  existing_author(db, author_id).await?;
  let form: CreateArticle = parse_form(fields)?;

  let image = match image {
    Some(upload) => Some(images.upload(upload).await?),
    None => None,
  };
  let stored = db.store_article(&NewArticle {
    author_id,
    title: form.title,
    text: form.text,
    image: image.clone(),
  }).await;

  match stored {
    Ok(article) => {
      info!("Article created: id={}, author={}", article.id, author_id);
      Ok(article)
    },
    Err(err) => {
      if let Some(url) = image {
        images.discard(&url).await;
      }
      Err(err)
    },
  }
}

/// Fetch an article on behalf of a reader, recording one view.
pub async fn get(db: &dyn Repository, id: Option<&str>, author_id: Option<&str>) -> Result<Article> {
  let author_id = require_id(author_id, "author id")?;
  let article_id = require_id(id, "id")?;
  existing_author(db, author_id).await?;
  let article = existing_article(db, article_id).await?;

  db.store_interaction(InteractionKind::View, author_id, article_id).await?;
  Ok(article)
}

pub async fn update(
  db: &dyn Repository,
  images: &ImageService,
  author_id: Option<&str>,
  id: Option<&str>,
  fields: &FormFields,
  image: Option<&Upload>,
) -> Result<Article> {
  let author_id = require_id(author_id, "author id")?;
  existing_author(db, author_id).await?;
  let article_id = require_id(id, "id")?;
  let mut article = existing_article(db, article_id).await?;
  if !article.is_written_by(author_id) {
    return Err(Error::Forbidden("You can only edit your own articles!".to_string()));
  }
  let form: UpdateArticle = parse_form(fields)?;

  if let Some(title) = form.title {
    article.title = title;
  }
  if let Some(text) = form.text {
    article.text = text;
  }
  let replaced = match image {
    Some(upload) => {
      let url = images.upload(upload).await?;
      article.image.replace(url)
    },
    None => None,
  };
  article.date_edited = Some(now());

  if let Err(err) = db.update_article(&article).await {
    if let Some(url) = &article.image {
      if replaced.as_ref() != Some(url) {
        images.discard(url).await;
      }
    }
    return Err(err);
  }
  // an upload under the same name has already overwritten the old image
  if let Some(old) = replaced.filter(|old| article.image.as_ref() != Some(old)) {
    images.discard(&old).await;
  }
  Ok(article)
}

pub async fn delete(db: &dyn Repository, images: &ImageService, id: Option<&str>) -> Result<Article> {
  let article_id = require_id(id, "id")?;
  let article = existing_article(db, article_id).await?;

  db.delete_article(article_id).await?;
  if let Some(image) = &article.image {
    images.discard(image).await;
  }
  info!("Article deleted: id={}", article_id);
  Ok(article)
}

pub async fn list(db: &dyn Repository, author_id: Option<&str>) -> Result<Vec<Article>> {
  let author_id = optional_author(db, author_id).await?;
  db.all_articles(author_id).await
}

pub async fn comments(db: &dyn Repository, id: Option<&str>, author_id: Option<&str>) -> Result<Vec<Comment>> {
  let article_id = require_id(id, "id")?;
  existing_article(db, article_id).await?;
  let author_id = optional_author(db, author_id).await?;
  db.article_comments(article_id, author_id).await
}

/// Likes, bookmarks, views or shares of an article.
pub async fn interactions(
  db: &dyn Repository,
  kind: InteractionKind,
  id: Option<&str>,
  author_id: Option<&str>,
) -> Result<Vec<Interaction>> {
  let article_id = require_id(id, "id")?;
  existing_article(db, article_id).await?;
  let author_id = optional_author(db, author_id).await?;
  db.article_interactions(kind, article_id, author_id).await
}

pub async fn tags(db: &dyn Repository, id: Option<&str>) -> Result<ArticleTags> {
  let article_id = require_id(id, "id")?;
  let article = existing_article(db, article_id).await?;
  Ok(ArticleTags {
    article_id,
    tags: article.tags,
  })
}

pub async fn stats(db: &dyn Repository, id: Option<&str>) -> Result<ArticleStats> {
  let article_id = require_id(id, "id")?;
  existing_article(db, article_id).await?;
  db.article_stats(article_id).await
}

/// Like, bookmark or share an article.
///
/// Likes and bookmarks can only be given once per reader.
pub async fn interact(
  db: &dyn Repository,
  kind: InteractionKind,
  article_id: Option<&str>,
  author_id: Option<&str>,
) -> Result<Interaction> {
  let (article, author) = article_and_author(db, article_id, author_id).await?;
  if kind.is_unique() && db.find_interaction(kind, author.id, article.id).await?.is_some() {
    return Err(Error::Invalid(format!("You have already {} this article!", kind.past_tense())));
  }
  let interaction = db.store_interaction(kind, author.id, article.id).await?;
  debug!("Stored {}: article={}, author={}", kind, article.id, author.id);
  Ok(interaction)
}

/// Take back a like or bookmark.
pub async fn uninteract(
  db: &dyn Repository,
  kind: InteractionKind,
  article_id: Option<&str>,
  author_id: Option<&str>,
) -> Result<Interaction> {
  let (article, author) = article_and_author(db, article_id, author_id).await?;
  let interaction = db.find_interaction(kind, author.id, article.id).await?
    .ok_or_else(|| Error::Invalid(format!("You have not {} this article!", kind.past_tense())))?;
  db.delete_interaction(kind, interaction.id).await?;
  Ok(interaction)
}

async fn owned_article_tag(
  db: &dyn Repository,
  params: &InteractionParams,
  action: &str,
) -> Result<(Article, String)> {
  let tag = match params.tag.as_deref() {
    Some(tag) if !tag.is_empty() => tag.to_string(),
    _ => return Err(Error::Invalid("The tag has to be provided!".to_string())),
  };
  validate(&TagForm { tag: tag.clone() })?;

  let (article, author) = article_and_author(db,
    params.article_id.as_deref(), params.author_id.as_deref()).await?;
  if !article.is_written_by(author.id) {
    return Err(Error::Forbidden(format!("You can only {} your articles!", action)));
  }
  Ok((article, tag))
}

pub async fn tag(db: &dyn Repository, params: &InteractionParams) -> Result<ArticleTags> {
  let (mut article, tag) = owned_article_tag(db, params, "tag").await?;
  if article.has_tag(&tag) {
    return Err(Error::Invalid(format!("The article is already tagged as {}", tag)));
  }
  article.tags.push(tag);
  db.update_article(&article).await?;
  Ok(ArticleTags {
    article_id: article.id,
    tags: article.tags,
  })
}

pub async fn untag(db: &dyn Repository, params: &InteractionParams) -> Result<ArticleTags> {
  let (mut article, tag) = owned_article_tag(db, params, "untag").await?;
  if !article.has_tag(&tag) {
    return Err(Error::Invalid(format!("The article is not tagged as {}", tag)));
  }
  article.tags.retain(|t| *t != tag);
  db.update_article(&article).await?;
  Ok(ArticleTags {
    article_id: article.id,
    tags: article.tags,
  })
}

pub async fn comment(
  db: &dyn Repository,
  article_id: Option<&str>,
  author_id: Option<&str>,
  form: CreateComment,
) -> Result<Comment> {
  let (article, author) = article_and_author(db, article_id, author_id).await?;
  validate(&form)?;
  db.store_comment(&NewComment {
    author_id: author.id,
    article_id: article.id,
    comment: form.comment,
  }).await
}

/// Delete a comment; only its author may.
pub async fn uncomment(db: &dyn Repository, comment_id: Option<&str>, author_id: Option<&str>) -> Result<Comment> {
  let comment_id = require_id(comment_id, "comment id")?;
  let author_id = require_id(author_id, "author id")?;
  let comment = existing_comment(db, comment_id).await?;
  existing_author(db, author_id).await?;
  if comment.author_id != author_id {
    return Err(Error::Forbidden("You can only delete your own comments!".to_string()));
  }
  db.delete_comment(comment_id).await?;
  Ok(comment)
}

pub async fn report(
  db: &dyn Repository,
  article_id: Option<&str>,
  author_id: Option<&str>,
  form: CreateReport,
) -> Result<Report> {
  let (article, author) = article_and_author(db, article_id, author_id).await?;
  validate(&form)?;
  let report = db.store_report(&NewReport {
    author_id: author.id,
    article_id: article.id,
    reason: form.reason,
  }).await?;
  warn!("Article {} reported by author {}", article.id, author.id);
  Ok(report)
}
