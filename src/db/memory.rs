use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::error::*;
use crate::models::*;
use crate::util::now;

use crate::db::*;

#[derive(Default)]
struct Tables {
  next_id: HashMap<&'static str, i32>,

  authors: BTreeMap<i32, Author>,
  articles: BTreeMap<i32, Article>,
  comments: BTreeMap<i32, Comment>,
  interactions: HashMap<InteractionKind, BTreeMap<i32, Interaction>>,
  reports: BTreeMap<i32, Report>,
}

impl Tables {
  fn next_id(&mut self, table: &'static str) -> i32 {
    let id = self.next_id.entry(table).or_insert(0);
    *id += 1;
    *id
  }

  fn interactions(&self, kind: InteractionKind) -> impl Iterator<Item = &Interaction> {
    self.interactions.get(&kind).into_iter().flat_map(|rows| rows.values())
  }

  fn check_refs(&self, author_id: i32, article_id: i32) -> Result<()> {
    if !self.authors.contains_key(&author_id) || !self.articles.contains_key(&article_id) {
      return Err(Error::Invalid("The referenced author or article does not exist.".to_string()));
    }
    Ok(())
  }

  fn articles_in(&self, ids: BTreeSet<i32>) -> Vec<Article> {
    ids.iter().filter_map(|id| self.articles.get(id)).cloned().collect()
  }

  fn count_interactions(&self, kind: InteractionKind, pred: impl Fn(&Interaction) -> bool) -> i64 {
    self.interactions(kind).filter(|row| pred(*row)).count() as i64
  }

  fn remove_article(&mut self, article_id: i32) -> bool {
    if self.articles.remove(&article_id).is_none() {
      return false;
    }
    self.comments.retain(|_, c| c.article_id != article_id);
    for rows in self.interactions.values_mut() {
      rows.retain(|_, i| i.article_id != article_id);
    }
    self.reports.retain(|_, r| r.article_id != article_id);
    true
  }
}

/// Repository kept in process memory, shared by every worker.
///
/// Follows the same rules as the postgres schema: serial ids per table,
/// unique author email, unique like/bookmark per (author, article) and
/// cascading deletes.
#[derive(Default)]
pub struct MemoryStore {
  tables: Mutex<Tables>,
}

impl MemoryStore {
  pub fn new() -> MemoryStore {
    MemoryStore::default()
  }

  fn lock(&self) -> Result<MutexGuard<'_, Tables>> {
    self.tables.lock().map_err(|_| Error::InternalServerError)
  }
}

#[async_trait(?Send)]
impl AuthorRepo for MemoryStore {
  async fn author_by_id(&self, author_id: i32) -> Result<Option<Author>> {
    Ok(self.lock()?.authors.get(&author_id).cloned())
  }

  async fn author_by_email(&self, email: &str) -> Result<Option<Author>> {
    let tables = self.lock()?;
    let found = tables.authors.values().find(|a| a.email_address == email).cloned();
    Ok(found)
  }

  async fn all_authors(&self) -> Result<Vec<Author>> {
    Ok(self.lock()?.authors.values().cloned().collect())
  }

  async fn store_author(&self, author: &NewAuthor) -> Result<Author> {
    let mut tables = self.lock()?;
    if tables.authors.values().any(|a| a.email_address == author.email_address) {
      return Err(Error::Invalid("That record already exists.".to_string()));
    }
    let row = Author {
      id: tables.next_id("authors"),
      name: author.name.clone(),
      email_address: author.email_address.clone(),
      created_at: now(),
    };
    tables.authors.insert(row.id, row.clone());
    Ok(row)
  }

  async fn update_author(&self, author: &Author) -> Result<u64> {
    let mut tables = self.lock()?;
    if tables.authors.values().any(|a| a.id != author.id && a.email_address == author.email_address) {
      return Err(Error::Invalid("That record already exists.".to_string()));
    }
    match tables.authors.get_mut(&author.id) {
      Some(row) => {
        row.name = author.name.clone();
        row.email_address = author.email_address.clone();
        Ok(1)
      },
      None => Ok(0),
    }
  }

  async fn delete_author(&self, author_id: i32) -> Result<u64> {
    let mut tables = self.lock()?;
    if tables.authors.remove(&author_id).is_none() {
      return Ok(0);
    }
    let articles: Vec<i32> = tables.articles.values()
      .filter(|a| a.author_id == author_id)
      .map(|a| a.id)
      .collect();
    for article_id in articles {
      tables.remove_article(article_id);
    }
    tables.comments.retain(|_, c| c.author_id != author_id);
    for rows in tables.interactions.values_mut() {
      rows.retain(|_, i| i.author_id != author_id);
    }
    tables.reports.retain(|_, r| r.author_id != author_id);
    Ok(1)
  }

  async fn author_stats(&self, author_id: i32) -> Result<AuthorStats> {
    let tables = self.lock()?;
    let by_author = |row: &Interaction| row.author_id == author_id;
    Ok(AuthorStats {
      articles_published: tables.articles.values().filter(|a| a.author_id == author_id).count() as i64,
      likes: tables.count_interactions(InteractionKind::Like, by_author),
      bookmarks: tables.count_interactions(InteractionKind::Bookmark, by_author),
      views: tables.count_interactions(InteractionKind::View, by_author),
      comments: tables.comments.values().filter(|c| c.author_id == author_id).count() as i64,
      shares: tables.count_interactions(InteractionKind::Share, by_author),
    })
  }
}

#[async_trait(?Send)]
impl ArticleRepo for MemoryStore {
  async fn article_by_id(&self, article_id: i32) -> Result<Option<Article>> {
    Ok(self.lock()?.articles.get(&article_id).cloned())
  }

  async fn all_articles(&self, author_id: Option<i32>) -> Result<Vec<Article>> {
    let tables = self.lock()?;
    Ok(tables.articles.values()
      .filter(|a| author_id.map_or(true, |id| a.author_id == id))
      .cloned()
      .collect())
  }

  async fn store_article(&self, article: &NewArticle) -> Result<Article> {
    let mut tables = self.lock()?;
    if !tables.authors.contains_key(&article.author_id) {
      return Err(Error::Invalid("The referenced author or article does not exist.".to_string()));
    }
    let row = Article {
      id: tables.next_id("articles"),
      author_id: article.author_id,
      title: article.title.clone(),
      text: article.text.clone(),
      image: article.image.clone(),
      date_published: now(),
      date_edited: None,
      tags: default_tags(),
    };
    tables.articles.insert(row.id, row.clone());
    Ok(row)
  }

  async fn update_article(&self, article: &Article) -> Result<u64> {
    let mut tables = self.lock()?;
    match tables.articles.get_mut(&article.id) {
      Some(row) => {
        row.title = article.title.clone();
        row.text = article.text.clone();
        row.image = article.image.clone();
        row.date_edited = article.date_edited;
        row.tags = article.tags.clone();
        Ok(1)
      },
      None => Ok(0),
    }
  }

  async fn delete_article(&self, article_id: i32) -> Result<u64> {
    let mut tables = self.lock()?;
    Ok(if tables.remove_article(article_id) { 1 } else { 0 })
  }

  async fn article_stats(&self, article_id: i32) -> Result<ArticleStats> {
    let tables = self.lock()?;
    let on_article = |row: &Interaction| row.article_id == article_id;
    Ok(ArticleStats {
      views: tables.count_interactions(InteractionKind::View, on_article),
      likes: tables.count_interactions(InteractionKind::Like, on_article),
      comments: tables.comments.values().filter(|c| c.article_id == article_id).count() as i64,
      bookmarks: tables.count_interactions(InteractionKind::Bookmark, on_article),
      shares: tables.count_interactions(InteractionKind::Share, on_article),
    })
  }

  async fn articles_by_interaction(&self, kind: InteractionKind, author_id: i32) -> Result<Vec<Article>> {
    let tables = self.lock()?;
    let ids = tables.interactions(kind)
      .filter(|row| row.author_id == author_id)
      .map(|row| row.article_id)
      .collect();
    Ok(tables.articles_in(ids))
  }

  async fn articles_commented(&self, author_id: i32) -> Result<Vec<Article>> {
    let tables = self.lock()?;
    let ids = tables.comments.values()
      .filter(|c| c.author_id == author_id)
      .map(|c| c.article_id)
      .collect();
    Ok(tables.articles_in(ids))
  }
}

#[async_trait(?Send)]
impl CommentRepo for MemoryStore {
  async fn comment_by_id(&self, comment_id: i32) -> Result<Option<Comment>> {
    Ok(self.lock()?.comments.get(&comment_id).cloned())
  }

  async fn store_comment(&self, comment: &NewComment) -> Result<Comment> {
    let mut tables = self.lock()?;
    tables.check_refs(comment.author_id, comment.article_id)?;
    let row = Comment {
      id: tables.next_id("comments"),
      author_id: comment.author_id,
      article_id: comment.article_id,
      comment: comment.comment.clone(),
      date: now(),
    };
    tables.comments.insert(row.id, row.clone());
    Ok(row)
  }

  async fn delete_comment(&self, comment_id: i32) -> Result<u64> {
    let mut tables = self.lock()?;
    Ok(tables.comments.remove(&comment_id).map_or(0, |_| 1))
  }

  async fn article_comments(&self, article_id: i32, author_id: Option<i32>) -> Result<Vec<Comment>> {
    let tables = self.lock()?;
    Ok(tables.comments.values()
      .filter(|c| c.article_id == article_id)
      .filter(|c| author_id.map_or(true, |id| c.author_id == id))
      .cloned()
      .collect())
  }
}

#[async_trait(?Send)]
impl InteractionRepo for MemoryStore {
  async fn find_interaction(&self, kind: InteractionKind, author_id: i32, article_id: i32) -> Result<Option<Interaction>> {
    let tables = self.lock()?;
    let found = tables.interactions(kind)
      .find(|row| row.author_id == author_id && row.article_id == article_id)
      .cloned();
    Ok(found)
  }

  async fn store_interaction(&self, kind: InteractionKind, author_id: i32, article_id: i32) -> Result<Interaction> {
    let mut tables = self.lock()?;
    tables.check_refs(author_id, article_id)?;
    if kind.is_unique() &&
      tables.interactions(kind).any(|row| row.author_id == author_id && row.article_id == article_id)
    {
      return Err(Error::Invalid("That record already exists.".to_string()));
    }
    let row = Interaction {
      id: tables.next_id(kind.table_name()),
      author_id,
      article_id,
      date: now(),
    };
    tables.interactions.entry(kind).or_default().insert(row.id, row.clone());
    Ok(row)
  }

  async fn delete_interaction(&self, kind: InteractionKind, interaction_id: i32) -> Result<u64> {
    let mut tables = self.lock()?;
    let removed = tables.interactions.get_mut(&kind)
      .and_then(|rows| rows.remove(&interaction_id));
    Ok(removed.map_or(0, |_| 1))
  }

  async fn article_interactions(&self, kind: InteractionKind, article_id: i32, author_id: Option<i32>) -> Result<Vec<Interaction>> {
    let tables = self.lock()?;
    let rows = tables.interactions(kind)
      .filter(|row| row.article_id == article_id)
      .filter(|row| author_id.map_or(true, |id| row.author_id == id))
      .cloned()
      .collect();
    Ok(rows)
  }

  async fn store_report(&self, report: &NewReport) -> Result<Report> {
    let mut tables = self.lock()?;
    tables.check_refs(report.author_id, report.article_id)?;
    let row = Report {
      id: tables.next_id("reports"),
      author_id: report.author_id,
      article_id: report.article_id,
      reason: report.reason.clone(),
      date: now(),
    };
    tables.reports.insert(row.id, row.clone());
    Ok(row)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  async fn author(store: &MemoryStore, email: &str) -> Author {
    store.store_author(&NewAuthor {
      name: "Jane".to_string(),
      email_address: email.to_string(),
    }).await.unwrap()
  }

  async fn article(store: &MemoryStore, author_id: i32) -> Article {
    store.store_article(&NewArticle {
      author_id,
      title: "Hello".to_string(),
      text: "World".to_string(),
      image: None,
    }).await.unwrap()
  }

  #[actix_rt::test]
  async fn ids_are_sequential_per_table() {
    let store = MemoryStore::new();
    let a1 = author(&store, "jane@example.com").await;
    let a2 = author(&store, "john@example.com").await;
    let art = article(&store, a1.id).await;
    assert_eq!((a1.id, a2.id, art.id), (1, 2, 1));
    assert_eq!(art.tags, vec!["tech".to_string()]);
    assert!(art.date_edited.is_none());
  }

  #[actix_rt::test]
  async fn duplicate_email_is_rejected() {
    let store = MemoryStore::new();
    author(&store, "jane@example.com").await;
    let err = store.store_author(&NewAuthor {
      name: "Other".to_string(),
      email_address: "jane@example.com".to_string(),
    }).await.unwrap_err();
    assert!(matches!(err, Error::Invalid(_)));
  }

  #[actix_rt::test]
  async fn missing_references_are_rejected() {
    let store = MemoryStore::new();
    let a = author(&store, "jane@example.com").await;
    let err = store.store_comment(&NewComment {
      author_id: a.id,
      article_id: 42,
      comment: "hi".to_string(),
    }).await.unwrap_err();
    assert!(matches!(err, Error::Invalid(_)));
    assert!(store.store_interaction(InteractionKind::View, 7, 1).await.is_err());
  }

  #[actix_rt::test]
  async fn likes_are_unique_views_are_not() {
    let store = MemoryStore::new();
    let a = author(&store, "jane@example.com").await;
    let art = article(&store, a.id).await;

    store.store_interaction(InteractionKind::Like, a.id, art.id).await.unwrap();
    assert!(store.store_interaction(InteractionKind::Like, a.id, art.id).await.is_err());

    store.store_interaction(InteractionKind::View, a.id, art.id).await.unwrap();
    store.store_interaction(InteractionKind::View, a.id, art.id).await.unwrap();

    let stats = store.article_stats(art.id).await.unwrap();
    assert_eq!(stats, ArticleStats { views: 2, likes: 1, ..Default::default() });

    let liked = store.find_interaction(InteractionKind::Like, a.id, art.id).await.unwrap();
    assert_eq!(liked.map(|row| row.article_id), Some(art.id));
    assert!(store.find_interaction(InteractionKind::Bookmark, a.id, art.id).await.unwrap().is_none());

    // viewed twice, listed once
    let viewed = store.articles_by_interaction(InteractionKind::View, a.id).await.unwrap();
    assert_eq!(viewed.len(), 1);
  }

  #[actix_rt::test]
  async fn deleting_an_author_cascades() {
    let store = MemoryStore::new();
    let jane = author(&store, "jane@example.com").await;
    let john = author(&store, "john@example.com").await;
    let janes = article(&store, jane.id).await;
    let johns = article(&store, john.id).await;

    store.store_interaction(InteractionKind::Like, john.id, janes.id).await.unwrap();
    store.store_interaction(InteractionKind::Bookmark, jane.id, johns.id).await.unwrap();
    store.store_comment(&NewComment {
      author_id: jane.id,
      article_id: johns.id,
      comment: "nice".to_string(),
    }).await.unwrap();

    assert_eq!(store.delete_author(jane.id).await.unwrap(), 1);
    assert_eq!(store.delete_author(jane.id).await.unwrap(), 0);

    assert!(store.article_by_id(janes.id).await.unwrap().is_none());
    assert!(store.articles_by_interaction(InteractionKind::Like, john.id).await.unwrap().is_empty());
    assert_eq!(store.article_stats(johns.id).await.unwrap(), ArticleStats::default());
  }

  #[actix_rt::test]
  async fn comments_filter_by_author() {
    let store = MemoryStore::new();
    let jane = author(&store, "jane@example.com").await;
    let john = author(&store, "john@example.com").await;
    let art = article(&store, jane.id).await;
    for (author_id, text) in [(jane.id, "one"), (john.id, "two"), (jane.id, "three")] {
      store.store_comment(&NewComment {
        author_id,
        article_id: art.id,
        comment: text.to_string(),
      }).await.unwrap();
    }

    let all = store.article_comments(art.id, None).await.unwrap();
    assert_eq!(all.len(), 3);
    let janes: Vec<String> = store.article_comments(art.id, Some(jane.id)).await.unwrap()
      .into_iter().map(|c| c.comment).collect();
    assert_eq!(janes, vec!["one".to_string(), "three".to_string()]);
  }
}
