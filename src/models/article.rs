use chrono::NaiveDateTime;

use serde::{Deserialize, Serialize};

/// Tag every new article starts with.
pub const DEFAULT_TAG: &str = "tech";

pub fn default_tags() -> Vec<String> {
  vec![DEFAULT_TAG.to_string()]
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Article {
  pub id: i32,
  pub author_id: i32,
  pub title: String,
  pub text: String,
  pub image: Option<String>,
  pub date_published: NaiveDateTime,
  pub date_edited: Option<NaiveDateTime>,
  #[serde(default = "default_tags")]
  pub tags: Vec<String>,
}

impl Article {
  pub fn is_written_by(&self, author_id: i32) -> bool {
    self.author_id == author_id
  }

  pub fn has_tag(&self, tag: &str) -> bool {
    self.tags.iter().any(|t| t == tag)
  }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewArticle {
  pub author_id: i32,
  pub title: String,
  pub text: String,
  pub image: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ArticleList<T> {
  pub articles: Vec<T>,
  pub articles_count: usize,
}

impl<T> From<Vec<T>> for ArticleList<T> {
  fn from(articles: Vec<T>) -> Self {
    ArticleList {
      articles_count: articles.len(),
      articles,
    }
  }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ArticleTags {
  pub article_id: i32,
  pub tags: Vec<String>,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize, PartialEq)]
pub struct ArticleStats {
  pub views: i64,
  pub likes: i64,
  pub comments: i64,
  pub bookmarks: i64,
  pub shares: i64,
}
