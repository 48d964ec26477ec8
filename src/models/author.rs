use chrono::NaiveDateTime;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Author {
  pub id: i32,
  pub name: String,
  pub email_address: String,
  pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewAuthor {
  pub name: String,
  pub email_address: String,
}

/// Counts of everything an author has published or done.
#[derive(Debug, Default, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthorStats {
  pub articles_published: i64,
  pub likes: i64,
  pub bookmarks: i64,
  pub views: i64,
  pub comments: i64,
  pub shares: i64,
}
