use chrono::NaiveDateTime;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Comment {
  pub id: i32,
  pub author_id: i32,
  pub article_id: i32,
  pub comment: String,
  pub date: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewComment {
  pub author_id: i32,
  pub article_id: i32,
  pub comment: String,
}
