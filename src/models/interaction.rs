use std::fmt;

use chrono::NaiveDateTime;

use serde::{Deserialize, Serialize};

/// The author -> article interactions stored one row per event/state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InteractionKind {
  Like,
  Bookmark,
  View,
  Share,
}

impl InteractionKind {
  pub const ALL: [InteractionKind; 4] = [
    InteractionKind::Like,
    InteractionKind::Bookmark,
    InteractionKind::View,
    InteractionKind::Share,
  ];

  pub fn table_name(self) -> &'static str {
    match self {
      InteractionKind::Like => "likes",
      InteractionKind::Bookmark => "bookmarks",
      InteractionKind::View => "views",
      InteractionKind::Share => "shares",
    }
  }

  /// Likes and bookmarks are a state: at most one per (author, article).
  pub fn is_unique(self) -> bool {
    matches!(self, InteractionKind::Like | InteractionKind::Bookmark)
  }

  pub fn past_tense(self) -> &'static str {
    match self {
      InteractionKind::Like => "liked",
      InteractionKind::Bookmark => "bookmarked",
      InteractionKind::View => "viewed",
      InteractionKind::Share => "shared",
    }
  }
}

impl fmt::Display for InteractionKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let name = match self {
      InteractionKind::Like => "like",
      InteractionKind::Bookmark => "bookmark",
      InteractionKind::View => "view",
      InteractionKind::Share => "share",
    };
    f.write_str(name)
  }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Interaction {
  pub id: i32,
  pub author_id: i32,
  pub article_id: i32,
  pub date: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Report {
  pub id: i32,
  pub author_id: i32,
  pub article_id: i32,
  pub reason: Option<String>,
  pub date: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewReport {
  pub author_id: i32,
  pub article_id: i32,
  pub reason: Option<String>,
}
