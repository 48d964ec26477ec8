use serde::{Deserialize, Serialize};

use validator::{Validate, ValidationError};

use super::check_length;

pub const TITLE_MIN_LENGTH: usize = 2;
pub const TITLE_MAX_LENGTH: usize = 100;
pub const TEXT_MAX_LENGTH: usize = 100_000;
pub const TAG_MAX_LENGTH: usize = 100;

fn validate_title(title: &str) -> Result<(), ValidationError> {
  check_length("Title", title, TITLE_MIN_LENGTH, TITLE_MAX_LENGTH)
}

fn validate_text(text: &str) -> Result<(), ValidationError> {
  check_length("Text", text, 1, TEXT_MAX_LENGTH)
}

fn validate_tag(tag: &str) -> Result<(), ValidationError> {
  check_length("tag", tag, 1, TAG_MAX_LENGTH)
}

#[derive(Debug, Default, Serialize, Deserialize, PartialEq, Validate)]
#[serde(deny_unknown_fields)]
pub struct CreateArticle {
  #[serde(rename = "Title")]
  #[validate(custom(function = "validate_title"))]
  pub title: String,
  #[serde(rename = "Text")]
  #[validate(custom(function = "validate_text"))]
  pub text: String,
}

#[derive(Debug, Default, Serialize, Deserialize, PartialEq, Validate)]
#[serde(deny_unknown_fields)]
pub struct UpdateArticle {
  #[serde(rename = "Title", default)]
  #[validate(custom(function = "validate_title"))]
  pub title: Option<String>,
  #[serde(rename = "Text", default)]
  #[validate(custom(function = "validate_text"))]
  pub text: Option<String>,
}

/// A single tag, as given to tag/untag.
#[derive(Debug, Default, Serialize, Deserialize, PartialEq, Validate)]
pub struct TagForm {
  #[validate(custom(function = "validate_tag"))]
  pub tag: String,
}

/// Query string of the article endpoints.
#[derive(Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct ArticleParams {
  pub id: Option<String>,
  #[serde(rename = "author id", alias = "author_id")]
  pub author_id: Option<String>,
}

/// Query string of the interaction actions (like, bookmark, tag, ...).
#[derive(Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct InteractionParams {
  #[serde(rename = "article id", alias = "article_id")]
  pub article_id: Option<String>,
  #[serde(rename = "author id", alias = "author_id")]
  pub author_id: Option<String>,
  pub tag: Option<String>,
}

#[cfg(test)]
mod tests {
  use super::*;

  use crate::error::Error;
  use crate::forms::{fields, parse_form, validate};

  #[test]
  fn title_bounds_are_inclusive() {
    let ok: CreateArticle = parse_form(&fields(&[
      ("Title", &"t".repeat(TITLE_MAX_LENGTH)),
      ("Text", "body"),
    ])).unwrap();
    assert_eq!(ok.title.len(), TITLE_MAX_LENGTH);

    let too_long: Result<CreateArticle, Error> = parse_form(&fields(&[
      ("Title", &"t".repeat(TITLE_MAX_LENGTH + 1)),
      ("Text", "body"),
    ]));
    match too_long {
      Err(Error::Invalid(msg)) => assert_eq!(msg, "The Title has to be at most 100 characters long."),
      other => panic!("unexpected: {:?}", other),
    }
  }

  #[test]
  fn empty_text_is_rejected() {
    let res: Result<CreateArticle, Error> = parse_form(&fields(&[("Title", "Rust"), ("Text", "")]));
    match res {
      Err(Error::Invalid(msg)) => assert_eq!(msg, "The Text has to be provided."),
      other => panic!("unexpected: {:?}", other),
    }
  }

  #[test]
  fn only_title_and_text_are_accepted() {
    let res: Result<UpdateArticle, Error> = parse_form(&fields(&[("Author", "me")]));
    assert!(matches!(res, Err(Error::Invalid(_))));

    let empty: UpdateArticle = parse_form(&fields(&[])).unwrap();
    assert_eq!(empty, UpdateArticle::default());
  }

  #[test]
  fn tag_length() {
    assert!(validate(&TagForm { tag: "rust".to_string() }).is_ok());
    assert!(validate(&TagForm { tag: "".to_string() }).is_err());
    assert!(validate(&TagForm { tag: "x".repeat(TAG_MAX_LENGTH + 1) }).is_err());
  }

  #[test]
  fn params_accept_spaced_and_snake_names() {
    let spaced: InteractionParams = query_from("article%20id=3&author+id=4&tag=rust");
    assert_eq!(spaced.article_id.as_deref(), Some("3"));
    assert_eq!(spaced.author_id.as_deref(), Some("4"));
    assert_eq!(spaced.tag.as_deref(), Some("rust"));

    let snake: ArticleParams = query_from("id=1&author_id=2");
    assert_eq!(snake.author_id.as_deref(), Some("2"));
  }

  fn query_from<T: serde::de::DeserializeOwned>(query: &str) -> T {
    actix_web::web::Query::<T>::from_query(query).unwrap().into_inner()
  }
}
