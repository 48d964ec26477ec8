use crate::db::Repository;
use crate::error::*;
use crate::models::*;

pub mod author;
pub mod article;

/// Parse a required integer id given as a query-string value.
pub fn require_id(value: Option<&str>, name: &str) -> Result<i32> {
  match value.map(str::trim) {
    None | Some("") => Err(Error::Invalid(format!("The {} has to be provided.", name))),
    Some(value) => value.parse::<i32>()
      .map_err(|_| Error::WrongType(format!("The {} has to be an integer.", name))),
  }
}

/// Like `require_id`, but a missing value is fine.
pub fn optional_id(value: Option<&str>, name: &str) -> Result<Option<i32>> {
  match value.map(str::trim) {
    None | Some("") => Ok(None),
    value => require_id(value, name).map(Some),
  }
}

pub async fn existing_author(db: &dyn Repository, author_id: i32) -> Result<Author> {
  db.author_by_id(author_id).await?
    .ok_or_else(|| Error::NotFound(format!("The author with id {} does not exist.", author_id)))
}

pub async fn existing_article(db: &dyn Repository, article_id: i32) -> Result<Article> {
  db.article_by_id(article_id).await?
    .ok_or_else(|| Error::NotFound(format!("The article with id {} does not exist.", article_id)))
}

pub async fn existing_comment(db: &dyn Repository, comment_id: i32) -> Result<Comment> {
  db.comment_by_id(comment_id).await?
    .ok_or_else(|| Error::NotFound(format!("The comment with id {} does not exist.", comment_id)))
}

#[cfg(test)]
mod tests {
  use super::*;

  use rstest::rstest;

  #[rstest]
  #[case(Some("7"), 7)]
  #[case(Some(" 12 "), 12)]
  #[case(Some("-3"), -3)]
  fn parses_ids(#[case] value: Option<&str>, #[case] expected: i32) {
    assert_eq!(require_id(value, "id").unwrap(), expected);
  }

  #[rstest]
  #[case(None)]
  #[case(Some(""))]
  fn missing_id_is_a_value_error(#[case] value: Option<&str>) {
    match require_id(value, "author id") {
      Err(Error::Invalid(msg)) => assert_eq!(msg, "The author id has to be provided."),
      other => panic!("unexpected: {:?}", other),
    }
  }

  #[test]
  fn non_integer_id_is_a_type_error() {
    match require_id(Some("abc"), "article id") {
      Err(Error::WrongType(msg)) => assert_eq!(msg, "The article id has to be an integer."),
      other => panic!("unexpected: {:?}", other),
    }
    assert!(matches!(optional_id(Some("x"), "id"), Err(Error::WrongType(_))));
    assert_eq!(optional_id(None, "id").unwrap(), None);
  }
}
