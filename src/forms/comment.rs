use serde::{Deserialize, Serialize};

use validator::{Validate, ValidationError};

use super::check_length;

pub const COMMENT_MAX_LENGTH: usize = 10_000;
pub const REPORT_REASON_MAX_LENGTH: usize = 500;

fn validate_comment(comment: &str) -> Result<(), ValidationError> {
  check_length("comment", comment, 1, COMMENT_MAX_LENGTH)
}

fn validate_reason(reason: &str) -> Result<(), ValidationError> {
  check_length("reason", reason, 1, REPORT_REASON_MAX_LENGTH)
}

#[derive(Debug, Default, Serialize, Deserialize, PartialEq, Validate)]
#[serde(deny_unknown_fields)]
pub struct CreateComment {
  #[validate(custom(function = "validate_comment"))]
  pub comment: String,
}

#[derive(Debug, Default, Serialize, Deserialize, PartialEq, Validate)]
#[serde(deny_unknown_fields)]
pub struct CreateReport {
  #[serde(default)]
  #[validate(custom(function = "validate_reason"))]
  pub reason: Option<String>,
}

/// Query string of uncomment.
#[derive(Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct CommentParams {
  #[serde(rename = "comment id", alias = "comment_id")]
  pub comment_id: Option<String>,
  #[serde(rename = "author id", alias = "author_id")]
  pub author_id: Option<String>,
}
