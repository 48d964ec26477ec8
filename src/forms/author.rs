use serde::{Deserialize, Serialize};

use validator::{Validate, ValidationError};

use super::check_length;

pub const NAME_MIN_LENGTH: usize = 2;
pub const NAME_MAX_LENGTH: usize = 20;
pub const EMAIL_MIN_LENGTH: usize = 8;
pub const EMAIL_MAX_LENGTH: usize = 64;

fn validate_name(name: &str) -> Result<(), ValidationError> {
  check_length("Name", name, NAME_MIN_LENGTH, NAME_MAX_LENGTH)
}

fn validate_email_length(email: &str) -> Result<(), ValidationError> {
  check_length("Email Address", email, EMAIL_MIN_LENGTH, EMAIL_MAX_LENGTH)
}

#[derive(Debug, Default, Serialize, Deserialize, PartialEq, Validate)]
#[serde(deny_unknown_fields)]
pub struct CreateAuthor {
  #[serde(rename = "Name")]
  #[validate(custom(function = "validate_name"))]
  pub name: String,
  #[serde(rename = "Email Address")]
  #[validate(
    custom(function = "validate_email_length"),
    email(message = "The Email Address is not a valid email address.")
  )]
  pub email_address: String,
}

#[derive(Debug, Default, Serialize, Deserialize, PartialEq, Validate)]
#[serde(deny_unknown_fields)]
pub struct UpdateAuthor {
  #[serde(rename = "Name", default)]
  #[validate(custom(function = "validate_name"))]
  pub name: Option<String>,
  #[serde(rename = "Email Address", default)]
  #[validate(
    custom(function = "validate_email_length"),
    email(message = "The Email Address is not a valid email address.")
  )]
  pub email_address: Option<String>,
}

/// Query string of the author endpoints.
#[derive(Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct AuthorParams {
  pub id: Option<String>,
}
