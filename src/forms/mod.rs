use std::collections::HashMap;

use serde::de::DeserializeOwned;

use validator::{Validate, ValidationError, ValidationErrors};

use crate::error::*;

pub mod author;
pub mod article;
pub mod comment;
pub use self::{
  author::*,
  article::*,
  comment::*,
};

/// Raw text fields of a submitted form.
pub type FormFields = HashMap<String, String>;

/// Check a raw form against the schema of `T`.
///
/// Missing required keys and unrecognized keys are rejected while
/// deserializing, length and format rules by `Validate`.
pub fn parse_form<T: DeserializeOwned + Validate>(fields: &FormFields) -> Result<T> {
  let value = serde_json::to_value(fields)?;
  let form: T = serde_json::from_value(value).map_err(|err| {
    Error::Invalid(format!("Invalid form data: {}", err))
  })?;
  validate(&form)?;
  Ok(form)
}

/// Run the `Validate` rules of an already deserialized form.
pub fn validate<T: Validate>(form: &T) -> Result<()> {
  form.validate().map_err(|errs| Error::Invalid(validation_message(&errs)))
}

/// Flatten validation errors into one message, ordered by field name.
pub fn validation_message(errors: &ValidationErrors) -> String {
  let mut fields = errors.field_errors().into_iter().collect::<Vec<_>>();
  fields.sort_by(|a, b| a.0.cmp(&b.0));
  fields.iter()
    .flat_map(|(field, errs)| {
      errs.iter().map(move |err| match err.message {
        Some(ref msg) => msg.to_string(),
        None => format!("The {} is invalid ({}).", field, err.code),
      })
    })
    .collect::<Vec<String>>()
    .join(" ")
}

/// Length rule with distinct too short / too long errors.
pub(crate) fn check_length(field: &str, value: &str, min: usize, max: usize) -> Result<(), ValidationError> {
  let len = value.chars().count();
  if len == 0 {
    let mut err = ValidationError::new("required");
    err.message = Some(format!("The {} has to be provided.", field).into());
    return Err(err);
  }
  if len < min {
    let mut err = ValidationError::new("too_short");
    err.message = Some(format!("The {} has to be at least {} characters long.", field, min).into());
    return Err(err);
  }
  if len > max {
    let mut err = ValidationError::new("too_long");
    err.message = Some(format!("The {} has to be at most {} characters long.", field, max).into());
    return Err(err);
  }
  Ok(())
}

#[cfg(test)]
pub(crate) fn fields(pairs: &[(&str, &str)]) -> FormFields {
  pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}
