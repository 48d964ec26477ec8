use log::*;

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
  // 400, missing or invalid value / business rule violation
  #[error("{0}")]
  Invalid(String),

  // 400, parameter of the wrong type
  #[error("{0}")]
  WrongType(String),

  // 400, acting on somebody else's resource
  #[error("{0}")]
  Forbidden(String),

  // 404
  #[error("{0}")]
  NotFound(String),

  // 500
  #[error("internal server error")]
  InternalServerError,

  #[error("invalid configuration: {0}")]
  InvalidConfig(String),

  // Json error
  #[error("Json error: {source}")]
  JsonError {
    #[from]
    source: serde_json::Error,
  },

  #[error("disconnected: {0}")]
  DisconnectedError(String),

  #[error("postgres error")]
  PgError {
    #[from]
    source: tokio_postgres::error::Error,
  },

  #[error("multipart error: {source}")]
  MultipartError {
    #[from]
    source: actix_multipart::MultipartError,
  },

  #[error("crossbeam recv error")]
  RecvError {
    #[from]
    source: crossbeam_channel::RecvError,
  },

  #[error("std io error")]
  IOError {
    #[from]
    source: std::io::Error,
  },

  #[error("config error")]
  ConfigError {
    #[from]
    source: config::ConfigError,
  },

  #[error(transparent)]
  Other(#[from] anyhow::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

// the ResponseError trait lets us convert errors to http responses with appropriate data
// https://actix.rs/docs/errors/
impl ResponseError for Error {
  fn status_code(&self) -> StatusCode {
    match self {
      Error::Invalid(_) | Error::WrongType(_) | Error::Forbidden(_) => StatusCode::BAD_REQUEST,
      Error::MultipartError { .. } => StatusCode::BAD_REQUEST,
      Error::NotFound(_) => StatusCode::NOT_FOUND,
      Error::DisconnectedError(_) => StatusCode::BAD_GATEWAY,
      _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }

  fn error_response(&self) -> HttpResponse {
    let status = self.status_code();
    if status.is_server_error() && status != StatusCode::BAD_GATEWAY {
      error!("InternalServerError: {:?}", self);
      return HttpResponse::build(status).json(json!({
        "error": "Internal Server Error",
      }));
    }
    HttpResponse::build(status).json(json!({
      "error": self.to_string(),
    }))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  use actix_web::body::to_bytes;

  #[actix_rt::test]
  async fn value_errors_are_bad_requests_with_message() {
    let err = Error::Invalid("The title has to be provided.".to_string());
    assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    let body = to_bytes(err.error_response().into_body()).await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body, json!({"error": "The title has to be provided."}));
  }

  #[actix_rt::test]
  async fn internal_errors_hide_details() {
    let err = Error::InvalidConfig("db.url".to_string());
    assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = to_bytes(err.error_response().into_body()).await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body, json!({"error": "Internal Server Error"}));
  }

  #[test]
  fn not_found_has_its_own_status() {
    let err = Error::NotFound("The article with id 3 does not exist.".to_string());
    assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
  }
}
