//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use softdb_core::{ErrorKind, store::RepositoryError};
use thiserror::Error;
use tracing::error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("store error: {source}")]
  Store {
    kind:   ErrorKind,
    #[source]
    source: Box<dyn std::error::Error + Send + Sync>,
  },
}

impl ApiError {
  /// Wrap a repository error, keeping its classification.
  pub fn store<E: RepositoryError>(e: E) -> Self {
    Self::Store { kind: e.kind(), source: Box::new(e) }
  }

  pub fn status(&self) -> StatusCode {
    match self {
      ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
      ApiError::Store { kind, .. } => match kind {
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::DuplicateKey => StatusCode::CONFLICT,
        ErrorKind::ForeignKeyViolation => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorKind::Validation => StatusCode::BAD_REQUEST,
        ErrorKind::Connectivity => StatusCode::INTERNAL_SERVER_ERROR,
      },
    }
  }
}

impl From<softdb_core::Error> for ApiError {
  fn from(e: softdb_core::Error) -> Self { ApiError::BadRequest(e.to_string()) }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.status();
    let message = match &self {
      ApiError::BadRequest(m) => m.clone(),
      ApiError::Store { source, .. } => source.to_string(),
    };
    if status.is_server_error() {
      error!(error = %message, "request failed");
    }
    (status, Json(json!({ "error": message }))).into_response()
  }
}

#[cfg(test)]
mod tests {
  use softdb_core::Classify;

  use super::*;

  #[derive(Debug, Error)]
  #[error("stub")]
  struct Stub(ErrorKind);

  impl Classify for Stub {
    fn kind(&self) -> ErrorKind { self.0 }
  }

  #[test]
  fn kinds_map_to_statuses() {
    for (kind, status) in [
      (ErrorKind::NotFound, StatusCode::NOT_FOUND),
      (ErrorKind::DuplicateKey, StatusCode::CONFLICT),
      (ErrorKind::ForeignKeyViolation, StatusCode::UNPROCESSABLE_ENTITY),
      (ErrorKind::Validation, StatusCode::BAD_REQUEST),
      (ErrorKind::Connectivity, StatusCode::INTERNAL_SERVER_ERROR),
    ] {
      assert_eq!(ApiError::store(Stub(kind)).status(), status);
    }
  }

  #[test]
  fn core_errors_are_bad_requests() {
    let err = ApiError::from(softdb_core::Error::NoApplications);
    assert_eq!(err.status(), StatusCode::BAD_REQUEST);
  }
}
