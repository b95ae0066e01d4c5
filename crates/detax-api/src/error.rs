//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  extract::{
    Path, Query,
    rejection::{JsonRejection, PathRejection, QueryRejection},
  },
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// A path extractor whose rejection is answered with an [`ApiError`] body.
pub type PathParam<T> = Result<Path<T>, PathRejection>;

/// A query-string extractor whose rejection is answered with an [`ApiError`]
/// body.
pub type QueryParams<T> = Result<Query<T>, QueryRejection>;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl From<detax_core::Error> for ApiError {
  fn from(err: detax_core::Error) -> Self {
    use detax_core::Error as E;
    match err {
      E::NotFound { .. } => Self::NotFound(err.to_string()),
      E::Validation(message) => Self::BadRequest(message),
      E::StoreUnavailable(source) => Self::Store(source),
      other => Self::Store(Box::new(other)),
    }
  }
}

impl From<JsonRejection> for ApiError {
  fn from(rejection: JsonRejection) -> Self {
    Self::BadRequest(rejection.body_text())
  }
}

impl From<PathRejection> for ApiError {
  fn from(rejection: PathRejection) -> Self {
    Self::BadRequest(rejection.body_text())
  }
}

impl From<QueryRejection> for ApiError {
  fn from(rejection: QueryRejection) -> Self {
    Self::BadRequest(rejection.body_text())
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Store(e) => {
        tracing::error!(error = %e, "request failed in the store");
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
      }
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}
