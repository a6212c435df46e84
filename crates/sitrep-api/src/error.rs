//! API error type and [`axum::response::IntoResponse`] implementation.
//!
//! Pipeline errors reach this boundary unmodified; here they become HTTP
//! statuses. A caller bug (inverted range, malformed parameter) is a 400;
//! everything upstream is a 502 with its retryability exposed so the
//! presentation layer can decide whether to offer a retry affordance.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("bad request: {0}")]
  BadRequest(String),

  #[error(transparent)]
  Pipeline(sitrep_core::Error),
}

impl From<sitrep_core::Error> for ApiError {
  fn from(e: sitrep_core::Error) -> Self {
    match e {
      sitrep_core::Error::InvalidRange { .. } => {
        Self::BadRequest(e.to_string())
      }
      other => Self::Pipeline(other),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    match self {
      ApiError::BadRequest(message) => (
        StatusCode::BAD_REQUEST,
        Json(json!({ "error": message })),
      )
        .into_response(),
      ApiError::Pipeline(e) => (
        StatusCode::BAD_GATEWAY,
        Json(json!({
          "error": e.to_string(),
          "retryable": e.is_retryable(),
        })),
      )
        .into_response(),
    }
  }
}
