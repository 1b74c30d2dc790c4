//! Error types and axum `IntoResponse` implementation.

use axum::{
  Json,
  extract::multipart::MultipartError,
  http::StatusCode,
  response::{IntoResponse, Redirect, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::views::FormView;

#[derive(Debug, Error)]
pub enum Error {
  /// No live session; answered with a redirect to the login page.
  #[error("authentication required")]
  Unauthorized,
  #[error("forbidden")]
  Forbidden,
  #[error("not found")]
  NotFound,
  #[error("validation failed: {}", .0.output_message)]
  Validation(FormView),
  #[error("conflict: {}", .0.output_message)]
  Conflict(FormView),
  /// A storage fault the user is told about through the form they submitted.
  #[error("request failed: {}", .0.output_message)]
  Failed(FormView),
  #[error("multipart error: {0}")]
  Multipart(#[from] MultipartError),
  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
  #[error("io error: {0}")]
  Io(#[from] std::io::Error),
  #[error("password hashing error: {0}")]
  Password(String),
  #[error("configuration error: {0}")]
  Config(String),
}

impl IntoResponse for Error {
  fn into_response(self) -> Response {
    match self {
      Error::Unauthorized => Redirect::to("/login").into_response(),
      Error::Forbidden => {
        (StatusCode::FORBIDDEN, Json(json!({ "error": "forbidden" })))
          .into_response()
      }
      Error::NotFound => {
        (StatusCode::NOT_FOUND, Json(json!({ "error": "not found" })))
          .into_response()
      }
      Error::Validation(view) => {
        (StatusCode::UNPROCESSABLE_ENTITY, Json(view)).into_response()
      }
      Error::Conflict(view) => (StatusCode::CONFLICT, Json(view)).into_response(),
      Error::Failed(view) => {
        (StatusCode::INTERNAL_SERVER_ERROR, Json(view)).into_response()
      }
      Error::Multipart(e) => e.into_response(),
      e @ (Error::Store(_) | Error::Io(_) | Error::Password(_) | Error::Config(_)) => {
        error!(error = %e, "request failed");
        (
          StatusCode::INTERNAL_SERVER_ERROR,
          Json(json!({ "error": "internal server error" })),
        )
          .into_response()
      }
    }
  }
}
