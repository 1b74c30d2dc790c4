//! `GET /display/{*file_name}`: download a stored upload as an attachment.

use axum::{
  extract::{Path, State},
  http::{StatusCode, header},
  response::{IntoResponse, Response},
};
use coursehub_core::store::MarketStore;
use tracing::debug;

use crate::{AppState, error::Error, uploads};

pub async fn handler<S>(
  State(state): State<AppState<S>>,
  Path(file_name): Path<String>,
) -> Result<Response, Error>
where
  S: MarketStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  // Only names that sanitize to themselves can refer to a stored upload.
  let safe = uploads::sanitize_filename(&file_name);
  if safe.is_empty() || safe != file_name {
    debug!(requested = %file_name, "refusing unsanitized download name");
    return Err(Error::NotFound);
  }

  let data = match tokio::fs::read(state.config.upload_dir.join(&safe)).await {
    Ok(data) => data,
    Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Err(Error::NotFound),
    Err(e) => return Err(e.into()),
  };

  Ok(
    (
      StatusCode::OK,
      [
        (header::CONTENT_TYPE, uploads::content_type(&safe).to_owned()),
        (
          header::CONTENT_DISPOSITION,
          format!("attachment; filename=\"{safe}\""),
        ),
      ],
      data,
    )
      .into_response(),
  )
}
