//! `GET /countries` — the distinct country names, sorted.

use axum::{Json, extract::State};
use sitrep_source::SourceFetcher;

use crate::{ApiState, error::ApiError};

pub async fn list<F>(
  State(state): State<ApiState<F>>,
) -> Result<Json<Vec<String>>, ApiError>
where
  F: SourceFetcher,
{
  let bundle = state.bundle().await?;
  Ok(Json(bundle.countries.clone()))
}
