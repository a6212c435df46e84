//! `POST /refresh` — drop the cached bundle so the next read re-runs the
//! pipeline. The presentation layer's "refresh data" affordance.

use axum::{extract::State, http::StatusCode};
use sitrep_source::SourceFetcher;

use crate::ApiState;

pub async fn handler<F>(State(state): State<ApiState<F>>) -> StatusCode
where
  F: SourceFetcher,
{
  state.cache.invalidate().await;
  StatusCode::NO_CONTENT
}
