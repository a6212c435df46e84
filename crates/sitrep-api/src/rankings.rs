//! `GET /top` — the hardest-hit countries for a metric.

use axum::{
  Json,
  extract::{Query, State},
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sitrep_core::{model::Metric, query::top_n};
use sitrep_source::SourceFetcher;

use crate::{ApiState, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct TopParams {
  /// Column to rank by. Defaults to cumulative cases.
  pub metric: Option<Metric>,
  /// How many countries to return. Defaults to 10.
  pub n:      Option<usize>,
  /// Ranking date. Defaults to the latest date present.
  pub date:   Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
pub struct TopEntry {
  pub country: String,
  pub value:   i64,
}

/// `GET /top?[metric=…][&n=…][&date=…]`
pub async fn handler<F>(
  State(state): State<ApiState<F>>,
  Query(params): Query<TopParams>,
) -> Result<Json<Vec<TopEntry>>, ApiError>
where
  F: SourceFetcher,
{
  let bundle = state.bundle().await?;
  let ranked = top_n(
    &bundle.by_country,
    params.metric.unwrap_or(Metric::TotalCases),
    params.n.unwrap_or(10),
    params.date,
  );
  Ok(Json(
    ranked
      .into_iter()
      .map(|(country, value)| TopEntry { country, value })
      .collect(),
  ))
}
