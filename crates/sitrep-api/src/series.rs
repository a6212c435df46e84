//! Time-series endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET` | `/global` | Global daily rows; optional `start`, `end`, `rolling_window` |
//! | `GET` | `/countries/{name}` | One country's daily rows; same params. Unknown names yield an empty list. |

use axum::{
  Json,
  extract::{Path, Query, State},
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sitrep_core::model::{DatedRow, Metric, MetricRow};
use sitrep_core::query::{
  filter_by_countries, filter_by_date_range, rolling_average,
};
use sitrep_source::SourceFetcher;

use crate::{ApiState, error::ApiError};

// ─── Parameters & response shape ─────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RangeParams {
  /// Inclusive; defaults to the start of the data.
  pub start:          Option<NaiveDate>,
  /// Inclusive; defaults to the end of the data.
  pub end:            Option<NaiveDate>,
  /// Window for the rolling averages of daily counts; omit to skip them.
  pub rolling_window: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct SeriesPoint {
  pub date:            NaiveDate,
  pub total_cases:     i64,
  pub total_deaths:    i64,
  pub total_recovered: i64,
  pub new_cases:       i64,
  pub new_deaths:      i64,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub new_cases_avg:   Option<f64>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub new_deaths_avg:  Option<f64>,
}

/// Apply the date range (full span by default) and shape rows into series
/// points, attaching rolling averages when a window was requested.
fn shape<T: DatedRow + MetricRow + Clone>(
  rows: &[T],
  params: &RangeParams,
) -> Result<Vec<SeriesPoint>, ApiError> {
  let dates = rows.iter().map(DatedRow::date);
  let (lo, hi) = match (dates.clone().min(), dates.max()) {
    (Some(lo), Some(hi)) => (lo, hi),
    _ => return Ok(Vec::new()),
  };
  let rows = filter_by_date_range(
    rows,
    params.start.unwrap_or(lo),
    params.end.unwrap_or(hi),
  )?;

  let averages = params.rolling_window.map(|window| {
    let new_cases: Vec<i64> =
      rows.iter().map(|r| r.metric(Metric::NewCases)).collect();
    let new_deaths: Vec<i64> =
      rows.iter().map(|r| r.metric(Metric::NewDeaths)).collect();
    (
      rolling_average(&new_cases, window),
      rolling_average(&new_deaths, window),
    )
  });

  Ok(
    rows
      .iter()
      .enumerate()
      .map(|(i, r)| SeriesPoint {
        date:            r.date(),
        total_cases:     r.metric(Metric::TotalCases),
        total_deaths:    r.metric(Metric::TotalDeaths),
        total_recovered: r.metric(Metric::TotalRecovered),
        new_cases:       r.metric(Metric::NewCases),
        new_deaths:      r.metric(Metric::NewDeaths),
        new_cases_avg:   averages.as_ref().map(|(cases, _)| cases[i]),
        new_deaths_avg:  averages.as_ref().map(|(_, deaths)| deaths[i]),
      })
      .collect(),
  )
}

// ─── Handlers ────────────────────────────────────────────────────────────────

/// `GET /global?[start=…][&end=…][&rolling_window=…]`
pub async fn global<F>(
  State(state): State<ApiState<F>>,
  Query(params): Query<RangeParams>,
) -> Result<Json<Vec<SeriesPoint>>, ApiError>
where
  F: SourceFetcher,
{
  let bundle = state.bundle().await?;
  Ok(Json(shape(&bundle.global, &params)?))
}

/// `GET /countries/{name}?[start=…][&end=…][&rolling_window=…]`
pub async fn country<F>(
  State(state): State<ApiState<F>>,
  Path(name): Path<String>,
  Query(params): Query<RangeParams>,
) -> Result<Json<Vec<SeriesPoint>>, ApiError>
where
  F: SourceFetcher,
{
  let bundle = state.bundle().await?;
  let rows = filter_by_countries(&bundle.by_country, &[name]);
  Ok(Json(shape(&rows, &params)?))
}
