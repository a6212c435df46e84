//! `GET /summary` — the latest global snapshot.

use axum::{Json, extract::State};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use sitrep_core::{
  Error,
  model::{GlobalAggregate, Metric, MetricRow},
  query::{case_fatality_rate, growth_rate},
};
use sitrep_source::SourceFetcher;

use crate::{ApiState, error::ApiError};

#[derive(Debug, Serialize)]
pub struct Summary {
  pub date:               NaiveDate,
  pub total_cases:        i64,
  pub total_deaths:       i64,
  pub total_recovered:    i64,
  /// Cases minus deaths minus recovered.
  pub active_cases:       i64,
  pub new_cases:          i64,
  pub new_deaths:         i64,
  pub case_fatality_rate: f64,
  /// Percent change in cumulative cases over the trailing 7 days.
  pub cases_growth_7d:    f64,
  pub deaths_growth_7d:   f64,
  pub last_refreshed:     Option<DateTime<Utc>>,
}

fn trailing_growth(rows: &[GlobalAggregate], metric: Metric) -> f64 {
  let series: Vec<i64> = rows.iter().map(|r| r.metric(metric)).collect();
  growth_rate(&series, 7).last().copied().unwrap_or(0.0)
}

pub async fn handler<F>(
  State(state): State<ApiState<F>>,
) -> Result<Json<Summary>, ApiError>
where
  F: SourceFetcher,
{
  let bundle = state.bundle().await?;
  let latest = bundle
    .global
    .last()
    .ok_or(ApiError::Pipeline(Error::EmptyDataset))?;

  Ok(Json(Summary {
    date:               latest.date,
    total_cases:        latest.total_cases,
    total_deaths:       latest.total_deaths,
    total_recovered:    latest.total_recovered,
    active_cases:       latest.total_cases
      - latest.total_deaths
      - latest.total_recovered,
    new_cases:          latest.new_cases,
    new_deaths:         latest.new_deaths,
    case_fatality_rate: case_fatality_rate(
      latest.total_deaths,
      latest.total_cases,
    ),
    cases_growth_7d:    trailing_growth(&bundle.global, Metric::TotalCases),
    deaths_growth_7d:   trailing_growth(&bundle.global, Metric::TotalDeaths),
    last_refreshed:     state.cache.last_refreshed().await,
  }))
}
