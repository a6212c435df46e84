//! sitrep server: configuration and router assembly.
//!
//! The binary reads `config.toml` (or `--config <path>`) layered with
//! `SITREP_*` environment variables, builds the HTTP fetcher, pipeline and
//! cache, and serves the JSON API under `/api`.

use axum::Router;
use serde::Deserialize;
use sitrep_source::{SourceFetcher, Sources};
use tower_http::trace::TraceLayer;

pub use sitrep_api::{ApiState, api_router};

// ─── Configuration ───────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and the
/// environment. Every field has a default; an absent config file serves the
/// upstream JHU tables on localhost.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host: String,

  #[serde(default = "default_port")]
  pub port: u16,

  /// Per-fetch timeout. There is no retry and no global deadline; a slow
  /// fetch simply delays the caller.
  #[serde(default = "default_fetch_timeout_seconds")]
  pub fetch_timeout_seconds: u64,

  /// The source data updates at most daily; six hours keeps refreshes rare.
  #[serde(default = "default_cache_ttl_seconds")]
  pub cache_ttl_seconds: i64,

  #[serde(default)]
  pub sources: Sources,
}

fn default_host() -> String { "127.0.0.1".to_string() }
fn default_port() -> u16 { 8080 }
fn default_fetch_timeout_seconds() -> u64 { 10 }
fn default_cache_ttl_seconds() -> i64 { 6 * 60 * 60 }

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build the application router: the JSON API nested under `/api`, with
/// request tracing.
pub fn router<F>(state: ApiState<F>) -> Router
where
  F: SourceFetcher + 'static,
{
  Router::new()
    .nest("/api", api_router(state))
    .layer(TraceLayer::new_for_http())
}

// ─── Integration tests ───────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use std::{
    collections::HashMap,
    future::Future,
    sync::{
      Arc,
      atomic::{AtomicUsize, Ordering},
    },
  };

  use axum::{
    body::Body,
    http::{Request, StatusCode},
  };
  use serde_json::Value;
  use sitrep_cache::{DataCache, SystemClock};
  use sitrep_core::{Error, Result, model::Category};
  use sitrep_source::{
    DataSource, Pipeline, SourceFetcher, Sources, WideTable,
  };
  use tower::ServiceExt as _;

  use super::*;

  const CONFIRMED: &str = "\
Province/State,Country/Region,Lat,Long,1/22/20,1/23/20,1/24/20,1/25/20
Alpha,Nation1,10.0,20.0,10,10,15,12
,Nation2,5.0,6.0,50,60,70,100
Beta,Nation3,1.0,1.0,50,60,70,100
";
  const DEATHS: &str = "\
Province/State,Country/Region,Lat,Long,1/22/20,1/23/20,1/24/20,1/25/20
Alpha,Nation1,10.0,20.0,0,1,1,2
,Nation2,5.0,6.0,5,6,7,8
Beta,Nation3,1.0,1.0,2,2,3,3
";

  struct FixtureFetcher {
    bodies:  HashMap<&'static str, String>,
    fetches: Arc<AtomicUsize>,
  }

  impl SourceFetcher for FixtureFetcher {
    fn fetch<'a>(
      &'a self,
      source: &'a DataSource,
    ) -> impl Future<Output = Result<WideTable>> + Send + 'a {
      async move {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let label = source.category.label();
        let body = self.bodies.get(label).ok_or_else(|| Error::Fetch {
          source_name: label.to_string(),
          message:     "HTTP 404 Not Found".to_string(),
        })?;
        WideTable::parse(body).map_err(|e| Error::Fetch {
          source_name: label.to_string(),
          message:     e.to_string(),
        })
      }
    }
  }

  /// State over a stub fetcher: confirmed + deaths fixtures, recovered
  /// missing (degraded mode). Returns the fetch counter alongside.
  fn make_state(
    entries: &[(Category, &str)],
  ) -> (ApiState<FixtureFetcher>, Arc<AtomicUsize>) {
    let fetches = Arc::new(AtomicUsize::new(0));
    let fetcher = FixtureFetcher {
      bodies:  entries
        .iter()
        .map(|(c, body)| (c.label(), body.to_string()))
        .collect(),
      fetches: Arc::clone(&fetches),
    };
    let sources = Sources {
      confirmed: "fixture://confirmed".to_string(),
      deaths:    "fixture://deaths".to_string(),
      recovered: "fixture://recovered".to_string(),
    };
    let state = ApiState {
      pipeline: Arc::new(Pipeline::new(fetcher, sources)),
      cache:    Arc::new(DataCache::new(3600, Arc::new(SystemClock))),
    };
    (state, fetches)
  }

  fn default_state() -> (ApiState<FixtureFetcher>, Arc<AtomicUsize>) {
    make_state(&[(Category::Confirmed, CONFIRMED), (Category::Deaths, DEATHS)])
  }

  async fn request(
    state: ApiState<FixtureFetcher>,
    method: &str,
    uri: &str,
  ) -> (StatusCode, Value) {
    let resp = router(state)
      .oneshot(
        Request::builder()
          .method(method)
          .uri(uri)
          .body(Body::empty())
          .unwrap(),
      )
      .await
      .unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
      .await
      .unwrap();
    let json = if bytes.is_empty() {
      Value::Null
    } else {
      serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
  }

  // ── Summary ────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn summary_returns_latest_global_snapshot() {
    let (state, _) = default_state();
    let (status, body) = request(state, "GET", "/api/summary").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["date"], "2020-01-25");
    assert_eq!(body["total_cases"], 212);
    assert_eq!(body["total_deaths"], 13);
    // Recovered source is missing: degraded mode, zeroes — not an error.
    assert_eq!(body["total_recovered"], 0);
    assert_eq!(body["active_cases"], 199);
    assert_eq!(body["new_cases"], 60);
    let cfr = body["case_fatality_rate"].as_f64().unwrap();
    assert!((cfr - 13.0 / 212.0 * 100.0).abs() < 1e-9);
  }

  // ── Series ─────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn global_series_filters_by_date_range() {
    let (state, _) = default_state();
    let (status, body) = request(
      state,
      "GET",
      "/api/global?start=2020-01-23&end=2020-01-24",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let points = body.as_array().unwrap();
    assert_eq!(points.len(), 2);
    assert_eq!(points[0]["date"], "2020-01-23");
    assert_eq!(points[1]["date"], "2020-01-24");
  }

  #[tokio::test]
  async fn inverted_range_is_a_bad_request() {
    let (state, _) = default_state();
    let (status, body) = request(
      state,
      "GET",
      "/api/global?start=2020-02-01&end=2020-01-01",
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("invalid date range"));
  }

  #[tokio::test]
  async fn country_series_clips_negative_daily_counts() {
    let (state, _) = default_state();
    let (status, body) =
      request(state, "GET", "/api/countries/Nation1").await;

    assert_eq!(status, StatusCode::OK);
    let new_cases: Vec<i64> = body
      .as_array()
      .unwrap()
      .iter()
      .map(|p| p["new_cases"].as_i64().unwrap())
      .collect();
    // Cumulative 10, 10, 15, 12: the drop clips to 0, not -3.
    assert_eq!(new_cases, vec![0, 0, 5, 0]);
  }

  #[tokio::test]
  async fn country_series_attaches_rolling_averages_on_request() {
    let (state, _) = default_state();
    let (status, body) = request(
      state,
      "GET",
      "/api/countries/Nation1?rolling_window=2",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let points = body.as_array().unwrap();
    assert_eq!(points.len(), 4);
    // new_cases = [0, 0, 5, 0] → window-2 averages [0, 0, 2.5, 2.5].
    assert_eq!(points[2]["new_cases_avg"].as_f64().unwrap(), 2.5);
    assert_eq!(points[3]["new_cases_avg"].as_f64().unwrap(), 2.5);
  }

  #[tokio::test]
  async fn unknown_country_yields_an_empty_list() {
    let (state, _) = default_state();
    let (status, body) =
      request(state, "GET", "/api/countries/Atlantis").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, serde_json::json!([]));
  }

  // ── Countries & rankings ───────────────────────────────────────────────────

  #[tokio::test]
  async fn countries_listed_sorted() {
    let (state, _) = default_state();
    let (status, body) = request(state, "GET", "/api/countries").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
      body,
      serde_json::json!(["Nation1", "Nation2", "Nation3"])
    );
  }

  #[tokio::test]
  async fn top_breaks_ties_by_encounter_order() {
    let (state, _) = default_state();
    let (status, body) = request(state, "GET", "/api/top?n=2").await;

    assert_eq!(status, StatusCode::OK);
    let entries = body.as_array().unwrap();
    assert_eq!(entries.len(), 2);
    // Nation2 and Nation3 both sit at 100; encounter order decides.
    assert_eq!(entries[0]["country"], "Nation2");
    assert_eq!(entries[1]["country"], "Nation3");
  }

  #[tokio::test]
  async fn top_accepts_metric_and_date() {
    let (state, _) = default_state();
    let (status, body) = request(
      state,
      "GET",
      "/api/top?metric=total_deaths&n=1&date=2020-01-23",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let entries = body.as_array().unwrap();
    assert_eq!(entries[0]["country"], "Nation2");
    assert_eq!(entries[0]["value"], 6);
  }

  // ── Failure propagation ────────────────────────────────────────────────────

  #[tokio::test]
  async fn fetch_failure_surfaces_as_retryable_502() {
    let (state, _) = make_state(&[(Category::Deaths, DEATHS)]);
    let (status, body) = request(state, "GET", "/api/summary").await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["retryable"], true);
    assert!(body["error"].as_str().unwrap().contains("confirmed"));
  }

  #[tokio::test]
  async fn schema_break_surfaces_as_non_retryable_502() {
    let broken = "Province/State,Country/Region,Lat,Long,NotADate\nAlpha,Nation1,0,0,5\n";
    let (state, _) = make_state(&[
      (Category::Confirmed, broken),
      (Category::Deaths, broken),
    ]);
    let (status, body) = request(state, "GET", "/api/summary").await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["retryable"], false);
  }

  // ── Caching & refresh ──────────────────────────────────────────────────────

  #[tokio::test]
  async fn bundle_is_cached_across_requests_until_refresh() {
    let (state, fetches) = default_state();

    request(state.clone(), "GET", "/api/summary").await;
    assert_eq!(fetches.load(Ordering::SeqCst), 3);

    // Second display cycle within the TTL: no new pipeline run.
    request(state.clone(), "GET", "/api/countries").await;
    assert_eq!(fetches.load(Ordering::SeqCst), 3);

    let (status, _) = request(state.clone(), "POST", "/api/refresh").await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    request(state, "GET", "/api/summary").await;
    assert_eq!(fetches.load(Ordering::SeqCst), 6);
  }

  // ── Configuration ──────────────────────────────────────────────────────────

  #[test]
  fn config_defaults_cover_every_field() {
    let cfg: ServerConfig = config::Config::builder()
      .build()
      .unwrap()
      .try_deserialize()
      .unwrap();

    assert_eq!(cfg.port, 8080);
    assert_eq!(cfg.fetch_timeout_seconds, 10);
    assert_eq!(cfg.cache_ttl_seconds, 21600);
    assert!(cfg.sources.confirmed.contains("confirmed_global.csv"));
    assert!(cfg.sources.recovered.contains("recovered_global.csv"));
  }
}
