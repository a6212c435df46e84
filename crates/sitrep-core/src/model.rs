//! Record types for the merged epidemiological dataset.
//!
//! Source tables arrive in wide format: one row per subregion, one column
//! per calendar date, each cell a cumulative count. Reshaping turns them
//! into [`LongRecord`]s, which merge into [`MergedRecord`]s and aggregate
//! up to country and global granularity.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ─── Categories & metrics ────────────────────────────────────────────────────

/// The three series published per region per day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
  Confirmed,
  Deaths,
  Recovered,
}

impl Category {
  /// Label used in log and error messages.
  pub fn label(&self) -> &'static str {
    match self {
      Self::Confirmed => "confirmed",
      Self::Deaths => "deaths",
      Self::Recovered => "recovered",
    }
  }
}

/// A query-selectable column of the merged tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
  TotalCases,
  TotalDeaths,
  TotalRecovered,
  NewCases,
  NewDeaths,
}

// ─── Records ─────────────────────────────────────────────────────────────────

/// One (subregion, date) observation of a single category, produced by
/// reshaping a wide source table. `value` is cumulative as of `date`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LongRecord {
  /// Sub-national unit; empty when the country reports as a whole.
  pub subregion: String,
  pub country:   String,
  pub latitude:  f64,
  pub longitude: f64,
  pub date:      NaiveDate,
  pub value:     i64,
}

/// The canonical per-subregion-per-day row. The merge key
/// (subregion, country, date) is unique across the merged set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergedRecord {
  pub subregion:       String,
  pub country:         String,
  pub latitude:        f64,
  pub longitude:       f64,
  pub date:            NaiveDate,
  pub total_cases:     i64,
  pub total_deaths:    i64,
  /// All zero when the recovered series is unavailable from the source.
  pub total_recovered: i64,
  /// First difference of `total_cases` within the (country, subregion)
  /// series, clipped at zero. The first observation of a series is 0.
  pub new_cases:       i64,
  pub new_deaths:      i64,
}

/// [`MergedRecord`] fields summed over a country's subregions for one date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryAggregate {
  pub country:         String,
  pub date:            NaiveDate,
  pub total_cases:     i64,
  pub total_deaths:    i64,
  pub total_recovered: i64,
  pub new_cases:       i64,
  pub new_deaths:      i64,
}

/// [`MergedRecord`] fields summed over everything for one date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalAggregate {
  pub date:            NaiveDate,
  pub total_cases:     i64,
  pub total_deaths:    i64,
  pub total_recovered: i64,
  pub new_cases:       i64,
  pub new_deaths:      i64,
}

// ─── Bundle ──────────────────────────────────────────────────────────────────

/// The immutable output of one pipeline run. Created once per refresh, held
/// for the cache TTL, replaced wholesale — never mutated in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetBundle {
  pub raw:        Vec<MergedRecord>,
  pub by_country: Vec<CountryAggregate>,
  pub global:     Vec<GlobalAggregate>,
  /// Distinct country names, sorted.
  pub countries:  Vec<String>,
}

// ─── Row-access traits ───────────────────────────────────────────────────────

/// Rows carrying an observation date.
pub trait DatedRow {
  fn date(&self) -> NaiveDate;
}

/// Rows attributable to a country.
pub trait CountryRow {
  fn country(&self) -> &str;
}

/// Rows exposing the merged metric columns.
pub trait MetricRow {
  fn metric(&self, metric: Metric) -> i64;
}

macro_rules! impl_metric_row {
  ($ty:ty) => {
    impl MetricRow for $ty {
      fn metric(&self, metric: Metric) -> i64 {
        match metric {
          Metric::TotalCases => self.total_cases,
          Metric::TotalDeaths => self.total_deaths,
          Metric::TotalRecovered => self.total_recovered,
          Metric::NewCases => self.new_cases,
          Metric::NewDeaths => self.new_deaths,
        }
      }
    }
  };
}

impl_metric_row!(MergedRecord);
impl_metric_row!(CountryAggregate);
impl_metric_row!(GlobalAggregate);

impl DatedRow for LongRecord {
  fn date(&self) -> NaiveDate { self.date }
}
impl DatedRow for MergedRecord {
  fn date(&self) -> NaiveDate { self.date }
}
impl DatedRow for CountryAggregate {
  fn date(&self) -> NaiveDate { self.date }
}
impl DatedRow for GlobalAggregate {
  fn date(&self) -> NaiveDate { self.date }
}

impl CountryRow for MergedRecord {
  fn country(&self) -> &str { &self.country }
}
impl CountryRow for CountryAggregate {
  fn country(&self) -> &str { &self.country }
}
