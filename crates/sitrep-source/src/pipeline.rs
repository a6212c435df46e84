//! The full fetch → reshape → merge pipeline.
//!
//! The three category fetches fan out concurrently and form a strict
//! barrier: all must finish (or fail) before reshaping begins. This is a
//! fan-out/fan-in join, not a streaming pipeline.

use serde::Deserialize;
use sitrep_core::{
  Result,
  merge::merge,
  model::{Category, DatasetBundle},
};
use tracing::warn;

use crate::fetch::{DataSource, SourceFetcher};
use crate::reshape::reshape;

/// URLs for the three category tables.
#[derive(Debug, Clone, Deserialize)]
pub struct Sources {
  pub confirmed: String,
  pub deaths:    String,
  pub recovered: String,
}

impl Sources {
  /// The JHU CSSE global time-series tables.
  pub fn jhu_defaults() -> Self {
    const BASE: &str = "https://raw.githubusercontent.com/CSSEGISandData/COVID-19/master/csse_covid_19_data/csse_covid_19_time_series";
    Self {
      confirmed: format!("{BASE}/time_series_covid19_confirmed_global.csv"),
      deaths:    format!("{BASE}/time_series_covid19_deaths_global.csv"),
      recovered: format!("{BASE}/time_series_covid19_recovered_global.csv"),
    }
  }
}

impl Default for Sources {
  fn default() -> Self { Self::jhu_defaults() }
}

/// Source configuration plus the fetcher that executes it.
pub struct Pipeline<F> {
  fetcher: F,
  sources: Sources,
}

impl<F: SourceFetcher> Pipeline<F> {
  pub fn new(fetcher: F, sources: Sources) -> Self {
    Self { fetcher, sources }
  }

  /// Execute one full pipeline run and produce a fresh [`DatasetBundle`].
  ///
  /// A failure in the recovered category alone degrades to an all-zero
  /// `total_recovered` column; confirmed and deaths failures fail the run.
  pub async fn run(&self) -> Result<DatasetBundle> {
    let confirmed_source = DataSource {
      category: Category::Confirmed,
      url:      self.sources.confirmed.clone(),
    };
    let deaths_source = DataSource {
      category: Category::Deaths,
      url:      self.sources.deaths.clone(),
    };
    let recovered_source = DataSource {
      category: Category::Recovered,
      url:      self.sources.recovered.clone(),
    };

    let (confirmed, deaths, recovered) = tokio::join!(
      self.fetcher.fetch(&confirmed_source),
      self.fetcher.fetch(&deaths_source),
      self.fetcher.fetch(&recovered_source),
    );

    let confirmed = reshape(&confirmed?, Category::Confirmed)?;
    let deaths = reshape(&deaths?, Category::Deaths)?;
    let recovered = match recovered
      .and_then(|table| reshape(&table, Category::Recovered))
    {
      Ok(records) => Some(records),
      Err(e) => {
        warn!(error = %e, "recovered series unavailable, continuing with zeroes");
        None
      }
    };

    merge(&confirmed, &deaths, recovered.as_deref())
  }
}
