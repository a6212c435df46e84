//! HTTP retrieval of wide-format source tables.

use std::{future::Future, time::Duration};

use sitrep_core::{Error, Result, model::Category};
use tracing::info;

use crate::table::WideTable;

/// Default per-fetch timeout. There is no retry at this layer; a failed
/// fetch propagates and the caller decides whether to re-run the pipeline.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// A named remote table: one category, one URL.
#[derive(Debug, Clone)]
pub struct DataSource {
  pub category: Category,
  pub url:      String,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over table retrieval. The pipeline and everything above it
/// depend on this, not on [`reqwest`], so tests can substitute fixture CSV
/// for the network.
pub trait SourceFetcher: Send + Sync {
  /// Retrieve and parse one source table.
  ///
  /// Fails with [`Error::Fetch`] when the source is unreachable, returns a
  /// non-2xx status, or returns a body that is not tabular data.
  fn fetch<'a>(
    &'a self,
    source: &'a DataSource,
  ) -> impl Future<Output = Result<WideTable>> + Send + 'a;
}

// ─── Production implementation ───────────────────────────────────────────────

/// Fetcher backed by [`reqwest`] with a bounded per-request timeout.
///
/// Cheap to clone — the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct HttpFetcher {
  client: reqwest::Client,
}

impl HttpFetcher {
  pub fn new(timeout: Duration) -> reqwest::Result<Self> {
    let client = reqwest::Client::builder().timeout(timeout).build()?;
    Ok(Self { client })
  }
}

impl SourceFetcher for HttpFetcher {
  fn fetch<'a>(
    &'a self,
    source: &'a DataSource,
  ) -> impl Future<Output = Result<WideTable>> + Send + 'a {
    async move {
      let fetch_err = |message: String| Error::Fetch {
        source_name: source.category.label().to_string(),
        message,
      };

      info!(
        category = source.category.label(),
        url = %source.url,
        "fetching source table"
      );
      let response = self
        .client
        .get(&source.url)
        .send()
        .await
        .map_err(|e| fetch_err(e.to_string()))?;
      if !response.status().is_success() {
        return Err(fetch_err(format!("HTTP {}", response.status())));
      }
      let body = response
        .text()
        .await
        .map_err(|e| fetch_err(e.to_string()))?;

      let table = WideTable::parse(&body)
        .map_err(|e| fetch_err(format!("body is not tabular data: {e}")))?;
      info!(
        category = source.category.label(),
        rows = table.rows.len(),
        "fetched source table"
      );
      Ok(table)
    }
  }
}
