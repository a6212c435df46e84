//! Error types for `sitrep-core`.
//!
//! One taxonomy covers the whole pipeline: errors raised in the source or
//! merge layers propagate unmodified through the cache to the caller, which
//! matches on the kind rather than catching anything generic.

use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// Network or HTTP failure while retrieving a source table, or a body
  /// that is not tabular data at all. Retryable by re-running the pipeline.
  #[error("failed to fetch {source_name}: {message}")]
  Fetch {
    source_name: String,
    message:     String,
  },

  /// The source table does not have the expected shape. Signals an upstream
  /// format change, not a transient condition.
  #[error("unexpected source shape: {0}")]
  Schema(String),

  /// The pipeline produced no usable rows. Not retryable without
  /// investigating the source.
  #[error("dataset is empty after processing")]
  EmptyDataset,

  /// Caller supplied an inverted date range.
  #[error("invalid date range: {start} is after {end}")]
  InvalidRange {
    start: NaiveDate,
    end:   NaiveDate,
  },
}

impl Error {
  /// Whether re-running the pipeline can plausibly clear the failure.
  pub fn is_retryable(&self) -> bool { matches!(self, Self::Fetch { .. }) }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
