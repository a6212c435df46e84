//! Source-table ingestion for sitrep.
//!
//! Fetches the three wide-format category tables over HTTP, reshapes them
//! into long-format records, and feeds [`sitrep_core::merge`] — the
//! fan-out/fan-in half of the pipeline.

pub mod fetch;
pub mod pipeline;
pub mod reshape;
pub mod table;

pub use fetch::{DataSource, HttpFetcher, SourceFetcher};
pub use pipeline::{Pipeline, Sources};
pub use table::WideTable;
