//! Core types and pure transforms for the sitrep dataset pipeline.
//!
//! This crate is deliberately free of HTTP and async dependencies.
//! All other crates depend on it; it depends on nothing but
//! chrono/serde/thiserror.

pub mod error;
pub mod merge;
pub mod model;
pub mod query;

pub use error::{Error, Result};
