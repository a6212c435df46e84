//! JSON API for the sitrep dataset pipeline.
//!
//! Exposes an axum [`Router`] over the query layer, generic over the
//! [`SourceFetcher`] so tests can substitute fixture CSV for the network.
//! This is the whole contract with the presentation layer: it receives
//! already-shaped tables and renders them; nothing else couples the two.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", sitrep_api::api_router(state))
//! ```

pub mod countries;
pub mod error;
pub mod rankings;
pub mod refresh;
pub mod series;
pub mod summary;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use sitrep_cache::DataCache;
use sitrep_core::model::DatasetBundle;
use sitrep_source::{Pipeline, SourceFetcher};

pub use error::ApiError;

// ─── Application state ───────────────────────────────────────────────────────

/// Shared state threaded through all handlers.
pub struct ApiState<F> {
  pub pipeline: Arc<Pipeline<F>>,
  pub cache:    Arc<DataCache>,
}

impl<F> Clone for ApiState<F> {
  fn clone(&self) -> Self {
    Self {
      pipeline: Arc::clone(&self.pipeline),
      cache:    Arc::clone(&self.cache),
    }
  }
}

impl<F: SourceFetcher> ApiState<F> {
  /// The bundle every handler works from. One potential refresh per
  /// display cycle; within the TTL this is a cheap clone of the shared
  /// [`Arc`].
  pub async fn bundle(&self) -> Result<Arc<DatasetBundle>, ApiError> {
    let pipeline = Arc::clone(&self.pipeline);
    let bundle = self
      .cache
      .get_or_refresh(|| async move { pipeline.run().await })
      .await?;
    Ok(bundle)
  }
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router for `state`.
pub fn api_router<F>(state: ApiState<F>) -> Router<()>
where
  F: SourceFetcher + 'static,
{
  Router::new()
    .route("/summary", get(summary::handler::<F>))
    .route("/global", get(series::global::<F>))
    .route("/countries", get(countries::list::<F>))
    .route("/countries/{name}", get(series::country::<F>))
    .route("/top", get(rankings::handler::<F>))
    .route("/refresh", post(refresh::handler::<F>))
    .with_state(state)
}
