//! TTL cache for pipeline output.
//!
//! An explicit cache object rather than module-level state: the clock is
//! injectable so tests can move time by hand, and consumers receive the
//! cache by reference. One bundle is shared across all consumers and
//! replaced wholesale on refresh.

use std::{future::Future, sync::Arc};

use chrono::{DateTime, TimeDelta, Utc};
use sitrep_core::{Result, model::DatasetBundle};
use tokio::sync::Mutex;
use tracing::{debug, info};

// ─── Clock ───────────────────────────────────────────────────────────────────

/// Time source for TTL decisions.
pub trait Clock: Send + Sync {
  fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time; the production clock.
pub struct SystemClock;

impl Clock for SystemClock {
  fn now(&self) -> DateTime<Utc> { Utc::now() }
}

// ─── Cache ───────────────────────────────────────────────────────────────────

struct CachedBundle {
  bundle:       Arc<DatasetBundle>,
  refreshed_at: DateTime<Utc>,
}

/// Memoizes one [`DatasetBundle`] for a bounded time window.
///
/// The state mutex is held across the refresh future, which is what makes
/// the refresh single-flight: concurrent callers observing an expired cache
/// queue behind the first one and then see its freshly stored bundle.
pub struct DataCache {
  ttl:   TimeDelta,
  clock: Arc<dyn Clock>,
  state: Mutex<Option<CachedBundle>>,
}

impl DataCache {
  pub fn new(ttl_seconds: i64, clock: Arc<dyn Clock>) -> Self {
    Self {
      ttl: TimeDelta::seconds(ttl_seconds),
      clock,
      state: Mutex::new(None),
    }
  }

  /// Return the cached bundle, running `refresh` first when the cache is
  /// empty or its TTL has elapsed.
  ///
  /// A failed refresh leaves the previous bundle and timestamp untouched
  /// and returns the error — stale data is never silently re-stamped as
  /// fresh.
  pub async fn get_or_refresh<F, Fut>(
    &self,
    refresh: F,
  ) -> Result<Arc<DatasetBundle>>
  where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<DatasetBundle>>,
  {
    let mut state = self.state.lock().await;

    if let Some(cached) = state.as_ref() {
      let age = self.clock.now() - cached.refreshed_at;
      if age < self.ttl {
        debug!(age_seconds = age.num_seconds(), "serving cached bundle");
        return Ok(Arc::clone(&cached.bundle));
      }
    }

    info!("cache empty or expired, running pipeline");
    let bundle = Arc::new(refresh().await?);
    *state = Some(CachedBundle {
      bundle:       Arc::clone(&bundle),
      refreshed_at: self.clock.now(),
    });
    Ok(bundle)
  }

  /// Drop the stored bundle and timestamp immediately. The next read runs
  /// the pipeline again.
  pub async fn invalidate(&self) {
    info!("cache invalidated");
    *self.state.lock().await = None;
  }

  /// When the current bundle was stored, if any.
  pub async fn last_refreshed(&self) -> Option<DateTime<Utc>> {
    self.state.lock().await.as_ref().map(|c| c.refreshed_at)
  }
}
