//! Periodic refresh driver.
//!
//! Owns the tick counter and guarantees at most one refresh in flight:
//! a trigger arriving while a refresh runs is skipped, not queued.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::sync::{Mutex, RwLock};
use tokio::time::MissedTickBehavior;
use tracing::debug;

use crate::pipeline::{FeedSource, RefreshOutcome, RefreshPipeline};

/// Default refresh interval.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(60);

/// Refresh interval of the capture deployment.
pub const CAPTURE_REFRESH_INTERVAL: Duration = Duration::from_secs(600);

/// Runs the pipeline on demand or on a timer, one tick at a time.
pub struct Scheduler<S> {
    pipeline: RefreshPipeline<S>,
    next_tick: AtomicU64,
    in_flight: Mutex<()>,
    latest: RwLock<Option<Arc<RefreshOutcome>>>,
}

impl<S: FeedSource> Scheduler<S> {
    pub fn new(pipeline: RefreshPipeline<S>) -> Self {
        Self {
            pipeline,
            next_tick: AtomicU64::new(0),
            in_flight: Mutex::new(()),
            latest: RwLock::new(None),
        }
    }

    pub fn pipeline(&self) -> &RefreshPipeline<S> {
        &self.pipeline
    }

    /// Run one refresh unless another is in flight.
    ///
    /// Returns `None` when skipped. Tick indices are only consumed by
    /// refreshes that actually run, so they increase by one each time.
    pub async fn trigger(&self) -> Option<Arc<RefreshOutcome>> {
        let Ok(_guard) = self.in_flight.try_lock() else {
            debug!("refresh already in flight, skipping tick");
            return None;
        };

        let tick = self.next_tick.fetch_add(1, Ordering::SeqCst);
        let outcome = Arc::new(self.pipeline.refresh(tick).await);

        let mut latest = self.latest.write().await;
        *latest = Some(Arc::clone(&outcome));

        Some(outcome)
    }

    /// The most recent outcome, if any refresh has completed.
    pub async fn latest(&self) -> Option<Arc<RefreshOutcome>> {
        let guard = self.latest.read().await;
        guard.clone()
    }

    /// Refresh every `interval`, starting immediately. Never returns.
    ///
    /// Ticks missed because a refresh outlived the interval are dropped
    /// rather than fired in a burst.
    pub async fn run(self: Arc<Self>, interval: Duration) {
        let mut timer = tokio::time::interval(interval);
        timer.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            timer.tick().await;
            self.trigger().await;
        }
    }
}
