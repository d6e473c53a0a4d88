//! Application state for the web layer.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::feeds::FeedClient;
use crate::scheduler::Scheduler;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Refresh driver holding the latest outcome
    pub scheduler: Arc<Scheduler<FeedClient>>,

    /// How often the page should poll for new data
    pub refresh_interval: Duration,

    /// Artifact directory served under `/artifacts`, when capturing
    pub artifact_dir: Option<PathBuf>,

    /// Directory served under `/static`
    pub static_dir: PathBuf,
}

impl AppState {
    /// Create a new app state.
    pub fn new(
        scheduler: Arc<Scheduler<FeedClient>>,
        refresh_interval: Duration,
        static_dir: impl Into<PathBuf>,
    ) -> Self {
        let artifact_dir = scheduler
            .pipeline()
            .renderer()
            .map(|r| r.output_dir().to_path_buf());

        Self {
            scheduler,
            refresh_interval,
            artifact_dir,
            static_dir: static_dir.into(),
        }
    }
}
