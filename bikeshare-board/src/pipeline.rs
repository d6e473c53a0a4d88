//! The refresh pipeline.
//!
//! One refresh fetches both feeds, fuses them and, in the capture
//! deployment, writes a map artifact. Fetch and fusion failures fail the
//! whole refresh; render failures only mark the artifact as failed.

use std::future::Future;
use std::path::PathBuf;

use chrono::{Local, NaiveDateTime};
use tracing::{debug, info, warn};

use crate::domain::StationRecord;
use crate::feeds::{FeedClient, FeedSnapshot, FetchError};
use crate::fusion::{ExclusionCounts, FusionError, fuse_with_report};
use crate::render::{ArtifactRenderer, RenderError};

/// Something that can provide both feeds.
///
/// Implemented by [`FeedClient`]; tests substitute canned feeds.
pub trait FeedSource: Send + Sync {
    fn fetch_feeds(&self) -> impl Future<Output = Result<FeedSnapshot, FetchError>> + Send;
}

impl FeedSource for FeedClient {
    async fn fetch_feeds(&self) -> Result<FeedSnapshot, FetchError> {
        FeedClient::fetch_feeds(self).await
    }
}

/// Why a refresh produced no records.
#[derive(Debug, Clone, thiserror::Error)]
pub enum RefreshError {
    #[error("feed fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("fusion failed: {0}")]
    Fusion(#[from] FusionError),
}

/// Records of one refresh, all or nothing.
#[derive(Debug, Clone)]
pub enum RefreshResult {
    Ok(Vec<StationRecord>),
    Failed(RefreshError),
}

impl RefreshResult {
    pub fn is_ok(&self) -> bool {
        matches!(self, RefreshResult::Ok(_))
    }

    pub fn records(&self) -> Option<&[StationRecord]> {
        match self {
            RefreshResult::Ok(records) => Some(records),
            RefreshResult::Failed(_) => None,
        }
    }

    pub fn error(&self) -> Option<&RefreshError> {
        match self {
            RefreshResult::Ok(_) => None,
            RefreshResult::Failed(e) => Some(e),
        }
    }
}

/// What happened to the artifact of a refresh.
#[derive(Debug)]
pub enum ArtifactStatus {
    /// No renderer configured.
    Disabled,
    /// The refresh failed before rendering; nothing was written.
    Skipped,
    Written(PathBuf),
    Failed(RenderError),
}

impl ArtifactStatus {
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            ArtifactStatus::Written(path) => Some(path),
            _ => None,
        }
    }
}

/// Everything a refresh produced.
#[derive(Debug)]
pub struct RefreshOutcome {
    pub tick: u64,
    /// Local wall-clock time the feeds were fused (and the artifact stamped).
    pub completed_at: NaiveDateTime,
    pub result: RefreshResult,
    pub artifact: ArtifactStatus,
    /// Rows dropped by fusion; `None` when fusion did not run.
    pub excluded: Option<ExclusionCounts>,
    /// Publisher's `last_updated` for the status feed, epoch seconds.
    pub status_last_updated: Option<i64>,
}

/// Fetch → fuse → render, one tick at a time.
pub struct RefreshPipeline<S> {
    source: S,
    renderer: Option<ArtifactRenderer>,
}

impl<S: FeedSource> RefreshPipeline<S> {
    /// Create a pipeline without artifact rendering.
    pub fn new(source: S) -> Self {
        Self {
            source,
            renderer: None,
        }
    }

    /// Enable artifact rendering.
    pub fn with_renderer(mut self, renderer: ArtifactRenderer) -> Self {
        self.renderer = Some(renderer);
        self
    }

    pub fn renderer(&self) -> Option<&ArtifactRenderer> {
        self.renderer.as_ref()
    }

    /// Run one refresh for `tick`.
    ///
    /// Never fails as a whole: failures are reported inside the outcome.
    pub async fn refresh(&self, tick: u64) -> RefreshOutcome {
        let fetched = self.source.fetch_feeds().await;
        let completed_at = Local::now().naive_local();

        let snapshot = match fetched {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(tick, error = %e, "feed fetch failed, skipping tick");
                return self.failed(tick, completed_at, e.into(), None);
            }
        };

        let status_last_updated = snapshot.status.last_updated;

        let fused = match fuse_with_report(&snapshot.info, &snapshot.status) {
            Ok(fused) => fused,
            Err(e) => {
                warn!(tick, error = %e, "fusion failed, skipping tick");
                return self.failed(tick, completed_at, e.into(), status_last_updated);
            }
        };

        info!(
            tick,
            stations = fused.records.len(),
            unmatched_info = fused.excluded.unmatched_info,
            unmatched_status = fused.excluded.unmatched_status,
            incomplete = fused.excluded.incomplete,
            "refreshed station data"
        );

        let artifact = self
            .render_artifact(&fused.records, tick, completed_at)
            .await;

        RefreshOutcome {
            tick,
            completed_at,
            result: RefreshResult::Ok(fused.records),
            artifact,
            excluded: Some(fused.excluded),
            status_last_updated,
        }
    }

    fn failed(
        &self,
        tick: u64,
        completed_at: NaiveDateTime,
        error: RefreshError,
        status_last_updated: Option<i64>,
    ) -> RefreshOutcome {
        let artifact = if self.renderer.is_some() {
            ArtifactStatus::Skipped
        } else {
            ArtifactStatus::Disabled
        };

        RefreshOutcome {
            tick,
            completed_at,
            result: RefreshResult::Failed(error),
            artifact,
            excluded: None,
            status_last_updated,
        }
    }

    async fn render_artifact(
        &self,
        records: &[StationRecord],
        tick: u64,
        captured_at: NaiveDateTime,
    ) -> ArtifactStatus {
        let Some(renderer) = self.renderer.clone() else {
            return ArtifactStatus::Disabled;
        };

        let output_dir = renderer.output_dir().to_path_buf();
        let records = records.to_vec();
        let rendered =
            tokio::task::spawn_blocking(move || renderer.render(&records, tick, captured_at))
                .await;

        match rendered {
            Ok(Ok(path)) => {
                debug!(tick, path = %path.display(), "wrote artifact");
                ArtifactStatus::Written(path)
            }
            Ok(Err(e)) => {
                warn!(tick, error = %e, "artifact render failed");
                ArtifactStatus::Failed(e)
            }
            Err(e) => {
                warn!(tick, error = %e, "artifact render task aborted");
                ArtifactStatus::Failed(RenderError::EncodeFailure {
                    path: output_dir,
                    message: e.to_string(),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::StationId;
    use crate::feeds::{
        Endpoint, RawStationInfo, RawStationInfoSet, RawStationStatus, RawStationStatusSet,
    };
    use crate::render::ArtifactConfig;
    use tempfile::tempdir;

    /// Serves the same result on every fetch.
    struct CannedFeeds(Result<FeedSnapshot, FetchError>);

    impl FeedSource for CannedFeeds {
        async fn fetch_feeds(&self) -> Result<FeedSnapshot, FetchError> {
            self.0.clone()
        }
    }

    fn snapshot() -> FeedSnapshot {
        let mut status = RawStationStatusSet::new(vec![RawStationStatus {
            station_id: Some(StationId::new("1")),
            num_bikes_available: Some(3),
        }]);
        status.last_updated = Some(1_700_000_000);

        FeedSnapshot {
            info: RawStationInfoSet::new(vec![RawStationInfo {
                station_id: Some(StationId::new("1")),
                name: Some("A".into()),
                lat: Some(48.8),
                lon: Some(2.3),
                capacity: Some(10),
            }]),
            status,
        }
    }

    fn unavailable() -> FetchError {
        FetchError::Transport {
            endpoint: Endpoint::StationInformation,
            url: "http://feeds/info.json".into(),
            status: Some(503),
            message: "Service Unavailable".into(),
        }
    }

    #[tokio::test]
    async fn successful_refresh_returns_records() {
        let pipeline = RefreshPipeline::new(CannedFeeds(Ok(snapshot())));

        let outcome = pipeline.refresh(0).await;

        let records = outcome.result.records().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].available_bikes_ratio, 0.3);
        assert!(matches!(outcome.artifact, ArtifactStatus::Disabled));
        assert_eq!(outcome.excluded, Some(ExclusionCounts::default()));
        assert_eq!(outcome.status_last_updated, Some(1_700_000_000));
    }

    #[tokio::test]
    async fn fetch_failure_fails_tick_without_artifact() {
        let dir = tempdir().unwrap();
        let renderer = ArtifactRenderer::new(ArtifactConfig::new(dir.path()));
        let pipeline = RefreshPipeline::new(CannedFeeds(Err(unavailable()))).with_renderer(renderer);

        let outcome = pipeline.refresh(7).await;

        assert_eq!(outcome.tick, 7);
        assert!(matches!(
            outcome.result,
            RefreshResult::Failed(RefreshError::Fetch(FetchError::Transport {
                status: Some(503),
                ..
            }))
        ));
        assert!(matches!(outcome.artifact, ArtifactStatus::Skipped));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn missing_column_fails_tick() {
        let mut feeds = snapshot();
        feeds.status.has_availability_field = false;
        let pipeline = RefreshPipeline::new(CannedFeeds(Ok(feeds)));

        let outcome = pipeline.refresh(0).await;

        assert!(matches!(
            outcome.result.error(),
            Some(RefreshError::Fusion(FusionError::MissingColumn { .. }))
        ));
        assert!(outcome.excluded.is_none());
    }

    #[tokio::test]
    async fn writes_artifact_when_enabled() {
        let dir = tempdir().unwrap();
        let renderer = ArtifactRenderer::new(ArtifactConfig::new(dir.path()));
        let pipeline = RefreshPipeline::new(CannedFeeds(Ok(snapshot()))).with_renderer(renderer);

        let outcome = pipeline.refresh(3).await;

        let path = outcome.artifact.path().unwrap();
        assert!(path.exists());
        let name = path.file_name().unwrap().to_string_lossy();
        assert!(name.starts_with("screenshot-3_"));
        assert_eq!(image::image_dimensions(path).unwrap(), (1000, 700));
    }

    #[tokio::test]
    async fn render_failure_keeps_records() {
        let dir = tempdir().unwrap();
        let renderer = ArtifactRenderer::new(ArtifactConfig::new(dir.path().join("missing")));
        let pipeline = RefreshPipeline::new(CannedFeeds(Ok(snapshot()))).with_renderer(renderer);

        let outcome = pipeline.refresh(0).await;

        assert!(outcome.result.is_ok());
        assert_eq!(outcome.result.records().unwrap().len(), 1);
        assert!(matches!(
            outcome.artifact,
            ArtifactStatus::Failed(RenderError::IoFailure { .. })
        ));
    }

    #[test]
    fn refresh_error_display() {
        let err = RefreshError::from(FusionError::MissingColumn {
            column: "num_bikes_available".into(),
        });
        assert_eq!(
            err.to_string(),
            "fusion failed: status feed has no 'num_bikes_available' field in any station"
        );
    }
}
