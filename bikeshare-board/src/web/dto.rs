//! Data transfer objects for web responses.

use serde::Serialize;

use crate::domain::StationRecord;
use crate::fusion::ExclusionCounts;
use crate::pipeline::{ArtifactStatus, RefreshOutcome, RefreshResult};

/// State of the latest refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SnapshotStatus {
    /// No refresh has completed yet
    Pending,
    Ok,
    Failed,
}

/// A station in a snapshot.
#[derive(Debug, Serialize)]
pub struct StationResult {
    pub station_id: String,
    pub name: String,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub capacity: u64,
    pub num_bikes_available: u64,
    pub available_bikes_ratio: f64,
    /// Ratio formatted for display, e.g. "45.67%"
    pub availability: String,
    pub size_weight: u8,
}

impl StationResult {
    pub fn from_record(record: &StationRecord) -> Self {
        Self {
            station_id: record.station_id.to_string(),
            name: record.display_name().to_string(),
            lat: record.lat,
            lon: record.lon,
            capacity: record.capacity,
            num_bikes_available: record.num_bikes_available,
            available_bikes_ratio: record.available_bikes_ratio,
            availability: record.availability_percent(),
            size_weight: record.size_weight,
        }
    }
}

/// Latest refresh, as served by `/api/snapshot`.
#[derive(Debug, Serialize)]
pub struct SnapshotResponse {
    pub status: SnapshotStatus,
    pub tick: Option<u64>,
    /// Local time of the refresh, `YYYY-MM-DD HH:MM:SS`
    pub completed_at: Option<String>,
    /// Failure notice, when the refresh failed
    pub error: Option<String>,
    pub stations: Vec<StationResult>,
    pub excluded: Option<ExclusionCounts>,
    /// URL of the refresh's artifact, when one was written
    pub artifact_url: Option<String>,
    /// Upstream `last_updated` of the status feed, epoch seconds
    pub feed_last_updated: Option<i64>,
    /// Escaped HTML listing of the same refresh, as served by `/stations`
    pub listing: String,
}

impl SnapshotResponse {
    /// Response before any refresh has completed.
    pub fn pending() -> Self {
        Self {
            status: SnapshotStatus::Pending,
            tick: None,
            completed_at: None,
            error: None,
            stations: Vec::new(),
            excluded: None,
            artifact_url: None,
            feed_last_updated: None,
            listing: String::new(),
        }
    }

    pub fn from_outcome(outcome: &RefreshOutcome) -> Self {
        let (status, error, stations) = match &outcome.result {
            RefreshResult::Ok(records) => (
                SnapshotStatus::Ok,
                None,
                records.iter().map(StationResult::from_record).collect(),
            ),
            RefreshResult::Failed(e) => (SnapshotStatus::Failed, Some(e.to_string()), Vec::new()),
        };

        Self {
            status,
            tick: Some(outcome.tick),
            completed_at: Some(outcome.completed_at.format("%Y-%m-%d %H:%M:%S").to_string()),
            error,
            stations,
            excluded: outcome.excluded,
            artifact_url: artifact_url(&outcome.artifact),
            feed_last_updated: outcome.status_last_updated,
            listing: String::new(),
        }
    }

    /// Attach the rendered listing.
    pub fn with_listing(mut self, listing: String) -> Self {
        self.listing = listing;
        self
    }
}

/// URL under which a written artifact is served.
pub fn artifact_url(artifact: &ArtifactStatus) -> Option<String> {
    let name = artifact.path()?.file_name()?.to_str()?;
    Some(format!("/artifacts/{name}"))
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
