//! Askama templates for the web frontend.

use askama::Template;

use crate::domain::StationRecord;
use crate::pipeline::{RefreshOutcome, RefreshResult};

use super::dto::artifact_url;

/// Notice shown in place of the listing when a refresh failed.
pub const FAILURE_NOTICE: &str = "Failed to update station data.";

/// Notice shown before the first refresh completes.
pub const PENDING_NOTICE: &str = "Waiting for the first refresh.";

// ============================================================================
// Page Templates (extend base.html)
// ============================================================================

/// Map and station listing.
#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub refresh_secs: u64,
}

// ============================================================================
// Fragment Templates (polled by the page, no base.html)
// ============================================================================

/// Station listing fragment.
#[derive(Template)]
#[template(path = "station_list.html")]
pub struct StationListTemplate {
    pub rows: Vec<StationRow>,
    pub updated_at: String,
    pub excluded: usize,
    pub artifact_url: Option<String>,
}

/// Single plain-text notice fragment.
#[derive(Template)]
#[template(path = "notice.html")]
pub struct NoticeTemplate {
    pub message: String,
}

/// Render the listing fragment for the latest outcome.
pub fn render_station_list(latest: Option<&RefreshOutcome>) -> askama::Result<String> {
    let Some(outcome) = latest else {
        return NoticeTemplate {
            message: PENDING_NOTICE.to_string(),
        }
        .render();
    };

    match &outcome.result {
        RefreshResult::Failed(_) => NoticeTemplate {
            message: FAILURE_NOTICE.to_string(),
        }
        .render(),
        RefreshResult::Ok(records) => StationListTemplate {
            rows: records.iter().map(StationRow::from_record).collect(),
            updated_at: outcome.completed_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            excluded: outcome.excluded.map(|e| e.total()).unwrap_or(0),
            artifact_url: artifact_url(&outcome.artifact),
        }
        .render(),
    }
}

// ============================================================================
// View Models (for templates)
// ============================================================================

/// One row of the station listing.
#[derive(Debug, Clone, PartialEq)]
pub struct StationRow {
    pub name: String,
    /// e.g. "45.67%"
    pub availability: String,
    pub capacity: u64,
}

impl StationRow {
    pub fn from_record(record: &StationRecord) -> Self {
        Self {
            name: record.display_name().to_string(),
            availability: record.availability_percent(),
            capacity: record.capacity,
        }
    }
}
