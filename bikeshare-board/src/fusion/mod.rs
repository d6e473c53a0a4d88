//! Fusion of the two feeds into station records.
//!
//! Three steps, applied in order:
//! 1. [`join_stations`]: inner join of info and status rows on `station_id`
//! 2. [`availability_ratio`]: bikes / capacity for each joined row
//! 3. a completeness filter dropping rows without a ratio
//!
//! Everything here is pure. Inputs are borrowed and never modified.

mod error;

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::domain::{SIZE_WEIGHT, StationId, StationRecord};
use crate::feeds::{RawStationInfo, RawStationInfoSet, RawStationStatus, RawStationStatusSet};

pub use error::FusionError;

/// A pair of rows sharing a station id.
#[derive(Debug, Clone, Copy)]
pub struct JoinedStation<'a> {
    pub station_id: &'a StationId,
    pub info: &'a RawStationInfo,
    pub status: &'a RawStationStatus,
}

/// How many rows fusion dropped, and why.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ExclusionCounts {
    /// Info rows with no status row (or no id).
    pub unmatched_info: usize,
    /// Status rows with no info row (or no id).
    pub unmatched_status: usize,
    /// Joined rows whose ratio is undefined.
    pub incomplete: usize,
}

impl ExclusionCounts {
    pub fn total(&self) -> usize {
        self.unmatched_info + self.unmatched_status + self.incomplete
    }
}

/// Records produced by a fusion, with diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct FusedStations {
    pub records: Vec<StationRecord>,
    pub excluded: ExclusionCounts,
}

/// Fuse the two feeds into station records.
///
/// Stations present in one feed only are dropped, as are stations whose
/// capacity is zero or missing or whose availability is missing. Fails only
/// if the status feed lacks the availability field entirely.
pub fn fuse(
    info: &RawStationInfoSet,
    status: &RawStationStatusSet,
) -> Result<Vec<StationRecord>, FusionError> {
    fuse_with_report(info, status).map(|fused| fused.records)
}

/// Like [`fuse`], but also reports how many rows were excluded.
pub fn fuse_with_report(
    info: &RawStationInfoSet,
    status: &RawStationStatusSet,
) -> Result<FusedStations, FusionError> {
    if !status.has_availability_field {
        return Err(FusionError::MissingColumn {
            column: status.availability_field.clone(),
        });
    }

    let joined = join_stations(info, status);

    let info_ids: HashSet<&StationId> = info
        .stations
        .iter()
        .filter_map(|s| s.station_id.as_ref())
        .collect();
    let status_ids: HashSet<&StationId> = status
        .stations
        .iter()
        .filter_map(|s| s.station_id.as_ref())
        .collect();

    let unmatched_info = info
        .stations
        .iter()
        .filter(|s| s.station_id.as_ref().is_none_or(|id| !status_ids.contains(id)))
        .count();
    let unmatched_status = status
        .stations
        .iter()
        .filter(|s| s.station_id.as_ref().is_none_or(|id| !info_ids.contains(id)))
        .count();

    let joined_count = joined.len();
    let records: Vec<StationRecord> = joined.into_iter().filter_map(to_record).collect();

    Ok(FusedStations {
        excluded: ExclusionCounts {
            unmatched_info,
            unmatched_status,
            incomplete: joined_count - records.len(),
        },
        records,
    })
}

/// Inner join on `station_id`.
///
/// Output follows the info feed's order. A station id repeated in the
/// status feed yields one joined row per status row, in status order.
/// Rows without an id never join.
pub fn join_stations<'a>(
    info: &'a RawStationInfoSet,
    status: &'a RawStationStatusSet,
) -> Vec<JoinedStation<'a>> {
    let mut by_id: HashMap<&StationId, Vec<&RawStationStatus>> = HashMap::new();
    for row in &status.stations {
        if let Some(id) = &row.station_id {
            by_id.entry(id).or_default().push(row);
        }
    }

    info.stations
        .iter()
        .filter_map(|info_row| {
            let id = info_row.station_id.as_ref()?;
            let matches = by_id.get(id)?;
            Some(matches.iter().copied().map(move |status_row| JoinedStation {
                station_id: id,
                info: info_row,
                status: status_row,
            }))
        })
        .flatten()
        .collect()
}

/// Ratio of available bikes to capacity.
///
/// `None` when capacity is zero or unknown, or availability is unknown.
/// The result is not clamped.
pub fn availability_ratio(num_bikes_available: Option<u64>, capacity: Option<u64>) -> Option<f64> {
    let bikes = num_bikes_available?;
    let capacity = capacity.filter(|&c| c > 0)?;
    Some(bikes as f64 / capacity as f64)
}

/// Metric and filter for one joined row.
fn to_record(joined: JoinedStation<'_>) -> Option<StationRecord> {
    let ratio = availability_ratio(joined.status.num_bikes_available, joined.info.capacity)?;

    Some(StationRecord {
        station_id: joined.station_id.clone(),
        name: joined.info.name.clone(),
        lat: joined.info.lat,
        lon: joined.info.lon,
        capacity: joined.info.capacity?,
        num_bikes_available: joined.status.num_bikes_available?,
        available_bikes_ratio: ratio,
        size_weight: SIZE_WEIGHT,
    })
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn info_row() -> impl Strategy<Value = RawStationInfo> {
        (
            proptest::option::weighted(0.95, 0u8..40),
            proptest::option::of(0u64..60),
        )
            .prop_map(|(id, capacity)| RawStationInfo {
                station_id: id.map(|i| StationId::new(i.to_string())),
                name: Some("station".to_string()),
                lat: Some(48.85),
                lon: Some(2.35),
                capacity,
            })
    }

    fn status_row() -> impl Strategy<Value = RawStationStatus> {
        (
            proptest::option::weighted(0.95, 0u8..40),
            proptest::option::of(0u64..80),
        )
            .prop_map(|(id, bikes)| RawStationStatus {
                station_id: id.map(|i| StationId::new(i.to_string())),
                num_bikes_available: bikes,
            })
    }

    fn feeds() -> impl Strategy<Value = (RawStationInfoSet, RawStationStatusSet)> {
        (
            proptest::collection::vec(info_row(), 0..30),
            proptest::collection::vec(status_row(), 0..30),
        )
            .prop_map(|(i, s)| (RawStationInfoSet::new(i), RawStationStatusSet::new(s)))
    }

    proptest! {
        /// Same inputs, same outputs
        #[test]
        fn deterministic((info, status) in feeds()) {
            let first = fuse(&info, &status).unwrap();
            let second = fuse(&info, &status).unwrap();
            prop_assert_eq!(first, second);
        }

        /// Every surviving record has positive capacity and an exact ratio
        #[test]
        fn records_are_complete((info, status) in feeds()) {
            for r in fuse(&info, &status).unwrap() {
                prop_assert!(r.capacity > 0);
                prop_assert_eq!(
                    r.available_bikes_ratio,
                    r.num_bikes_available as f64 / r.capacity as f64
                );
            }
        }

        /// Records only exist for ids present in both feeds
        #[test]
        fn inner_join_only((info, status) in feeds()) {
            let info_ids: HashSet<_> =
                info.stations.iter().filter_map(|s| s.station_id.clone()).collect();
            let status_ids: HashSet<_> =
                status.stations.iter().filter_map(|s| s.station_id.clone()).collect();

            for r in fuse(&info, &status).unwrap() {
                prop_assert!(info_ids.contains(&r.station_id));
                prop_assert!(status_ids.contains(&r.station_id));
            }
        }

        /// Exclusion counts account for every joined row
        #[test]
        fn incomplete_count_matches_join((info, status) in feeds()) {
            let joined = join_stations(&info, &status).len();
            let fused = fuse_with_report(&info, &status).unwrap();
            prop_assert_eq!(fused.records.len() + fused.excluded.incomplete, joined);
        }

        /// Inputs are left untouched
        #[test]
        fn inputs_unchanged((info, status) in feeds()) {
            let info_before = info.clone();
            let status_before = status.clone();
            let _ = fuse(&info, &status);
            prop_assert_eq!(info, info_before);
            prop_assert_eq!(status, status_before);
        }
    }
}
