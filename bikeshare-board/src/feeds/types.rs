//! Parsed feed documents.
//!
//! Only the envelope (`data.stations` as an array) is validated strictly.
//! Individual rows are read field by field: a missing or wrong-typed field
//! becomes `None` and is dealt with by the fusion filter.

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::domain::StationId;

use super::error::{Endpoint, FetchError};

/// Default name of the availability field in the status feed.
pub const DEFAULT_AVAILABILITY_FIELD: &str = "num_bikes_available";

#[derive(Debug, Deserialize)]
struct FeedEnvelope {
    #[serde(default)]
    last_updated: Option<Value>,
    data: FeedData,
}

#[derive(Debug, Deserialize)]
struct FeedData {
    stations: Vec<Value>,
}

/// A feed body whose envelope has been validated.
#[derive(Debug, Clone)]
pub struct FeedDocument {
    /// `last_updated` epoch seconds, when the publisher provides it.
    pub last_updated: Option<i64>,
    /// Raw station rows, in feed order.
    pub stations: Vec<Value>,
}

impl FeedDocument {
    /// Parse a response body.
    ///
    /// Fails with [`FetchError::Json`] if the body is not JSON, and with
    /// [`FetchError::Schema`] if it lacks a `data.stations` array.
    pub fn parse(endpoint: Endpoint, body: &str) -> Result<Self, FetchError> {
        let value: Value = serde_json::from_str(body).map_err(|e| FetchError::Json {
            endpoint,
            message: e.to_string(),
        })?;

        let envelope: FeedEnvelope =
            serde_json::from_value(value).map_err(|e| FetchError::Schema {
                endpoint,
                message: e.to_string(),
            })?;

        Ok(Self {
            last_updated: envelope.last_updated.as_ref().and_then(Value::as_i64),
            stations: envelope.data.stations,
        })
    }
}

/// Static attributes of one station, as published.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawStationInfo {
    pub station_id: Option<StationId>,
    pub name: Option<String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub capacity: Option<u64>,
}

impl RawStationInfo {
    /// Read a row, tolerating missing or malformed fields.
    pub fn from_row(row: &Value) -> Self {
        let Some(obj) = row.as_object() else {
            return Self::default();
        };

        Self {
            station_id: obj.get("station_id").and_then(StationId::from_json),
            name: obj.get("name").and_then(Value::as_str).map(str::to_string),
            lat: finite_f64(obj.get("lat")),
            lon: finite_f64(obj.get("lon")),
            capacity: non_negative_int(obj.get("capacity")),
        }
    }
}

/// Live attributes of one station, as published.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawStationStatus {
    pub station_id: Option<StationId>,
    pub num_bikes_available: Option<u64>,
}

impl RawStationStatus {
    /// Read a row, taking availability from `availability_field`.
    pub fn from_row(row: &Value, availability_field: &str) -> Self {
        let Some(obj) = row.as_object() else {
            return Self::default();
        };

        Self {
            station_id: obj.get("station_id").and_then(StationId::from_json),
            num_bikes_available: non_negative_int(obj.get(availability_field)),
        }
    }
}

/// All rows of the station-information feed.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawStationInfoSet {
    pub last_updated: Option<i64>,
    pub stations: Vec<RawStationInfo>,
}

impl RawStationInfoSet {
    pub fn new(stations: Vec<RawStationInfo>) -> Self {
        Self {
            last_updated: None,
            stations,
        }
    }

    pub fn from_document(doc: &FeedDocument) -> Self {
        Self {
            last_updated: doc.last_updated,
            stations: doc.stations.iter().map(RawStationInfo::from_row).collect(),
        }
    }
}

/// All rows of the station-status feed.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawStationStatusSet {
    pub last_updated: Option<i64>,
    pub stations: Vec<RawStationStatus>,
    /// Name of the field availability was read from.
    pub availability_field: String,
    /// Whether any row carries the availability field at all.
    pub has_availability_field: bool,
}

impl RawStationStatusSet {
    /// Build a set from already-parsed rows, assuming the field is present.
    pub fn new(stations: Vec<RawStationStatus>) -> Self {
        Self {
            last_updated: None,
            stations,
            availability_field: DEFAULT_AVAILABILITY_FIELD.to_string(),
            has_availability_field: true,
        }
    }

    pub fn from_document(doc: &FeedDocument, availability_field: &str) -> Self {
        let has_availability_field = doc
            .stations
            .iter()
            .filter_map(Value::as_object)
            .any(|obj: &Map<String, Value>| obj.contains_key(availability_field));

        Self {
            last_updated: doc.last_updated,
            stations: doc
                .stations
                .iter()
                .map(|row| RawStationStatus::from_row(row, availability_field))
                .collect(),
            availability_field: availability_field.to_string(),
            has_availability_field,
        }
    }
}

/// Both feeds of one refresh.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedSnapshot {
    pub info: RawStationInfoSet,
    pub status: RawStationStatusSet,
}

fn finite_f64(value: Option<&Value>) -> Option<f64> {
    value?.as_f64().filter(|f| f.is_finite())
}

/// Integers ≥ 0. Integral floats (`12.0`) are accepted since some
/// publishers serialize counts that way.
fn non_negative_int(value: Option<&Value>) -> Option<u64> {
    let value = value?;
    value.as_u64().or_else(|| {
        let f = value.as_f64()?;
        (f >= 0.0 && f.fract() == 0.0 && f < u64::MAX as f64).then_some(f as u64)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_envelope() {
        let body = r#"{"last_updated": 1700000000, "ttl": 60,
            "data": {"stations": [{"station_id": 1}, {"station_id": 2}]}}"#;
        let doc = FeedDocument::parse(Endpoint::StationInformation, body).unwrap();
        assert_eq!(doc.last_updated, Some(1_700_000_000));
        assert_eq!(doc.stations.len(), 2);
    }

    #[test]
    fn last_updated_is_optional() {
        let doc =
            FeedDocument::parse(Endpoint::StationStatus, r#"{"data": {"stations": []}}"#).unwrap();
        assert_eq!(doc.last_updated, None);
        assert!(doc.stations.is_empty());
    }

    #[test]
    fn invalid_json_is_json_error() {
        let err = FeedDocument::parse(Endpoint::StationStatus, "<html>503</html>").unwrap_err();
        assert!(matches!(
            err,
            FetchError::Json {
                endpoint: Endpoint::StationStatus,
                ..
            }
        ));
    }

    #[test]
    fn missing_data_is_schema_error() {
        let err = FeedDocument::parse(Endpoint::StationInformation, r#"{"stations": []}"#)
            .unwrap_err();
        assert!(matches!(err, FetchError::Schema { .. }));
    }

    #[test]
    fn missing_stations_is_schema_error() {
        let err =
            FeedDocument::parse(Endpoint::StationInformation, r#"{"data": {}}"#).unwrap_err();
        assert!(matches!(err, FetchError::Schema { .. }));
    }

    #[test]
    fn non_array_stations_is_schema_error() {
        let err = FeedDocument::parse(
            Endpoint::StationInformation,
            r#"{"data": {"stations": {"1": {}}}}"#,
        )
        .unwrap_err();
        assert!(matches!(err, FetchError::Schema { .. }));
    }

    #[test]
    fn info_row_reads_all_fields() {
        let row = json!({
            "station_id": 213688169,
            "stationCode": "16107",
            "name": "Benjamin Godard - Victor Hugo",
            "lat": 48.865983,
            "lon": 2.275725,
            "capacity": 35,
            "rental_methods": ["CREDITCARD"]
        });
        let info = RawStationInfo::from_row(&row);
        assert_eq!(info.station_id, Some(StationId::new("213688169")));
        assert_eq!(info.name.as_deref(), Some("Benjamin Godard - Victor Hugo"));
        assert_eq!(info.lat, Some(48.865983));
        assert_eq!(info.lon, Some(2.275725));
        assert_eq!(info.capacity, Some(35));
    }

    #[test]
    fn info_row_tolerates_bad_fields() {
        let row = json!({"station_id": "x", "capacity": -3, "lat": "north", "name": 12});
        let info = RawStationInfo::from_row(&row);
        assert_eq!(info.station_id, Some(StationId::new("x")));
        assert_eq!(info.capacity, None);
        assert_eq!(info.lat, None);
        assert_eq!(info.name, None);
    }

    #[test]
    fn non_object_row_is_empty() {
        assert_eq!(RawStationInfo::from_row(&json!(3)), RawStationInfo::default());
        assert_eq!(
            RawStationStatus::from_row(&json!("x"), DEFAULT_AVAILABILITY_FIELD),
            RawStationStatus::default()
        );
    }

    #[test]
    fn integral_floats_count_as_integers() {
        let row = json!({"station_id": 1, "capacity": 12.0});
        assert_eq!(RawStationInfo::from_row(&row).capacity, Some(12));

        let row = json!({"station_id": 1, "capacity": 12.5});
        assert_eq!(RawStationInfo::from_row(&row).capacity, None);
    }

    #[test]
    fn status_set_tracks_field_presence() {
        let doc = FeedDocument {
            last_updated: Some(5),
            stations: vec![
                json!({"station_id": 1, "num_bikes_available": null}),
                json!({"station_id": 2, "num_bikes_available": 4}),
            ],
        };
        let set = RawStationStatusSet::from_document(&doc, DEFAULT_AVAILABILITY_FIELD);
        assert!(set.has_availability_field);
        assert_eq!(set.last_updated, Some(5));
        assert_eq!(set.stations[0].num_bikes_available, None);
        assert_eq!(set.stations[1].num_bikes_available, Some(4));
    }

    #[test]
    fn status_set_without_field() {
        let doc = FeedDocument {
            last_updated: None,
            stations: vec![json!({"station_id": 1, "numBikesAvailable": 3})],
        };
        let set = RawStationStatusSet::from_document(&doc, DEFAULT_AVAILABILITY_FIELD);
        assert!(!set.has_availability_field);
        assert_eq!(set.stations[0].num_bikes_available, None);
    }

    #[test]
    fn status_set_custom_field() {
        let doc = FeedDocument {
            last_updated: None,
            stations: vec![json!({"station_id": 1, "numBikesAvailable": 3})],
        };
        let set = RawStationStatusSet::from_document(&doc, "numBikesAvailable");
        assert!(set.has_availability_field);
        assert_eq!(set.availability_field, "numBikesAvailable");
        assert_eq!(set.stations[0].num_bikes_available, Some(3));
    }
}
