//! Fused per-station record.

use serde::Serialize;

use super::StationId;

/// Marker weight used for uniform marker sizing on the map.
pub const SIZE_WEIGHT: u8 = 1;

/// A station present in both feeds with a computable availability ratio.
///
/// Records only come out of [`crate::fusion::fuse`], which guarantees
/// `capacity > 0` and `available_bikes_ratio == num_bikes_available / capacity`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationRecord {
    pub station_id: StationId,
    pub name: Option<String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub capacity: u64,
    pub num_bikes_available: u64,
    /// Not clamped: inconsistent upstream data may push this above 1.
    pub available_bikes_ratio: f64,
    pub size_weight: u8,
}

impl StationRecord {
    /// Name to show in listings, falling back to the station id.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(self.station_id.as_str())
    }

    /// Map position, if both coordinates are known.
    pub fn position(&self) -> Option<(f64, f64)> {
        Some((self.lat?, self.lon?))
    }

    /// Availability formatted as a percentage, e.g. `"45.67%"`.
    pub fn availability_percent(&self) -> String {
        format_availability(self.available_bikes_ratio)
    }
}

/// Format a ratio as a percentage with two decimals.
///
/// ```
/// use bikeshare_board::domain::format_availability;
///
/// assert_eq!(format_availability(0.4567), "45.67%");
/// assert_eq!(format_availability(1.0), "100.00%");
/// ```
pub fn format_availability(ratio: f64) -> String {
    format!("{:.2}%", ratio * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: Option<&str>, lat: Option<f64>, lon: Option<f64>) -> StationRecord {
        StationRecord {
            station_id: StationId::new("7"),
            name: name.map(str::to_string),
            lat,
            lon,
            capacity: 20,
            num_bikes_available: 5,
            available_bikes_ratio: 0.25,
            size_weight: SIZE_WEIGHT,
        }
    }

    #[test]
    fn formats_two_decimals() {
        assert_eq!(format_availability(0.4567), "45.67%");
        assert_eq!(format_availability(0.0), "0.00%");
        assert_eq!(format_availability(0.3), "30.00%");
    }

    #[test]
    fn ratios_above_one_are_shown_as_is() {
        assert_eq!(format_availability(1.25), "125.00%");
    }

    #[test]
    fn display_name_falls_back_to_id() {
        assert_eq!(record(Some("Bastille"), None, None).display_name(), "Bastille");
        assert_eq!(record(None, None, None).display_name(), "7");
    }

    #[test]
    fn position_requires_both_coordinates() {
        assert_eq!(
            record(None, Some(48.85), Some(2.36)).position(),
            Some((48.85, 2.36))
        );
        assert_eq!(record(None, Some(48.85), None).position(), None);
        assert_eq!(record(None, None, Some(2.36)).position(), None);
    }

    #[test]
    fn availability_percent_uses_ratio() {
        assert_eq!(record(None, None, None).availability_percent(), "25.00%");
    }
}
