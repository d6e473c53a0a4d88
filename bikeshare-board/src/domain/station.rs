//! Station identity.

use std::fmt;

use serde::Serialize;
use serde_json::Value;

/// Opaque key identifying a station across both feeds.
///
/// GBFS publishers disagree on whether `station_id` is a JSON number or a
/// string (Vélib' uses large integers, most others use strings). Both are
/// normalized to the same textual form so `213688169` and `"213688169"`
/// join with each other.
///
/// # Examples
///
/// ```
/// use bikeshare_board::domain::StationId;
/// use serde_json::json;
///
/// let a = StationId::from_json(&json!(213688169)).unwrap();
/// let b = StationId::from_json(&json!("213688169")).unwrap();
/// assert_eq!(a, b);
///
/// // Blank strings and non-scalar values are not identities
/// assert!(StationId::from_json(&json!("  ")).is_none());
/// assert!(StationId::from_json(&json!(null)).is_none());
/// ```
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct StationId(String);

impl StationId {
    /// Create a station id from a string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Read a station id from a JSON value.
    ///
    /// Accepts integers and non-blank strings (trimmed). Anything else
    /// yields `None`.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) if n.is_i64() || n.is_u64() => Some(Self(n.to_string())),
            Value::String(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(Self(trimmed.to_string()))
                }
            }
            _ => None,
        }
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for StationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StationId({})", self.0)
    }
}

impl fmt::Display for StationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
