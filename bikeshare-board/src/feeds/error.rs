//! Feed fetcher error types.

use std::fmt;

/// Which of the two upstream feeds an error came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    StationInformation,
    StationStatus,
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endpoint::StationInformation => f.write_str("station_information"),
            Endpoint::StationStatus => f.write_str("station_status"),
        }
    }
}

/// Errors that can occur when retrieving a feed.
///
/// A fetch either yields both parsed feeds or exactly one of these.
#[derive(Debug, Clone, thiserror::Error)]
pub enum FetchError {
    /// Non-2xx status, network failure or timeout.
    ///
    /// `status` is `None` when no HTTP response was received.
    #[error("{endpoint} request to {url} failed{}: {message}", status_suffix(.status))]
    Transport {
        endpoint: Endpoint,
        url: String,
        status: Option<u16>,
        message: String,
    },

    /// Response body is not valid JSON.
    #[error("{endpoint} returned invalid JSON: {message}")]
    Json { endpoint: Endpoint, message: String },

    /// Valid JSON without the `data.stations` array.
    #[error("{endpoint} has unexpected shape: {message}")]
    Schema { endpoint: Endpoint, message: String },

    /// HTTP client could not be constructed.
    #[error("failed to build HTTP client: {message}")]
    Client { message: String },
}

impl FetchError {
    /// The feed this error concerns, if any.
    pub fn endpoint(&self) -> Option<Endpoint> {
        match self {
            FetchError::Transport { endpoint, .. }
            | FetchError::Json { endpoint, .. }
            | FetchError::Schema { endpoint, .. } => Some(*endpoint),
            FetchError::Client { .. } => None,
        }
    }

    /// HTTP status code for transport errors that received a response.
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::Transport { status, .. } => *status,
            _ => None,
        }
    }
}

fn status_suffix(status: &Option<u16>) -> String {
    match status {
        Some(code) => format!(" with status {code}"),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = FetchError::Transport {
            endpoint: Endpoint::StationInformation,
            url: "http://feeds/info.json".into(),
            status: Some(503),
            message: "Service Unavailable".into(),
        };
        assert_eq!(
            err.to_string(),
            "station_information request to http://feeds/info.json failed with status 503: Service Unavailable"
        );

        let err = FetchError::Transport {
            endpoint: Endpoint::StationStatus,
            url: "http://feeds/status.json".into(),
            status: None,
            message: "connection refused".into(),
        };
        assert_eq!(
            err.to_string(),
            "station_status request to http://feeds/status.json failed: connection refused"
        );

        let err = FetchError::Schema {
            endpoint: Endpoint::StationStatus,
            message: "missing field `data`".into(),
        };
        assert_eq!(
            err.to_string(),
            "station_status has unexpected shape: missing field `data`"
        );
    }

    #[test]
    fn accessors() {
        let err = FetchError::Transport {
            endpoint: Endpoint::StationStatus,
            url: String::new(),
            status: Some(404),
            message: String::new(),
        };
        assert_eq!(err.endpoint(), Some(Endpoint::StationStatus));
        assert_eq!(err.status(), Some(404));

        let err = FetchError::Json {
            endpoint: Endpoint::StationInformation,
            message: String::new(),
        };
        assert_eq!(err.endpoint(), Some(Endpoint::StationInformation));
        assert_eq!(err.status(), None);

        let err = FetchError::Client {
            message: String::new(),
        };
        assert_eq!(err.endpoint(), None);
    }
}
