//! GBFS feed HTTP client.

use std::time::Duration;

use super::error::{Endpoint, FetchError};
use super::types::{
    DEFAULT_AVAILABILITY_FIELD, FeedDocument, FeedSnapshot, RawStationInfoSet,
    RawStationStatusSet,
};

/// Default station-information feed (Vélib' Métropole open data).
pub const DEFAULT_STATION_INFORMATION_URL: &str =
    "https://velib-metropole-opendata.smovengo.cloud/opendata/Velib_Metropole/station_information.json";

/// Default station-status feed (Vélib' Métropole open data).
pub const DEFAULT_STATION_STATUS_URL: &str =
    "https://velib-metropole-opendata.smovengo.cloud/opendata/Velib_Metropole/station_status.json";

/// Default per-request timeout.
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Configuration for the feed client.
#[derive(Debug, Clone)]
pub struct FeedConfig {
    /// URL of the station-information feed
    pub station_information_url: String,
    /// URL of the station-status feed
    pub station_status_url: String,
    /// Status field holding the number of available bikes
    pub availability_field: String,
    /// Request timeout in seconds, applied to each feed separately
    pub timeout_secs: u64,
}

impl FeedConfig {
    /// Create a config pointing at the default feeds.
    pub fn new() -> Self {
        Self {
            station_information_url: DEFAULT_STATION_INFORMATION_URL.to_string(),
            station_status_url: DEFAULT_STATION_STATUS_URL.to_string(),
            availability_field: DEFAULT_AVAILABILITY_FIELD.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Set the station-information URL.
    pub fn with_station_information_url(mut self, url: impl Into<String>) -> Self {
        self.station_information_url = url.into();
        self
    }

    /// Set the station-status URL.
    pub fn with_station_status_url(mut self, url: impl Into<String>) -> Self {
        self.station_status_url = url.into();
        self
    }

    /// Set the availability field name.
    pub fn with_availability_field(mut self, field: impl Into<String>) -> Self {
        self.availability_field = field.into();
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    fn url(&self, endpoint: Endpoint) -> &str {
        match endpoint {
            Endpoint::StationInformation => &self.station_information_url,
            Endpoint::StationStatus => &self.station_status_url,
        }
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Client for the two station feeds.
///
/// Holds no state between calls: every fetch goes to the network.
#[derive(Debug, Clone)]
pub struct FeedClient {
    http: reqwest::Client,
    config: FeedConfig,
}

impl FeedClient {
    /// Create a new feed client with the given configuration.
    pub fn new(config: FeedConfig) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("bikeshare-board/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| FetchError::Client {
                message: e.to_string(),
            })?;

        Ok(Self { http, config })
    }

    /// Fetch the station-information feed.
    pub async fn fetch_station_information(&self) -> Result<RawStationInfoSet, FetchError> {
        let doc = self.get_document(Endpoint::StationInformation).await?;
        Ok(RawStationInfoSet::from_document(&doc))
    }

    /// Fetch the station-status feed.
    pub async fn fetch_station_status(&self) -> Result<RawStationStatusSet, FetchError> {
        let doc = self.get_document(Endpoint::StationStatus).await?;
        Ok(RawStationStatusSet::from_document(
            &doc,
            &self.config.availability_field,
        ))
    }

    /// Fetch both feeds concurrently.
    ///
    /// Fails as soon as either feed fails; there is no partial result and
    /// no retry.
    pub async fn fetch_feeds(&self) -> Result<FeedSnapshot, FetchError> {
        let (info, status) = futures::try_join!(
            self.fetch_station_information(),
            self.fetch_station_status()
        )?;
        Ok(FeedSnapshot { info, status })
    }

    async fn get_document(&self, endpoint: Endpoint) -> Result<FeedDocument, FetchError> {
        let url = self.config.url(endpoint);

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| transport_error(endpoint, url, &e))?;

        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Transport {
                endpoint,
                url: url.to_string(),
                status: Some(status.as_u16()),
                message: body.chars().take(200).collect(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| transport_error(endpoint, url, &e))?;

        FeedDocument::parse(endpoint, &body)
    }
}

fn transport_error(endpoint: Endpoint, url: &str, err: &reqwest::Error) -> FetchError {
    let message = if err.is_timeout() {
        "request timed out".to_string()
    } else {
        err.to_string()
    };

    FetchError::Transport {
        endpoint,
        url: url.to_string(),
        status: err.status().map(|s| s.as_u16()),
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults() {
        let config = FeedConfig::default();
        assert_eq!(
            config.station_information_url,
            DEFAULT_STATION_INFORMATION_URL
        );
        assert_eq!(config.station_status_url, DEFAULT_STATION_STATUS_URL);
        assert_eq!(config.availability_field, "num_bikes_available");
        assert_eq!(config.timeout_secs, 10);
    }

    #[test]
    fn config_builder() {
        let config = FeedConfig::new()
            .with_station_information_url("http://localhost:8080/info.json")
            .with_station_status_url("http://localhost:8080/status.json")
            .with_availability_field("numBikesAvailable")
            .with_timeout(3);

        assert_eq!(
            config.url(Endpoint::StationInformation),
            "http://localhost:8080/info.json"
        );
        assert_eq!(
            config.url(Endpoint::StationStatus),
            "http://localhost:8080/status.json"
        );
        assert_eq!(config.availability_field, "numBikesAvailable");
        assert_eq!(config.timeout_secs, 3);
    }

    #[test]
    fn client_creation() {
        let client = FeedClient::new(FeedConfig::default());
        assert!(client.is_ok());
    }

    #[tokio::test]
    async fn unreachable_host_is_transport_error() {
        // Port 9 (discard) on localhost is closed in test environments.
        let config = FeedConfig::new()
            .with_station_information_url("http://127.0.0.1:9/info.json")
            .with_station_status_url("http://127.0.0.1:9/status.json")
            .with_timeout(2);
        let client = FeedClient::new(config).unwrap();

        let err = client.fetch_station_information().await.unwrap_err();
        match err {
            FetchError::Transport {
                endpoint, status, ..
            } => {
                assert_eq!(endpoint, Endpoint::StationInformation);
                assert_eq!(status, None);
            }
            other => panic!("expected transport error, got {other:?}"),
        }
    }
}
