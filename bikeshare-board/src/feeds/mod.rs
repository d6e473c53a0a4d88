//! Bike-share station feeds.
//!
//! Retrieves the GBFS `station_information` and `station_status` documents
//! and parses them into raw row sets. Key characteristics:
//! - Both feeds are fetched on every call; nothing is cached
//! - A failure on either feed fails the whole fetch, with no retry
//! - Row fields are optional; only the `data.stations` envelope is mandatory

mod client;
mod error;
mod types;

pub use client::{
    DEFAULT_STATION_INFORMATION_URL, DEFAULT_STATION_STATUS_URL, FeedClient, FeedConfig,
};
pub use error::{Endpoint, FetchError};
pub use types::{
    DEFAULT_AVAILABILITY_FIELD, FeedDocument, FeedSnapshot, RawStationInfo, RawStationInfoSet,
    RawStationStatus, RawStationStatusSet,
};
