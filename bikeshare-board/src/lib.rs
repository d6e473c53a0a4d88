//! Bike-share station board.
//!
//! Polls a bike-share system's station-information and station-status
//! feeds, joins them per station, computes the share of docks holding a
//! bike, and serves the result as a live map and listing. Optionally
//! writes a timestamped PNG of the map on every refresh.

pub mod config;
pub mod domain;
pub mod feeds;
pub mod fusion;
pub mod logging;
pub mod pipeline;
pub mod render;
pub mod scheduler;
pub mod web;
