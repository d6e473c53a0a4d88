//! Core domain types for the station board.
//!
//! Raw feed rows are parsed leniently in [`crate::feeds`]; the types here
//! are what survives fusion and reaches the presentation layer.

mod record;
mod station;

pub use record::{SIZE_WEIGHT, StationRecord, format_availability};
pub use station::StationId;
