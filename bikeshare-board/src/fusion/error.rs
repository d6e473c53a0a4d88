//! Fusion error types.

/// Structural problems that make a tick's feeds unusable.
///
/// Per-row gaps (missing capacity, zero capacity, missing availability)
/// are not errors; those rows are filtered out.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FusionError {
    /// No status row carries the availability field.
    #[error("status feed has no '{column}' field in any station")]
    MissingColumn { column: String },
}
