//! Map artifacts.
//!
//! Renders the fused station records to a PNG with the capture time drawn
//! on it. Used by the capture deployment, where every refresh leaves one
//! immutable file behind.

mod artifact;
mod color;
mod error;
mod font;
mod map;

pub use artifact::{
    ArtifactConfig, ArtifactRenderer, DEFAULT_HEIGHT, DEFAULT_OUTPUT_DIR, DEFAULT_WIDTH,
    artifact_file_name,
};
pub use color::ratio_color;
pub use error::RenderError;
pub use map::{Extent, Projection, draw_map};
