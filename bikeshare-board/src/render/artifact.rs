//! Timestamped PNG artifacts of the station map.

use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use image::imageops::{self, FilterType};
use image::{ImageFormat, Rgb};

use crate::domain::StationRecord;

use super::error::RenderError;
use super::font::draw_label;
use super::map::draw_map;

/// Default artifact directory, relative to the working directory.
pub const DEFAULT_OUTPUT_DIR: &str = "screenshots";

/// Default artifact resolution.
pub const DEFAULT_WIDTH: u32 = 1000;
pub const DEFAULT_HEIGHT: u32 = 700;

/// Size of the canvas the map is drawn on before resizing.
const CAPTURE_WIDTH: u32 = 1400;
const CAPTURE_HEIGHT: u32 = 980;

const TIMESTAMP_X: u32 = 20;
const TIMESTAMP_Y: u32 = 20;
const TIMESTAMP_SCALE: u32 = 4;
const TIMESTAMP_COLOR: Rgb<u8> = Rgb([0, 0, 0]);
const TIMESTAMP_BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
const TIMESTAMP_PADDING: u32 = 8;

/// Configuration for artifact rendering.
#[derive(Debug, Clone)]
pub struct ArtifactConfig {
    /// Directory artifacts are written to
    pub output_dir: PathBuf,
    /// Final image width in pixels
    pub width: u32,
    /// Final image height in pixels
    pub height: u32,
}

impl ArtifactConfig {
    /// Create a config writing to `output_dir` at the default resolution.
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
        }
    }

    /// Set the final image resolution.
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }
}

impl Default for ArtifactConfig {
    fn default() -> Self {
        Self::new(DEFAULT_OUTPUT_DIR)
    }
}

/// File name for the artifact of a tick.
///
/// Unique across ticks because the tick index is part of the name, even
/// when two ticks share the same second.
///
/// ```
/// use bikeshare_board::render::artifact_file_name;
/// use chrono::NaiveDate;
///
/// let at = NaiveDate::from_ymd_opt(2024, 5, 1)
///     .unwrap()
///     .and_hms_opt(8, 30, 5)
///     .unwrap();
/// assert_eq!(artifact_file_name(3, at), "screenshot-3_2024-05-01_08-30-05.png");
/// ```
pub fn artifact_file_name(tick: u64, captured_at: NaiveDateTime) -> String {
    format!(
        "screenshot-{tick}_{}.png",
        captured_at.format("%Y-%m-%d_%H-%M-%S")
    )
}

/// Renders station records to PNG files.
#[derive(Debug, Clone)]
pub struct ArtifactRenderer {
    config: ArtifactConfig,
}

impl ArtifactRenderer {
    pub fn new(config: ArtifactConfig) -> Self {
        Self { config }
    }

    pub fn output_dir(&self) -> &Path {
        &self.config.output_dir
    }

    /// Create the output directory if it does not exist yet.
    ///
    /// Called once at start-up; calling it again is harmless.
    pub fn ensure_output_dir(&self) -> Result<(), RenderError> {
        std::fs::create_dir_all(&self.config.output_dir).map_err(|source| {
            RenderError::IoFailure {
                path: self.config.output_dir.clone(),
                source,
            }
        })
    }

    /// Render `records` and write the artifact for `tick`.
    ///
    /// The timestamp is drawn onto the map before it is resized, so the
    /// written file is exactly `width × height` whatever the record count.
    pub fn render(
        &self,
        records: &[StationRecord],
        tick: u64,
        captured_at: NaiveDateTime,
    ) -> Result<PathBuf, RenderError> {
        let path = self
            .config
            .output_dir
            .join(artifact_file_name(tick, captured_at));

        if self.config.width == 0 || self.config.height == 0 {
            return Err(RenderError::EncodeFailure {
                path,
                message: format!(
                    "invalid target size {}x{}",
                    self.config.width, self.config.height
                ),
            });
        }

        let mut canvas = draw_map(records, CAPTURE_WIDTH, CAPTURE_HEIGHT);

        let stamp = captured_at.format("%Y-%m-%d %H:%M:%S").to_string();
        draw_label(
            &mut canvas,
            TIMESTAMP_X,
            TIMESTAMP_Y,
            &stamp,
            TIMESTAMP_SCALE,
            (TIMESTAMP_COLOR, TIMESTAMP_BACKGROUND),
            TIMESTAMP_PADDING,
        );

        let resized = imageops::resize(
            &canvas,
            self.config.width,
            self.config.height,
            FilterType::Triangle,
        );

        resized
            .save_with_format(&path, ImageFormat::Png)
            .map_err(|e| RenderError::from_image(path.clone(), e))?;

        Ok(path)
    }
}
