//! Artifact renderer error types.

use std::path::PathBuf;

/// Errors from producing or saving an artifact image.
///
/// Neither is fatal to a refresh: the station records are still delivered.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// The image could not be produced or encoded.
    #[error("failed to encode {}: {message}", .path.display())]
    EncodeFailure { path: PathBuf, message: String },

    /// The output directory could not be created or written.
    #[error("failed to write {}: {source}", .path.display())]
    IoFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl RenderError {
    pub(crate) fn from_image(path: PathBuf, err: image::ImageError) -> Self {
        match err {
            image::ImageError::IoError(source) => RenderError::IoFailure { path, source },
            other => RenderError::EncodeFailure {
                path,
                message: other.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = RenderError::EncodeFailure {
            path: PathBuf::from("out/a.png"),
            message: "zero-sized image".into(),
        };
        assert_eq!(err.to_string(), "failed to encode out/a.png: zero-sized image");

        let err = RenderError::IoFailure {
            path: PathBuf::from("out"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert_eq!(err.to_string(), "failed to write out: denied");
    }

    #[test]
    fn io_errors_are_classified() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err = RenderError::from_image(PathBuf::from("x.png"), image::ImageError::IoError(io));
        assert!(matches!(err, RenderError::IoFailure { .. }));
    }
}
