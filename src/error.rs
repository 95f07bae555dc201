//! Error types for docblocks library.

use std::io;
use thiserror::Error;

/// Result type alias for docblocks operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while structuring a page.
///
/// These are boundary errors only: bad configuration, an expired deadline,
/// or malformed input files. Per-detection anomalies (degenerate geometry,
/// out-of-range confidence) never fail the page; they are reported as
/// [`Warning`](crate::model::Warning)s on the result instead.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Merge threshold outside the accepted 1..=100 pixel range.
    #[error("Merge threshold {0} is out of range (valid: 1-100 pixels)")]
    InvalidThreshold(u32),

    /// The caller's deadline elapsed before a stage could start.
    #[error("Deadline elapsed before processing completed")]
    DeadlineExceeded,

    /// Error serializing the page result.
    #[error("Rendering error: {0}")]
    Render(String),

    /// Malformed detections input (CLI/file boundary).
    #[error("Invalid detections input: {0}")]
    Detections(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::InvalidThreshold(0);
        assert_eq!(
            err.to_string(),
            "Merge threshold 0 is out of range (valid: 1-100 pixels)"
        );

        let err = Error::DeadlineExceeded;
        assert_eq!(
            err.to_string(),
            "Deadline elapsed before processing completed"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
