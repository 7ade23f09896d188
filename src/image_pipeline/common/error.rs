use thiserror::Error;

#[derive(Error, Debug)]
pub enum CaptureError {
    /// `end_of_stream` is set when the source reported end of data rather
    /// than a timeout.
    #[error("Incomplete frame: received {received} of {expected} bytes")]
    IncompleteFrame {
        expected: usize,
        received: usize,
        end_of_stream: bool,
    },

    #[error("Frame size mismatch for {pixel_format}: expected {expected} bytes, got {actual}")]
    SizeMismatch {
        pixel_format: String,
        expected: usize,
        actual: usize,
    },

    #[error("Unsupported format '{0}' (valid formats: rgb565, yuv422, gray)")]
    UnsupportedFormat(String),

    #[error("Sink '{sink}' failed: {reason}")]
    SinkFailure { sink: String, reason: String },

    #[error("Invalid image dimensions: width={0}, height={1}")]
    InvalidDimensions(usize, usize),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to encode image: {0}")]
    EncodeError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl CaptureError {
    /// Incomplete frames are skipped by the capture loop; everything else
    /// stops it.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, CaptureError::IncompleteFrame { .. })
    }
}

pub type Result<T> = std::result::Result<T, CaptureError>;
