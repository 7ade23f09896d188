use crate::image_pipeline::common::error::Result;
use crate::image_pipeline::frame::types::FrameBuffer;

/// Anything that can hand out whole frames.
///
/// Implementations return a buffer of exactly `expected_size` bytes or
/// `CaptureError::IncompleteFrame`; a short buffer is never returned.
pub trait FrameSource {
    fn read_frame(&mut self, expected_size: usize) -> Result<FrameBuffer>;
}
