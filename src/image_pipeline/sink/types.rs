//! Sink traits

use crate::image_pipeline::common::error::Result;
use crate::image_pipeline::decode::types::RasterImage;
use crate::image_pipeline::frame::types::FrameBuffer;

/// What the capture loop should do after a sink has seen a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkControl {
    Continue,
    /// The operator asked to stop (e.g. pressed `q` in the preview).
    Stop,
}

/// Receives each captured frame.
///
/// `accept_raw` runs before decoding and `accept_raster` after; a sink
/// implements whichever it needs. `index` counts successfully read frames
/// from zero. `poll_control` runs after every read attempt, complete or not,
/// so a sink can stop the loop while no frames are arriving.
pub trait FrameSink {
    fn name(&self) -> &str;

    fn accept_raw(&mut self, _index: u64, _frame: &FrameBuffer) -> Result<()> {
        Ok(())
    }

    fn accept_raster(&mut self, _index: u64, _image: &RasterImage) -> Result<SinkControl> {
        Ok(SinkControl::Continue)
    }

    fn poll_control(&mut self) -> Result<SinkControl> {
        Ok(SinkControl::Continue)
    }
}
