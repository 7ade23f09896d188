//! Frame reader over a plain byte stream.
//!
//! The reader owns its stream exclusively. It keeps calling `read` on the
//! unfilled tail of the frame until the frame is complete, the stream reports
//! end of data, or the stream's own timeout fires. Whatever was collected
//! before a failure is dropped.
//!
//! A zero-length read normally means end of data. Serial ports configured
//! with a read timeout also return zero bytes when the timeout expires, so
//! such sources are marked with `empty_read_is_timeout`.

use std::io::{ErrorKind, Read};

use tracing::{debug, trace};

use crate::image_pipeline::common::error::{CaptureError, Result};
use crate::image_pipeline::frame::reader::FrameSource;
use crate::image_pipeline::frame::types::FrameBuffer;

pub struct StreamFrameReader<R: Read> {
    stream: R,
    empty_read_is_timeout: bool,
}

impl<R: Read> StreamFrameReader<R> {
    pub fn new(stream: R) -> Self {
        Self {
            stream,
            empty_read_is_timeout: false,
        }
    }

    /// Treat `Ok(0)` from the stream as an expired read timeout instead of
    /// end of data.
    pub fn empty_read_is_timeout(mut self, enabled: bool) -> Self {
        self.empty_read_is_timeout = enabled;
        self
    }
}

impl<R: Read> FrameSource for StreamFrameReader<R> {
    /// Reads until `expected_size` bytes have been collected.
    ///
    /// A zero-length read, `TimedOut` or `WouldBlock` ends the attempt with
    /// `IncompleteFrame`. `Interrupted` is retried. Any other I/O error is
    /// returned as is.
    fn read_frame(&mut self, expected_size: usize) -> Result<FrameBuffer> {
        let mut data = vec![0u8; expected_size];
        let mut filled = 0;

        while filled < expected_size {
            match self.stream.read(&mut data[filled..]) {
                Ok(0) => {
                    let end_of_stream = !self.empty_read_is_timeout;
                    debug!(
                        received = filled,
                        expected = expected_size,
                        end_of_stream,
                        "Read returned no data"
                    );
                    return Err(CaptureError::IncompleteFrame {
                        expected: expected_size,
                        received: filled,
                        end_of_stream,
                    });
                }
                Ok(n) => {
                    filled += n;
                    trace!(chunk = n, filled, "Read chunk");
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) if matches!(e.kind(), ErrorKind::TimedOut | ErrorKind::WouldBlock) => {
                    debug!(received = filled, expected = expected_size, "Read timed out");
                    return Err(CaptureError::IncompleteFrame {
                        expected: expected_size,
                        received: filled,
                        end_of_stream: false,
                    });
                }
                Err(e) => return Err(e.into()),
            }
        }

        Ok(FrameBuffer::from_bytes(data))
    }
}
