//! Frame data types

/// Width and height of the sensor frame in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameGeometry {
    pub width: usize,
    pub height: usize,
}

impl FrameGeometry {
    /// QVGA, the resolution the sensor firmware streams.
    pub const QVGA: FrameGeometry = FrameGeometry { width: 320, height: 240 };

    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    pub fn pixel_count(&self) -> usize {
        self.width * self.height
    }
}

impl Default for FrameGeometry {
    fn default() -> Self {
        Self::QVGA
    }
}

/// One complete raw frame as received from the link.
///
/// Only the frame reader and `from_bytes` construct these, and the contents
/// are never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameBuffer {
    data: Vec<u8>,
}

impl FrameBuffer {
    /// Wraps bytes obtained elsewhere, e.g. a raw dump read back from disk.
    pub fn from_bytes(data: Vec<u8>) -> Self {
        Self { data }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl AsRef<[u8]> for FrameBuffer {
    fn as_ref(&self) -> &[u8] {
        &self.data
    }
}
