use std::fs;
use std::path::PathBuf;

use tracing::info;

use crate::image_pipeline::common::error::{CaptureError, Result};
use crate::image_pipeline::frame::types::FrameBuffer;
use crate::image_pipeline::sink::image_file::expand_index;
use crate::image_pipeline::sink::types::FrameSink;

/// Writes the undecoded frame byte for byte, no header, so it can be
/// replayed later with `replay_dump`.
pub struct RawDumpSink {
    path: PathBuf,
}

impl RawDumpSink {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }
}

impl FrameSink for RawDumpSink {
    fn name(&self) -> &str {
        "raw_dump"
    }

    fn accept_raw(&mut self, index: u64, frame: &FrameBuffer) -> Result<()> {
        let path = expand_index(&self.path, index);
        fs::write(&path, frame.as_bytes()).map_err(|e| CaptureError::SinkFailure {
            sink: self.name().to_string(),
            reason: format!("{}: {}", path.display(), e),
        })?;
        info!(path = %path.display(), bytes = frame.len(), "Raw data saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dump_is_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("output.hex");
        let bytes: Vec<u8> = (0..=255u8).collect();

        let mut sink = RawDumpSink::new(&path);
        sink.accept_raw(3, &FrameBuffer::from_bytes(bytes.clone())).unwrap();

        assert_eq!(fs::read(&path).unwrap(), bytes);
    }

    #[test]
    fn failure_names_the_sink() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = RawDumpSink::new(dir.path().join("nope").join("output.hex"));
        let err = sink.accept_raw(0, &FrameBuffer::from_bytes(vec![1])).unwrap_err();
        assert!(matches!(err, CaptureError::SinkFailure { ref sink, .. } if sink == "raw_dump"));
    }
}
