use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::info;

use crate::image_pipeline::common::error::{CaptureError, Result};
use crate::image_pipeline::decode::types::RasterImage;
use crate::image_pipeline::sink::png_writer::PngRasterWriter;
use crate::image_pipeline::sink::types::{FrameSink, SinkControl};
use crate::image_pipeline::sink::writer::RasterWriter;

const INDEX_PLACEHOLDER: &str = "{index}";

/// Replaces `{index}` in `path` with the zero-padded frame index.
pub fn expand_index(path: &Path, index: u64) -> PathBuf {
    let raw = path.to_string_lossy();
    if raw.contains(INDEX_PLACEHOLDER) {
        PathBuf::from(raw.replace(INDEX_PLACEHOLDER, &format!("{index:06}")))
    } else {
        path.to_path_buf()
    }
}

/// Writes every decoded raster to an image file.
///
/// Without an `{index}` placeholder in the path each frame overwrites the
/// previous one.
pub struct ImageFileSink {
    path: PathBuf,
    writer: Box<dyn RasterWriter>,
    name: String,
}

impl ImageFileSink {
    pub fn new<P: Into<PathBuf>>(path: P, writer: Box<dyn RasterWriter>) -> Self {
        Self {
            path: path.into(),
            writer,
            name: "image_file".to_string(),
        }
    }

    pub fn png<P: Into<PathBuf>>(path: P) -> Self {
        Self::new(path, Box::new(PngRasterWriter))
    }

    /// Encodes `image` to `path` directly, outside of any capture loop.
    pub fn write_to(&self, path: &Path, image: &RasterImage) -> Result<()> {
        let failure = |reason: String| CaptureError::SinkFailure {
            sink: self.name.clone(),
            reason: format!("{}: {}", path.display(), reason),
        };

        let file = File::create(path).map_err(|e| failure(e.to_string()))?;
        let mut output = BufWriter::new(file);
        self.writer
            .write_raster(image, &mut output)
            .map_err(|e| failure(e.to_string()))?;
        output.flush().map_err(|e| failure(e.to_string()))?;
        Ok(())
    }
}

impl FrameSink for ImageFileSink {
    fn name(&self) -> &str {
        &self.name
    }

    fn accept_raster(&mut self, index: u64, image: &RasterImage) -> Result<SinkControl> {
        let path = expand_index(&self.path, index);
        self.write_to(&path, image)?;
        info!(path = %path.display(), "Image saved");
        Ok(SinkControl::Continue)
    }
}
