use std::io::Write;
use crate::image_pipeline::common::error::Result;
use crate::image_pipeline::decode::types::RasterImage;

/// Encodes an RGB888 raster into an image container.
pub trait RasterWriter {
    fn write_raster(&self, image: &RasterImage, output: &mut dyn Write) -> Result<()>;
}
