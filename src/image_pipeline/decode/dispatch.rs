use tracing::{debug, instrument};

use crate::image_pipeline::common::error::{CaptureError, Result};
use crate::image_pipeline::decode::config::{validate_geometry, DecodeConfig, DecodeOptions};
use crate::image_pipeline::decode::luma::yuyv_luma_to_rgb888;
use crate::image_pipeline::decode::rgb565::rgb565_to_rgb888;
use crate::image_pipeline::decode::types::{PixelFormat, RasterImage, RowOrder};
use crate::image_pipeline::decode::yuv422::yuyv_to_rgb888;
use crate::image_pipeline::frame::types::{FrameBuffer, FrameGeometry};

/// Decodes one frame into an RGB888 raster.
///
/// The frame length must be exactly `width * height * bytes_per_pixel` for
/// `format`; anything else is a `SizeMismatch` and nothing is decoded.
/// Bottom-first frames are flipped after decoding so the raster is always
/// top row first.
pub fn decode(
    format: PixelFormat,
    frame: &FrameBuffer,
    geometry: FrameGeometry,
    options: &DecodeOptions,
) -> Result<RasterImage> {
    validate_geometry(format, geometry)?;

    let expected = format.frame_size(geometry);
    if frame.len() != expected {
        return Err(CaptureError::SizeMismatch {
            pixel_format: format.to_string(),
            expected,
            actual: frame.len(),
        });
    }

    let bytes = frame.as_bytes();
    let data = match format {
        PixelFormat::Rgb565 => rgb565_to_rgb888(bytes, options.expansion),
        PixelFormat::Yuv422 => yuyv_to_rgb888(bytes),
        PixelFormat::Luma8 => yuyv_luma_to_rgb888(bytes),
    };

    let mut image = RasterImage {
        width: geometry.width,
        height: geometry.height,
        data,
    };

    if options.row_order == RowOrder::BottomFirst {
        image.flip_vertical();
    }

    Ok(image)
}

/// A decode configuration bound to the `decode` entry point.
#[derive(Debug, Clone)]
pub struct Decoder {
    config: DecodeConfig,
}

impl Decoder {
    pub fn new(config: DecodeConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DecodeConfig {
        &self.config
    }

    pub fn expected_frame_size(&self) -> usize {
        self.config.frame_size()
    }

    #[instrument(skip(self, frame), fields(format = %self.config.format, bytes = frame.len()))]
    pub fn decode(&self, frame: &FrameBuffer) -> Result<RasterImage> {
        let image = decode(self.config.format, frame, self.config.geometry, &self.config.options)?;
        debug!(width = image.width, height = image.height, "Decoded frame");
        Ok(image)
    }
}
