//! Decoder configuration types

use crate::image_pipeline::common::error::{CaptureError, Result};
use crate::image_pipeline::decode::types::{PixelFormat, Rgb565Expansion, RowOrder};
use crate::image_pipeline::frame::types::FrameGeometry;

/// Per-decode policies that do not depend on the pixel format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Only consulted for RGB565 frames
    pub expansion: Rgb565Expansion,
    pub row_order: RowOrder,
}

impl DecodeOptions {
    pub fn new(row_order: RowOrder) -> Self {
        Self {
            expansion: Rgb565Expansion::default(),
            row_order,
        }
    }

    pub fn with_expansion(mut self, expansion: Rgb565Expansion) -> Self {
        self.expansion = expansion;
        self
    }
}

/// Everything the reader and decoder need to know about one frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeConfig {
    pub geometry: FrameGeometry,
    pub format: PixelFormat,
    pub options: DecodeOptions,
}

impl DecodeConfig {
    pub fn builder() -> DecodeConfigBuilder {
        DecodeConfigBuilder::default()
    }

    /// Bytes the reader must collect for one frame.
    pub fn frame_size(&self) -> usize {
        self.format.frame_size(self.geometry)
    }
}

/// Builder for DecodeConfig
///
/// Row order has no default: two sensor setups with opposite scan order are
/// in use, so the caller must say which one it is talking to.
#[derive(Default)]
pub struct DecodeConfigBuilder {
    geometry: Option<FrameGeometry>,
    format: Option<PixelFormat>,
    expansion: Option<Rgb565Expansion>,
    row_order: Option<RowOrder>,
}

impl DecodeConfigBuilder {
    pub fn geometry(mut self, geometry: FrameGeometry) -> Self {
        self.geometry = Some(geometry);
        self
    }

    pub fn dimensions(self, width: usize, height: usize) -> Self {
        self.geometry(FrameGeometry::new(width, height))
    }

    pub fn format(mut self, format: PixelFormat) -> Self {
        self.format = Some(format);
        self
    }

    pub fn expansion(mut self, expansion: Rgb565Expansion) -> Self {
        self.expansion = Some(expansion);
        self
    }

    pub fn row_order(mut self, row_order: RowOrder) -> Self {
        self.row_order = Some(row_order);
        self
    }

    pub fn build(self) -> Result<DecodeConfig> {
        let row_order = self.row_order.ok_or_else(|| {
            CaptureError::InvalidConfig("row order must be set explicitly".to_string())
        })?;
        let geometry = self.geometry.unwrap_or_default();
        let format = self.format.unwrap_or(PixelFormat::Rgb565);

        validate_geometry(format, geometry)?;

        Ok(DecodeConfig {
            geometry,
            format,
            options: DecodeOptions {
                expansion: self.expansion.unwrap_or_default(),
                row_order,
            },
        })
    }
}

/// Rejects empty frames, odd widths for formats packed as pixel pairs, and
/// sizes whose frame or RGB888 raster byte count does not fit.
///
/// Image encoders take `u32` sides, so each side is capped there too.
pub(crate) fn validate_geometry(format: PixelFormat, geometry: FrameGeometry) -> Result<()> {
    let FrameGeometry { width, height } = geometry;
    let invalid = || CaptureError::InvalidDimensions(width, height);

    if width == 0 || height == 0 {
        return Err(invalid());
    }
    if format.is_yuyv_packed() && width % 2 != 0 {
        return Err(invalid());
    }
    if u32::try_from(width).is_err() || u32::try_from(height).is_err() {
        return Err(invalid());
    }

    let pixels = width.checked_mul(height).ok_or_else(invalid)?;
    pixels.checked_mul(format.bytes_per_pixel()).ok_or_else(invalid)?;
    pixels.checked_mul(3).ok_or_else(invalid)?;
    Ok(())
}
