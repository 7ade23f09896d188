use std::io::Write;

use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder};
use tracing::debug;

use crate::image_pipeline::common::error::{CaptureError, Result};
use crate::image_pipeline::decode::types::RasterImage;
use crate::image_pipeline::sink::writer::RasterWriter;

/// Lossless 8-bit RGB PNG.
pub struct PngRasterWriter;

impl RasterWriter for PngRasterWriter {
    fn write_raster(&self, image: &RasterImage, output: &mut dyn Write) -> Result<()> {
        debug!("Encoding PNG image: {}x{}", image.width, image.height);

        if !image.is_consistent() {
            return Err(CaptureError::EncodeError(format!(
                "raster holds {} bytes, expected {} for {}x{}",
                image.data.len(),
                image.width * image.height * 3,
                image.width,
                image.height
            )));
        }

        PngEncoder::new(output)
            .write_image(
                &image.data,
                image.width as u32,
                image.height as u32,
                ExtendedColorType::Rgb8,
            )
            .map_err(|e| CaptureError::EncodeError(e.to_string()))?;

        debug!("PNG encoding complete");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_decodable_png() {
        let raster = RasterImage {
            width: 2,
            height: 2,
            data: vec![255, 0, 0, 0, 255, 0, 0, 0, 255, 10, 20, 30],
        };
        let mut encoded = Vec::new();
        PngRasterWriter.write_raster(&raster, &mut encoded).unwrap();

        assert_eq!(&encoded[..8], b"\x89PNG\r\n\x1a\n");

        let decoded = image::load_from_memory_with_format(&encoded, image::ImageFormat::Png)
            .unwrap()
            .to_rgb8();
        assert_eq!(decoded.dimensions(), (2, 2));
        assert_eq!(decoded.into_raw(), raster.data);
    }

    #[test]
    fn short_buffer_is_encode_error() {
        let raster = RasterImage { width: 4, height: 4, data: vec![0; 5] };
        let err = PngRasterWriter.write_raster(&raster, &mut Vec::new()).unwrap_err();
        assert!(matches!(err, CaptureError::EncodeError(_)));
    }
}
