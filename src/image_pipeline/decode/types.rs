//! Decoder data types

use std::fmt;
use std::str::FromStr;

use crate::image_pipeline::common::error::CaptureError;
use crate::image_pipeline::frame::types::FrameGeometry;

/// Pixel encodings the sensor can stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    /// 16-bit little-endian `RRRRRGGGGGGBBBBB`.
    Rgb565,
    /// 4:2:2 packed `Y0 U Y1 V`.
    Yuv422,
    /// The luma plane of a YUYV stream, rendered as grey.
    Luma8,
}

impl PixelFormat {
    pub const ALL: [PixelFormat; 3] =
        [PixelFormat::Rgb565, PixelFormat::Yuv422, PixelFormat::Luma8];

    pub fn bytes_per_pixel(self) -> usize {
        match self {
            PixelFormat::Rgb565 => 2,
            PixelFormat::Yuv422 => 2,
            PixelFormat::Luma8 => 2,
        }
    }

    /// Exact number of bytes one frame occupies on the wire.
    ///
    /// `geometry` must have passed `DecodeConfigBuilder::build` or `decode`'s
    /// validation, which rejects sizes that overflow.
    pub fn frame_size(self, geometry: FrameGeometry) -> usize {
        geometry.pixel_count() * self.bytes_per_pixel()
    }

    /// Formats packed as YUYV groups cover two pixels per group.
    pub fn is_yuyv_packed(self) -> bool {
        matches!(self, PixelFormat::Yuv422 | PixelFormat::Luma8)
    }

    pub fn name(self) -> &'static str {
        match self {
            PixelFormat::Rgb565 => "rgb565",
            PixelFormat::Yuv422 => "yuv422",
            PixelFormat::Luma8 => "gray",
        }
    }
}

impl fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PixelFormat {
    type Err = CaptureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rgb565" => Ok(PixelFormat::Rgb565),
            "yuv422" | "yuyv" => Ok(PixelFormat::Yuv422),
            "gray" | "grey" | "luma" => Ok(PixelFormat::Luma8),
            _ => Err(CaptureError::UnsupportedFormat(s.to_string())),
        }
    }
}

/// How 5- and 6-bit RGB565 channels are widened to 8 bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Rgb565Expansion {
    /// Left shift into the high bits. Fast; the top code maps to 248/252.
    #[default]
    Shift,
    /// Scale by 255/31 and 255/63. Linear; the top code maps to 255.
    Proportional,
}

impl Rgb565Expansion {
    #[inline]
    pub fn expand(self, word: u16) -> [u8; 3] {
        let r5 = (word >> 11) & 0x1F;
        let g6 = (word >> 5) & 0x3F;
        let b5 = word & 0x1F;

        match self {
            Rgb565Expansion::Shift => [(r5 << 3) as u8, (g6 << 2) as u8, (b5 << 3) as u8],
            Rgb565Expansion::Proportional => [
                (r5 as u32 * 255 / 31) as u8,
                (g6 as u32 * 255 / 63) as u8,
                (b5 as u32 * 255 / 31) as u8,
            ],
        }
    }
}

/// Order in which the sensor emits rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum RowOrder {
    /// First row on the wire is the top of the image.
    TopFirst,
    /// First row on the wire is the bottom of the image; rows are reversed.
    BottomFirst,
}

/// Decoded RGB888 image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterImage {
    /// Width of the image in pixels
    pub width: usize,
    /// Height of the image in pixels
    pub height: usize,
    /// Pixel data interleaved [R, G, B, R, G, B, ...], row-major, top row first
    pub data: Vec<u8>,
}

impl RasterImage {
    /// True when `data` holds exactly `width * height` RGB triples.
    pub fn is_consistent(&self) -> bool {
        self.data.len() == self.width * self.height * 3
    }

    pub fn stride(&self) -> usize {
        self.width * 3
    }

    pub fn pixel(&self, x: usize, y: usize) -> [u8; 3] {
        let i = y * self.stride() + x * 3;
        [self.data[i], self.data[i + 1], self.data[i + 2]]
    }

    pub fn pixels(&self) -> impl Iterator<Item = [u8; 3]> + '_ {
        self.data.chunks_exact(3).map(|p| [p[0], p[1], p[2]])
    }

    /// Reverses row order in place.
    pub fn flip_vertical(&mut self) {
        let stride = self.stride();
        let height = self.height;
        for top in 0..height / 2 {
            let bottom = height - 1 - top;
            let (upper, lower) = self.data.split_at_mut(bottom * stride);
            upper[top * stride..(top + 1) * stride].swap_with_slice(&mut lower[..stride]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_format_names() {
        assert_eq!("rgb565".parse::<PixelFormat>().unwrap(), PixelFormat::Rgb565);
        assert_eq!("YUV422".parse::<PixelFormat>().unwrap(), PixelFormat::Yuv422);
        assert_eq!("yuyv".parse::<PixelFormat>().unwrap(), PixelFormat::Yuv422);
        assert_eq!(" gray ".parse::<PixelFormat>().unwrap(), PixelFormat::Luma8);

        let err = "bgr24".parse::<PixelFormat>().unwrap_err();
        assert!(matches!(err, CaptureError::UnsupportedFormat(ref s) if s == "bgr24"));
        let message = err.to_string();
        for format in PixelFormat::ALL {
            assert!(message.contains(format.name()), "{message}");
        }
    }

    #[test]
    fn name_round_trips_through_from_str() {
        for format in PixelFormat::ALL {
            assert_eq!(format.to_string().parse::<PixelFormat>().unwrap(), format);
        }
    }

    #[test]
    fn qvga_frames_are_two_bytes_per_pixel() {
        for format in PixelFormat::ALL {
            assert_eq!(format.frame_size(FrameGeometry::QVGA), 320 * 240 * 2);
        }
    }

    #[test]
    fn expansion_policies_at_extremes() {
        assert_eq!(Rgb565Expansion::Shift.expand(0xFFFF), [248, 252, 248]);
        assert_eq!(Rgb565Expansion::Proportional.expand(0xFFFF), [255, 255, 255]);
        assert_eq!(Rgb565Expansion::Shift.expand(0x0000), [0, 0, 0]);
        assert_eq!(Rgb565Expansion::Proportional.expand(0x0000), [0, 0, 0]);
        assert_eq!(Rgb565Expansion::Shift.expand(0xF800), [248, 0, 0]);
        assert_eq!(Rgb565Expansion::Shift.expand(0x07E0), [0, 252, 0]);
        assert_eq!(Rgb565Expansion::Shift.expand(0x001F), [0, 0, 248]);
    }

    #[test]
    fn flip_vertical_reverses_rows() {
        let mut image = RasterImage {
            width: 1,
            height: 3,
            data: vec![1, 1, 1, 2, 2, 2, 3, 3, 3],
        };
        image.flip_vertical();
        assert_eq!(image.data, vec![3, 3, 3, 2, 2, 2, 1, 1, 1]);

        let mut even = RasterImage {
            width: 2,
            height: 2,
            data: vec![1, 1, 1, 2, 2, 2, 3, 3, 3, 4, 4, 4],
        };
        even.flip_vertical();
        assert_eq!(even.pixel(0, 0), [3, 3, 3]);
        assert_eq!(even.pixel(1, 0), [4, 4, 4]);
        assert_eq!(even.pixel(0, 1), [1, 1, 1]);
    }
}
