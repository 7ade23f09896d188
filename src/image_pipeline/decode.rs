//! Pixel decoding module
//!
//! One pure routine per sensor encoding, all producing RGB888. The decoders
//! keep no state between calls, so a `Decoder` can be shared across threads.

mod rgb565;
mod yuv422;
mod luma;
mod dispatch;
pub mod config;
pub mod types;

pub use config::{DecodeConfig, DecodeConfigBuilder, DecodeOptions};
pub use dispatch::{decode, Decoder};
pub use types::{PixelFormat, RasterImage, Rgb565Expansion, RowOrder};
