//! Frame acquisition module
//!
//! Collects exactly one frame's worth of bytes from a byte stream. There is no
//! in-band framing on the link, so the expected size is the only sync signal.

mod reader;
mod stream_reader;
mod serial;
pub mod types;

pub use reader::FrameSource;
pub use stream_reader::StreamFrameReader;
pub use serial::{SerialConfig, SerialPort, DEFAULT_BAUD_RATE};
pub use types::{FrameBuffer, FrameGeometry};
