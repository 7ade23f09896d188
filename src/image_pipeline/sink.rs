//! Frame sinks
//!
//! Collaborators that receive each captured frame: raw dumps, encoded image
//! files and a live terminal preview. The capture loop owns them as trait
//! objects and keeps running when one of them fails.

mod writer;
mod png_writer;
mod image_file;
mod raw_dump;
mod display;
pub mod types;

pub use writer::RasterWriter;
pub use png_writer::PngRasterWriter;
pub use image_file::{ImageFileSink, expand_index};
pub use raw_dump::RawDumpSink;
pub use display::TerminalPreview;
pub use types::{FrameSink, SinkControl};
