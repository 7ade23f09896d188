//! Frame capture and decoding pipeline
//!
//! Bytes come off the sensor link through the `frame` module, are turned into
//! RGB888 rasters by `decode`, and are handed to the collaborators in `sink`.
//! `capture` ties the three together into the per-frame loop.

pub mod common;
pub mod frame;
pub mod decode;
pub mod sink;
pub mod capture;

pub use common::{
    CaptureError,
    Result,
};

pub use frame::{
    FrameBuffer,
    FrameGeometry,
    FrameSource,
    StreamFrameReader,
    SerialConfig,
    SerialPort,
};

pub use decode::{
    decode,
    DecodeConfig,
    DecodeConfigBuilder,
    DecodeOptions,
    Decoder,
    PixelFormat,
    RasterImage,
    Rgb565Expansion,
    RowOrder,
};

pub use sink::{
    FrameSink,
    SinkControl,
    RasterWriter,
    ImageFileSink,
    PngRasterWriter,
    RawDumpSink,
    TerminalPreview,
};

pub use capture::{
    CapturePipeline,
    CaptureStats,
    FrameOutcome,
    RunPolicy,
    PipelineTimings,
    StepTiming,
    Timer,
    replay_dump,
};
