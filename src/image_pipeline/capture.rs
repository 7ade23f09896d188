//! Capture orchestration module
//!
//! Runs read → decode → sinks once per frame, plus offline replay of raw
//! dumps through the same decoder.

mod pipeline;
mod replay;
mod timing;


pub use pipeline::{CapturePipeline, CaptureStats, FrameOutcome, RunPolicy};
pub use replay::replay_dump;
pub use timing::{PipelineTimings, StepTiming, Timer};
