use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, info, info_span, instrument, warn};

use crate::image_pipeline::{
    common::error::{CaptureError, Result},
    capture::timing::{PipelineTimings, Timer},
    decode::{DecodeConfig, Decoder, RasterImage},
    frame::{FrameBuffer, FrameSource, SerialConfig, SerialPort, StreamFrameReader},
    sink::{FrameSink, SinkControl},
};

/// When the capture loop stops on its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunPolicy {
    /// Stop after this many decoded frames. `None` runs until stopped.
    pub max_frames: Option<u64>,
    /// Give up after this many incomplete frames in a row. `None` waits forever.
    pub max_consecutive_incomplete: Option<u32>,
}

impl Default for RunPolicy {
    fn default() -> Self {
        Self {
            max_frames: Some(1),
            max_consecutive_incomplete: None,
        }
    }
}

impl RunPolicy {
    pub fn unlimited() -> Self {
        Self {
            max_frames: None,
            max_consecutive_incomplete: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CaptureStats {
    pub frames_decoded: u64,
    pub incomplete_frames: u64,
    pub sink_failures: u64,
}

/// Result of one read → decode → deliver attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameOutcome {
    Decoded { index: u64, stop_requested: bool },
    /// The frame was dropped; the stream is left where the attempt ended.
    Incomplete {
        expected: usize,
        received: usize,
        end_of_stream: bool,
    },
}

pub struct CapturePipeline<S: FrameSource> {
    source: S,
    decoder: Decoder,
    sinks: Vec<Box<dyn FrameSink>>,
    stats: CaptureStats,
    last_timings: PipelineTimings,
}

impl CapturePipeline<StreamFrameReader<SerialPort>> {
    pub fn open_serial<P: AsRef<Path>>(
        device: P,
        serial: &SerialConfig,
        config: DecodeConfig,
    ) -> Result<Self> {
        let port = SerialPort::open(device, serial)?;
        info!(device = %port.path().display(), baud = serial.baud_rate, "Serial port open");
        // With VMIN=0 a read timeout surfaces as a zero-length read.
        let reader =
            StreamFrameReader::new(port).empty_read_is_timeout(serial.read_timeout.is_some());
        Ok(Self::with_source(reader, config))
    }
}

impl<S: FrameSource> CapturePipeline<S> {
    pub fn with_source(source: S, config: DecodeConfig) -> Self {
        Self {
            source,
            decoder: Decoder::new(config),
            sinks: Vec::new(),
            stats: CaptureStats::default(),
            last_timings: PipelineTimings::new(),
        }
    }

    pub fn with_sink(mut self, sink: Box<dyn FrameSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    pub fn add_sink(&mut self, sink: Box<dyn FrameSink>) {
        self.sinks.push(sink);
    }

    pub fn stats(&self) -> &CaptureStats {
        &self.stats
    }

    /// Step timings of the most recent frame attempt.
    pub fn last_timings(&self) -> &PipelineTimings {
        &self.last_timings
    }

    /// Reads, decodes and delivers one frame.
    ///
    /// An incomplete frame is reported as `FrameOutcome::Incomplete`, not as
    /// an error. Sink failures are logged and counted. Any other reader or
    /// decoder error is returned.
    #[instrument(skip(self), fields(frame = self.stats.frames_decoded))]
    pub fn capture_frame(&mut self) -> Result<FrameOutcome> {
        let mut timings = PipelineTimings::new();
        let expected_size = self.decoder.expected_frame_size();

        let read = {
            let _span = info_span!("read_frame", expected_size).entered();
            let timer = Timer::start("read_frame");
            let read = self.source.read_frame(expected_size);
            timings.record(timer);
            read
        };

        let frame = match read {
            Ok(frame) => frame,
            Err(CaptureError::IncompleteFrame { expected, received, end_of_stream }) => {
                self.stats.incomplete_frames += 1;
                self.last_timings = timings;
                return Ok(FrameOutcome::Incomplete { expected, received, end_of_stream });
            }
            Err(e) => return Err(e),
        };

        let index = self.stats.frames_decoded;

        deliver_raw(&mut self.sinks, index, &frame, &mut self.stats, &mut timings);

        let image = {
            let _span = info_span!("decode").entered();
            let timer = Timer::start("decode");
            let image = self.decoder.decode(&frame)?;
            timings.record(timer);
            image
        };
        drop(frame);

        let stop_requested =
            deliver_raster(&mut self.sinks, index, &image, &mut self.stats, &mut timings);

        self.stats.frames_decoded += 1;
        timings.log_summary();
        self.last_timings = timings;

        Ok(FrameOutcome::Decoded { index, stop_requested })
    }

    /// Captures frames until the policy is satisfied, a sink asks to stop,
    /// `stop` is raised, or the source reaches end of data with nothing read.
    /// `stop` and the sinks' `poll_control` are checked between attempts.
    pub fn run(&mut self, policy: &RunPolicy, stop: &AtomicBool) -> Result<CaptureStats> {
        let config = self.decoder.config();
        info!(
            format = %config.format,
            width = config.geometry.width,
            height = config.geometry.height,
            frame_size = config.frame_size(),
            "Capture started"
        );

        let mut consecutive_incomplete: u32 = 0;

        loop {
            if stop.load(Ordering::Relaxed) {
                info!("Stop requested");
                break;
            }

            if consecutive_incomplete == 0 {
                info!("Waiting for image data...");
            }

            let outcome = self.capture_frame()?;
            let poll_stop = poll_sinks(&mut self.sinks, &mut self.stats);

            match outcome {
                FrameOutcome::Decoded { index, stop_requested } => {
                    consecutive_incomplete = 0;
                    debug!(
                        index,
                        read_ms = step_millis(&self.last_timings, "read_frame"),
                        decode_ms = step_millis(&self.last_timings, "decode"),
                        "Frame delivered"
                    );

                    if stop_requested || poll_stop {
                        info!("Sink requested stop");
                        break;
                    }
                    if policy.max_frames.is_some_and(|max| self.stats.frames_decoded >= max) {
                        break;
                    }
                }
                FrameOutcome::Incomplete { expected, received, end_of_stream } => {
                    consecutive_incomplete = consecutive_incomplete.saturating_add(1);
                    if received > 0 {
                        warn!(received, expected, "Discarding incomplete frame");
                    } else {
                        debug!(end_of_stream, "No data received");
                    }

                    if poll_stop {
                        info!("Sink requested stop");
                        break;
                    }
                    if end_of_stream && received == 0 {
                        info!("Input stream closed");
                        break;
                    }
                    if policy
                        .max_consecutive_incomplete
                        .is_some_and(|limit| consecutive_incomplete >= limit)
                    {
                        warn!(consecutive_incomplete, "Giving up after repeated incomplete frames");
                        break;
                    }
                }
            }
        }

        info!(
            decoded = self.stats.frames_decoded,
            incomplete = self.stats.incomplete_frames,
            sink_failures = self.stats.sink_failures,
            "Capture finished"
        );
        Ok(self.stats.clone())
    }
}

fn step_millis(timings: &PipelineTimings, step: &str) -> f64 {
    timings
        .get_step(step)
        .map_or(0.0, |d| d.as_secs_f64() * 1000.0)
}

/// Returns true if any sink asked to stop. Every sink is polled.
fn poll_sinks(sinks: &mut [Box<dyn FrameSink>], stats: &mut CaptureStats) -> bool {
    let mut stop_requested = false;
    for sink in sinks.iter_mut() {
        match sink.poll_control() {
            Ok(SinkControl::Continue) => {}
            Ok(SinkControl::Stop) => stop_requested = true,
            Err(e) => {
                stats.sink_failures += 1;
                warn!(sink = sink.name(), error = %e, "Sink failed while polling");
            }
        }
    }
    stop_requested
}

pub(crate) fn deliver_raw(
    sinks: &mut [Box<dyn FrameSink>],
    index: u64,
    frame: &FrameBuffer,
    stats: &mut CaptureStats,
    timings: &mut PipelineTimings,
) {
    for sink in sinks.iter_mut() {
        let timer = Timer::start(format!("sink:{}", sink.name()));
        if let Err(e) = sink.accept_raw(index, frame) {
            stats.sink_failures += 1;
            warn!(sink = sink.name(), error = %e, "Sink failed on raw frame");
        }
        timings.record(timer);
    }
}

/// Returns true if any sink asked to stop. Every sink still sees the frame.
pub(crate) fn deliver_raster(
    sinks: &mut [Box<dyn FrameSink>],
    index: u64,
    image: &RasterImage,
    stats: &mut CaptureStats,
    timings: &mut PipelineTimings,
) -> bool {
    let mut stop_requested = false;
    for sink in sinks.iter_mut() {
        let timer = Timer::start(format!("sink:{}", sink.name()));
        match sink.accept_raster(index, image) {
            Ok(SinkControl::Continue) => {}
            Ok(SinkControl::Stop) => stop_requested = true,
            Err(e) => {
                stats.sink_failures += 1;
                warn!(sink = sink.name(), error = %e, "Sink failed on decoded frame");
            }
        }
        timings.record(timer);
    }
    stop_requested
}
