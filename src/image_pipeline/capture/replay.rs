use std::path::Path;

use tracing::{info, info_span, instrument};

use crate::image_pipeline::{
    common::error::{CaptureError, Result},
    capture::pipeline::{deliver_raster, CaptureStats},
    capture::timing::{PipelineTimings, Timer},
    decode::Decoder,
    frame::FrameBuffer,
    sink::FrameSink,
};

/// Decodes a raw dump written by `RawDumpSink` and hands the raster to `sinks`.
///
/// The whole file is one frame; its length must match the decoder's frame
/// size exactly. Sink failures are counted in the returned stats.
#[instrument(skip_all, fields(dump = %dump.as_ref().display()))]
pub fn replay_dump<P: AsRef<Path>>(
    dump: P,
    decoder: &Decoder,
    sinks: &mut [Box<dyn FrameSink>],
) -> Result<CaptureStats> {
    let dump = dump.as_ref();
    let mut stats = CaptureStats::default();
    let mut timings = PipelineTimings::new();

    let frame = {
        let _span = info_span!("read_dump").entered();
        let timer = Timer::start("read_dump");
        let bytes = std::fs::read(dump).map_err(|e| {
            let reason = format!("{}: {}", dump.display(), e);
            CaptureError::IoError(std::io::Error::new(e.kind(), reason))
        })?;
        timings.record(timer);
        FrameBuffer::from_bytes(bytes)
    };

    let image = {
        let _span = info_span!("decode").entered();
        let timer = Timer::start("decode");
        let image = decoder.decode(&frame)?;
        timings.record(timer);
        image
    };

    deliver_raster(sinks, 0, &image, &mut stats, &mut timings);
    stats.frames_decoded = 1;
    timings.log_summary();

    info!(
        width = image.width,
        height = image.height,
        sink_failures = stats.sink_failures,
        "Replay complete"
    );
    Ok(stats)
}
