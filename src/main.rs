use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand};
use serial_framegrab::image_pipeline::frame::DEFAULT_BAUD_RATE;
use serial_framegrab::image_pipeline::{
    CapturePipeline, DecodeConfig, Decoder, FrameSink, ImageFileSink, PixelFormat, RawDumpSink,
    Rgb565Expansion, RowOrder, RunPolicy, SerialConfig, TerminalPreview, replay_dump,
};
use serial_framegrab::logger;

use tracing::{error, info, warn};

/// Read timeout used with `--display` when none is given, so the preview can
/// react to its quit keys while the sensor is silent.
const PREVIEW_READ_TIMEOUT: Duration = Duration::from_millis(100);

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Grab raw frames from a serial image sensor and decode them to RGB images"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Read frames from a serial device.
    Capture(CaptureArgs),
    /// Decode a raw dump written by `capture --save-raw`.
    Convert(ConvertArgs),
}

#[derive(Args, Debug)]
struct DecodeArgs {
    /// Pixel format streamed by the sensor: rgb565, yuv422 or gray.
    #[arg(long, short)]
    format: String,

    /// Row order of the sensor's scan.
    #[arg(long, value_enum)]
    row_order: RowOrder,

    /// RGB565 channel expansion.
    #[arg(long, value_enum, default_value = "shift")]
    expansion: Rgb565Expansion,

    #[arg(long, default_value_t = 320)]
    width: usize,

    #[arg(long, default_value_t = 240)]
    height: usize,
}

#[derive(Args, Debug)]
struct OutputArgs {
    /// Decoded image path. `{index}` is replaced by the frame number.
    #[arg(long, short, default_value = "output.png")]
    output: PathBuf,
}

#[derive(Args, Debug)]
struct CaptureArgs {
    /// Serial device, e.g. /dev/ttyUSB0.
    #[arg(long, short, env = "FRAMEGRAB_DEVICE")]
    device: PathBuf,

    #[arg(long, env = "FRAMEGRAB_BAUD", default_value_t = DEFAULT_BAUD_RATE)]
    baud: u32,

    /// Read timeout in milliseconds. Blocks indefinitely when absent, except
    /// with --display, which defaults to 100.
    #[arg(long)]
    timeout_ms: Option<u64>,

    #[command(flatten)]
    decode: DecodeArgs,

    #[command(flatten)]
    output: OutputArgs,

    /// Also write each frame's undecoded bytes.
    #[arg(long)]
    save_raw: bool,

    #[arg(long, default_value = "output.hex")]
    raw_output: PathBuf,

    /// Show frames in the terminal as they arrive. Quit with q, Esc or Ctrl+C.
    #[arg(long)]
    display: bool,

    /// Where log output goes while --display owns the terminal.
    #[arg(long, default_value = "framegrab.log")]
    log_file: PathBuf,

    /// Frames to capture before exiting; 0 runs until interrupted.
    /// Defaults to 1, or 0 with --display.
    #[arg(long)]
    frames: Option<u64>,

    /// Exit after this many incomplete frames in a row.
    #[arg(long)]
    max_incomplete: Option<u32>,
}

#[derive(Args, Debug)]
struct ConvertArgs {
    /// Raw dump to decode.
    #[arg(long, short, default_value = "output.hex")]
    input: PathBuf,

    #[command(flatten)]
    decode: DecodeArgs,

    #[command(flatten)]
    output: OutputArgs,
}

impl DecodeArgs {
    fn to_config(&self) -> anyhow::Result<DecodeConfig> {
        let format: PixelFormat = self.format.parse()?;
        let config = DecodeConfig::builder()
            .dimensions(self.width, self.height)
            .format(format)
            .expansion(self.expansion)
            .row_order(self.row_order)
            .build()?;
        Ok(config)
    }
}

impl OutputArgs {
    fn sink(&self) -> ImageFileSink {
        ImageFileSink::png(&self.output)
    }
}

impl CaptureArgs {
    fn read_timeout(&self) -> Option<Duration> {
        match self.timeout_ms {
            Some(ms) => Some(Duration::from_millis(ms)),
            None if self.display => Some(PREVIEW_READ_TIMEOUT),
            None => None,
        }
    }

    fn run_policy(&self) -> RunPolicy {
        let frames = self.frames.unwrap_or(if self.display { 0 } else { 1 });
        RunPolicy {
            max_frames: (frames > 0).then_some(frames),
            max_consecutive_incomplete: self.max_incomplete,
        }
    }
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() { ExitCode::from(1) } else { ExitCode::SUCCESS };
        }
    };

    // The preview draws on the terminal, so its logs go to a file instead.
    let log_file = match &cli.command {
        Command::Capture(args) if args.display => Some(args.log_file.clone()),
        _ => None,
    };
    match &log_file {
        Some(path) => {
            if let Err(e) = logger::init_to_file(path) {
                eprintln!("error: cannot open log file {}: {}", path.display(), e);
                return ExitCode::from(1);
            }
        }
        None => logger::init(),
    }

    let result = match cli.command {
        Command::Capture(args) => capture(args),
        Command::Convert(args) => convert(args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            if log_file.is_some() {
                eprintln!("error: {:#}", e);
            }
            ExitCode::from(1)
        }
    }
}

fn capture(args: CaptureArgs) -> anyhow::Result<()> {
    // Validate everything the operator typed before touching the device.
    let config = args.decode.to_config()?;

    let serial = SerialConfig {
        baud_rate: args.baud,
        read_timeout: args.read_timeout(),
    };

    let stop = Arc::new(AtomicBool::new(false));
    let handler_flag = stop.clone();
    ctrlc::set_handler(move || {
        handler_flag.store(true, Ordering::Relaxed);
    })
    .context("failed to install Ctrl-C handler")?;

    let mut pipeline = CapturePipeline::open_serial(&args.device, &serial, config)
        .with_context(|| format!("failed to open serial device {}", args.device.display()))?;

    if args.save_raw {
        pipeline.add_sink(Box::new(RawDumpSink::new(&args.raw_output)));
    }
    pipeline.add_sink(Box::new(args.output.sink()));
    if args.display {
        let preview = TerminalPreview::new().context("failed to start terminal preview")?;
        pipeline.add_sink(Box::new(preview));
    }

    let stats = pipeline.run(&args.run_policy(), &stop)?;
    // Restores the terminal before anything else is reported.
    drop(pipeline);

    if stats.sink_failures > 0 {
        warn!(failures = stats.sink_failures, "Some frames were not written");
    }
    // Quitting the preview before any frame arrived is not a failure.
    if stats.frames_decoded == 0 && !args.display && !stop.load(Ordering::Relaxed) {
        bail!("no complete frame received");
    }
    Ok(())
}

fn convert(args: ConvertArgs) -> anyhow::Result<()> {
    let config = args.decode.to_config()?;
    let decoder = Decoder::new(config);

    info!(input = %args.input.display(), format = %decoder.config().format, "Converting raw dump");

    let mut sinks: Vec<Box<dyn FrameSink>> = vec![Box::new(args.output.sink())];
    let stats = replay_dump(&args.input, &decoder, &mut sinks)?;

    if stats.sink_failures > 0 {
        bail!("failed to write {}", args.output.output.display());
    }
    Ok(())
}
