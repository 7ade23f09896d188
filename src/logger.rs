pub use tracing::{debug, error, info, warn, trace, instrument};
use std::fs::OpenOptions;
use std::io;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt::{self, format::FmtSpan, writer::BoxMakeWriter}};

/// Installs the global subscriber writing to stderr. Frame step spans are
/// only reported on close when the active filter asks for debug output.
pub fn init() {
    install(BoxMakeWriter::new(io::stderr), true);
}

/// Same as `init`, but appends to `path` instead of stderr.
///
/// Used while the terminal preview owns the screen.
pub fn init_to_file(path: &Path) -> io::Result<()> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    install(BoxMakeWriter::new(Mutex::new(file)), false);
    Ok(())
}

fn install(writer: BoxMakeWriter, ansi: bool) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let is_debug = env_filter.to_string().contains("debug") ||
                   std::env::var("RUST_LOG").unwrap_or_default().contains("debug");

    let fmt_layer = fmt::layer()
        .with_target(false)
        .with_ansi(ansi)
        .with_timer(fmt::time::uptime())
        .with_writer(writer)
        .with_span_events(if is_debug {
            FmtSpan::CLOSE
        } else {
            FmtSpan::NONE
        });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}
