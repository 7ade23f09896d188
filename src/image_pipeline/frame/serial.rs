//! Serial device access.
//!
//! The port is opened as a regular device node. On Linux it is switched to raw
//! 8N1 mode at the requested baud rate through termios, and the read timeout
//! is expressed with `VMIN`/`VTIME`: with a timeout, `read` returns 0 once the
//! line has been idle that long, which the frame reader treats as the end of
//! the current attempt.

use std::fs::{File, OpenOptions};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::image_pipeline::common::error::Result;

pub const DEFAULT_BAUD_RATE: u32 = 115_200;

#[derive(Debug, Clone)]
pub struct SerialConfig {
    pub baud_rate: u32,
    /// Inter-byte timeout. `None` blocks until data arrives.
    pub read_timeout: Option<Duration>,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            baud_rate: DEFAULT_BAUD_RATE,
            read_timeout: None,
        }
    }
}

pub struct SerialPort {
    file: File,
    path: PathBuf,
}

impl SerialPort {
    pub fn open<P: AsRef<Path>>(path: P, config: &SerialConfig) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new().read(true).write(true).open(&path)?;

        configure(&file, config)?;

        info!(
            device = %path.display(),
            baud = config.baud_rate,
            timeout_ms = config.read_timeout.map(|t| t.as_millis() as u64),
            "Opened serial device"
        );

        Ok(Self { file, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Read for SerialPort {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.file.read(buf)
    }
}

/// `VTIME` is in tenths of a second and fits in a `cc_t`.
fn vtime_deciseconds(timeout: Duration) -> u8 {
    let tenths = timeout.as_millis().div_ceil(100);
    tenths.clamp(1, 255) as u8
}

#[cfg(target_os = "linux")]
fn baud_constant(baud_rate: u32) -> io::Result<libc::speed_t> {
    let speed = match baud_rate {
        9_600 => libc::B9600,
        19_200 => libc::B19200,
        38_400 => libc::B38400,
        57_600 => libc::B57600,
        115_200 => libc::B115200,
        230_400 => libc::B230400,
        460_800 => libc::B460800,
        921_600 => libc::B921600,
        other => {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("unsupported baud rate {other}"),
            ));
        }
    };
    Ok(speed)
}

#[cfg(target_os = "linux")]
fn configure(file: &File, config: &SerialConfig) -> io::Result<()> {
    use std::os::fd::AsRawFd;

    let fd = file.as_raw_fd();
    let speed = baud_constant(config.baud_rate)?;

    // SAFETY: `fd` is a valid descriptor owned by `file` for the whole block and
    // `tio` is a plain C struct fully initialised by `tcgetattr` before use.
    unsafe {
        let mut tio: libc::termios = std::mem::zeroed();
        if libc::tcgetattr(fd, &mut tio) != 0 {
            let err = io::Error::last_os_error();
            // Not a tty (a fifo or a regular file replayed as a device): read it as is.
            if err.raw_os_error() == Some(libc::ENOTTY) {
                warn!("Device is not a terminal, skipping line configuration");
                return Ok(());
            }
            return Err(err);
        }

        libc::cfmakeraw(&mut tio);
        tio.c_cflag |= libc::CLOCAL | libc::CREAD;
        tio.c_cflag &= !(libc::CSTOPB | libc::PARENB);

        if libc::cfsetispeed(&mut tio, speed) != 0 || libc::cfsetospeed(&mut tio, speed) != 0 {
            return Err(io::Error::last_os_error());
        }

        match config.read_timeout {
            None => {
                tio.c_cc[libc::VMIN] = 1;
                tio.c_cc[libc::VTIME] = 0;
            }
            Some(timeout) => {
                tio.c_cc[libc::VMIN] = 0;
                tio.c_cc[libc::VTIME] = vtime_deciseconds(timeout);
            }
        }

        if libc::tcsetattr(fd, libc::TCSANOW, &tio) != 0 {
            return Err(io::Error::last_os_error());
        }
        libc::tcflush(fd, libc::TCIFLUSH);
    }

    debug!("Configured serial line raw 8N1");
    Ok(())
}

#[cfg(not(target_os = "linux"))]
fn configure(_file: &File, config: &SerialConfig) -> io::Result<()> {
    warn!(
        baud = config.baud_rate,
        "Line configuration is only implemented on Linux; using the device's current settings"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn vtime_rounds_up_and_clamps() {
        assert_eq!(vtime_deciseconds(Duration::from_millis(0)), 1);
        assert_eq!(vtime_deciseconds(Duration::from_millis(50)), 1);
        assert_eq!(vtime_deciseconds(Duration::from_millis(100)), 1);
        assert_eq!(vtime_deciseconds(Duration::from_millis(101)), 2);
        assert_eq!(vtime_deciseconds(Duration::from_secs(60)), 255);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn rejects_unknown_baud_rate() {
        assert!(baud_constant(115_200).is_ok());
        assert_eq!(
            baud_constant(12_345).unwrap_err().kind(),
            io::ErrorKind::InvalidInput
        );
    }

    #[test]
    fn regular_file_reads_through() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(&[1, 2, 3, 4]).unwrap();

        let mut port = SerialPort::open(tmp.path(), &SerialConfig::default()).unwrap();
        let mut buf = [0u8; 4];
        port.read_exact(&mut buf).unwrap();
        assert_eq!(buf, [1, 2, 3, 4]);
        assert_eq!(port.path(), tmp.path());
    }
}
