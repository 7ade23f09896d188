//! Live preview in the terminal.
//!
//! Each character cell shows two vertically stacked pixels using the upper
//! half block glyph: foreground is the top pixel, background the bottom one.
//! The raster is nearest-neighbour scaled to fit the terminal. Pressing `q`,
//! `Esc` or `Ctrl+C` asks the capture loop to stop. Raw mode turns off the
//! terminal's own SIGINT, so `Ctrl+C` arrives here as a key event.

use std::io::{self, Stdout, Write};
use std::time::Duration;

use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand, QueueableCommand,
};
use tracing::debug;

use crate::image_pipeline::common::error::{CaptureError, Result};
use crate::image_pipeline::decode::types::RasterImage;
use crate::image_pipeline::sink::types::{FrameSink, SinkControl};

const UPPER_HALF_BLOCK: char = '\u{2580}';

/// Top and bottom colour of one character cell.
pub(crate) type Cell = ([u8; 3], [u8; 3]);

/// Scales `image` into `cols x rows` cells, two pixel rows per cell.
///
/// The aspect ratio is preserved; returns the grid and its size.
pub(crate) fn cell_grid(
    image: &RasterImage,
    cols: usize,
    rows: usize,
) -> (Vec<Cell>, usize, usize) {
    if image.width == 0 || image.height == 0 || cols == 0 || rows == 0 {
        return (Vec::new(), 0, 0);
    }

    // Fit in pixel space where one cell is 1 wide and 2 tall.
    let max_h = rows * 2;
    let (out_w, out_h) = if image.width * max_h <= cols * image.height {
        ((image.width * max_h / image.height).max(1), max_h)
    } else {
        (cols, (image.height * cols / image.width).max(1))
    };
    let out_rows = out_h.div_ceil(2);

    let sample = |x: usize, y: usize| {
        let sx = (x * image.width / out_w).min(image.width - 1);
        let sy = (y * image.height / out_h).min(image.height - 1);
        image.pixel(sx, sy)
    };

    let mut cells = Vec::with_capacity(out_w * out_rows);
    for row in 0..out_rows {
        for x in 0..out_w {
            let top = sample(x, row * 2);
            let bottom = if row * 2 + 1 < out_h {
                sample(x, row * 2 + 1)
            } else {
                [0, 0, 0]
            };
            cells.push((top, bottom));
        }
    }
    (cells, out_w, out_rows)
}

/// Terminal preview sink. Owns the terminal while alive.
pub struct TerminalPreview {
    stdout: Stdout,
}

impl TerminalPreview {
    pub fn new() -> Result<Self> {
        let mut stdout = io::stdout();
        terminal::enable_raw_mode()?;
        stdout.execute(EnterAlternateScreen)?;
        stdout.execute(cursor::Hide)?;
        debug!("Terminal preview started");
        Ok(Self { stdout })
    }

    fn render(&mut self, image: &RasterImage) -> io::Result<()> {
        let (cols, rows) = terminal::size()?;
        // Keep the last line free for the status text.
        let (cells, width, height) =
            cell_grid(image, cols as usize, (rows as usize).saturating_sub(1));

        self.stdout.queue(cursor::MoveTo(0, 0))?;
        for row in 0..height {
            self.stdout.queue(cursor::MoveTo(0, row as u16))?;
            for &(top, bottom) in &cells[row * width..(row + 1) * width] {
                self.stdout
                    .queue(SetForegroundColor(rgb(top)))?
                    .queue(SetBackgroundColor(rgb(bottom)))?
                    .queue(Print(UPPER_HALF_BLOCK))?;
            }
            self.stdout.queue(ResetColor)?;
        }
        self.stdout
            .queue(cursor::MoveTo(0, height as u16))?
            .queue(Print(format!("{}x{}  q/Esc to quit", image.width, image.height)))?;
        self.stdout.flush()
    }

    /// Drains pending key events; true if the operator asked to quit.
    fn quit_requested() -> io::Result<bool> {
        while event::poll(Duration::from_millis(0))? {
            if let Event::Key(key) = event::read()? {
                if is_quit_key(&key) {
                    return Ok(true);
                }
            }
        }
        Ok(false)
    }
}

fn rgb([r, g, b]: [u8; 3]) -> Color {
    Color::Rgb { r, g, b }
}

fn is_quit_key(key: &KeyEvent) -> bool {
    if key.kind != KeyEventKind::Press {
        return false;
    }
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => true,
        KeyCode::Char('c') => key.modifiers.contains(KeyModifiers::CONTROL),
        _ => false,
    }
}

impl FrameSink for TerminalPreview {
    fn name(&self) -> &str {
        "terminal_preview"
    }

    fn accept_raster(&mut self, _index: u64, image: &RasterImage) -> Result<SinkControl> {
        self.render(image).map_err(|e| CaptureError::SinkFailure {
            sink: self.name().to_string(),
            reason: e.to_string(),
        })?;
        Ok(SinkControl::Continue)
    }

    fn poll_control(&mut self) -> Result<SinkControl> {
        if Self::quit_requested()? {
            return Ok(SinkControl::Stop);
        }
        Ok(SinkControl::Continue)
    }
}

impl Drop for TerminalPreview {
    fn drop(&mut self) {
        let _ = self.stdout.execute(cursor::Show);
        let _ = self.stdout.execute(LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checker(width: usize, height: usize) -> RasterImage {
        let mut data = Vec::with_capacity(width * height * 3);
        for y in 0..height {
            for x in 0..width {
                let v = if (x + y) % 2 == 0 { 255 } else { 0 };
                data.extend_from_slice(&[v, v, v]);
            }
        }
        RasterImage { width, height, data }
    }

    #[test]
    fn small_image_maps_one_pixel_per_half_cell() {
        let image = checker(4, 4);
        let (cells, w, h) = cell_grid(&image, 80, 24);
        // Height-limited at 48 pixel rows would upscale; width limit is 80.
        assert!(w <= 80 && h <= 24);
        assert_eq!(cells.len(), w * h);
    }

    #[test]
    fn exact_fit_samples_each_pixel() {
        let image = checker(4, 4);
        let (cells, w, h) = cell_grid(&image, 4, 2);
        assert_eq!((w, h), (4, 2));
        assert_eq!(cells[0], ([255; 3], [0; 3]));
        assert_eq!(cells[1], ([0; 3], [255; 3]));
        assert_eq!(cells[4], ([255; 3], [0; 3]));
    }

    #[test]
    fn preserves_aspect_ratio_of_qvga() {
        let image = checker(320, 240);
        let (_, w, h) = cell_grid(&image, 200, 50);
        // 100 pixel rows tall -> 133 wide.
        assert_eq!(w, 133);
        assert_eq!(h, 50);
    }

    #[test]
    fn quit_keys_include_ctrl_c() {
        assert!(is_quit_key(&KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE)));
        assert!(is_quit_key(&KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE)));
        assert!(is_quit_key(&KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)));

        assert!(!is_quit_key(&KeyEvent::new(KeyCode::Char('c'), KeyModifiers::NONE)));
        assert!(!is_quit_key(&KeyEvent::new(KeyCode::Char('x'), KeyModifiers::NONE)));

        let mut release = KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE);
        release.kind = KeyEventKind::Release;
        assert!(!is_quit_key(&release));
    }

    #[test]
    fn empty_terminal_yields_nothing() {
        let (cells, w, h) = cell_grid(&checker(4, 4), 0, 10);
        assert!(cells.is_empty());
        assert_eq!((w, h), (0, 0));
    }
}
