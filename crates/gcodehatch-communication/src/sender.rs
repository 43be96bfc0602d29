//! Line-by-line program streaming
//!
//! Supports:
//! - Skipping blank lines and `;` comment lines
//! - Distance-proportional pauses after every line carrying an axis word
//! - A settle pause after the port opens
//! - Pluggable sleeping so callers can record delays instead of blocking

use crate::coordinates::{extract_coordinates, travel_distance, AxisWords};
use gcodehatch_core::ConnectionError;
use std::io::Write;
use std::time::Duration;
use tracing::{debug, info};

/// Millimetres of travel per second of pause
pub const DEFAULT_DELAY_DIVISOR: f64 = 12.0;

/// Shortest pause after a motion line
pub const DEFAULT_MIN_DELAY: Duration = Duration::from_secs(1);

/// Pause between opening the port and the first line
pub const DEFAULT_SETTLE_TIME: Duration = Duration::from_secs(2);

/// Streaming options
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SendOptions {
    /// Pause = distance / delay_divisor seconds
    pub delay_divisor: f64,
    pub min_delay: Duration,
    pub settle: Duration,
}

impl Default for SendOptions {
    fn default() -> Self {
        Self {
            delay_divisor: DEFAULT_DELAY_DIVISOR,
            min_delay: DEFAULT_MIN_DELAY,
            settle: DEFAULT_SETTLE_TIME,
        }
    }
}

impl SendOptions {
    /// Pause after a line that moved `distance`
    pub fn delay_for(&self, distance: f64) -> Duration {
        let seconds = distance / self.delay_divisor;
        let delay = Duration::try_from_secs_f64(seconds).unwrap_or(self.min_delay);
        delay.max(self.min_delay)
    }
}

/// Summary of one streamed program
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SendReport {
    pub lines_sent: usize,
    pub total_distance: f64,
    /// Sum of the per-line pauses, settle time excluded
    pub total_delay: Duration,
}

/// Something that can pause the stream
pub trait Sleeper {
    fn sleep(&mut self, duration: Duration);
}

/// Blocks the calling thread
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&mut self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

impl<F: FnMut(Duration)> Sleeper for F {
    fn sleep(&mut self, duration: Duration) {
        self(duration)
    }
}

/// Writes program lines to a port, pausing between motion lines
pub struct GcodeSender<W: Write, S: Sleeper = ThreadSleeper> {
    port: W,
    sleeper: S,
    options: SendOptions,
}

impl<W: Write> GcodeSender<W, ThreadSleeper> {
    pub fn new(port: W, options: SendOptions) -> Self {
        Self::with_sleeper(port, options, ThreadSleeper)
    }
}

impl<W: Write, S: Sleeper> GcodeSender<W, S> {
    pub fn with_sleeper(port: W, options: SendOptions, sleeper: S) -> Self {
        Self {
            port,
            sleeper,
            options,
        }
    }

    pub fn options(&self) -> &SendOptions {
        &self.options
    }

    /// Give back the underlying port
    pub fn into_inner(self) -> W {
        self.port
    }

    /// Wait for the settle time, then stream every line of `program`.
    pub fn send_program(&mut self, program: &str) -> Result<SendReport, ConnectionError> {
        if !self.options.settle.is_zero() {
            debug!(settle = ?self.options.settle, "Waiting for port to settle");
            self.sleeper.sleep(self.options.settle);
        }
        self.send_lines(program.lines())
    }

    /// Stream lines without the settle pause.
    ///
    /// Blank lines and lines starting with `;` are skipped. Every other line
    /// is written with a trailing newline. When it carries an X, Y or Z word
    /// the sender pauses for `max(min_delay, distance / delay_divisor)` and
    /// the line's axis words become the previous position.
    pub fn send_lines<'a, I>(&mut self, lines: I) -> Result<SendReport, ConnectionError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut report = SendReport::default();
        let mut previous = AxisWords::ORIGIN;

        for raw in lines {
            let line = raw.trim();
            if line.is_empty() || line.starts_with(';') {
                continue;
            }

            self.write_line(line)?;
            report.lines_sent += 1;

            let current = extract_coordinates(line);
            if current.has_any() {
                let distance = travel_distance(&previous, &current);
                let delay = self.options.delay_for(distance);
                debug!(line, distance, delay = ?delay, "Sent motion line");

                self.sleeper.sleep(delay);
                report.total_distance += distance;
                report.total_delay += delay;
                previous = current;
            } else {
                debug!(line, "Sent line");
            }
        }

        info!(
            lines = report.lines_sent,
            distance = report.total_distance,
            delay = ?report.total_delay,
            "Program transmission complete"
        );
        Ok(report)
    }

    fn write_line(&mut self, line: &str) -> Result<(), ConnectionError> {
        let io_error = |e: std::io::Error| ConnectionError::IoError {
            reason: e.to_string(),
        };
        self.port.write_all(line.as_bytes()).map_err(io_error)?;
        self.port.write_all(b"\n").map_err(io_error)?;
        self.port.flush().map_err(io_error)
    }
}
