//! # GCodeHatch Communication
//!
//! Streams a generated program to a motion controller over a serial port.
//! The controller has no flow control: each motion line is followed by a
//! pause proportional to the distance it travels.

pub mod coordinates;
pub mod sender;
pub mod serial;

pub use coordinates::{extract_coordinates, travel_distance, AxisWords};
pub use sender::{
    GcodeSender, SendOptions, SendReport, Sleeper, ThreadSleeper, DEFAULT_DELAY_DIVISOR,
    DEFAULT_MIN_DELAY, DEFAULT_SETTLE_TIME,
};
pub use serial::{list_ports, open_serial_port, SerialPortInfo, DEFAULT_BAUD_RATE};
