//! Serial port access
//!
//! Provides port enumeration and opening for direct hardware connection
//! to the controller via USB.

use gcodehatch_core::ConnectionError;
use std::time::Duration;
use tracing::{error, info, warn};

/// Baud rate the controller firmware listens on
pub const DEFAULT_BAUD_RATE: u32 = 115_200;

/// Read timeout for the opened port
const PORT_TIMEOUT: Duration = Duration::from_secs(1);

/// Information about an available serial port
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerialPortInfo {
    /// Port name (e.g., "/dev/ttyUSB0", "COM3")
    pub port_name: String,

    /// Port description (e.g., "USB Arduino Serial Port")
    pub description: String,

    /// Manufacturer name if available
    pub manufacturer: Option<String>,

    /// USB vendor ID if applicable
    pub vid: Option<u16>,

    /// USB product ID if applicable
    pub pid: Option<u16>,
}

impl SerialPortInfo {
    pub fn new(port_name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            port_name: port_name.into(),
            description: description.into(),
            manufacturer: None,
            vid: None,
            pid: None,
        }
    }

    pub fn with_manufacturer(mut self, manufacturer: impl Into<String>) -> Self {
        self.manufacturer = Some(manufacturer.into());
        self
    }

    pub fn with_usb_ids(mut self, vid: u16, pid: u16) -> Self {
        self.vid = Some(vid);
        self.pid = Some(pid);
        self
    }
}

/// List serial ports that look like a USB-attached controller.
///
/// Keeps:
/// - Windows: COM* (e.g., COM1, COM3)
/// - Linux: /dev/ttyUSB*, /dev/ttyACM*
/// - macOS: /dev/cu.usbserial-*, /dev/cu.usbmodem*, /dev/tty.usbmodem*
pub fn list_ports() -> Result<Vec<SerialPortInfo>, ConnectionError> {
    let ports = serialport::available_ports().map_err(|e| {
        error!("Failed to enumerate serial ports: {}", e);
        ConnectionError::Enumeration {
            reason: e.to_string(),
        }
    })?;

    Ok(ports
        .iter()
        .filter(|port| is_controller_port(&port.port_name))
        .map(|port| {
            let info = SerialPortInfo::new(&port.port_name, port_description(port));
            match &port.port_type {
                serialport::SerialPortType::UsbPort(usb) => {
                    let info = info.with_usb_ids(usb.vid, usb.pid);
                    match &usb.manufacturer {
                        Some(mfg) => info.with_manufacturer(mfg),
                        None => info,
                    }
                }
                _ => info,
            }
        })
        .collect())
}

/// Open a port for streaming
pub fn open_serial_port(
    port: &str,
    baud_rate: u32,
) -> Result<Box<dyn serialport::SerialPort>, ConnectionError> {
    match serialport::new(port, baud_rate).timeout(PORT_TIMEOUT).open() {
        Ok(handle) => {
            info!(port, baud_rate, "Opened serial port");
            Ok(handle)
        }
        Err(e) => {
            warn!("Failed to open serial port {}: {}", port, e);
            Err(ConnectionError::FailedToOpen {
                port: port.to_string(),
                reason: e.to_string(),
            })
        }
    }
}

fn is_controller_port(port_name: &str) -> bool {
    if let Some(number) = port_name.strip_prefix("COM") {
        return !number.is_empty() && number.chars().all(|c| c.is_ascii_digit());
    }

    [
        "/dev/ttyUSB",
        "/dev/ttyACM",
        "/dev/cu.usbserial-",
        "/dev/cu.usbmodem",
        "/dev/tty.usbmodem",
        "/dev/tty.usbserial-",
    ]
    .iter()
    .any(|prefix| port_name.starts_with(prefix))
}

fn port_description(port: &serialport::SerialPortInfo) -> String {
    match &port.port_type {
        serialport::SerialPortType::UsbPort(usb) => format!(
            "USB {} {}",
            usb.manufacturer.as_deref().unwrap_or("Device"),
            usb.product.as_deref().unwrap_or("Serial Port")
        ),
        serialport::SerialPortType::BluetoothPort => "Bluetooth Serial".to_string(),
        serialport::SerialPortType::PciPort => "PCI Serial".to_string(),
        _ => "Serial Port".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_controller_port_patterns() {
        assert!(is_controller_port("COM3"));
        assert!(is_controller_port("/dev/ttyUSB0"));
        assert!(is_controller_port("/dev/ttyACM1"));
        assert!(is_controller_port("/dev/tty.usbmodem1101"));
        assert!(is_controller_port("/dev/cu.usbserial-A50285BI"));

        assert!(!is_controller_port("COM"));
        assert!(!is_controller_port("COMX"));
        assert!(!is_controller_port("/dev/ttyS0"));
        assert!(!is_controller_port("/dev/tty.Bluetooth-Incoming-Port"));
    }

    #[test]
    fn test_port_info_builder() {
        let info = SerialPortInfo::new("/dev/ttyACM0", "USB Arduino Serial Port")
            .with_manufacturer("Arduino")
            .with_usb_ids(0x2341, 0x0043);
        assert_eq!(info.manufacturer.as_deref(), Some("Arduino"));
        assert_eq!(info.vid, Some(0x2341));
        assert_eq!(info.pid, Some(0x0043));
    }

    #[test]
    fn test_open_missing_port_fails() {
        let err = open_serial_port("/dev/gcodehatch-no-such-port", DEFAULT_BAUD_RATE).unwrap_err();
        assert!(matches!(err, ConnectionError::FailedToOpen { ref port, .. } if port == "/dev/gcodehatch-no-such-port"));
    }
}
