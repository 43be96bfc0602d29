//! Error handling for GCodeHatch
//!
//! Provides the error types for every layer of the application:
//! - Toolpath errors (geometry and engine parameters)
//! - Import errors (drawing decoding)
//! - Connection errors (serial streaming)
//!
//! All error types use `thiserror`. Each layer returns its own enum and
//! callers branch on the variant, never on the message text.

use thiserror::Error;

/// Toolpath engine error type
///
/// Every variant is terminal for a single conversion call.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ToolpathError {
    /// No usable curve yielded a polygon
    #[error("No geometry found: the drawing contains no usable curves")]
    NoGeometryFound,

    /// Polygon cannot be placed or filled
    #[error("Invalid polygon: {reason}")]
    InvalidPolygon {
        /// Why the polygon was rejected.
        reason: String,
    },

    /// A curve type the decoder cannot flatten
    #[error("Unsupported primitive: {kind}")]
    UnsupportedPrimitive {
        /// Entity type or a description of the unusable definition.
        kind: String,
    },

    /// Engine parameter out of range
    #[error("Invalid value for '{name}': {reason}")]
    InvalidParameter {
        /// The parameter name.
        name: String,
        /// The reason the value is invalid.
        reason: String,
    },
}

impl ToolpathError {
    /// Shorthand for an `InvalidPolygon` error
    pub fn invalid_polygon(reason: impl Into<String>) -> Self {
        Self::InvalidPolygon {
            reason: reason.into(),
        }
    }

    /// Shorthand for an `UnsupportedPrimitive` error
    pub fn unsupported(kind: impl Into<String>) -> Self {
        Self::UnsupportedPrimitive { kind: kind.into() }
    }

    /// Shorthand for an `InvalidParameter` error
    pub fn invalid_parameter(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

/// Drawing import error type
#[derive(Error, Debug)]
pub enum ImportError {
    /// Path missing or not a drawing file
    #[error("Invalid drawing file: {path}")]
    InvalidFile {
        /// The offending path.
        path: String,
    },

    /// The drawing could not be parsed
    #[error("DXF parse error: {0}")]
    Parse(String),

    /// Geometry problem found while decoding
    #[error(transparent)]
    Toolpath(#[from] ToolpathError),

    /// I/O error during file reading
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Connection error type
///
/// Represents errors while streaming a program to a device.
#[derive(Error, Debug, Clone)]
pub enum ConnectionError {
    /// Failed to open port
    #[error("Failed to open port {port}: {reason}")]
    FailedToOpen {
        /// The name of the port that failed to open.
        port: String,
        /// The reason the port failed to open.
        reason: String,
    },

    /// Write or flush failed mid-stream
    #[error("I/O error: {reason}")]
    IoError {
        /// The reason for the I/O error.
        reason: String,
    },

    /// Enumerating ports failed
    #[error("Failed to enumerate ports: {reason}")]
    Enumeration {
        /// The reason enumeration failed.
        reason: String,
    },
}

/// Result type for the toolpath engine
pub type ToolpathResult<T> = std::result::Result<T, ToolpathError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toolpath_error_display() {
        let err = ToolpathError::invalid_polygon("fewer than 3 distinct vertices");
        assert_eq!(
            err.to_string(),
            "Invalid polygon: fewer than 3 distinct vertices"
        );

        let err = ToolpathError::unsupported("HATCH");
        assert_eq!(err.to_string(), "Unsupported primitive: HATCH");

        let err = ToolpathError::invalid_parameter("spacing", "must be positive");
        assert_eq!(err.to_string(), "Invalid value for 'spacing': must be positive");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let import_err: ImportError = io_err.into();
        assert!(matches!(import_err, ImportError::Io(_)));
    }

    #[test]
    fn test_connection_error_display() {
        let err = ConnectionError::FailedToOpen {
            port: "/dev/ttyACM0".to_string(),
            reason: "busy".to_string(),
        };
        assert_eq!(err.to_string(), "Failed to open port /dev/ttyACM0: busy");
    }
}
