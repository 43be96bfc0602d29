//! Drawing unit handling
//!
//! The working area is always measured in millimeters. Drawings authored in
//! inches are scaled up before placement.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Millimeters per inch
pub const MM_PER_INCH: f64 = 25.4;

/// Units a drawing is authored in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    /// Millimeters (no scaling)
    #[default]
    #[serde(alias = "millimeter", alias = "metric")]
    Mm,
    /// Inches (scaled by 25.4)
    #[serde(alias = "in", alias = "imperial")]
    Inch,
}

impl Units {
    /// Factor that converts a coordinate in these units to millimeters
    pub fn scale_to_mm(&self) -> f64 {
        match self {
            Self::Mm => 1.0,
            Self::Inch => MM_PER_INCH,
        }
    }

    /// Short unit label
    pub fn label(&self) -> &'static str {
        match self {
            Self::Mm => "mm",
            Self::Inch => "in",
        }
    }
}

impl fmt::Display for Units {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for Units {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mm" | "millimeter" | "millimeters" | "metric" => Ok(Self::Mm),
            "in" | "inch" | "inches" | "imperial" => Ok(Self::Inch),
            _ => Err(format!("Unknown units: {}", s)),
        }
    }
}
