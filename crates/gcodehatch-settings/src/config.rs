//! Configuration management for GCodeHatch
//!
//! Configuration is organized into logical sections:
//! - Bed (working area size)
//! - Slicing (hatch spacing, extrusion, tolerances, drawing units)
//! - Import (curve flattening tolerances)
//! - Preview (image export)
//! - Serial (port and streaming delays)

use crate::error::{SettingsError, SettingsResult};
use gcodehatch_camtools::{
    EmitterParams, ToolpathParams, DEFAULT_BED_HEIGHT, DEFAULT_BED_WIDTH,
    DEFAULT_EXTRUSION_DIVISOR, DEFAULT_HATCH_SPACING, DEFAULT_PARALLEL_EPSILON,
};
use gcodehatch_communication::{
    SendOptions, DEFAULT_BAUD_RATE, DEFAULT_DELAY_DIVISOR, DEFAULT_MIN_DELAY,
    DEFAULT_SETTLE_TIME,
};
use gcodehatch_core::{Units, DEFAULT_POINT_TOLERANCE};
use gcodehatch_designer::{ImportOptions, DEFAULT_ARC_SAGITTA, DEFAULT_CURVE_DISTANCE};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

/// File name used inside the platform config directory
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Working area
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BedSettings {
    /// Width in millimeters
    pub width: f64,
    /// Height in millimeters
    pub height: f64,
}

impl Default for BedSettings {
    fn default() -> Self {
        Self {
            width: DEFAULT_BED_WIDTH,
            height: DEFAULT_BED_HEIGHT,
        }
    }
}

/// Toolpath generation settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlicingSettings {
    pub hatch_spacing: f64,
    pub extrusion_divisor: f64,
    pub point_tolerance: f64,
    pub parallel_epsilon: f64,
    /// Units the drawings are authored in
    pub units: Units,
}

impl Default for SlicingSettings {
    fn default() -> Self {
        Self {
            hatch_spacing: DEFAULT_HATCH_SPACING,
            extrusion_divisor: DEFAULT_EXTRUSION_DIVISOR,
            point_tolerance: DEFAULT_POINT_TOLERANCE,
            parallel_epsilon: DEFAULT_PARALLEL_EPSILON,
            units: Units::Mm,
        }
    }
}

/// Drawing import settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportSettings {
    pub arc_sagitta: f64,
    pub curve_distance: f64,
    pub strict: bool,
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self {
            arc_sagitta: DEFAULT_ARC_SAGITTA,
            curve_distance: DEFAULT_CURVE_DISTANCE,
            strict: false,
        }
    }
}

/// Preview image settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewSettings {
    /// Write a PNG next to the program after slicing
    pub enabled: bool,
    pub width_px: u32,
    pub height_px: u32,
}

impl Default for PreviewSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            width_px: 600,
            height_px: 600,
        }
    }
}

/// Serial streaming settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SerialSettings {
    /// Port used when none is given on the command line
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<String>,
    pub baud_rate: u32,
    /// Millimeters of travel per second of pause
    pub delay_divisor: f64,
    pub min_delay_secs: f64,
    /// Pause after opening the port, in milliseconds
    pub settle_ms: u64,
}

impl Default for SerialSettings {
    fn default() -> Self {
        Self {
            port: None,
            baud_rate: DEFAULT_BAUD_RATE,
            delay_divisor: DEFAULT_DELAY_DIVISOR,
            min_delay_secs: DEFAULT_MIN_DELAY.as_secs_f64(),
            settle_ms: DEFAULT_SETTLE_TIME.as_millis() as u64,
        }
    }
}

/// Complete application configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub bed: BedSettings,
    pub slicing: SlicingSettings,
    pub import: ImportSettings,
    pub preview: PreviewSettings,
    pub serial: SerialSettings,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Json,
    Toml,
}

impl Format {
    fn from_path(path: &Path) -> SettingsResult<Self> {
        let ext = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase());
        match ext.as_deref() {
            Some("json") => Ok(Self::Json),
            Some("toml") => Ok(Self::Toml),
            _ => Err(SettingsError::UnsupportedFormat(
                path.display().to_string(),
            )),
        }
    }
}

impl Config {
    /// Load config from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let format = Format::from_path(path)?;
        let content = std::fs::read_to_string(path).map_err(|e| SettingsError::LoadError {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        let config: Self = match format {
            Format::Json => serde_json::from_str(&content)?,
            Format::Toml => toml::from_str(&content)?,
        };

        config.validate()?;
        debug!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Save config to file (JSON or TOML)
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;

        let content = match Format::from_path(path)? {
            Format::Json => serde_json::to_string_pretty(self)?,
            Format::Toml => toml::to_string_pretty(self)?,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content).map_err(|e| SettingsError::SaveError {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        info!(path = %path.display(), "Saved configuration");
        Ok(())
    }

    /// `<platform config dir>/gcodehatch/config.toml`
    pub fn default_path() -> SettingsResult<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join("gcodehatch").join(CONFIG_FILE_NAME))
            .ok_or_else(|| {
                SettingsError::ConfigDirectory("no configuration directory on this platform".into())
            })
    }

    /// Load the file at [`Config::default_path`], or the defaults when it
    /// does not exist yet.
    pub fn load_or_default() -> SettingsResult<Self> {
        let path = Self::default_path()?;
        if path.is_file() {
            Self::load_from_file(&path)
        } else {
            debug!(path = %path.display(), "No configuration file, using defaults");
            Ok(Self::default())
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> SettingsResult<()> {
        let positive = [
            ("bed.width", self.bed.width),
            ("bed.height", self.bed.height),
            ("slicing.hatch_spacing", self.slicing.hatch_spacing),
            ("slicing.extrusion_divisor", self.slicing.extrusion_divisor),
            ("slicing.point_tolerance", self.slicing.point_tolerance),
            ("slicing.parallel_epsilon", self.slicing.parallel_epsilon),
            ("import.arc_sagitta", self.import.arc_sagitta),
            ("import.curve_distance", self.import.curve_distance),
            ("serial.delay_divisor", self.serial.delay_divisor),
        ];
        for (key, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(SettingsError::invalid(
                    key,
                    format!("must be a positive number, got {value}"),
                ));
            }
        }

        if !(self.serial.min_delay_secs.is_finite() && self.serial.min_delay_secs >= 0.0) {
            return Err(SettingsError::invalid(
                "serial.min_delay_secs",
                "must be zero or more",
            ));
        }

        if self.serial.baud_rate == 0 {
            return Err(SettingsError::invalid("serial.baud_rate", "must be > 0"));
        }

        if self.preview.width_px == 0 || self.preview.height_px == 0 {
            return Err(SettingsError::invalid(
                "preview",
                "image dimensions must be > 0",
            ));
        }

        Ok(())
    }

    /// Engine parameters, with the unit scale applied ahead of placement
    pub fn toolpath_params(&self) -> ToolpathParams {
        ToolpathParams {
            spacing: self.slicing.hatch_spacing,
            bed_width: self.bed.width,
            bed_height: self.bed.height,
            scale_factor: self.slicing.units.scale_to_mm(),
            point_tolerance: self.slicing.point_tolerance,
            parallel_epsilon: self.slicing.parallel_epsilon,
        }
    }

    pub fn emitter_params(&self) -> EmitterParams {
        EmitterParams {
            extrusion_divisor: self.slicing.extrusion_divisor,
        }
    }

    pub fn import_options(&self) -> ImportOptions {
        ImportOptions {
            arc_sagitta: self.import.arc_sagitta,
            curve_distance: self.import.curve_distance,
            strict: self.import.strict,
        }
    }

    pub fn send_options(&self) -> SendOptions {
        SendOptions {
            delay_divisor: self.serial.delay_divisor,
            min_delay: Duration::try_from_secs_f64(self.serial.min_delay_secs)
                .unwrap_or(DEFAULT_MIN_DELAY),
            settle: Duration::from_millis(self.serial.settle_ms),
        }
    }
}
