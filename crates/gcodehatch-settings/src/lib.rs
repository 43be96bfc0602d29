//! # GCodeHatch Settings
//!
//! Loads and saves the application configuration. Files are JSON or TOML,
//! picked by extension, and every section falls back to its defaults when
//! missing. The `*_params`/`*_options` adapters hand each engine crate its
//! own parameter struct.

pub mod config;
pub mod error;

pub use config::{
    BedSettings, Config, ImportSettings, PreviewSettings, SerialSettings, SlicingSettings,
    CONFIG_FILE_NAME,
};
pub use error::{SettingsError, SettingsResult};
