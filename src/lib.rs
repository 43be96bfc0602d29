//! # GCodeHatch
//!
//! Turns a closed DXF outline into a G-code program for a plotter or
//! extrusion printer: one pass around the perimeter followed by a diagonal
//! cross-hatch infill.
//!
//! ## Architecture
//!
//! GCodeHatch is organized as a workspace with multiple crates:
//!
//! 1. **gcodehatch-core** - Geometry types, units, error enums
//! 2. **gcodehatch-designer** - DXF import and curve flattening
//! 3. **gcodehatch-camtools** - Stitching, placement, perimeter, hatch, G-code emission
//! 4. **gcodehatch-visualizer** - PNG previews and frame stepping
//! 5. **gcodehatch-communication** - Serial streaming with distance-based pacing
//! 6. **gcodehatch-settings** - JSON/TOML configuration
//! 7. **gcodehatch** - This crate: slicing glue and the command-line front end

use anyhow::Context;
use std::path::{Path, PathBuf};
use tracing::info;

pub use gcodehatch_camtools::{
    emit_gcode, generate_toolpath, render_program, EmitterParams, Toolpath, ToolpathInput,
    ToolpathParams,
};
pub use gcodehatch_communication::{
    list_ports, open_serial_port, GcodeSender, SendOptions, SendReport, SerialPortInfo,
};
pub use gcodehatch_core::{
    Command, ConnectionError, GcodeLine, ImportError, MoveMode, Point, Polygon, Primitive,
    PrimitiveKind, ToolpathError, Units,
};
pub use gcodehatch_designer::{DxfImporter, ImportOptions};
pub use gcodehatch_settings::{Config, SettingsError};
pub use gcodehatch_visualizer::{PreviewRenderer, PreviewSession};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Extension given to generated programs
pub const OUTPUT_EXTENSION: &str = "gcode";

/// Result of slicing one drawing
#[derive(Debug, Clone)]
pub struct SliceOutput {
    /// Newline-joined program text
    pub program: String,
    /// Where the program goes unless the caller overrides it
    pub filename: PathBuf,
    pub toolpath: Toolpath,
}

/// Initialize logging with the default configuration
///
/// Sets up structured logging with:
/// - Console output on stderr with pretty formatting
/// - RUST_LOG environment variable support
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .pretty();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .context("Failed to initialize logging")?;

    Ok(())
}

/// The input path with its extension replaced, e.g. `part.dxf` -> `part.gcode`
pub fn output_filename(path: impl AsRef<Path>) -> PathBuf {
    path.as_ref().with_extension(OUTPUT_EXTENSION)
}

/// Decode a DXF file and turn it into a program
pub fn slice_file(path: impl AsRef<Path>, config: &Config) -> anyhow::Result<SliceOutput> {
    let path = path.as_ref();
    config.validate().context("Invalid configuration")?;

    let primitives = DxfImporter::new(config.import_options())
        .import_file(path)
        .with_context(|| format!("Failed to import {}", path.display()))?;

    let toolpath = generate_toolpath(
        ToolpathInput::Primitives(primitives),
        &config.toolpath_params(),
    )
    .with_context(|| format!("Failed to generate a toolpath for {}", path.display()))?;

    let lines = emit_gcode(&toolpath.commands(), &config.emitter_params());
    let program = render_program(&lines);

    info!(
        input = %path.display(),
        lines = lines.len(),
        closed = toolpath.fully_closed,
        "Sliced drawing"
    );

    Ok(SliceOutput {
        program,
        filename: output_filename(path),
        toolpath,
    })
}

/// Renderer for the configured working area and image size
pub fn preview_renderer(config: &Config) -> anyhow::Result<PreviewRenderer> {
    PreviewRenderer::new(
        config.bed.width,
        config.bed.height,
        config.preview.width_px,
        config.preview.height_px,
    )
    .context("Invalid preview settings")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_filename_replaces_extension() {
        assert_eq!(output_filename("part.dxf"), PathBuf::from("part.gcode"));
        assert_eq!(
            output_filename("/tmp/jobs/Bracket.DXF"),
            PathBuf::from("/tmp/jobs/Bracket.gcode")
        );
        assert_eq!(output_filename("outline"), PathBuf::from("outline.gcode"));
    }

    #[test]
    fn test_preview_renderer_follows_config() {
        let mut config = Config::default();
        config.preview.width_px = 400;
        config.preview.height_px = 300;
        let renderer = preview_renderer(&config).unwrap();
        assert_eq!(renderer.width_px(), 400);
        assert_eq!(renderer.height_px(), 300);
    }

    #[test]
    fn test_slice_missing_file_fails() {
        let err = slice_file("/nonexistent/part.dxf", &Config::default()).unwrap_err();
        assert!(err.to_string().contains("Failed to import"));
    }
}
