use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use gcodehatch::{
    init_logging, list_ports, open_serial_port, preview_renderer, slice_file, Config,
    GcodeSender, PreviewSession, Units, BUILD_DATE, VERSION,
};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

const LONG_VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), " (built ", env!("BUILD_DATE"), ")");

#[derive(Parser)]
#[command(name = "gcodehatch")]
#[command(author, version, long_version = LONG_VERSION, about, long_about = None)]
struct Cli {
    /// Configuration file (JSON or TOML); defaults to the user config file
    #[arg(short, long, global = true, value_name = "CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Turn a DXF outline into a perimeter and cross-hatch program
    Slice {
        /// Input DXF file
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Output program (defaults to the input name with a .gcode extension)
        #[arg(short, long, value_name = "OUTPUT")]
        output: Option<PathBuf>,

        /// Distance between hatch lines in mm
        #[arg(long)]
        spacing: Option<f64>,

        /// Working area width in mm
        #[arg(long)]
        bed_width: Option<f64>,

        /// Working area height in mm
        #[arg(long)]
        bed_height: Option<f64>,

        /// Units the drawing is authored in (mm or inch)
        #[arg(long)]
        units: Option<Units>,

        /// Preview image path (defaults to the output name with a .png extension)
        #[arg(long, value_name = "PNG", conflicts_with = "no_preview")]
        preview: Option<PathBuf>,

        /// Skip writing a preview image
        #[arg(long)]
        no_preview: bool,
    },

    /// Render the toolpath of a DXF file up to one command
    Preview {
        /// Input DXF file
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Index of the last command shown (clamped to the program)
        #[arg(short, long, default_value_t = usize::MAX)]
        frame: usize,

        /// Output PNG file
        #[arg(short, long, value_name = "PNG")]
        output: PathBuf,
    },

    /// Stream a program to the controller
    Send {
        /// Program file
        #[arg(value_name = "GCODE")]
        gcode: PathBuf,

        /// Serial port (defaults to the configured port)
        #[arg(short, long)]
        port: Option<String>,

        /// Baud rate (defaults to the configured rate)
        #[arg(short, long)]
        baud: Option<u32>,
    },

    /// List serial ports that look like a controller
    Ports,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging()?;
    info!(version = VERSION, build_date = BUILD_DATE, "Starting GCodeHatch");

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Slice {
            input,
            output,
            spacing,
            bed_width,
            bed_height,
            units,
            preview,
            no_preview,
        } => {
            let mut config = config;
            if let Some(spacing) = spacing {
                config.slicing.hatch_spacing = spacing;
            }
            if let Some(width) = bed_width {
                config.bed.width = width;
            }
            if let Some(height) = bed_height {
                config.bed.height = height;
            }
            if let Some(units) = units {
                config.slicing.units = units;
            }
            if no_preview {
                config.preview.enabled = false;
            }
            run_slice(&input, output, preview, &config)
        }
        Commands::Preview {
            input,
            frame,
            output,
        } => run_preview(&input, frame, &output, &config),
        Commands::Send { gcode, port, baud } => run_send(&gcode, port, baud, &config),
        Commands::Ports => run_ports(),
    }
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::load_from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display())),
        None => Config::load_or_default().context("Failed to load user config"),
    }
}

fn run_slice(
    input: &Path,
    output: Option<PathBuf>,
    preview: Option<PathBuf>,
    config: &Config,
) -> Result<()> {
    let sliced = slice_file(input, config)?;
    if !sliced.toolpath.fully_closed {
        warn!("Outline did not close; the program follows the partial chain");
    }

    let output = output.unwrap_or(sliced.filename);
    std::fs::write(&output, &sliced.program)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    println!("Wrote {}", output.display());

    if config.preview.enabled {
        let png = preview.unwrap_or_else(|| output.with_extension("png"));
        preview_renderer(config)?
            .save_png(&sliced.toolpath.commands(), &png)
            .with_context(|| format!("Failed to write preview {}", png.display()))?;
        println!("Wrote {}", png.display());
    }

    Ok(())
}

fn run_preview(input: &Path, frame: usize, output: &Path, config: &Config) -> Result<()> {
    let sliced = slice_file(input, config)?;
    let mut session = PreviewSession::with_emitter_params(
        preview_renderer(config)?,
        sliced.toolpath.commands(),
        &config.emitter_params(),
    );
    session.seek(frame);
    session
        .save_png(output)
        .with_context(|| format!("Failed to write preview {}", output.display()))?;

    println!("{}", session.status_line());
    println!("Wrote {}", output.display());
    Ok(())
}

fn run_send(gcode: &Path, port: Option<String>, baud: Option<u32>, config: &Config) -> Result<()> {
    let program = std::fs::read_to_string(gcode)
        .with_context(|| format!("Failed to read {}", gcode.display()))?;

    let Some(port) = port.or_else(|| config.serial.port.clone()) else {
        bail!("No serial port given; pass --port or set serial.port in the config");
    };
    let baud = baud.unwrap_or(config.serial.baud_rate);

    let handle = open_serial_port(&port, baud)?;
    let mut sender = GcodeSender::new(handle, config.send_options());
    let report = sender.send_program(&program)?;

    println!(
        "Sent {} lines, {:.1} mm of travel in {:.1} s",
        report.lines_sent,
        report.total_distance,
        report.total_delay.as_secs_f64()
    );
    Ok(())
}

fn run_ports() -> Result<()> {
    let ports = list_ports()?;
    if ports.is_empty() {
        println!("No controller ports found");
    }
    for port in ports {
        println!("{}\t{}", port.port_name, port.description);
    }
    Ok(())
}
