//! Command-line interface implementation
//!
//! This module provides the CLI entry point and dispatches to submodules
//! for specific command implementations.

mod info;
mod render;
mod resolve;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::Level;

use crate::color::ColorSpace;
use crate::config::{self, CliOverrides, LoadedConfig};
use crate::viewport::ScaleMode;

pub use info::PaletteAction;

/// Exit codes
pub(crate) const EXIT_SUCCESS: u8 = 0;
pub(crate) const EXIT_ERROR: u8 = 1;
pub(crate) const EXIT_INVALID_ARGS: u8 = 2;

/// Rasterfx - Palette quantization and pixelated viewport scaling for rendered frames
#[derive(Parser)]
#[command(name = "rasterfx")]
#[command(about = "Rasterfx - Palette quantization and pixelated viewport scaling for rendered frames")]
#[command(version)]
pub struct Cli {
    /// Increase log output (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Viewport flags shared by `render` and `resolve`
#[derive(Args, Debug, Clone, Default)]
pub struct ViewportArgs {
    /// Scaling policy (constant-downscale, scale-vertical-integer, exact-vertical)
    #[arg(long, value_enum)]
    pub scale_mode: Option<ScaleMode>,

    /// Divisor for constant-downscale (1.0-8.0)
    #[arg(long)]
    pub downscale: Option<f32>,

    /// Target height for the vertical modes
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub max_vertical: Option<u32>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run PNG frames through the quantizer and the viewport scaler
    Render {
        /// Input images, processed in order as consecutive frames
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Output file or directory.
        /// If omitted: {input}_fx.png
        /// If file (single input): output.png
        /// If file (multiple): output_{input}.png
        /// If directory (ends with /): dir/{input}.png
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Config file (default: search for rasterfx.toml upwards)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Palette reference (@builtin, configured name, or file); repeatable, replaces the config list
        #[arg(short, long = "palette")]
        palettes: Vec<String>,

        /// Color space the quantizer works in
        #[arg(long, value_enum)]
        color_space: Option<ColorSpace>,

        #[command(flatten)]
        viewport: ViewportArgs,

        /// Skip palette quantization
        #[arg(long)]
        no_quantize: bool,

        /// Skip viewport scaling
        #[arg(long)]
        no_scale: bool,
    },
    /// Print the render resolution for a screen size
    Resolve {
        /// Screen width in pixels
        width: u32,

        /// Screen height in pixels
        height: u32,

        /// Config file (default: search for rasterfx.toml upwards)
        #[arg(short, long)]
        config: Option<PathBuf>,

        #[command(flatten)]
        viewport: ViewportArgs,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List and inspect palettes
    Palettes {
        #[command(subcommand)]
        action: PaletteAction,
    },
}

/// Install the stderr log subscriber.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Load the config and apply CLI overrides, printing any error.
pub(crate) fn load_effective_config(
    path: Option<&std::path::Path>,
    overrides: &CliOverrides,
) -> Result<LoadedConfig, ExitCode> {
    let mut loaded = match config::load_config(path) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Err(ExitCode::from(EXIT_ERROR));
        }
    };

    config::merge_cli_overrides(&mut loaded.config, overrides);

    let errors = loaded.config.validate();
    if !errors.is_empty() {
        for error in &errors {
            eprintln!("Error: {}", error);
        }
        return Err(ExitCode::from(EXIT_INVALID_ARGS));
    }

    Ok(loaded)
}

impl ViewportArgs {
    fn apply(&self, overrides: &mut CliOverrides) {
        overrides.scale_mode = self.scale_mode;
        overrides.constant_downscale = self.downscale;
        overrides.maximum_vertical_resolution = self.max_vertical;
    }
}

/// Run the CLI application
pub fn run() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Render {
            inputs,
            output,
            config,
            palettes,
            color_space,
            viewport,
            no_quantize,
            no_scale,
        } => {
            let mut overrides = CliOverrides {
                palettes: (!palettes.is_empty()).then_some(palettes),
                color_space,
                no_quantize,
                no_scale,
                ..Default::default()
            };
            viewport.apply(&mut overrides);
            render::run_render(&inputs, output.as_deref(), config.as_deref(), &overrides)
        }
        Commands::Resolve {
            width,
            height,
            config,
            viewport,
            json,
        } => {
            let mut overrides = CliOverrides::default();
            viewport.apply(&mut overrides);
            resolve::run_resolve(width, height, config.as_deref(), &overrides, json)
        }
        Commands::Palettes { action } => info::run_palettes(action),
    }
}
