//! Render command implementation

use image::RgbaImage;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{info, warn};

use crate::config::{register_config_palettes, CliOverrides};
use crate::output::{generate_output_path, load_rgba, save_png};
use crate::quantize::{PaletteQuantizer, QuantizeOutcome};
use crate::registry::PaletteRegistry;
use crate::sink::CpuFilter;
use crate::viewport::ViewportScaler;

use super::{load_effective_config, EXIT_ERROR, EXIT_INVALID_ARGS, EXIT_SUCCESS};

/// Execute the render command
pub fn run_render(
    inputs: &[PathBuf],
    output: Option<&Path>,
    config_path: Option<&Path>,
    overrides: &CliOverrides,
) -> ExitCode {
    let loaded = match load_effective_config(config_path, overrides) {
        Ok(loaded) => loaded,
        Err(code) => return code,
    };
    let config = &loaded.config;

    let mut registry = PaletteRegistry::new();
    if let Err(e) = register_config_palettes(&loaded, &mut registry) {
        eprintln!("Error: {}", e);
        return ExitCode::from(EXIT_ERROR);
    }

    // Palettes given on the command line are relative to the working directory
    let palette_base = if overrides.palettes.is_some() {
        PathBuf::from(".")
    } else {
        loaded.root()
    };
    let palette_list = match registry.resolve_all(&config.quantize.palettes, &palette_base) {
        Ok(list) => list,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_INVALID_ARGS);
        }
    };

    if config.quantize.enabled && palette_list.is_empty() {
        warn!("no palettes configured, frames will not be quantized");
    }

    let color_space = config.quantize.color_space;
    let mut sink = CpuFilter::new(color_space);
    let mut quantizer = PaletteQuantizer::new();
    let scaler = ViewportScaler::new(config.viewport.settings);
    let is_single_input = inputs.len() == 1;

    for input in inputs {
        let mut frame = match load_rgba(input) {
            Ok(image) => image,
            Err(e) => {
                eprintln!("Error: Cannot open input file '{}': {}", input.display(), e);
                return ExitCode::from(EXIT_INVALID_ARGS);
            }
        };
        let (width, height) = frame.dimensions();

        if config.quantize.enabled {
            let mut quantized = RgbaImage::new(width, height);
            match quantizer.render(
                &palette_list,
                &registry,
                color_space,
                &mut sink,
                &frame,
                &mut quantized,
            ) {
                Ok(QuantizeOutcome::Quantized { colors }) => {
                    info!(input = %input.display(), colors, "quantized frame");
                }
                Ok(outcome) => {
                    info!(input = %input.display(), ?outcome, "frame passed through");
                }
                Err(e) => {
                    eprintln!("Error: '{}': {}", input.display(), e);
                    return ExitCode::from(EXIT_ERROR);
                }
            }
            frame = quantized;
        }

        if config.viewport.enabled {
            let mut scaled = RgbaImage::new(width, height);
            match scaler.render(&mut sink, &frame, &mut scaled, (width, height)) {
                Ok(resolution) => {
                    info!(
                        input = %input.display(),
                        horizontal = resolution.horizontal,
                        vertical = resolution.vertical,
                        "scaled frame"
                    );
                }
                Err(e) => {
                    eprintln!("Error: '{}': {}", input.display(), e);
                    return ExitCode::from(EXIT_ERROR);
                }
            }
            frame = scaled;
        }

        let output_path = generate_output_path(input, output, is_single_input);
        if let Err(e) = save_png(&frame, &output_path) {
            eprintln!("Error: Failed to save '{}': {}", output_path.display(), e);
            return ExitCode::from(EXIT_ERROR);
        }

        println!("Saved: {}", output_path.display());
    }

    ExitCode::from(EXIT_SUCCESS)
}
