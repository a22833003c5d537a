//! Palette listing and inspection commands

use clap::Subcommand;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::color::ColorSpace;
use crate::config::{load_config, register_config_palettes};
use crate::palettes;
use crate::quantize::PaletteAggregator;
use crate::registry::{PaletteRegistry, RegistryError};

use super::{EXIT_ERROR, EXIT_INVALID_ARGS, EXIT_SUCCESS};

#[derive(Subcommand)]
pub enum PaletteAction {
    /// List all available built-in palettes
    List,
    /// Show the merged color list the quantizer would use
    Show {
        /// Palette references (@builtin, configured name, or file)
        #[arg(required = true)]
        references: Vec<String>,

        /// Config file providing named palettes
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Color space to convert the colors into
        #[arg(long, value_enum, default_value_t = ColorSpace::Gamma)]
        color_space: ColorSpace,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Execute the palettes command
pub fn run_palettes(action: PaletteAction) -> ExitCode {
    match action {
        PaletteAction::List => {
            println!("Built-in palettes:");
            for name in palettes::list_builtins() {
                let count = palettes::get_builtin(name).map(|p| p.len()).unwrap_or(0);
                println!("  @{:<12} {} colors", name, count);
            }
            ExitCode::from(EXIT_SUCCESS)
        }
        PaletteAction::Show {
            references,
            config,
            color_space,
            json,
        } => run_show(&references, config.as_deref(), color_space, json),
    }
}

fn run_show(
    references: &[String],
    config_path: Option<&Path>,
    color_space: ColorSpace,
    json: bool,
) -> ExitCode {
    let loaded = match load_config(config_path) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let mut registry = PaletteRegistry::new();
    if let Err(e) = register_config_palettes(&loaded, &mut registry) {
        eprintln!("Error: {}", e);
        return ExitCode::from(EXIT_ERROR);
    }

    let list = match registry.resolve_all(references, Path::new(".")) {
        Ok(list) => list,
        Err(e) => {
            eprintln!("Error: {}", e);
            if matches!(e, RegistryError::BuiltinNotFound(_)) {
                eprintln!();
                eprintln!("Available palettes:");
                for name in palettes::list_builtins() {
                    eprintln!("  @{}", name);
                }
            }
            return ExitCode::from(EXIT_INVALID_ARGS);
        }
    };

    let mut aggregator = PaletteAggregator::new();
    let colors: Vec<String> = aggregator
        .update(&list, &registry, color_space)
        .iter()
        .map(|c| c.to_hex())
        .collect();

    if json {
        let value = serde_json::json!({
            "palettes": references,
            "color_space": color_space,
            "colors": colors,
        });
        match serde_json::to_string_pretty(&value) {
            Ok(text) => println!("{}", text),
            Err(e) => {
                eprintln!("Error: {}", e);
                return ExitCode::from(EXIT_ERROR);
            }
        }
    } else {
        println!("Palettes: {}", references.join(", "));
        println!("Colors ({}, {:?}):", colors.len(), color_space);
        println!();
        for (index, hex) in colors.iter().enumerate() {
            println!("  {:>3}  {}", index, hex);
        }
    }

    ExitCode::from(EXIT_SUCCESS)
}
