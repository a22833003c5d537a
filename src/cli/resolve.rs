//! Resolve command implementation

use std::path::Path;
use std::process::ExitCode;

use crate::config::CliOverrides;
use crate::viewport::resolve;

use super::{load_effective_config, EXIT_ERROR, EXIT_SUCCESS};

/// Execute the resolve command
pub fn run_resolve(
    width: u32,
    height: u32,
    config_path: Option<&Path>,
    overrides: &CliOverrides,
    json: bool,
) -> ExitCode {
    let loaded = match load_effective_config(config_path, overrides) {
        Ok(loaded) => loaded,
        Err(code) => return code,
    };
    let settings = loaded.config.viewport.settings;
    let resolution = resolve(width, height, &settings);

    if json {
        let value = serde_json::json!({
            "scale_mode": settings.scale_mode,
            "screen": { "width": width, "height": height },
            "resolution": resolution,
        });
        match serde_json::to_string_pretty(&value) {
            Ok(text) => println!("{}", text),
            Err(e) => {
                eprintln!("Error: {}", e);
                return ExitCode::from(EXIT_ERROR);
            }
        }
    } else {
        println!("{}x{}", resolution.horizontal, resolution.vertical);
    }

    ExitCode::from(EXIT_SUCCESS)
}
