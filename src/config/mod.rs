//! Configuration module for rasterfx
//!
//! Provides types and parsing for `rasterfx.toml` effect configuration.

pub mod loader;
pub mod schema;

pub use loader::{
    find_config, find_config_from, load_config, merge_cli_overrides, register_config_palettes,
    CliOverrides, ConfigError, LoadedConfig, CONFIG_FILE_NAME,
};
pub use schema::*;
