//! Configuration loading and discovery for `rasterfx.toml`
//!
//! Provides functions to find, load, and merge configuration.

use super::schema::RasterConfig;
use crate::color::ColorSpace;
use crate::registry::{load_palette_file, PaletteRegistry, RegistryError};
use crate::viewport::ScaleMode;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// File name searched for when discovering configuration
pub const CONFIG_FILE_NAME: &str = "rasterfx.toml";

/// Configuration loading error
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// File I/O error
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error
    #[error("Failed to parse rasterfx.toml: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error
    #[error("Config validation failed:\n{}", .0.iter().map(|e| format!("  - {}", e)).collect::<Vec<_>>().join("\n"))]
    Validation(Vec<String>),
}

/// A configuration together with the file it came from.
#[derive(Debug, Clone, Default)]
pub struct LoadedConfig {
    pub config: RasterConfig,
    /// `None` when no config file was found and defaults are in use
    pub path: Option<PathBuf>,
}

impl LoadedConfig {
    /// Directory relative paths in the config are resolved against.
    pub fn root(&self) -> PathBuf {
        self.path
            .as_deref()
            .and_then(project_root)
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

/// CLI arguments that can override config values
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    /// Replace the configured palette list
    pub palettes: Option<Vec<String>>,
    pub color_space: Option<ColorSpace>,
    pub scale_mode: Option<ScaleMode>,
    pub constant_downscale: Option<f32>,
    pub maximum_vertical_resolution: Option<u32>,
    /// Force the quantizer off
    pub no_quantize: bool,
    /// Force the scaler off
    pub no_scale: bool,
}

/// Find rasterfx.toml by walking up from the current working directory.
///
/// Search order:
/// 1. Walk up from current directory looking for rasterfx.toml
/// 2. Check XDG_CONFIG_HOME/rasterfx/rasterfx.toml (or ~/.config/rasterfx/rasterfx.toml)
pub fn find_config() -> Option<PathBuf> {
    if let Ok(cwd) = env::current_dir() {
        if let Some(path) = find_config_from(cwd) {
            return Some(path);
        }
    }

    find_xdg_config()
}

/// Find rasterfx.toml in the XDG config directory.
pub fn find_xdg_config() -> Option<PathBuf> {
    let xdg_config = env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|_| env::var("HOME").map(|h| PathBuf::from(h).join(".config")))
        .ok()?;

    let config_path = xdg_config.join("rasterfx").join(CONFIG_FILE_NAME);
    if config_path.exists() {
        Some(config_path)
    } else {
        None
    }
}

/// Find rasterfx.toml by walking up from a specific directory.
pub fn find_config_from(start: PathBuf) -> Option<PathBuf> {
    let mut current = start;

    loop {
        let config_path = current.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            return None;
        }
    }
}

/// Load configuration from a rasterfx.toml file.
///
/// If a path is provided, loads from that file. Otherwise, uses `find_config()`
/// to locate the config file. If no config file is found, returns the
/// default configuration.
///
/// # Example
/// ```ignore
/// let loaded = load_config(None)?;
/// let loaded = load_config(Some(Path::new("game/rasterfx.toml")))?;
/// ```
pub fn load_config(path: Option<&Path>) -> Result<LoadedConfig, ConfigError> {
    let config_path = match path {
        Some(p) => Some(p.to_path_buf()),
        None => find_config(),
    };

    match config_path {
        Some(p) => {
            let config = load_config_file(&p)?;
            debug!(path = %p.display(), "loaded config");
            Ok(LoadedConfig {
                config,
                path: Some(p),
            })
        }
        None => Ok(LoadedConfig::default()),
    }
}

/// Load configuration from a specific file path.
fn load_config_file(path: &Path) -> Result<RasterConfig, ConfigError> {
    let contents = fs::read_to_string(path)?;
    let config: RasterConfig = toml::from_str(&contents)?;

    let errors = config.validate();
    if !errors.is_empty() {
        return Err(ConfigError::Validation(errors.into_iter().map(|e| e.to_string()).collect()));
    }

    Ok(config)
}

/// Merge CLI overrides into a configuration.
///
/// CLI arguments take precedence over config file values.
pub fn merge_cli_overrides(config: &mut RasterConfig, overrides: &CliOverrides) {
    if let Some(ref palettes) = overrides.palettes {
        config.quantize.palettes = palettes.clone();
    }
    if let Some(color_space) = overrides.color_space {
        config.quantize.color_space = color_space;
    }
    if let Some(scale_mode) = overrides.scale_mode {
        config.viewport.settings.scale_mode = scale_mode;
    }
    if let Some(downscale) = overrides.constant_downscale {
        config.viewport.settings.constant_downscale = downscale;
    }
    if let Some(max) = overrides.maximum_vertical_resolution {
        config.viewport.settings.maximum_vertical_resolution = max;
    }
    if overrides.no_quantize {
        config.quantize.enabled = false;
    }
    if overrides.no_scale {
        config.viewport.enabled = false;
    }
}

/// Get the project root directory from a config file path.
pub fn project_root(config_path: &Path) -> Option<&Path> {
    config_path.parent()
}

/// Resolve a path relative to the project root.
///
/// If the path is absolute, returns it unchanged.
pub fn resolve_path(project_root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        project_root.join(path)
    }
}

/// Load every file in the `[palettes]` table into `registry` under its name.
pub fn register_config_palettes(
    loaded: &LoadedConfig,
    registry: &mut PaletteRegistry,
) -> Result<(), RegistryError> {
    let root = loaded.root();
    for (name, file) in &loaded.config.palettes {
        let palette = load_palette_file(&resolve_path(&root, file))?;
        registry.register_as(name.clone(), palette);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_file(path: &Path, contents: &str) {
        File::create(path)
            .expect("should create file")
            .write_all(contents.as_bytes())
            .expect("should write file content");
    }

    #[test]
    fn test_find_config_in_current_dir() {
        let temp = TempDir::new().expect("should create temp dir");
        let config_path = temp.path().join(CONFIG_FILE_NAME);
        write_file(&config_path, "[viewport]\n");

        let found = find_config_from(temp.path().to_path_buf());
        assert_eq!(found, Some(config_path));
    }

    #[test]
    fn test_find_config_in_parent_dir() {
        let temp = TempDir::new().expect("should create temp dir");
        let config_path = temp.path().join(CONFIG_FILE_NAME);
        write_file(&config_path, "[viewport]\n");

        let subdir = temp.path().join("frames").join("intro");
        fs::create_dir_all(&subdir).expect("should create subdirectories");

        let found = find_config_from(subdir);
        assert_eq!(found, Some(config_path));
    }

    #[test]
    fn test_find_config_not_found() {
        let temp = TempDir::new().expect("should create temp dir");
        let found = find_config_from(temp.path().to_path_buf());
        assert_eq!(found, None);
    }

    #[test]
    fn test_load_config_from_file() {
        let temp = TempDir::new().expect("should create temp dir");
        let config_path = temp.path().join(CONFIG_FILE_NAME);
        write_file(
            &config_path,
            "[viewport]\nscale_mode = \"scale-vertical-integer\"\nmaximum_vertical_resolution = 180\n",
        );

        let loaded = load_config(Some(&config_path)).expect("should load config");
        assert_eq!(loaded.config.viewport.settings.scale_mode, ScaleMode::ScaleVerticalInteger);
        assert_eq!(loaded.config.viewport.settings.maximum_vertical_resolution, 180);
        assert_eq!(loaded.root(), temp.path());
    }

    #[test]
    fn test_load_config_validation_error() {
        let temp = TempDir::new().expect("should create temp dir");
        let config_path = temp.path().join(CONFIG_FILE_NAME);
        write_file(&config_path, "[viewport]\nconstant_downscale = 0.5\n");

        match load_config(Some(&config_path)) {
            Err(ConfigError::Validation(errors)) => {
                assert_eq!(errors.len(), 1);
                assert!(errors[0].contains("viewport.constant_downscale"));
            }
            other => panic!("Expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_load_config_parse_error() {
        let temp = TempDir::new().expect("should create temp dir");
        let config_path = temp.path().join(CONFIG_FILE_NAME);
        write_file(&config_path, "[viewport\n");
        assert!(matches!(load_config(Some(&config_path)), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_config_missing_file() {
        let result = load_config(Some(Path::new("/nonexistent/rasterfx.toml")));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_default_loaded_config_root() {
        let loaded = LoadedConfig::default();
        assert_eq!(loaded.root(), PathBuf::from("."));
    }

    #[test]
    fn test_merge_cli_overrides() {
        let mut config = RasterConfig::default();
        let overrides = CliOverrides {
            palettes: Some(vec!["@gameboy".to_string()]),
            color_space: Some(ColorSpace::Linear),
            scale_mode: Some(ScaleMode::ExactVertical),
            constant_downscale: Some(4.0),
            maximum_vertical_resolution: Some(144),
            no_quantize: false,
            no_scale: true,
        };

        merge_cli_overrides(&mut config, &overrides);

        assert_eq!(config.quantize.palettes, vec!["@gameboy"]);
        assert_eq!(config.quantize.color_space, ColorSpace::Linear);
        assert_eq!(config.viewport.settings.scale_mode, ScaleMode::ExactVertical);
        assert_eq!(config.viewport.settings.constant_downscale, 4.0);
        assert_eq!(config.viewport.settings.maximum_vertical_resolution, 144);
        assert!(config.quantize.enabled);
        assert!(!config.viewport.enabled);
    }

    #[test]
    fn test_merge_empty_overrides_keeps_config() {
        let mut config = RasterConfig::default();
        config.quantize.palettes = vec!["@nes".to_string()];
        let before = config.clone();
        merge_cli_overrides(&mut config, &CliOverrides::default());
        assert_eq!(config, before);
    }

    #[test]
    fn test_resolve_path() {
        let root = Path::new("/project");
        assert_eq!(resolve_path(root, Path::new("pal.toml")), PathBuf::from("/project/pal.toml"));
        assert_eq!(resolve_path(root, Path::new("/abs/pal.toml")), PathBuf::from("/abs/pal.toml"));
    }

    #[test]
    fn test_register_config_palettes() {
        let temp = TempDir::new().expect("should create temp dir");
        let config_path = temp.path().join(CONFIG_FILE_NAME);
        write_file(&config_path, "[palettes]\nsunset = \"pals/sunset.toml\"\n");
        fs::create_dir_all(temp.path().join("pals")).unwrap();
        write_file(
            &temp.path().join("pals").join("sunset.toml"),
            "colors = [\"#2B0F54\", \"#AB1F65\", \"#FF4F69\"]\n",
        );

        let loaded = load_config(Some(&config_path)).unwrap();
        let mut registry = PaletteRegistry::new();
        register_config_palettes(&loaded, &mut registry).unwrap();

        let id = registry.lookup("sunset").expect("sunset should be registered");
        assert_eq!(registry.get(id).unwrap().len(), 3);
        assert_eq!(registry.resolve("sunset", &loaded.root()).unwrap(), id);
    }
}
