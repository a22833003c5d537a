//! Configuration schema types for `rasterfx.toml`
//!
//! Defines the structure and validation rules for effect configuration.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::color::ColorSpace;
use crate::viewport::{ViewportConfig, MAX_DOWNSCALE, MIN_DOWNSCALE};

/// Viewport scaling section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewportSection {
    /// Run the scaler at all
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(flatten)]
    pub settings: ViewportConfig,
}

impl Default for ViewportSection {
    fn default() -> Self {
        Self {
            enabled: true,
            settings: ViewportConfig::default(),
        }
    }
}

/// Palette quantization section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuantizeSection {
    /// Run the quantizer at all
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Color space frames are processed in
    #[serde(default)]
    pub color_space: ColorSpace,
    /// Palette references, in order (`@builtin`, a `[palettes]` name, or a file)
    #[serde(default)]
    pub palettes: Vec<String>,
}

impl Default for QuantizeSection {
    fn default() -> Self {
        Self {
            enabled: true,
            color_space: ColorSpace::default(),
            palettes: Vec::new(),
        }
    }
}

fn default_true() -> bool {
    true
}

/// Complete `rasterfx.toml` configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RasterConfig {
    #[serde(default)]
    pub viewport: ViewportSection,
    #[serde(default)]
    pub quantize: QuantizeSection,
    /// Named palette files, relative to the config file
    #[serde(default)]
    pub palettes: BTreeMap<String, PathBuf>,
}

/// Configuration validation error
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    /// Path to the invalid field (e.g., "viewport.constant_downscale")
    pub field: String,
    /// Error message
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "rasterfx.toml: '{}' {}", self.field, self.message)
    }
}

impl RasterConfig {
    /// Validate the configuration and return any errors
    pub fn validate(&self) -> Vec<ConfigValidationError> {
        let mut errors = Vec::new();
        let viewport = &self.viewport.settings;

        let downscale = viewport.constant_downscale;
        if !downscale.is_finite() || downscale < MIN_DOWNSCALE || downscale > MAX_DOWNSCALE {
            errors.push(ConfigValidationError {
                field: "viewport.constant_downscale".to_string(),
                message: format!("must be between {} and {}", MIN_DOWNSCALE, MAX_DOWNSCALE),
            });
        }

        if viewport.maximum_vertical_resolution == 0 {
            errors.push(ConfigValidationError {
                field: "viewport.maximum_vertical_resolution".to_string(),
                message: "must be a positive integer".to_string(),
            });
        }

        for (i, reference) in self.quantize.palettes.iter().enumerate() {
            if reference.trim().is_empty() {
                errors.push(ConfigValidationError {
                    field: format!("quantize.palettes[{}]", i),
                    message: "must be a non-empty palette reference".to_string(),
                });
            }
        }

        for name in self.palettes.keys() {
            if name.starts_with('@') {
                errors.push(ConfigValidationError {
                    field: format!("palettes.{}", name),
                    message: "names starting with '@' are reserved for built-in palettes"
                        .to_string(),
                });
            }
        }

        errors
    }

    /// Check if validation passed
    pub fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::viewport::ScaleMode;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: RasterConfig = toml::from_str("").unwrap();
        assert_eq!(config, RasterConfig::default());
        assert!(config.viewport.enabled);
        assert!(config.quantize.enabled);
        assert_eq!(config.viewport.settings, ViewportConfig::default());
        assert_eq!(config.quantize.color_space, ColorSpace::Gamma);
        assert!(config.is_valid());
    }

    #[test]
    fn test_full_config() {
        let toml_str = r#"
[viewport]
scale_mode = "exact-vertical"
constant_downscale = 3.0
maximum_vertical_resolution = 240

[quantize]
color_space = "linear"
palettes = ["@pico8", "retro"]

[palettes]
retro = "palettes/retro.toml"
"#;
        let config: RasterConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.viewport.settings.scale_mode, ScaleMode::ExactVertical);
        assert_eq!(config.viewport.settings.constant_downscale, 3.0);
        assert_eq!(config.viewport.settings.maximum_vertical_resolution, 240);
        assert_eq!(config.quantize.color_space, ColorSpace::Linear);
        assert_eq!(config.quantize.palettes, vec!["@pico8", "retro"]);
        assert_eq!(config.palettes["retro"], PathBuf::from("palettes/retro.toml"));
        assert!(config.is_valid());
    }

    #[test]
    fn test_disabled_sections() {
        let config: RasterConfig =
            toml::from_str("[viewport]\nenabled = false\n[quantize]\nenabled = false\n").unwrap();
        assert!(!config.viewport.enabled);
        assert!(!config.quantize.enabled);
        assert_eq!(config.viewport.settings.maximum_vertical_resolution, 360);
    }

    #[test]
    fn test_unknown_scale_mode_rejected() {
        let result: Result<RasterConfig, _> = toml::from_str("[viewport]\nscale_mode = \"huge\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_reports_every_problem() {
        let mut config = RasterConfig::default();
        config.viewport.settings.constant_downscale = 9.5;
        config.viewport.settings.maximum_vertical_resolution = 0;
        config.quantize.palettes = vec!["@nes".to_string(), "  ".to_string()];
        config.palettes.insert("@mine".to_string(), PathBuf::from("mine.toml"));

        let errors = config.validate();
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(
            fields,
            vec![
                "viewport.constant_downscale",
                "viewport.maximum_vertical_resolution",
                "quantize.palettes[1]",
                "palettes.@mine",
            ]
        );
    }

    #[test]
    fn test_validate_rejects_nan_downscale() {
        let mut config = RasterConfig::default();
        config.viewport.settings.constant_downscale = f32::NAN;
        assert!(!config.is_valid());
    }

    #[test]
    fn test_validation_error_display() {
        let err = ConfigValidationError {
            field: "viewport.maximum_vertical_resolution".to_string(),
            message: "must be a positive integer".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "rasterfx.toml: 'viewport.maximum_vertical_resolution' must be a positive integer"
        );
    }
}
