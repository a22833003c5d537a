//! Data models for palettes and palette files

use serde::{Deserialize, Serialize};

use crate::color::{parse_color, Color, ColorError};

/// A named, ordered set of colors.
///
/// Colors are stored gamma-encoded, exactly as authored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Palette {
    pub name: String,
    pub colors: Vec<Color>,
}

impl Palette {
    pub fn new(name: impl Into<String>, colors: Vec<Color>) -> Self {
        Self {
            name: name.into(),
            colors,
        }
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}

/// A palette as written in a `.toml` or `.json` palette file.
///
/// ```toml
/// name = "sunset"
/// colors = ["#2B0F54", "rgb(171, 31, 101)", "orange"]
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaletteDef {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub name: Option<String>,
    #[serde(default)]
    pub colors: Vec<String>,
}

/// A color string in a palette file that failed to parse.
#[derive(Debug, Clone, PartialEq)]
pub struct BadColor {
    /// Position of the color in the file's `colors` list
    pub index: usize,
    pub value: String,
    pub error: ColorError,
}

impl PaletteDef {
    /// Parse every color string, naming the palette `fallback_name` when the
    /// file does not name it.
    pub fn into_palette(self, fallback_name: &str) -> Result<Palette, BadColor> {
        let colors = self
            .colors
            .iter()
            .enumerate()
            .map(|(index, value)| {
                parse_color(value).map_err(|error| BadColor {
                    index,
                    value: value.clone(),
                    error,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let name = self.name.unwrap_or_else(|| fallback_name.to_string());
        Ok(Palette::new(name, colors))
    }
}
