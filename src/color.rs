//! Color values, color spaces and color string parsing
//!
//! Palette colors are stored as four `f32` components. Color strings accepted
//! in palette files:
//! - Hex: `#RGB`, `#RGBA`, `#RRGGBB`, `#RRGGBBAA`
//! - Functional: `rgb()`, `rgba()`, `hsl()`, `hsla()`, `hwb()`, `oklch()`
//! - Named: `red`, `blue`, `transparent`, etc.

use clap::ValueEnum;
use image::Rgba;
use lightningcss::traits::Parse;
use lightningcss::values::color::CssColor;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for color parsing failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColorError {
    /// Input string was empty
    #[error("empty color string")]
    Empty,
    /// Invalid length (must be 3, 4, 6, or 8 hex chars after #)
    #[error("invalid color length {0}, expected 3, 4, 6, or 8")]
    InvalidLength(usize),
    /// Contains non-hex characters
    #[error("invalid hex character '{0}'")]
    InvalidHex(char),
    /// CSS parsing error from lightningcss
    #[error("CSS parse error: {0}")]
    CssParse(String),
}

/// How palette colors are interpreted by the frame they are applied to.
///
/// Palettes are authored gamma-encoded. When frames are processed in linear
/// space the palette has to be converted first, otherwise every color lands
/// darker or brighter than the one that was picked.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum ColorSpace {
    /// Colors are used exactly as authored
    #[default]
    Gamma,
    /// Colors are converted from sRGB to linear before use
    Linear,
}

/// An RGBA color with floating point components.
///
/// Components are nominally in `[0, 1]` but linear values are not clamped.
/// Equality is exact component-wise equality.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);
    pub const RED: Color = Color::rgb(1.0, 0.0, 0.0);
    pub const GREEN: Color = Color::rgb(0.0, 1.0, 0.0);
    pub const BLUE: Color = Color::rgb(0.0, 0.0, 1.0);
    pub const TRANSPARENT: Color = Color::new(0.0, 0.0, 0.0, 0.0);

    /// Create a color from all four components.
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Create an opaque color.
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self::new(r, g, b, 1.0)
    }

    /// Convert an 8-bit pixel to a color without any transfer function.
    pub fn from_rgba8(pixel: Rgba<u8>) -> Self {
        let [r, g, b, a] = pixel.0;
        Self::new(
            r as f32 / 255.0,
            g as f32 / 255.0,
            b as f32 / 255.0,
            a as f32 / 255.0,
        )
    }

    /// Convert to an 8-bit pixel, clamping each component into `[0, 1]`.
    pub fn to_rgba8(self) -> Rgba<u8> {
        Rgba([
            unit_to_u8(self.r),
            unit_to_u8(self.g),
            unit_to_u8(self.b),
            unit_to_u8(self.a),
        ])
    }

    /// Convert a gamma-encoded (sRGB) color to linear. Alpha is unchanged.
    pub fn to_linear(self) -> Self {
        Self::new(
            srgb_to_linear(self.r),
            srgb_to_linear(self.g),
            srgb_to_linear(self.b),
            self.a,
        )
    }

    /// Convert a linear color back to gamma-encoded sRGB. Alpha is unchanged.
    pub fn to_gamma(self) -> Self {
        Self::new(
            linear_to_srgb(self.r),
            linear_to_srgb(self.g),
            linear_to_srgb(self.b),
            self.a,
        )
    }

    /// Convert an authored (gamma-encoded) color into `space`.
    pub fn to_space(self, space: ColorSpace) -> Self {
        match space {
            ColorSpace::Gamma => self,
            ColorSpace::Linear => self.to_linear(),
        }
    }

    /// Convert a color expressed in `space` back to gamma-encoded sRGB.
    pub fn to_gamma_from(self, space: ColorSpace) -> Self {
        match space {
            ColorSpace::Gamma => self,
            ColorSpace::Linear => self.to_gamma(),
        }
    }

    /// Squared euclidean distance over the RGB channels.
    pub fn distance_sq(&self, other: &Color) -> f32 {
        let dr = self.r - other.r;
        let dg = self.g - other.g;
        let db = self.b - other.b;
        dr * dr + dg * dg + db * db
    }

    /// Format as `#RRGGBBAA`.
    pub fn to_hex(self) -> String {
        let [r, g, b, a] = self.to_rgba8().0;
        format!("#{:02X}{:02X}{:02X}{:02X}", r, g, b, a)
    }
}

impl From<Rgba<u8>> for Color {
    fn from(pixel: Rgba<u8>) -> Self {
        Color::from_rgba8(pixel)
    }
}

fn unit_to_u8(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Standard sRGB electro-optical transfer function for one channel.
pub fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// Inverse of [`srgb_to_linear`].
pub fn linear_to_srgb(c: f32) -> f32 {
    if c <= 0.003_130_8 {
        c * 12.92
    } else {
        1.055 * c.powf(1.0 / 2.4) - 0.055
    }
}

/// Parse a CSS color string into a [`Color`].
///
/// # Examples
///
/// ```
/// use rasterfx::color::{parse_color, Color};
///
/// assert_eq!(parse_color("#F00").unwrap(), Color::RED);
/// assert_eq!(parse_color("rgb(0, 255, 0)").unwrap(), Color::GREEN);
/// assert_eq!(parse_color("blue").unwrap(), Color::BLUE);
/// ```
///
/// # Errors
///
/// Returns `ColorError` if the input is invalid or unparseable.
pub fn parse_color(s: &str) -> Result<Color, ColorError> {
    parse_rgba8(s).map(Color::from_rgba8)
}

/// Parse a CSS color string into an 8-bit RGBA pixel.
pub fn parse_rgba8(s: &str) -> Result<Rgba<u8>, ColorError> {
    let s = s.trim();
    if s.is_empty() {
        return Err(ColorError::Empty);
    }

    // Fast path for hex colors
    if let Some(hex) = s.strip_prefix('#') {
        return parse_hex_color(hex);
    }

    parse_css_color(s)
}

/// Parse the digits of a hex color (RGB, RGBA, RRGGBB, RRGGBBAA)
fn parse_hex_color(hex: &str) -> Result<Rgba<u8>, ColorError> {
    let digits = hex
        .chars()
        .map(parse_hex_digit)
        .collect::<Result<Vec<u8>, _>>()?;

    match digits.as_slice() {
        // Short forms double each digit
        [r, g, b] => Ok(Rgba([r * 17, g * 17, b * 17, 255])),
        [r, g, b, a] => Ok(Rgba([r * 17, g * 17, b * 17, a * 17])),
        [r1, r2, g1, g2, b1, b2] => Ok(Rgba([r1 * 16 + r2, g1 * 16 + g2, b1 * 16 + b2, 255])),
        [r1, r2, g1, g2, b1, b2, a1, a2] => Ok(Rgba([
            r1 * 16 + r2,
            g1 * 16 + g2,
            b1 * 16 + b2,
            a1 * 16 + a2,
        ])),
        _ => Err(ColorError::InvalidLength(digits.len())),
    }
}

/// Parse a CSS color using lightningcss (rgb, hsl, hwb, oklch, named colors)
fn parse_css_color(s: &str) -> Result<Rgba<u8>, ColorError> {
    use lightningcss::values::color::FloatColor;

    let css_color = CssColor::parse_string(s).map_err(|e| ColorError::CssParse(e.to_string()))?;
    let rgb_color = css_color
        .to_rgb()
        .map_err(|_| ColorError::CssParse("cannot convert color to RGB".to_string()))?;

    match rgb_color {
        CssColor::RGBA(rgba) => Ok(Rgba([rgba.red, rgba.green, rgba.blue, rgba.alpha])),
        // Float colors show up when components have 'none' values
        CssColor::Float(float_color) => match float_color.as_ref() {
            FloatColor::RGB(rgb) => Ok(Rgba([
                unit_to_u8(rgb.r),
                unit_to_u8(rgb.g),
                unit_to_u8(rgb.b),
                unit_to_u8(rgb.alpha),
            ])),
            _ => Err(ColorError::CssParse("unexpected float color format".to_string())),
        },
        _ => Err(ColorError::CssParse("color conversion did not produce RGB".to_string())),
    }
}

/// Parse a single hex digit (0-9, A-F, a-f) to u8 (0-15)
fn parse_hex_digit(c: char) -> Result<u8, ColorError> {
    c.to_digit(16).map(|d| d as u8).ok_or(ColorError::InvalidHex(c))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-3
    }

    #[test]
    fn test_parse_hex_forms() {
        assert_eq!(parse_rgba8("#F00").unwrap(), Rgba([255, 0, 0, 255]));
        assert_eq!(parse_rgba8("#F008").unwrap(), Rgba([255, 0, 0, 136]));
        assert_eq!(parse_rgba8("#1D2B53").unwrap(), Rgba([29, 43, 83, 255]));
        assert_eq!(parse_rgba8("#00000000").unwrap(), Rgba([0, 0, 0, 0]));
    }

    #[test]
    fn test_parse_hex_errors() {
        assert_eq!(parse_rgba8(""), Err(ColorError::Empty));
        assert_eq!(parse_rgba8("#12345"), Err(ColorError::InvalidLength(5)));
        assert_eq!(parse_rgba8("#GG0000"), Err(ColorError::InvalidHex('G')));
    }

    #[test]
    fn test_parse_css_forms() {
        assert_eq!(parse_rgba8("rgb(0, 255, 0)").unwrap(), Rgba([0, 255, 0, 255]));
        assert_eq!(parse_rgba8("hsl(0, 100%, 50%)").unwrap(), Rgba([255, 0, 0, 255]));
        assert_eq!(parse_rgba8("white").unwrap(), Rgba([255, 255, 255, 255]));
        assert!(parse_rgba8("notacolor").is_err());
    }

    #[test]
    fn test_linear_conversion_of_mid_gray() {
        let gray = Color::new(0.5, 0.5, 0.5, 1.0);
        let linear = gray.to_space(ColorSpace::Linear);
        assert!(approx(linear.r, 0.214));
        assert!(approx(linear.g, 0.214));
        assert!(approx(linear.b, 0.214));
        assert_eq!(linear.a, 1.0);
    }

    #[test]
    fn test_gamma_space_is_identity() {
        let gray = Color::new(0.5, 0.5, 0.5, 1.0);
        assert_eq!(gray.to_space(ColorSpace::Gamma), gray);
        assert_eq!(gray.to_gamma_from(ColorSpace::Gamma), gray);
    }

    #[test]
    fn test_alpha_untouched_by_linear() {
        let c = Color::new(0.8, 0.2, 0.6, 0.5);
        assert_eq!(c.to_linear().a, 0.5);
    }

    #[test]
    fn test_transfer_endpoints_and_toe() {
        assert_eq!(srgb_to_linear(0.0), 0.0);
        assert!(approx(srgb_to_linear(1.0), 1.0));
        // Linear segment below the threshold
        assert!(approx(srgb_to_linear(0.04), 0.04 / 12.92));
    }

    #[test]
    fn test_linear_to_srgb_inverts() {
        for v in [0.0_f32, 0.01, 0.2, 0.5, 0.9, 1.0] {
            assert!(approx(linear_to_srgb(srgb_to_linear(v)), v), "value {}", v);
        }
    }

    #[test]
    fn test_rgba8_conversion() {
        let c = Color::from_rgba8(Rgba([255, 0, 51, 255]));
        assert_eq!(c.r, 1.0);
        assert!(approx(c.b, 0.2));
        assert_eq!(c.to_rgba8(), Rgba([255, 0, 51, 255]));
        assert_eq!(Color::new(2.0, -1.0, 0.0, 1.0).to_rgba8(), Rgba([255, 0, 0, 255]));
    }

    #[test]
    fn test_to_hex() {
        assert_eq!(Color::RED.to_hex(), "#FF0000FF");
        assert_eq!(Color::TRANSPARENT.to_hex(), "#00000000");
    }

    #[test]
    fn test_distance() {
        assert_eq!(Color::RED.distance_sq(&Color::RED), 0.0);
        assert_eq!(Color::BLACK.distance_sq(&Color::WHITE), 3.0);
    }
}
