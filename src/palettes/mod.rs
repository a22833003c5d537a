//! Built-in palette definitions.
//!
//! Provides a set of commonly used pixel art palettes that can be
//! referenced by name using the `@name` syntax.

use crate::color::Color;
use crate::models::Palette;

/// List of all available built-in palette names.
const BUILTIN_NAMES: &[&str] = &["gameboy", "nes", "pico8", "grayscale", "1bit"];

/// Returns a list of all available built-in palette names.
pub fn list_builtins() -> Vec<&'static str> {
    BUILTIN_NAMES.to_vec()
}

/// Returns a built-in palette by name, or None if not found.
pub fn get_builtin(name: &str) -> Option<Palette> {
    match name {
        "gameboy" => Some(gameboy()),
        "nes" => Some(nes()),
        "pico8" => Some(pico8()),
        "grayscale" => Some(grayscale()),
        "1bit" => Some(one_bit()),
        _ => None,
    }
}

fn hex_palette(name: &str, hex: &[u32]) -> Palette {
    let colors = hex
        .iter()
        .map(|&rgb| {
            Color::rgb(
                ((rgb >> 16) & 0xFF) as f32 / 255.0,
                ((rgb >> 8) & 0xFF) as f32 / 255.0,
                (rgb & 0xFF) as f32 / 255.0,
            )
        })
        .collect();
    Palette::new(name, colors)
}

/// Game Boy 4-color green palette.
/// Reference: https://lospec.com/palette-list/nintendo-gameboy-bgb
fn gameboy() -> Palette {
    hex_palette("gameboy", &[0x9BBC0F, 0x8BAC0F, 0x306230, 0x0F380F])
}

/// NES-inspired palette with key representative colors.
/// Reference: https://lospec.com/palette-list/nintendo-entertainment-system
fn nes() -> Palette {
    hex_palette(
        "nes",
        &[
            0x000000, 0xFCFCFC, 0xA80020, 0x00A800, 0x0058F8, 0x00B8D8, 0xF8D800, 0xF83800,
            0xF878F8, 0x503000, 0x7C7C7C, 0xFCB8B8,
        ],
    )
}

/// PICO-8 16-color palette.
/// Reference: https://lospec.com/palette-list/pico-8
fn pico8() -> Palette {
    hex_palette(
        "pico8",
        &[
            0x000000, 0x1D2B53, 0x7E2553, 0x008751, 0xAB5236, 0x5F574F, 0xC2C3C7, 0xFFF1E8,
            0xFF004D, 0xFFA300, 0xFFEC27, 0x00E436, 0x29ADFF, 0x83769C, 0xFF77A8, 0xFFCCAA,
        ],
    )
}

/// 8-shade grayscale palette from white to black.
fn grayscale() -> Palette {
    hex_palette(
        "grayscale",
        &[0xFFFFFF, 0xDFDFDF, 0xBFBFBF, 0x9F9F9F, 0x7F7F7F, 0x5F5F5F, 0x3F3F3F, 0x000000],
    )
}

/// 1-bit black and white palette.
fn one_bit() -> Palette {
    hex_palette("1bit", &[0x000000, 0xFFFFFF])
}
