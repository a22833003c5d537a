//! Viewport resolution scaling
//!
//! Renders a frame at a reduced resolution and stretches it back to the
//! output size with point filtering, giving hard-edged retro pixels.
//!
//! | Mode | Divisor | Result for 1920x1080, max 360 |
//! |------|---------|-------------------------------|
//! | `constant-downscale` | `constant_downscale` | 960x540 (downscale 2) |
//! | `scale-vertical-integer` | smallest whole number fitting under the max | 640x360 |
//! | `exact-vertical` | `height / max`, fractional | 640x360 |

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::sink::{FilterMode, FilterSink};

/// Smallest and largest accepted constant downscale factor
pub const MIN_DOWNSCALE: f32 = 1.0;
pub const MAX_DOWNSCALE: f32 = 8.0;

/// How the output resolution is reduced.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum ScaleMode {
    /// Divide both dimensions by a fixed factor
    #[default]
    ConstantDownscale,
    /// Divide by the smallest whole number that brings the height under the maximum
    ScaleVerticalInteger,
    /// Force the height to the maximum and scale the width to match
    ExactVertical,
}

/// Viewport scaling settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    pub scale_mode: ScaleMode,
    /// Divisor for [`ScaleMode::ConstantDownscale`], clamped to `[1, 8]`
    pub constant_downscale: f32,
    /// Target height for the vertical modes
    pub maximum_vertical_resolution: u32,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            scale_mode: ScaleMode::ConstantDownscale,
            constant_downscale: 2.0,
            maximum_vertical_resolution: 360,
        }
    }
}

impl ViewportConfig {
    pub fn new(scale_mode: ScaleMode, constant_downscale: f32, maximum_vertical_resolution: u32) -> Self {
        Self {
            scale_mode,
            constant_downscale: clamp_downscale(constant_downscale),
            maximum_vertical_resolution: maximum_vertical_resolution.max(1),
        }
    }

    /// The constant downscale actually used, clamped to `[1, 8]`.
    pub fn effective_downscale(&self) -> f32 {
        clamp_downscale(self.constant_downscale)
    }

    /// The vertical target actually used, at least 1.
    pub fn effective_maximum_vertical(&self) -> u32 {
        self.maximum_vertical_resolution.max(1)
    }
}

fn clamp_downscale(factor: f32) -> f32 {
    if factor.is_nan() {
        return MIN_DOWNSCALE;
    }
    factor.clamp(MIN_DOWNSCALE, MAX_DOWNSCALE)
}

/// Render target size computed for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResolvedResolution {
    pub horizontal: u32,
    pub vertical: u32,
}

/// Floor a computed dimension, never going below one pixel.
fn to_dimension(value: f64) -> u32 {
    // `as` saturates: negatives and NaN become 0, infinity becomes u32::MAX
    (value.floor() as u32).max(1)
}

/// Compute the reduced render resolution for a source of the given size.
///
/// Both dimensions of the result are at least 1.
pub fn resolve(source_width: u32, source_height: u32, config: &ViewportConfig) -> ResolvedResolution {
    let width = f64::from(source_width.max(1));
    let height = source_height.max(1);

    let (horizontal, vertical) = match config.scale_mode {
        ScaleMode::ConstantDownscale => {
            let factor = f64::from(config.effective_downscale());
            (to_dimension(width / factor), to_dimension(f64::from(height) / factor))
        }
        ScaleMode::ScaleVerticalInteger => {
            let max = config.effective_maximum_vertical();
            // Smallest d with floor(height / d) <= max
            let divisor = (u64::from(height) / (u64::from(max) + 1) + 1) as u32;
            (
                to_dimension(width / f64::from(divisor)),
                (height / divisor).max(1),
            )
        }
        ScaleMode::ExactVertical => {
            let vertical = config.effective_maximum_vertical();
            let factor = f64::from(height) / f64::from(vertical);
            (to_dimension(width / factor), vertical)
        }
    };

    ResolvedResolution {
        horizontal,
        vertical,
    }
}

/// Per-frame downscale-then-upscale effect.
#[derive(Debug, Clone, Default)]
pub struct ViewportScaler {
    pub config: ViewportConfig,
}

impl ViewportScaler {
    pub fn new(config: ViewportConfig) -> Self {
        Self { config }
    }

    /// Process one frame from `source` into `destination`.
    ///
    /// `screen` is the size the resolution is derived from, normally the
    /// source size. The scratch target is released on every path, including
    /// when a blit fails.
    pub fn render<F: FilterSink>(
        &self,
        sink: &mut F,
        source: &F::Image,
        destination: &mut F::Image,
        screen: (u32, u32),
    ) -> Result<ResolvedResolution, F::Error> {
        let resolution = resolve(screen.0, screen.1, &self.config);
        debug!(
            screen_width = screen.0,
            screen_height = screen.1,
            horizontal = resolution.horizontal,
            vertical = resolution.vertical,
            mode = ?self.config.scale_mode,
            "resolved viewport"
        );

        let mut scaled =
            sink.acquire_temporary(resolution.horizontal, resolution.vertical, FilterMode::Point)?;

        let result = match sink.blit(source, &mut scaled, FilterMode::Point) {
            Ok(()) => sink.blit(&scaled, destination, FilterMode::Point),
            Err(e) => Err(e),
        };
        sink.release_temporary(scaled);

        result.map(|()| resolution)
    }
}
