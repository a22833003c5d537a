//! Palette quantization effect
//!
//! [`PaletteAggregator`] merges an ordered list of palettes into one
//! deduplicated color array and only rebuilds it when the list of palette
//! identities changes. [`PaletteQuantizer`] runs the aggregator once per frame
//! and hands the colors to a [`FilterSink`], falling back to a plain copy when
//! there is nothing to quantize to.

use tracing::{debug, warn};

use crate::color::{Color, ColorSpace};
use crate::registry::{PaletteId, PaletteStore};
use crate::sink::{FilterMode, FilterSink};

/// Whether the palette list differs from the one seen last frame.
///
/// Compares identities slot by slot. Two different palettes with the same
/// colors are still a change, and an unset slot never matches a set one.
pub fn needs_rebuild(current: &[Option<PaletteId>], previous: &[Option<PaletteId>]) -> bool {
    if current.len() != previous.len() {
        return true;
    }
    current.iter().zip(previous).any(|(now, before)| now != before)
}

/// Merge the palettes in `list` into one color array.
///
/// Colors keep first-occurrence order, are converted into `color_space` and
/// appear at most once. Unset slots and ids unknown to `store` are skipped.
pub fn rebuild<S: PaletteStore + ?Sized>(
    list: &[Option<PaletteId>],
    store: &S,
    color_space: ColorSpace,
) -> Vec<Color> {
    let mut colors: Vec<Color> = Vec::new();

    for id in list.iter().flatten() {
        let Some(palette) = store.palette(*id) else {
            warn!(palette = id.raw(), "palette no longer registered, skipping");
            continue;
        };
        for color in &palette.colors {
            let converted = color.to_space(color_space);
            // Every distinct color costs the sink per-pixel work
            if !colors.contains(&converted) {
                colors.push(converted);
            }
        }
    }

    colors
}

/// Cached aggregation of a palette list.
#[derive(Debug, Clone, Default)]
pub struct PaletteAggregator {
    colors: Vec<Color>,
    previous: Vec<Option<PaletteId>>,
    color_space: ColorSpace,
    built: bool,
    rebuilds: u64,
}

impl PaletteAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bring the color set up to date with this frame's palette list.
    ///
    /// Rebuilds on the first call or when the list of identities changed.
    /// A color space change also counts as a change, since the cached colors
    /// were converted for the old space. Otherwise the cached colors are
    /// returned untouched.
    pub fn update<S: PaletteStore + ?Sized>(
        &mut self,
        list: &[Option<PaletteId>],
        store: &S,
        color_space: ColorSpace,
    ) -> &[Color] {
        let stale = !self.built
            || self.color_space != color_space
            || needs_rebuild(list, &self.previous);

        if stale {
            self.colors = rebuild(list, store, color_space);
            self.previous = list.to_vec();
            self.color_space = color_space;
            self.built = true;
            self.rebuilds += 1;
            debug!(
                palettes = list.len(),
                colors = self.colors.len(),
                ?color_space,
                "rebuilt palette colors"
            );
        }

        &self.colors
    }

    /// The colors produced by the last update.
    pub fn colors(&self) -> &[Color] {
        &self.colors
    }

    /// The palette list the current colors were built from.
    pub fn palettes(&self) -> &[Option<PaletteId>] {
        &self.previous
    }

    /// How many times the colors have been rebuilt.
    pub fn rebuild_count(&self) -> u64 {
        self.rebuilds
    }
}

/// What a quantizer frame ended up doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantizeOutcome {
    /// The frame was quantized to this many colors
    Quantized { colors: usize },
    /// No palette colors were available; the frame was copied unchanged
    NoColors,
    /// The sink could not quantize; the frame was copied unchanged
    SinkFailed,
}

/// Per-frame palette quantization effect.
#[derive(Debug, Clone, Default)]
pub struct PaletteQuantizer {
    aggregator: PaletteAggregator,
}

impl PaletteQuantizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn aggregator(&self) -> &PaletteAggregator {
        &self.aggregator
    }

    /// Process one frame from `source` into `destination`.
    ///
    /// Only a failure of the fallback copy is returned as an error. Missing
    /// colors and quantization failures degrade to a passthrough.
    pub fn render<S, F>(
        &mut self,
        palettes: &[Option<PaletteId>],
        store: &S,
        color_space: ColorSpace,
        sink: &mut F,
        source: &F::Image,
        destination: &mut F::Image,
    ) -> Result<QuantizeOutcome, F::Error>
    where
        S: PaletteStore + ?Sized,
        F: FilterSink,
    {
        let mut colors = self.aggregator.update(palettes, store, color_space);

        if let Some(limit) = sink.max_colors() {
            if colors.len() > limit {
                warn!(colors = colors.len(), limit, "palette exceeds sink color limit, truncating");
                colors = &colors[..limit];
            }
        }

        // Sinks are never handed an empty color list
        if colors.is_empty() {
            sink.blit(source, destination, FilterMode::Point)?;
            return Ok(QuantizeOutcome::NoColors);
        }

        match sink.apply_color_quantization(source, colors, destination) {
            Ok(()) => Ok(QuantizeOutcome::Quantized {
                colors: colors.len(),
            }),
            Err(e) => {
                warn!(error = %e, "quantization failed, passing frame through");
                sink.blit(source, destination, FilterMode::Point)?;
                Ok(QuantizeOutcome::SinkFailed)
            }
        }
    }
}
