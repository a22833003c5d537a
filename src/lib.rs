//! Rasterfx - Frame post-processing effects for pixel-art rendering
//!
//! This library provides two effects that run once per rendered frame:
//! - Palette quantization: snap every pixel to the nearest color of a merged,
//!   cached palette set
//! - Viewport scaling: render at a reduced resolution and blow the result back
//!   up with point filtering
//!
//! Both effects talk to the renderer through the [`sink::FilterSink`] trait.
//! [`sink::CpuFilter`] is a software implementation over `image` buffers.

pub mod cli;
pub mod color;
pub mod config;
pub mod models;
pub mod output;
pub mod palettes;
pub mod quantize;
pub mod registry;
pub mod sink;
pub mod viewport;

pub use quantize::{PaletteAggregator, PaletteQuantizer, QuantizeOutcome};
pub use registry::{PaletteId, PaletteRegistry, PaletteStore};
pub use sink::{CpuFilter, FilterMode, FilterSink};
pub use viewport::{resolve, ResolvedResolution, ScaleMode, ViewportConfig, ViewportScaler};
