//! Image filter sink: the boundary between the effects and whatever draws pixels
//!
//! The effects never touch pixels themselves. They hand colors, images and
//! target sizes to a [`FilterSink`]. A GPU host implements the trait over its
//! own texture handles; [`CpuFilter`] is a reference implementation over
//! `image::RgbaImage` used by the CLI and the tests.

use clap::ValueEnum;
use image::imageops::{self, FilterType};
use image::RgbaImage;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::trace;

use crate::color::{Color, ColorSpace};

/// Sampling used when a blit reads its source.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum FilterMode {
    /// Nearest-neighbor (pixel-perfect)
    #[default]
    Point,
    /// Bilinear interpolation
    Bilinear,
}

impl FilterMode {
    fn filter_type(self) -> FilterType {
        match self {
            FilterMode::Point => FilterType::Nearest,
            FilterMode::Bilinear => FilterType::Triangle,
        }
    }
}

/// Operations the effects need from the rendering host.
pub trait FilterSink {
    /// Image or render target handle
    type Image;
    type Error: std::fmt::Display;

    /// Replace every pixel of `source` with its closest color from `colors`,
    /// writing into `destination`. Callers never pass an empty `colors`.
    fn apply_color_quantization(
        &mut self,
        source: &Self::Image,
        colors: &[Color],
        destination: &mut Self::Image,
    ) -> Result<(), Self::Error>;

    /// Copy `source` into `destination`, resampling to the destination size.
    fn blit(
        &mut self,
        source: &Self::Image,
        destination: &mut Self::Image,
        filter: FilterMode,
    ) -> Result<(), Self::Error>;

    /// Borrow a scratch target of exactly `width` x `height`.
    fn acquire_temporary(
        &mut self,
        width: u32,
        height: u32,
        filter: FilterMode,
    ) -> Result<Self::Image, Self::Error>;

    /// Return a target obtained from [`FilterSink::acquire_temporary`].
    fn release_temporary(&mut self, target: Self::Image);

    /// Largest number of colors `apply_color_quantization` accepts, if limited.
    fn max_colors(&self) -> Option<usize> {
        None
    }
}

/// Error type for the CPU reference sink
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CpuFilterError {
    /// Quantization needs source and destination of the same size
    #[error("size mismatch: source is {}x{}, destination is {}x{}", .source_size.0, .source_size.1, .destination_size.0, .destination_size.1)]
    SizeMismatch {
        source_size: (u32, u32),
        destination_size: (u32, u32),
    },
    /// Images and targets must have at least one pixel
    #[error("empty image ({0}x{1})")]
    EmptyImage(u32, u32),
    #[error("no colors to quantize to")]
    NoColors,
    #[error("{given} colors exceed the limit of {limit}")]
    TooManyColors { given: usize, limit: usize },
}

/// Number of released temporaries kept around for reuse
const POOL_CAPACITY: usize = 4;

/// Reference sink over 8-bit sRGB images.
///
/// Pixels are decoded into the configured color space before matching, so
/// palette colors must already be in that space (as the aggregator produces
/// them). The matched color is encoded back to sRGB; source alpha is kept.
#[derive(Debug, Default)]
pub struct CpuFilter {
    color_space: ColorSpace,
    max_colors: Option<usize>,
    pool: Vec<RgbaImage>,
    outstanding: usize,
}

impl CpuFilter {
    pub fn new(color_space: ColorSpace) -> Self {
        Self {
            color_space,
            ..Self::default()
        }
    }

    /// Limit the number of colors accepted per quantization.
    pub fn with_max_colors(mut self, limit: usize) -> Self {
        self.max_colors = Some(limit);
        self
    }

    pub fn color_space(&self) -> ColorSpace {
        self.color_space
    }

    /// Temporaries acquired but not yet released.
    pub fn outstanding_temporaries(&self) -> usize {
        self.outstanding
    }
}

fn check_non_empty(image: &RgbaImage) -> Result<(), CpuFilterError> {
    let (w, h) = image.dimensions();
    if w == 0 || h == 0 {
        return Err(CpuFilterError::EmptyImage(w, h));
    }
    Ok(())
}

impl FilterSink for CpuFilter {
    type Image = RgbaImage;
    type Error = CpuFilterError;

    fn apply_color_quantization(
        &mut self,
        source: &RgbaImage,
        colors: &[Color],
        destination: &mut RgbaImage,
    ) -> Result<(), CpuFilterError> {
        if colors.is_empty() {
            return Err(CpuFilterError::NoColors);
        }
        if let Some(limit) = self.max_colors {
            if colors.len() > limit {
                return Err(CpuFilterError::TooManyColors {
                    given: colors.len(),
                    limit,
                });
            }
        }
        if source.dimensions() != destination.dimensions() {
            return Err(CpuFilterError::SizeMismatch {
                source_size: source.dimensions(),
                destination_size: destination.dimensions(),
            });
        }
        check_non_empty(source)?;

        let space = self.color_space;
        let encoded: Vec<[u8; 4]> = colors
            .iter()
            .map(|c| c.to_gamma_from(space).to_rgba8().0)
            .collect();
        let row_len = source.width() as usize * 4;

        destination
            .par_chunks_mut(row_len)
            .zip(source.par_chunks(row_len))
            .for_each(|(dst_row, src_row)| {
                for (dst, src) in dst_row.chunks_exact_mut(4).zip(src_row.chunks_exact(4)) {
                    let pixel = Color::from_rgba8(image::Rgba([src[0], src[1], src[2], src[3]]))
                        .to_space(space);
                    let nearest = nearest_index(&pixel, colors);
                    let [r, g, b, _] = encoded[nearest];
                    dst.copy_from_slice(&[r, g, b, src[3]]);
                }
            });
        Ok(())
    }

    fn blit(
        &mut self,
        source: &RgbaImage,
        destination: &mut RgbaImage,
        filter: FilterMode,
    ) -> Result<(), CpuFilterError> {
        check_non_empty(source)?;
        check_non_empty(destination)?;
        let (w, h) = destination.dimensions();
        if source.dimensions() == (w, h) {
            destination.copy_from_slice(source.as_raw());
        } else {
            *destination = imageops::resize(source, w, h, filter.filter_type());
        }
        Ok(())
    }

    fn acquire_temporary(
        &mut self,
        width: u32,
        height: u32,
        _filter: FilterMode,
    ) -> Result<RgbaImage, CpuFilterError> {
        if width == 0 || height == 0 {
            return Err(CpuFilterError::EmptyImage(width, height));
        }
        let target = match self.pool.iter().position(|t| t.dimensions() == (width, height)) {
            Some(index) => self.pool.swap_remove(index),
            None => RgbaImage::new(width, height),
        };
        self.outstanding += 1;
        trace!(width, height, outstanding = self.outstanding, "acquired temporary");
        Ok(target)
    }

    fn release_temporary(&mut self, target: RgbaImage) {
        self.outstanding = self.outstanding.saturating_sub(1);
        if self.pool.len() >= POOL_CAPACITY {
            self.pool.remove(0);
        }
        self.pool.push(target);
    }

    fn max_colors(&self) -> Option<usize> {
        self.max_colors
    }
}

/// Index of the color closest to `pixel`; ties go to the earliest color.
fn nearest_index(pixel: &Color, colors: &[Color]) -> usize {
    let mut best = 0;
    let mut best_dist = f32::INFINITY;
    for (i, color) in colors.iter().enumerate() {
        let dist = pixel.distance_sq(color);
        if dist < best_dist {
            best = i;
            best_dist = dist;
        }
    }
    best
}
