//! Polar-to-raster projection
//!
//! Maps each valid sample `(angle, range)` to
//!
//! ```text
//! px = round( range·cos(angle)·scale + offset)
//! py = round(-range·sin(angle)·scale + offset)
//! ```
//!
//! The vertical axis is flipped so +y (counter-clockwise from the sensor's
//! forward axis) points up on a top-left-origin raster. Invalid samples and
//! pixels outside the raster are dropped without error.

use crate::core::types::Scan;
use crate::error::{Error, Result};

/// Integer pixel coordinate inside a raster
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PixelCoord {
    pub x: u32,
    pub y: u32,
}

/// Raster dimensions in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RasterSize {
    pub width: u32,
    pub height: u32,
}

impl RasterSize {
    pub fn square(side: u32) -> Self {
        Self {
            width: side,
            height: side,
        }
    }
}

/// Meters-to-pixels mapping
///
/// Only constructible with `scale > 0`; a zero or negative scale would
/// collapse or mirror the cloud.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectionConfig {
    scale: f32,
    origin_offset: f32,
}

impl ProjectionConfig {
    /// `scale` in pixels per meter, `origin_offset` in pixels
    pub fn new(scale: f32, origin_offset: f32) -> Result<Self> {
        if !scale.is_finite() || scale <= 0.0 {
            return Err(Error::Configuration(format!(
                "projection scale must be a positive number of pixels per meter, got {}",
                scale
            )));
        }
        if !origin_offset.is_finite() {
            return Err(Error::Configuration(format!(
                "projection origin offset must be finite, got {}",
                origin_offset
            )));
        }
        Ok(Self {
            scale,
            origin_offset,
        })
    }

    /// Scale 50 px/m centered on a square raster of `side` pixels
    pub fn centered(side: u32) -> Self {
        Self {
            scale: 50.0,
            origin_offset: side as f32 / 2.0,
        }
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn origin_offset(&self) -> f32 {
        self.origin_offset
    }

    /// Pixel index of the sensor origin (same on both axes)
    pub fn origin_pixel(&self) -> i64 {
        self.origin_offset.round() as i64
    }

    /// Project one Cartesian point (meters) to an unclipped pixel
    ///
    /// `None` when either coordinate is not finite (e.g. a NaN angle).
    #[inline]
    pub fn to_pixel(&self, x: f32, y: f32) -> Option<(i64, i64)> {
        let px = (x * self.scale + self.origin_offset).round();
        let py = (-y * self.scale + self.origin_offset).round();
        if !(px.is_finite() && py.is_finite()) {
            return None;
        }
        Some((px as i64, py as i64))
    }
}

/// Project `scan` into `out`, replacing its contents
///
/// `out` keeps its capacity between calls, so steady-state projection does
/// not allocate.
pub fn project_into(
    scan: &Scan,
    config: &ProjectionConfig,
    size: RasterSize,
    out: &mut Vec<PixelCoord>,
) {
    out.clear();
    let (w, h) = (size.width as i64, size.height as i64);

    for sample in scan.samples.iter().filter(|s| s.is_valid()) {
        let (x, y) = sample.to_cartesian();
        let Some((px, py)) = config.to_pixel(x, y) else {
            continue;
        };
        if px >= 0 && px < w && py >= 0 && py < h {
            out.push(PixelCoord {
                x: px as u32,
                y: py as u32,
            });
        }
    }
}

/// Project `scan` into a fresh vector
pub fn project(scan: &Scan, config: &ProjectionConfig, size: RasterSize) -> Vec<PixelCoord> {
    let mut out = Vec::with_capacity(scan.len());
    project_into(scan, config, size, &mut out);
    out
}
