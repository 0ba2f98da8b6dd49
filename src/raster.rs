//! Social occupancy rasters: decoding and orientation normalization.
//!
//! A raster is a single-channel 8-bit intensity grid with a physical
//! resolution and its origin at the geometric center. Rasters arrive as
//! [`RasterMsg`] events, are decoded once (with the vertical axis flipped to
//! match the grid convention), and are later re-oriented with
//! [`Raster::rotated`] before projection into the cost grid.

use crate::error::{LayerError, Result};

/// The only supported raster encoding: one unsigned byte per pixel.
pub const MONO8: &str = "mono8";

/// Inbound raster message from the social map source.
///
/// The payload is opaque until decoded; `frame_id` and `stamp_us` identify
/// where and when the raster was captured.
#[derive(Debug, Clone)]
pub struct RasterMsg {
    /// Frame the raster was captured in
    pub frame_id: String,
    /// Capture timestamp in microseconds since epoch
    pub stamp_us: u64,
    /// Width in pixels
    pub width: usize,
    /// Height in pixels
    pub height: usize,
    /// Physical resolution in meters per pixel, uniform in X/Y
    pub resolution: f32,
    /// Pixel encoding identifier
    pub encoding: String,
    /// Row-major pixel payload, top row first (image convention)
    pub data: Vec<u8>,
}

/// Single-channel 8-bit raster with its origin at the geometric center.
///
/// Row-major storage: `index = y * width + x`, with Y increasing upward
/// (grid convention; the image-convention flip happens at decode time).
#[derive(Debug, Clone, PartialEq)]
pub struct Raster {
    width: usize,
    height: usize,
    resolution: f32,
    pixels: Vec<u8>,
}

impl Raster {
    /// Create a raster from row-major pixels in grid convention.
    ///
    /// Returns a decode error if the pixel count does not match the
    /// dimensions or the resolution is not positive.
    pub fn new(width: usize, height: usize, resolution: f32, pixels: Vec<u8>) -> Result<Self> {
        if pixels.len() != width * height {
            return Err(LayerError::Decode(format!(
                "pixel count {} does not match {}x{}",
                pixels.len(),
                width,
                height
            )));
        }
        if resolution <= 0.0 || !resolution.is_finite() {
            return Err(LayerError::Decode(format!(
                "invalid resolution: {resolution}"
            )));
        }
        Ok(Self {
            width,
            height,
            resolution,
            pixels,
        })
    }

    /// Decode a raster message.
    ///
    /// Validates the encoding and payload length, then flips the vertical
    /// axis: the image convention's Y runs downward, the grid's upward.
    pub fn decode(msg: &RasterMsg) -> Result<Self> {
        if msg.encoding != MONO8 {
            return Err(LayerError::Decode(format!(
                "unsupported encoding: {}",
                msg.encoding
            )));
        }
        if msg.width == 0 || msg.height == 0 {
            return Err(LayerError::Decode(format!(
                "empty raster: {}x{}",
                msg.width, msg.height
            )));
        }
        if msg.data.len() != msg.width * msg.height {
            return Err(LayerError::Decode(format!(
                "payload length {} does not match {}x{}",
                msg.data.len(),
                msg.width,
                msg.height
            )));
        }
        let mut flipped = Vec::with_capacity(msg.width * msg.height);
        for row in msg.data.chunks_exact(msg.width).rev() {
            flipped.extend_from_slice(row);
        }
        Self::new(msg.width, msg.height, msg.resolution, flipped)
    }

    /// Width in pixels.
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height in pixels.
    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Physical resolution in meters per pixel.
    #[inline]
    pub fn resolution(&self) -> f32 {
        self.resolution
    }

    /// Pixel intensity at (x, y). Panics if out of range.
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> u8 {
        debug_assert!(x < self.width && y < self.height);
        self.pixels[y * self.width + x]
    }

    /// Raw row-major pixel buffer.
    #[inline]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Rotate the raster about its center by `angle` radians on an expanded
    /// canvas that contains the rotated content without clipping.
    ///
    /// Canvas dimensions come from the rotated bounding box of the unrotated
    /// rectangle's corners, so for a given input and angle the output size is
    /// deterministic. Resampling is nearest-neighbor; samples that fall
    /// outside the source are zero. `rotated(0.0)` returns an identical
    /// raster.
    pub fn rotated(&self, angle: f32) -> Raster {
        let (sin_a, cos_a) = angle.sin_cos();
        let w = self.width as f32;
        let h = self.height as f32;

        let out_w = (w * cos_a.abs() + h * sin_a.abs()).round().max(1.0) as usize;
        let out_h = (w * sin_a.abs() + h * cos_a.abs()).round().max(1.0) as usize;

        let in_cx = (w - 1.0) / 2.0;
        let in_cy = (h - 1.0) / 2.0;
        let out_cx = (out_w as f32 - 1.0) / 2.0;
        let out_cy = (out_h as f32 - 1.0) / 2.0;

        let mut pixels = vec![0u8; out_w * out_h];
        for y in 0..out_h {
            let dy = y as f32 - out_cy;
            for x in 0..out_w {
                let dx = x as f32 - out_cx;
                // Inverse mapping: rotate the output coordinate back by -angle
                let sx = (cos_a * dx + sin_a * dy + in_cx).round() as i32;
                let sy = (-sin_a * dx + cos_a * dy + in_cy).round() as i32;
                if sx >= 0 && sy >= 0 && (sx as usize) < self.width && (sy as usize) < self.height
                {
                    pixels[y * out_w + x] = self.pixels[sy as usize * self.width + sx as usize];
                }
            }
        }

        Raster {
            width: out_w,
            height: out_h,
            resolution: self.resolution,
            pixels,
        }
    }
}
