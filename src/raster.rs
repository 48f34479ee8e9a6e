//! Borrowed views over interleaved RGBA pixel data.

use serde::{Deserialize, Serialize};

use crate::error::SelectionError;

/// Integer pixel coordinate.
///
/// Signed so that out-of-bounds host coordinates stay representable and can
/// be rejected instead of silently clamped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    #[inline]
    pub fn distance(&self, other: Point) -> f32 {
        let dx = (self.x - other.x) as f32;
        let dy = (self.y - other.y) as f32;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Borrowed view over an interleaved 8-bit RGBA buffer.
///
/// Row-major, no padding: `data.len() == width * height * 4`. The view
/// validates that invariant once so downstream pixel access can index
/// without re-checking.
#[derive(Debug, Clone, Copy)]
pub struct RasterView<'a> {
    data: &'a [u8],
    width: usize,
    height: usize,
}

impl<'a> RasterView<'a> {
    /// Wraps a pixel buffer, checking its length against the dimensions.
    pub fn new(data: &'a [u8], width: usize, height: usize) -> Result<Self, SelectionError> {
        if width == 0 || height == 0 || data.len() != width * height * 4 {
            return Err(SelectionError::EmptyBuffer);
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    /// Number of pixels in the buffer.
    #[inline]
    pub fn pixel_count(&self) -> usize {
        self.width * self.height
    }

    /// True when the signed coordinate pair lands inside the buffer.
    #[inline]
    pub fn contains(&self, p: Point) -> bool {
        p.x >= 0 && p.y >= 0 && (p.x as usize) < self.width && (p.y as usize) < self.height
    }

    /// Validates a caller-supplied coordinate. Never clamps.
    pub fn require(&self, p: Point) -> Result<(), SelectionError> {
        if self.contains(p) {
            Ok(())
        } else {
            Err(SelectionError::OutOfBounds {
                x: p.x,
                y: p.y,
                width: self.width,
                height: self.height,
            })
        }
    }

    /// Flat pixel index of an in-bounds coordinate.
    #[inline]
    pub fn index(&self, x: usize, y: usize) -> usize {
        y * self.width + x
    }

    /// RGB channels of an in-bounds pixel. Alpha never participates in
    /// color distance, so it is not fetched.
    #[inline]
    pub fn rgb(&self, x: usize, y: usize) -> [u8; 3] {
        let i = self.index(x, y) * 4;
        [self.data[i], self.data[i + 1], self.data[i + 2]]
    }

    /// Unweighted grayscale mean of an in-bounds pixel, 0..255.
    #[inline]
    pub fn gray(&self, x: usize, y: usize) -> f32 {
        let [r, g, b] = self.rgb(x, y);
        (r as f32 + g as f32 + b as f32) / 3.0
    }
}

// ============================================================================
// Tests
// ============================================================================
