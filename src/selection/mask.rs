//! Selection masks and their geometry.
//!
//! A [SelectionMask] is a word-packed bitset covering every pixel of the
//! source buffer; a [Selection] wraps the mask with an identity, its tight
//! bounding box and a creation stamp.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Tight bounding box of the set pixels of a mask, in pixel coordinates.
/// All-zero when the mask is empty.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bounds {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

impl Bounds {
    /// True when no pixel is covered.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Word-packed bitset over `width * height` pixels, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionMask {
    width: usize,
    height: usize,
    words: Vec<u64>,
}

impl SelectionMask {
    /// Creates an empty mask for a buffer of the given dimensions.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            words: vec![0u64; (width * height).div_ceil(64)],
        }
    }

    /// Packs a row-major boolean map into a mask.
    pub fn from_bools(width: usize, height: usize, bits: &[bool]) -> Self {
        debug_assert_eq!(bits.len(), width * height);
        let mut mask = Self::new(width, height);
        for (i, &on) in bits.iter().enumerate() {
            if on {
                mask.words[i / 64] |= 1 << (i % 64);
            }
        }
        mask
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// True when the pixel is selected. Out-of-range coordinates read as
    /// unselected.
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        let i = y * self.width + x;
        self.words[i / 64] >> (i % 64) & 1 == 1
    }

    /// Marks an in-range pixel as selected.
    #[inline]
    pub fn set(&mut self, x: usize, y: usize) {
        debug_assert!(x < self.width && y < self.height);
        let i = y * self.width + x;
        self.words[i / 64] |= 1 << (i % 64);
    }

    /// Number of selected pixels.
    pub fn count(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|&w| w == 0)
    }

    /// True when every selected pixel of `self` is also selected in
    /// `other`. Masks of different dimensions are never subsets.
    pub fn is_subset_of(&self, other: &SelectionMask) -> bool {
        self.width == other.width
            && self.height == other.height
            && self
                .words
                .iter()
                .zip(&other.words)
                .all(|(a, b)| a & !b == 0)
    }

    /// Tight bounding box of the selected pixels.
    pub fn bounds(&self) -> Bounds {
        let mut min_x = usize::MAX;
        let mut min_y = usize::MAX;
        let mut max_x = 0usize;
        let mut max_y = 0usize;
        let mut any = false;

        for y in 0..self.height {
            for x in 0..self.width {
                if self.get(x, y) {
                    any = true;
                    min_x = min_x.min(x);
                    min_y = min_y.min(y);
                    max_x = max_x.max(x);
                    max_y = max_y.max(y);
                }
            }
        }

        if !any {
            return Bounds::default();
        }
        Bounds {
            x: min_x,
            y: min_y,
            width: max_x - min_x + 1,
            height: max_y - min_y + 1,
        }
    }

    /// Expands the mask to one byte per pixel (255 selected, 0 not) for
    /// host interop, e.g. painting a canvas overlay.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = vec![0u8; self.width * self.height];
        for (i, byte) in out.iter_mut().enumerate() {
            if self.words[i / 64] >> (i % 64) & 1 == 1 {
                *byte = 255;
            }
        }
        out
    }
}

/// A finished selection: identity, packed pixel mask, tight bounds and the
/// caller-clock stamp it was created at.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub id: Uuid,
    pub mask: SelectionMask,
    pub bounds: Bounds,
    pub created_at_ms: u64,
}

impl Selection {
    /// Mints a selection from a mask, computing its tight bounds.
    ///
    /// `created_at_ms` comes from the caller's clock; the engine never
    /// reads one itself.
    pub fn from_mask(mask: SelectionMask, created_at_ms: u64) -> Self {
        let bounds = mask.bounds();
        Self {
            id: Uuid::new_v4(),
            mask,
            bounds,
            created_at_ms,
        }
    }

    /// Number of selected pixels.
    pub fn pixel_count(&self) -> usize {
        self.mask.count()
    }

    pub fn is_empty(&self) -> bool {
        self.mask.is_empty()
    }
}

// ============================================================================
// Tests
// ============================================================================
