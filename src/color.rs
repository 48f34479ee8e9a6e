//! Color space conversions and distance metrics.
//!
//! Selection tolerance is measured as Euclidean distance between component
//! vectors in a chosen space. RGB compares raw channels, HSV separates hue
//! and saturation from brightness, and LAB approximates perceptual
//! difference under a D65 white point.

use serde::{Deserialize, Serialize};

/// Color space a tolerance comparison runs in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorSpace {
    #[default]
    Rgb,
    Hsv,
    Lab,
}

impl ColorSpace {
    /// Converts an RGB triple into this space's component vector.
    ///
    /// RGB passes channels through as 0..255 floats; HSV yields hue in
    /// degrees (0..360) with saturation and value in percent; LAB yields
    /// (L, a, b).
    #[inline]
    pub fn convert(&self, rgb: [u8; 3]) -> [f32; 3] {
        match self {
            ColorSpace::Rgb => [rgb[0] as f32, rgb[1] as f32, rgb[2] as f32],
            ColorSpace::Hsv => rgb_to_hsv(rgb),
            ColorSpace::Lab => rgb_to_lab(rgb),
        }
    }

    /// Euclidean distance between two RGB pixels measured in this space.
    ///
    /// Both endpoints are converted first; components of different spaces
    /// are never mixed.
    pub fn distance(&self, a: [u8; 3], b: [u8; 3]) -> f32 {
        component_distance(self.convert(a), self.convert(b))
    }
}

/// Euclidean distance between two already-converted component vectors.
#[inline]
pub fn component_distance(a: [f32; 3], b: [f32; 3]) -> f32 {
    let d0 = a[0] - b[0];
    let d1 = a[1] - b[1];
    let d2 = a[2] - b[2];
    (d0 * d0 + d1 * d1 + d2 * d2).sqrt()
}

/// Converts 8-bit RGB to HSV: hue in degrees (0..360), saturation and value
/// in percent (0..100). Achromatic input yields hue 0.
#[inline]
pub fn rgb_to_hsv([r, g, b]: [u8; 3]) -> [f32; 3] {
    let r = r as f32 / 255.0;
    let g = g as f32 / 255.0;
    let b = b as f32 / 255.0;

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    let h = if delta == 0.0 {
        0.0
    } else if max == r {
        // +6 keeps the quotient positive before the wrap
        60.0 * (((g - b) / delta + 6.0) % 6.0)
    } else if max == g {
        60.0 * ((b - r) / delta + 2.0)
    } else {
        60.0 * ((r - g) / delta + 4.0)
    };
    let s = if max == 0.0 { 0.0 } else { delta / max * 100.0 };
    let v = max * 100.0;

    [h, s, v]
}

/// Converts 8-bit sRGB to CIELAB under a D65 white point.
#[inline]
pub fn rgb_to_lab([r, g, b]: [u8; 3]) -> [f32; 3] {
    let linear = |c: f32| {
        if c > 0.04045 {
            ((c + 0.055) / 1.055).powf(2.4)
        } else {
            c / 12.92
        }
    };
    let r = linear(r as f32 / 255.0);
    let g = linear(g as f32 / 255.0);
    let b = linear(b as f32 / 255.0);

    // sRGB -> XYZ (D65), normalized by the reference white
    let x = (r * 0.4124 + g * 0.3576 + b * 0.1805) / 0.95047;
    let y = (r * 0.2126 + g * 0.7152 + b * 0.0722) / 1.0;
    let z = (r * 0.0193 + g * 0.1192 + b * 0.9505) / 1.08883;

    let f = |t: f32| {
        if t > 0.008856 {
            t.powf(1.0 / 3.0)
        } else {
            7.787 * t + 16.0 / 116.0
        }
    };
    let fx = f(x);
    let fy = f(y);
    let fz = f(z);

    [116.0 * fy - 16.0, 500.0 * (fx - fy), 200.0 * (fy - fz)]
}

// ============================================================================
// Tests
// ============================================================================
