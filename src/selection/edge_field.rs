//! Window-bounded Sobel edge extraction.
//!
//! The lasso inspects a small square window around the cursor instead of
//! the whole buffer. Gradients are computed over unweighted grayscale, and
//! only pixels whose gradient magnitude clears a threshold enter the
//! result, keeping the field sparse.

use ndarray::Array2;

use crate::error::SelectionError;
use crate::raster::{Point, RasterView};

/// Horizontal Sobel kernel (responds to vertical boundaries).
const SOBEL_X: [[f32; 3]; 3] = [[-1.0, 0.0, 1.0], [-2.0, 0.0, 2.0], [-1.0, 0.0, 1.0]];

/// Vertical Sobel kernel (responds to horizontal boundaries).
const SOBEL_Y: [[f32; 3]; 3] = [[-1.0, -2.0, -1.0], [0.0, 0.0, 0.0], [1.0, 2.0, 1.0]];

/// Default gradient magnitude a pixel must exceed to count as an edge.
pub const DEFAULT_EDGE_THRESHOLD: f32 = 20.0;

/// A pixel whose gradient magnitude cleared the edge threshold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgePixel {
    pub point: Point,
    /// Gradient magnitude `sqrt(gx^2 + gy^2)`.
    pub strength: f32,
    /// Gradient direction `atan2(gy, gx)` in degrees, (-180, 180].
    pub angle_deg: f32,
}

/// Sparse edge set of one cursor window, in row-major scan order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EdgeCostField {
    edges: Vec<EdgePixel>,
}

impl EdgeCostField {
    /// Extracts edges inside a square window of half-extent `radius` around
    /// `center`.
    ///
    /// The window is clipped to the buffer. Pixels on the clipped window's
    /// outermost ring are skipped because the 3x3 kernel does not fit; they
    /// are never zero-padded.
    ///
    /// # Arguments
    /// * `raster` - Source pixels
    /// * `center` - Window center; must lie inside the buffer
    /// * `radius` - Window half-extent in pixels, at least 1
    /// * `threshold` - Gradient magnitude cutoff
    pub fn compute(
        raster: &RasterView,
        center: Point,
        radius: u32,
        threshold: f32,
    ) -> Result<Self, SelectionError> {
        raster.require(center)?;
        if radius == 0 {
            return Err(SelectionError::invalid("radius", "must be at least 1"));
        }

        let x0 = (center.x - radius as i32).max(0) as usize;
        let y0 = (center.y - radius as i32).max(0) as usize;
        let x1 = (center.x + radius as i32).min(raster.width() as i32 - 1) as usize;
        let y1 = (center.y + radius as i32).min(raster.height() as i32 - 1) as usize;

        let win_w = x1 - x0 + 1;
        let win_h = y1 - y0 + 1;

        // Stage the window as grayscale once; the kernel taps each value up
        // to nine times.
        let gray = Array2::from_shape_fn((win_h, win_w), |(wy, wx)| raster.gray(x0 + wx, y0 + wy));

        let mut edges = Vec::new();
        if win_w >= 3 && win_h >= 3 {
            for wy in 1..win_h - 1 {
                for wx in 1..win_w - 1 {
                    let mut gx = 0.0f32;
                    let mut gy = 0.0f32;
                    for ky in 0..3 {
                        for kx in 0..3 {
                            let v = gray[(wy + ky - 1, wx + kx - 1)];
                            gx += v * SOBEL_X[ky][kx];
                            gy += v * SOBEL_Y[ky][kx];
                        }
                    }
                    let strength = (gx * gx + gy * gy).sqrt();
                    if strength > threshold {
                        edges.push(EdgePixel {
                            point: Point::new((x0 + wx) as i32, (y0 + wy) as i32),
                            strength,
                            angle_deg: gy.atan2(gx).to_degrees(),
                        });
                    }
                }
            }
        }

        Ok(Self { edges })
    }

    /// Edge pixels in row-major scan order.
    pub fn edges(&self) -> &[EdgePixel] {
        &self.edges
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Most frequent gradient direction, in whole degrees.
    ///
    /// Angles are binned to whole degrees before counting; ties keep the
    /// direction seen first. Returns 0.0 for an empty field, which callers
    /// must treat as "no directional information", not as a horizontal
    /// gradient.
    pub fn dominant_angle_deg(&self) -> f32 {
        if self.edges.is_empty() {
            return 0.0;
        }

        // counted in scan order so ties resolve to the first bin seen
        let mut bins: Vec<(i32, u32)> = Vec::new();
        for edge in &self.edges {
            let bin = edge.angle_deg.round() as i32;
            match bins.iter_mut().find(|(b, _)| *b == bin) {
                Some((_, n)) => *n += 1,
                None => bins.push((bin, 1)),
            }
        }

        let mut best = bins[0];
        for &candidate in &bins[1..] {
            if candidate.1 > best.1 {
                best = candidate;
            }
        }
        best.0 as f32
    }

    /// Mean gradient magnitude, 0.0 for an empty field.
    pub fn mean_strength(&self) -> f32 {
        if self.edges.is_empty() {
            return 0.0;
        }
        self.edges.iter().map(|e| e.strength).sum::<f32>() / self.edges.len() as f32
    }

    /// First edge within `max_dist` pixels of `p`, in scan order.
    pub(crate) fn nearest_within(&self, p: Point, max_dist: f32) -> Option<&EdgePixel> {
        self.edges.iter().find(|e| e.point.distance(p) < max_dist)
    }
}

/// Computes the edge field around `center` with the default threshold.
pub fn edge_field(
    data: &[u8],
    width: usize,
    height: usize,
    center: Point,
    radius: u32,
) -> Result<EdgeCostField, SelectionError> {
    let raster = RasterView::new(data, width, height)?;
    EdgeCostField::compute(&raster, center, radius, DEFAULT_EDGE_THRESHOLD)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    /// Buffer split into a dark left half and bright right half at `split`.
    fn vertical_step(width: usize, height: usize, split: usize) -> Vec<u8> {
        let mut data = vec![0u8; width * height * 4];
        for y in 0..height {
            for x in 0..width {
                let v = if x < split { 10 } else { 250 };
                let i = (y * width + x) * 4;
                data[i] = v;
                data[i + 1] = v;
                data[i + 2] = v;
                data[i + 3] = 255;
            }
        }
        data
    }

    fn uniform(width: usize, height: usize, v: u8) -> Vec<u8> {
        let mut data = vec![v; width * height * 4];
        for px in data.chunks_exact_mut(4) {
            px[3] = 255;
        }
        data
    }

    #[test]
    fn test_vertical_step_yields_horizontal_gradient() {
        let data = vertical_step(11, 11, 5);
        let raster = RasterView::new(&data, 11, 11).unwrap();
        let field = EdgeCostField::compute(&raster, Point::new(5, 5), 4, 20.0).unwrap();

        assert!(!field.is_empty());
        // the step sits between columns 4 and 5, so only those columns react
        for edge in field.edges() {
            assert!(edge.point.x == 4 || edge.point.x == 5, "{:?}", edge.point);
            assert!((edge.strength - 960.0).abs() < 1.0, "{}", edge.strength);
            assert!(edge.angle_deg.abs() < 1e-3, "{}", edge.angle_deg);
        }
        assert_eq!(field.dominant_angle_deg(), 0.0);
    }

    #[test]
    fn test_horizontal_step_yields_vertical_gradient() {
        // dark top, bright bottom: gradient points down (+y)
        let mut data = vec![0u8; 11 * 11 * 4];
        for y in 0..11 {
            for x in 0..11 {
                let v = if y < 5 { 10 } else { 250 };
                let i = (y * 11 + x) * 4;
                data[i] = v;
                data[i + 1] = v;
                data[i + 2] = v;
                data[i + 3] = 255;
            }
        }
        let raster = RasterView::new(&data, 11, 11).unwrap();
        let field = EdgeCostField::compute(&raster, Point::new(5, 5), 4, 20.0).unwrap();

        assert!(!field.is_empty());
        for edge in field.edges() {
            assert!((edge.angle_deg - 90.0).abs() < 1e-3, "{}", edge.angle_deg);
        }
        assert_eq!(field.dominant_angle_deg(), 90.0);
    }

    #[test]
    fn test_flat_buffer_has_no_edges() {
        let data = uniform(9, 9, 128);
        let raster = RasterView::new(&data, 9, 9).unwrap();
        let field = EdgeCostField::compute(&raster, Point::new(4, 4), 3, 20.0).unwrap();

        assert!(field.is_empty());
        assert_eq!(field.dominant_angle_deg(), 0.0);
        assert_eq!(field.mean_strength(), 0.0);
    }

    #[test]
    fn test_threshold_filters_edges() {
        let data = vertical_step(11, 11, 5);
        let raster = RasterView::new(&data, 11, 11).unwrap();

        let low = EdgeCostField::compute(&raster, Point::new(5, 5), 4, 20.0).unwrap();
        let high = EdgeCostField::compute(&raster, Point::new(5, 5), 4, 2000.0).unwrap();
        assert!(!low.is_empty());
        assert!(high.is_empty());
    }

    #[test]
    fn test_window_ring_is_skipped() {
        let data = vertical_step(11, 11, 5);
        let raster = RasterView::new(&data, 11, 11).unwrap();

        // radius 1 leaves exactly one interior pixel: the center itself
        let field = EdgeCostField::compute(&raster, Point::new(4, 5), 1, 20.0).unwrap();
        assert_eq!(field.len(), 1);
        assert_eq!(field.edges()[0].point, Point::new(4, 5));

        // at the buffer corner the clipped window is 2x2: no interior at all
        let corner = EdgeCostField::compute(&raster, Point::new(0, 0), 1, 0.0).unwrap();
        assert!(corner.is_empty());
    }

    #[test]
    fn test_mean_strength() {
        let data = vertical_step(11, 11, 5);
        let raster = RasterView::new(&data, 11, 11).unwrap();
        let field = EdgeCostField::compute(&raster, Point::new(5, 5), 3, 20.0).unwrap();

        assert!((field.mean_strength() - 960.0).abs() < 1.0);
    }

    #[test]
    fn test_center_out_of_bounds_rejected() {
        let data = uniform(5, 5, 0);
        let raster = RasterView::new(&data, 5, 5).unwrap();

        let err = EdgeCostField::compute(&raster, Point::new(5, 2), 2, 20.0).unwrap_err();
        assert!(matches!(err, SelectionError::OutOfBounds { .. }));
    }

    #[test]
    fn test_zero_radius_rejected() {
        let data = uniform(5, 5, 0);
        let raster = RasterView::new(&data, 5, 5).unwrap();

        let err = EdgeCostField::compute(&raster, Point::new(2, 2), 0, 20.0).unwrap_err();
        assert!(matches!(
            err,
            SelectionError::InvalidSettings { field: "radius", .. }
        ));
    }

    #[test]
    fn test_dominant_angle_tie_breaks_first_seen() {
        let field = EdgeCostField {
            edges: vec![
                EdgePixel {
                    point: Point::new(0, 0),
                    strength: 50.0,
                    angle_deg: 45.2,
                },
                EdgePixel {
                    point: Point::new(1, 0),
                    strength: 50.0,
                    angle_deg: -90.1,
                },
                EdgePixel {
                    point: Point::new(2, 0),
                    strength: 50.0,
                    angle_deg: 44.9,
                },
            ],
        };
        // 45.2 and 44.9 share the 45-degree bin and outvote -90
        assert_eq!(field.dominant_angle_deg(), 45.0);

        let tie = EdgeCostField {
            edges: vec![
                EdgePixel {
                    point: Point::new(0, 0),
                    strength: 50.0,
                    angle_deg: 10.0,
                },
                EdgePixel {
                    point: Point::new(1, 0),
                    strength: 50.0,
                    angle_deg: 20.0,
                },
            ],
        };
        assert_eq!(tie.dominant_angle_deg(), 10.0);
    }

    #[test]
    fn test_nearest_within_scan_order() {
        let field = EdgeCostField {
            edges: vec![
                EdgePixel {
                    point: Point::new(3, 1),
                    strength: 40.0,
                    angle_deg: 0.0,
                },
                EdgePixel {
                    point: Point::new(3, 2),
                    strength: 80.0,
                    angle_deg: 0.0,
                },
            ],
        };
        // both are in range; scan order picks the first
        let hit = field.nearest_within(Point::new(2, 2), 3.0).unwrap();
        assert_eq!(hit.point, Point::new(3, 1));
        assert!(field.nearest_within(Point::new(9, 9), 3.0).is_none());
    }
}
