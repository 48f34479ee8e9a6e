//! Magic wand region growing.
//!
//! Selects pixels whose color distance to a seed pixel stays within a
//! tolerance, either as a contiguous flood-filled region or as a global
//! whole-buffer scan. Distance is measured in the settings' color space;
//! the seed always belongs to its own selection.

use std::collections::VecDeque;

use log::debug;
use rayon::prelude::*;

use crate::color::{component_distance, ColorSpace};
use crate::error::SelectionError;
use crate::raster::{Point, RasterView};
use crate::selection::mask::{Selection, SelectionMask};
use crate::settings::{Connectivity, ToleranceSettings};

/// Grows a selection from `seed` under `settings`.
///
/// `now_ms` stamps the resulting selection; it comes from the caller's
/// clock. The seed is validated against the buffer, never clamped.
///
/// # Arguments
/// * `data` - Interleaved RGBA bytes, `width * height * 4` long
/// * `width` - Buffer width in pixels
/// * `height` - Buffer height in pixels
/// * `seed` - Starting pixel; must lie inside the buffer
/// * `settings` - Tolerance, color space, adjacency and fill mode
/// * `now_ms` - Caller clock for the selection's creation stamp
pub fn region_grow(
    data: &[u8],
    width: usize,
    height: usize,
    seed: Point,
    settings: &ToleranceSettings,
    now_ms: u64,
) -> Result<Selection, SelectionError> {
    let raster = RasterView::new(data, width, height)?;
    let mask = grow_mask(&raster, seed, settings)?;
    let selection = Selection::from_mask(mask, now_ms);
    debug!(
        "magic wand at ({}, {}): {} px, bounds {:?}",
        seed.x,
        seed.y,
        selection.pixel_count(),
        selection.bounds
    );
    Ok(selection)
}

/// Region-growing mask without the selection envelope.
pub(crate) fn grow_mask(
    raster: &RasterView,
    seed: Point,
    settings: &ToleranceSettings,
) -> Result<SelectionMask, SelectionError> {
    settings.validate()?;
    raster.require(seed)?;

    let mask = if settings.contiguous {
        flood_fill(
            raster,
            seed,
            settings.tolerance,
            settings.color_space,
            settings.connectivity,
            None,
        )
    } else {
        global_scan(raster, seed, settings.tolerance, settings.color_space)
    };
    Ok(mask)
}

/// Radius-limited preview fill around the lasso cursor.
///
/// Plain RGB distance with 4-connectivity; pixels farther than `radius`
/// from the cursor are never visited.
pub(crate) fn hover_fill(
    raster: &RasterView,
    cursor: Point,
    tolerance: f32,
    radius: f32,
) -> SelectionMask {
    flood_fill(
        raster,
        cursor,
        tolerance,
        ColorSpace::Rgb,
        Connectivity::Four,
        Some(radius),
    )
}

/// Breadth-first flood fill from `seed`.
///
/// Pixels are marked visited when enqueued and tested against the seed
/// color when dequeued; only accepted pixels propagate to their neighbors.
/// With `max_radius` the fill also stops at pixels farther than that
/// distance from the seed.
fn flood_fill(
    raster: &RasterView,
    seed: Point,
    tolerance: f32,
    color_space: ColorSpace,
    connectivity: Connectivity,
    max_radius: Option<f32>,
) -> SelectionMask {
    let width = raster.width();
    let height = raster.height();
    let mut mask = SelectionMask::new(width, height);
    let mut visited = vec![false; width * height];

    let seed_color = color_space.convert(raster.rgb(seed.x as usize, seed.y as usize));

    let mut queue = VecDeque::new();
    visited[raster.index(seed.x as usize, seed.y as usize)] = true;
    queue.push_back(seed);

    while let Some(p) = queue.pop_front() {
        let (x, y) = (p.x as usize, p.y as usize);
        let color = color_space.convert(raster.rgb(x, y));
        if component_distance(seed_color, color) > tolerance {
            continue;
        }
        mask.set(x, y);

        for &(dx, dy) in connectivity.offsets() {
            let neighbor = Point::new(p.x + dx, p.y + dy);
            if !raster.contains(neighbor) {
                continue;
            }
            let ni = raster.index(neighbor.x as usize, neighbor.y as usize);
            if visited[ni] {
                continue;
            }
            if let Some(r) = max_radius {
                if neighbor.distance(seed) > r {
                    continue;
                }
            }
            visited[ni] = true;
            queue.push_back(neighbor);
        }
    }

    mask
}

/// Whole-buffer scan: adjacency is ignored, every pixel within tolerance of
/// the seed color is selected.
fn global_scan(
    raster: &RasterView,
    seed: Point,
    tolerance: f32,
    color_space: ColorSpace,
) -> SelectionMask {
    let seed_color = color_space.convert(raster.rgb(seed.x as usize, seed.y as usize));
    let bits: Vec<bool> = raster
        .data()
        .par_chunks_exact(4)
        .map(|px| {
            let color = color_space.convert([px[0], px[1], px[2]]);
            component_distance(seed_color, color) <= tolerance
        })
        .collect();
    SelectionMask::from_bools(raster.width(), raster.height(), &bits)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn uniform(width: usize, height: usize, rgb: [u8; 3]) -> Vec<u8> {
        let mut data = Vec::with_capacity(width * height * 4);
        for _ in 0..width * height {
            data.extend_from_slice(&[rgb[0], rgb[1], rgb[2], 255]);
        }
        data
    }

    /// Columns left of `split` get `left`, the rest `right`.
    fn two_tone(
        width: usize,
        height: usize,
        split: usize,
        left: [u8; 3],
        right: [u8; 3],
    ) -> Vec<u8> {
        let mut data = Vec::with_capacity(width * height * 4);
        for _ in 0..height {
            for x in 0..width {
                let rgb = if x < split { left } else { right };
                data.extend_from_slice(&[rgb[0], rgb[1], rgb[2], 255]);
            }
        }
        data
    }

    fn set_pixel(data: &mut [u8], width: usize, x: usize, y: usize, rgb: [u8; 3]) {
        let i = (y * width + x) * 4;
        data[i] = rgb[0];
        data[i + 1] = rgb[1];
        data[i + 2] = rgb[2];
    }

    fn grow(
        data: &[u8],
        width: usize,
        height: usize,
        seed: Point,
        settings: &ToleranceSettings,
    ) -> Selection {
        region_grow(data, width, height, seed, settings, 0).unwrap()
    }

    #[test]
    fn test_uniform_buffer_selects_everything() {
        let data = uniform(10, 10, [120, 80, 40]);
        let settings = ToleranceSettings {
            tolerance: 0.0,
            ..Default::default()
        };
        let selection = grow(&data, 10, 10, Point::new(5, 5), &settings);

        assert_eq!(selection.pixel_count(), 100);
        assert_eq!(selection.bounds.x, 0);
        assert_eq!(selection.bounds.y, 0);
        assert_eq!(selection.bounds.width, 10);
        assert_eq!(selection.bounds.height, 10);
    }

    #[test]
    fn test_two_tone_selects_one_half() {
        let data = two_tone(10, 10, 5, [20, 20, 20], [220, 220, 220]);
        let settings = ToleranceSettings {
            tolerance: 30.0,
            ..Default::default()
        };
        let selection = grow(&data, 10, 10, Point::new(2, 4), &settings);

        assert_eq!(selection.pixel_count(), 50);
        assert_eq!(selection.bounds.width, 5);
        assert_eq!(selection.bounds.height, 10);
        assert!(selection.mask.get(0, 0));
        assert!(selection.mask.get(4, 9));
        assert!(!selection.mask.get(5, 0));
    }

    #[test]
    fn test_color_island_selected_exactly() {
        // red 5x5 block on blue ground; the fill stops at the color border
        let mut data = uniform(8, 8, [0, 0, 255]);
        for y in 0..5 {
            for x in 0..5 {
                set_pixel(&mut data, 8, x, y, [255, 0, 0]);
            }
        }
        let settings = ToleranceSettings {
            tolerance: 10.0,
            ..Default::default()
        };
        let selection = grow(&data, 8, 8, Point::new(2, 2), &settings);

        assert_eq!(selection.pixel_count(), 25);
        assert_eq!(selection.bounds.x, 0);
        assert_eq!(selection.bounds.y, 0);
        assert_eq!(selection.bounds.width, 5);
        assert_eq!(selection.bounds.height, 5);
        for y in 0..8 {
            for x in 0..8 {
                assert_eq!(selection.mask.get(x, y), x < 5 && y < 5, "({x}, {y})");
            }
        }
    }

    #[test]
    fn test_seed_always_selected() {
        let mut data = uniform(5, 5, [0, 0, 0]);
        set_pixel(&mut data, 5, 2, 2, [255, 0, 0]); // isolated odd pixel
        let settings = ToleranceSettings {
            tolerance: 0.0,
            ..Default::default()
        };
        let selection = grow(&data, 5, 5, Point::new(2, 2), &settings);

        assert!(selection.mask.get(2, 2));
        assert_eq!(selection.pixel_count(), 1);
    }

    #[test]
    fn test_tolerance_monotonicity() {
        // gradient strip: each column 25 levels brighter
        let mut data = uniform(8, 3, [0, 0, 0]);
        for y in 0..3 {
            for x in 0..8 {
                let v = (x * 25) as u8;
                set_pixel(&mut data, 8, x, y, [v, v, v]);
            }
        }
        let seed = Point::new(0, 1);

        let mut previous: Option<SelectionMask> = None;
        for tolerance in [0.0, 50.0, 100.0, 200.0, 400.0] {
            let settings = ToleranceSettings {
                tolerance,
                ..Default::default()
            };
            let selection = grow(&data, 8, 3, seed, &settings);
            if let Some(prev) = &previous {
                assert!(
                    prev.is_subset_of(&selection.mask),
                    "tolerance {tolerance} shrank the mask"
                );
            }
            previous = Some(selection.mask);
        }
    }

    #[test]
    fn test_four_connectivity_is_subset_of_eight() {
        // diagonal line of bright pixels on dark ground: 8-connectivity
        // walks the diagonal, 4-connectivity stays on the seed
        let mut data = uniform(6, 6, [0, 0, 0]);
        for i in 0..6 {
            set_pixel(&mut data, 6, i, i, [200, 200, 200]);
        }

        let four = grow(
            &data,
            6,
            6,
            Point::new(0, 0),
            &ToleranceSettings {
                tolerance: 10.0,
                connectivity: Connectivity::Four,
                ..Default::default()
            },
        );
        let eight = grow(
            &data,
            6,
            6,
            Point::new(0, 0),
            &ToleranceSettings {
                tolerance: 10.0,
                connectivity: Connectivity::Eight,
                ..Default::default()
            },
        );

        assert_eq!(four.pixel_count(), 1);
        assert_eq!(eight.pixel_count(), 6);
        assert!(four.mask.is_subset_of(&eight.mask));
    }

    #[test]
    fn test_global_scan_ignores_adjacency() {
        // checkerboard: contiguous fill stays on the seed square, global
        // scan picks up every square of the same color
        let mut data = uniform(6, 6, [0, 0, 0]);
        for y in 0..6 {
            for x in 0..6 {
                if (x + y) % 2 == 0 {
                    set_pixel(&mut data, 6, x, y, [255, 255, 255]);
                }
            }
        }

        let contiguous = grow(
            &data,
            6,
            6,
            Point::new(0, 0),
            &ToleranceSettings {
                tolerance: 10.0,
                ..Default::default()
            },
        );
        let global = grow(
            &data,
            6,
            6,
            Point::new(0, 0),
            &ToleranceSettings {
                tolerance: 10.0,
                contiguous: false,
                ..Default::default()
            },
        );

        assert_eq!(contiguous.pixel_count(), 1);
        assert_eq!(global.pixel_count(), 18);
        assert!(contiguous.mask.is_subset_of(&global.mask));
    }

    #[test]
    fn test_global_scan_matches_fill_on_uniform_buffer() {
        // with no color border to stop at, adjacency does not matter
        let data = uniform(10, 10, [200, 40, 40]);
        let settings = ToleranceSettings {
            tolerance: 0.0,
            ..Default::default()
        };
        let contiguous = grow(&data, 10, 10, Point::new(5, 5), &settings);
        let global = grow(
            &data,
            10,
            10,
            Point::new(5, 5),
            &ToleranceSettings {
                contiguous: false,
                ..settings
            },
        );

        assert_eq!(global.pixel_count(), 100);
        assert_eq!(contiguous.mask, global.mask);
    }

    #[test]
    fn test_lab_space_separates_halves() {
        let data = two_tone(10, 4, 5, [0, 0, 0], [255, 255, 255]);
        let settings = ToleranceSettings {
            tolerance: 50.0,
            color_space: ColorSpace::Lab,
            ..Default::default()
        };
        // black-to-white is ~100 in L, far above tolerance 50
        let selection = grow(&data, 10, 4, Point::new(1, 1), &settings);
        assert_eq!(selection.pixel_count(), 20);
    }

    #[test]
    fn test_out_of_bounds_seed_rejected() {
        let data = uniform(4, 4, [0, 0, 0]);
        for seed in [Point::new(-1, 0), Point::new(4, 0), Point::new(0, 4)] {
            let err =
                region_grow(&data, 4, 4, seed, &ToleranceSettings::default(), 0).unwrap_err();
            assert!(matches!(err, SelectionError::OutOfBounds { .. }), "{seed:?}");
        }
    }

    #[test]
    fn test_empty_buffer_rejected() {
        let err = region_grow(&[], 0, 0, Point::new(0, 0), &ToleranceSettings::default(), 0)
            .unwrap_err();
        assert_eq!(err, SelectionError::EmptyBuffer);
    }

    #[test]
    fn test_invalid_settings_rejected_before_work() {
        let data = uniform(4, 4, [0, 0, 0]);
        let settings = ToleranceSettings {
            tolerance: -3.0,
            ..Default::default()
        };
        let err = region_grow(&data, 4, 4, Point::new(0, 0), &settings, 0).unwrap_err();
        assert!(matches!(err, SelectionError::InvalidSettings { .. }));
    }

    #[test]
    fn test_determinism() {
        let data = two_tone(12, 12, 6, [10, 40, 90], [200, 180, 160]);
        let settings = ToleranceSettings {
            tolerance: 60.0,
            color_space: ColorSpace::Hsv,
            contiguous: false,
            ..Default::default()
        };
        let a = grow(&data, 12, 12, Point::new(2, 2), &settings);
        let b = grow(&data, 12, 12, Point::new(2, 2), &settings);

        assert_eq!(a.mask, b.mask);
        assert_eq!(a.bounds, b.bounds);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_hover_fill_respects_radius() {
        let data = uniform(11, 11, [90, 90, 90]);
        let raster = RasterView::new(&data, 11, 11).unwrap();
        let mask = hover_fill(&raster, Point::new(5, 5), 10.0, 2.0);

        // euclidean disc of radius 2 on a uniform field: 13 pixels
        assert_eq!(mask.count(), 13);
        assert!(mask.get(5, 5));
        assert!(mask.get(5, 3));
        assert!(!mask.get(7, 6));
        assert!(!mask.get(8, 5));
    }
}
