//! Live-wire path extension between consecutive cursor samples.
//!
//! The default strategy walks the straight Bresenham segment and
//! probabilistically redirects intermediate candidates onto nearby edge
//! pixels; the probability peaks when cursor motion runs perpendicular to
//! the dominant gradient, i.e. along the image edge. This is a local greedy
//! walk by design, not a global shortest-path search. The alternate
//! [GlobalSearch](crate::settings::PathfindingMode::GlobalSearch) mode runs
//! A* over the whole buffer instead, pricing moves by grayscale similarity.

use crate::raster::{Point, RasterView};
use crate::selection::edge_field::EdgeCostField;

/// Distance within which a path candidate may snap to an edge pixel.
pub(crate) const SNAP_DISTANCE: f32 = 3.0;

// ============================================================================
// Snap randomness
// ============================================================================

/// MINSTD linear congruential generator.
///
/// Snap decisions draw from a session-owned generator seeded by the
/// gesture's start point, so a gesture replayed with identical inputs
/// produces an identical path.
#[derive(Debug, Clone)]
pub(crate) struct SnapRng {
    state: u64,
}

impl SnapRng {
    pub(crate) fn new(seed: u64) -> Self {
        Self {
            state: seed.wrapping_add(1),
        }
    }

    fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_mul(48271).wrapping_add(1) % 2147483647;
        self.state as u32
    }

    /// Uniform value in [0, 1).
    pub(crate) fn next_f32(&mut self) -> f32 {
        self.next_u32() as f32 / 2147483647.0
    }
}

// ============================================================================
// Perpendicular bias
// ============================================================================

/// Probability that a candidate within snap distance of an edge pixel is
/// redirected onto it.
///
/// Directions fold together mod 180 (edge orientation is undirected). The
/// probability peaks at `perp_bias` when motion is perpendicular to the
/// dominant gradient and falls off as a Gaussian with width
/// `falloff_sigma_deg`.
pub fn perp_cost(
    motion_angle_deg: f32,
    dominant_angle_deg: f32,
    perp_bias: f32,
    falloff_sigma_deg: f32,
) -> f32 {
    let diff = (motion_angle_deg - dominant_angle_deg).abs();
    let angle_diff = diff.min(180.0 - diff);
    let perp_diff = (90.0 - angle_diff).abs();
    perp_bias * (-(perp_diff * perp_diff) / (2.0 * falloff_sigma_deg * falloff_sigma_deg)).exp()
}

// ============================================================================
// Segment interpolation
// ============================================================================

/// Integer points of the straight segment from `from` to `to`, inclusive.
pub fn bresenham(from: Point, to: Point) -> Vec<Point> {
    let mut points = Vec::new();
    let dx = (to.x - from.x).abs();
    let dy = -(to.y - from.y).abs();
    let sx = if from.x < to.x { 1 } else { -1 };
    let sy = if from.y < to.y { 1 } else { -1 };
    let mut err = dx + dy;
    let (mut x, mut y) = (from.x, from.y);

    loop {
        points.push(Point::new(x, y));
        if x == to.x && y == to.y {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
    points
}

/// Walks the segment from `from` to `to`, redirecting intermediate
/// candidates onto nearby edge pixels with probability `snap_probability`.
///
/// Endpoints stay fixed so consecutive segments remain connected; the
/// session appends `result[1..]`. One uniform draw is consumed per
/// candidate that has an edge in range. An empty field returns the straight
/// segment untouched.
pub(crate) fn find_path(
    from: Point,
    to: Point,
    field: &EdgeCostField,
    snap_probability: f32,
    rng: &mut SnapRng,
) -> Vec<Point> {
    let mut path = bresenham(from, to);
    if path.len() <= 2 || field.is_empty() {
        return path;
    }

    let last = path.len() - 1;
    for candidate in &mut path[1..last] {
        if let Some(edge) = field.nearest_within(*candidate, SNAP_DISTANCE) {
            if rng.next_f32() < snap_probability {
                *candidate = edge.point;
            }
        }
    }
    path
}

// ============================================================================
// Global A* mode
// ============================================================================

/// A* over the whole buffer, stepping 8-connected and pricing each move by
/// grayscale similarity: `255 - |gray(a) - gray(b)|`, so the cheapest path
/// hugs contrast boundaries. The Manhattan heuristic matches the cost
/// scale. Falls back to the straight segment if the frontier exhausts.
pub(crate) fn find_path_global(raster: &RasterView, from: Point, to: Point) -> Vec<Point> {
    use std::cmp::Reverse;
    use std::collections::BinaryHeap;

    if from == to {
        return vec![from];
    }

    let width = raster.width();
    let height = raster.height();
    let index = |p: Point| p.y as usize * width + p.x as usize;

    // costs scaled to integer milli-units so the heap stays totally ordered
    let scale = |c: f32| (c * 1024.0) as u64;
    let heuristic =
        |p: Point| ((p.x - to.x).abs() + (p.y - to.y).abs()) as u64 * scale(1.0);

    let mut g_score = vec![u64::MAX; width * height];
    let mut came_from = vec![usize::MAX; width * height];
    let mut closed = vec![false; width * height];
    let mut open: BinaryHeap<Reverse<(u64, u64, i32, i32)>> = BinaryHeap::new();
    let mut seq = 0u64; // insertion order breaks cost ties deterministically

    g_score[index(from)] = 0;
    open.push(Reverse((heuristic(from), seq, from.x, from.y)));

    const STEPS: [(i32, i32); 8] = [
        (1, 0),
        (-1, 0),
        (0, 1),
        (0, -1),
        (1, 1),
        (1, -1),
        (-1, 1),
        (-1, -1),
    ];

    while let Some(Reverse((_, _, x, y))) = open.pop() {
        let current = Point::new(x, y);
        let ci = index(current);
        if closed[ci] {
            continue;
        }
        closed[ci] = true;

        if current == to {
            // walk the parent chain back to the start
            let mut path = vec![current];
            let mut i = ci;
            while came_from[i] != usize::MAX {
                i = came_from[i];
                path.push(Point::new((i % width) as i32, (i / width) as i32));
            }
            path.reverse();
            return path;
        }

        let current_gray = raster.gray(x as usize, y as usize);
        for &(dx, dy) in &STEPS {
            let neighbor = Point::new(x + dx, y + dy);
            if !raster.contains(neighbor) {
                continue;
            }
            let ni = index(neighbor);
            if closed[ni] {
                continue;
            }
            let step_cost =
                255.0 - (current_gray - raster.gray(neighbor.x as usize, neighbor.y as usize)).abs();
            let tentative = g_score[ci].saturating_add(scale(step_cost));
            if tentative < g_score[ni] {
                g_score[ni] = tentative;
                came_from[ni] = ci;
                seq += 1;
                open.push(Reverse((
                    tentative.saturating_add(heuristic(neighbor)),
                    seq,
                    neighbor.x,
                    neighbor.y,
                )));
            }
        }
    }

    bresenham(from, to)
}

// ============================================================================
// Tests
// ============================================================================
