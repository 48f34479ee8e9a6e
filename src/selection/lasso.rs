//! Magic lasso gesture sessions.
//!
//! A session is an explicit state machine fed by the host's pointer events.
//! Every cursor sample extends the path along nearby image edges, refreshes
//! the trajectory estimate and hover preview, and may drop an anchor node;
//! finishing closes the loop and rasterizes the enclosed region into a
//! selection. All time enters through `now_ms` arguments (browser hosts
//! pass the pointer event timestamps), so a recorded gesture replays
//! exactly.

use log::{debug, trace};

use crate::error::SelectionError;
use crate::raster::{Point, RasterView};
use crate::selection::edge_field::EdgeCostField;
use crate::selection::live_wire::{self, SnapRng};
use crate::selection::magic_wand;
use crate::selection::mask::{Selection, SelectionMask};
use crate::settings::{LassoSettings, PathfindingMode};

/// Number of trailing path points the trajectory estimate looks at.
const TRAJECTORY_WINDOW: usize = 3;

/// Number of extrapolated points in the predictive path.
const PREDICTIVE_STEPS: usize = 15;

/// Lifecycle of a lasso gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LassoState {
    Idle,
    Drawing,
    Closed,
}

impl LassoState {
    fn name(&self) -> &'static str {
        match self {
            LassoState::Idle => "idle",
            LassoState::Drawing => "drawing",
            LassoState::Closed => "closed",
        }
    }
}

/// Smoothed cursor motion over the trailing path points.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Trajectory {
    pub dx: f32,
    pub dy: f32,
    /// `atan2(dy, dx)` in degrees.
    pub angle_deg: f32,
    /// Window displacement divided by the window length, in pixels per
    /// sample.
    pub velocity: f32,
}

/// Anchor confirmed along the path, with the edge context it was dropped in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Node {
    pub point: Point,
    pub timestamp_ms: u64,
    /// Dominant gradient direction of the cursor window at drop time.
    pub dominant_angle_deg: f32,
    /// Mean gradient magnitude of the window's edge list, 0.0 when the list
    /// was empty.
    pub edge_strength: f32,
}

/// What a single step changed, for host feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepOutcome {
    /// Points appended to the path by this sample.
    pub appended: usize,
    /// Whether this sample dropped an anchor node.
    pub node_dropped: bool,
}

/// An in-progress lasso gesture.
#[derive(Debug, Clone)]
pub struct LassoSession {
    state: LassoState,
    path: Vec<Point>,
    nodes: Vec<Node>,
    trajectory: Trajectory,
    hover_mask: SelectionMask,
    predictive_path: Vec<Point>,
    last_drop_ms: u64,
    last_sample_ms: u64,
    rng: SnapRng,
}

impl LassoSession {
    /// Begins a gesture at `seed`.
    ///
    /// `now_ms` is the host clock for this event; the first node cannot
    /// drop earlier than one full `node_drop_time_ms` after this moment.
    /// The snap generator is seeded from the start point, so identical
    /// gestures replay identically.
    pub fn start(
        data: &[u8],
        width: usize,
        height: usize,
        seed: Point,
        now_ms: u64,
    ) -> Result<Self, SelectionError> {
        let raster = RasterView::new(data, width, height)?;
        raster.require(seed)?;
        debug!("lasso start at ({}, {})", seed.x, seed.y);

        Ok(Self {
            state: LassoState::Drawing,
            path: vec![seed],
            nodes: Vec::new(),
            trajectory: Trajectory::default(),
            hover_mask: SelectionMask::new(width, height),
            predictive_path: Vec::new(),
            last_drop_ms: now_ms,
            last_sample_ms: now_ms,
            rng: SnapRng::new(gesture_seed(seed)),
        })
    }

    /// Feeds one cursor sample into the gesture.
    ///
    /// The order is fixed: extend the path along edges, re-estimate the
    /// trajectory, refresh the hover preview, evaluate the node-drop rule,
    /// then extrapolate the predictive path. An out-of-bounds cursor is
    /// rejected and leaves the session untouched.
    pub fn step(
        &mut self,
        data: &[u8],
        width: usize,
        height: usize,
        cursor: Point,
        settings: &LassoSettings,
        now_ms: u64,
    ) -> Result<StepOutcome, SelectionError> {
        self.require_state(LassoState::Drawing)?;
        settings.validate()?;
        let raster = RasterView::new(data, width, height)?;
        raster.require(cursor)?;

        let radius = settings.hover_radius.round() as u32;
        let field = EdgeCostField::compute(&raster, cursor, radius, settings.edge_threshold)?;

        // 1. extend the path; the perpendicular bias compares the motion
        //    estimated from previous samples against this window's edges
        let last = self.path[self.path.len() - 1];
        let segment = match settings.pathfinding {
            PathfindingMode::LocalSnap => {
                let snap_probability = live_wire::perp_cost(
                    self.trajectory.angle_deg,
                    field.dominant_angle_deg(),
                    settings.perp_bias,
                    settings.falloff_sigma_deg,
                );
                live_wire::find_path(last, cursor, &field, snap_probability, &mut self.rng)
            }
            PathfindingMode::GlobalSearch => live_wire::find_path_global(&raster, last, cursor),
        };
        let appended = segment.len() - 1;
        self.path.extend_from_slice(&segment[1..]);

        // 2. trajectory over the trailing window
        self.update_trajectory();

        // 3. hover preview around the cursor
        self.hover_mask = magic_wand::hover_fill(
            &raster,
            cursor,
            settings.hover_tolerance,
            settings.hover_radius,
        );

        // 4. node drop; both the time gate and the spacing gate must pass
        let node_dropped = self.try_drop_node(cursor, &field, settings, now_ms);

        // 5. predictive extrapolation
        self.predictive_path = if settings.predictive_mode {
            self.predict(cursor)
        } else {
            Vec::new()
        };

        self.last_sample_ms = now_ms;
        trace!(
            "lasso step to ({}, {}): +{} path points, node={}",
            cursor.x,
            cursor.y,
            appended,
            node_dropped
        );
        Ok(StepOutcome {
            appended,
            node_dropped,
        })
    }

    /// Closes the gesture and rasterizes the enclosed region.
    ///
    /// One more traced segment leads from the last path point back to the
    /// start point, then the loop is filled with an even-odd scanline pass
    /// over pixel centers; the path pixels themselves are included. Fewer
    /// than three path points, or an interior that rasterizes to nothing,
    /// is a degenerate gesture: the session resets to idle and no selection
    /// is produced. On success the session transitions to closed, keeping
    /// the closed path and nodes readable while the hover preview and
    /// predictive path are discarded.
    pub fn finish(
        &mut self,
        data: &[u8],
        width: usize,
        height: usize,
        settings: &LassoSettings,
        now_ms: u64,
    ) -> Result<Selection, SelectionError> {
        self.require_state(LassoState::Drawing)?;
        settings.validate()?;
        let raster = RasterView::new(data, width, height)?;

        if self.path.len() <= 2 {
            self.cancel();
            return Err(SelectionError::DegenerateSelection);
        }

        // close the loop the same way a step extends it, with the edge
        // window centered on the start point
        let last = self.path[self.path.len() - 1];
        let first = self.path[0];
        let closing = match settings.pathfinding {
            PathfindingMode::LocalSnap => {
                let radius = settings.hover_radius.round() as u32;
                let field =
                    EdgeCostField::compute(&raster, first, radius, settings.edge_threshold)?;
                let snap_probability = live_wire::perp_cost(
                    self.trajectory.angle_deg,
                    field.dominant_angle_deg(),
                    settings.perp_bias,
                    settings.falloff_sigma_deg,
                );
                live_wire::find_path(last, first, &field, snap_probability, &mut self.rng)
            }
            PathfindingMode::GlobalSearch => live_wire::find_path_global(&raster, last, first),
        };
        self.path.extend_from_slice(&closing[1..]);

        let mut mask = fill_closed_path(&self.path, raster.width(), raster.height());
        for p in &self.path {
            if raster.contains(*p) {
                mask.set(p.x as usize, p.y as usize);
            }
        }
        if mask.is_empty() {
            self.cancel();
            return Err(SelectionError::DegenerateSelection);
        }

        self.state = LassoState::Closed;
        self.hover_mask = SelectionMask::new(self.hover_mask.width(), self.hover_mask.height());
        self.predictive_path.clear();
        let selection = Selection::from_mask(mask, now_ms);
        debug!(
            "lasso finished: {} path points, {} px, bounds {:?}",
            self.path.len(),
            selection.pixel_count(),
            selection.bounds
        );
        Ok(selection)
    }

    /// Abandons the gesture and clears per-gesture state.
    pub fn cancel(&mut self) {
        self.state = LassoState::Idle;
        self.path.clear();
        self.nodes.clear();
        self.trajectory = Trajectory::default();
        self.hover_mask = SelectionMask::new(self.hover_mask.width(), self.hover_mask.height());
        self.predictive_path.clear();
    }

    pub fn state(&self) -> LassoState {
        self.state
    }

    /// Traced boundary so far, starting at the seed point.
    pub fn path(&self) -> &[Point] {
        &self.path
    }

    /// Anchor nodes dropped so far.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn trajectory(&self) -> Trajectory {
        self.trajectory
    }

    /// Live preview of what a wand click near the cursor would select.
    pub fn hover_mask(&self) -> &SelectionMask {
        &self.hover_mask
    }

    /// Expected upcoming cursor positions; empty unless predictive mode is
    /// on and the cursor is moving. Points may extend beyond the buffer.
    pub fn predictive_path(&self) -> &[Point] {
        &self.predictive_path
    }

    fn require_state(&self, expected: LassoState) -> Result<(), SelectionError> {
        if self.state == expected {
            Ok(())
        } else {
            Err(SelectionError::SessionState {
                expected: expected.name(),
                actual: self.state.name(),
            })
        }
    }

    fn update_trajectory(&mut self) {
        if self.path.len() < 2 {
            return;
        }
        let window = &self.path[self.path.len().saturating_sub(TRAJECTORY_WINDOW)..];
        let first = window[0];
        let last = window[window.len() - 1];
        let dx = (last.x - first.x) as f32;
        let dy = (last.y - first.y) as f32;
        self.trajectory = Trajectory {
            dx,
            dy,
            angle_deg: dy.atan2(dx).to_degrees(),
            velocity: (dx * dx + dy * dy).sqrt() / window.len() as f32,
        };
    }

    fn try_drop_node(
        &mut self,
        cursor: Point,
        field: &EdgeCostField,
        settings: &LassoSettings,
        now_ms: u64,
    ) -> bool {
        if now_ms.saturating_sub(self.last_drop_ms) < settings.node_drop_time_ms {
            return false;
        }
        if let Some(last) = self.nodes.last() {
            if cursor.distance(last.point) < settings.min_drop_distance {
                return false;
            }
        }

        self.nodes.push(Node {
            point: cursor,
            timestamp_ms: now_ms,
            dominant_angle_deg: field.dominant_angle_deg(),
            edge_strength: field.mean_strength(),
        });
        self.last_drop_ms = now_ms;
        debug!(
            "lasso node #{} at ({}, {})",
            self.nodes.len(),
            cursor.x,
            cursor.y
        );
        true
    }

    /// Extrapolates future cursor positions along the trajectory direction,
    /// one normalized step at a time.
    fn predict(&self, cursor: Point) -> Vec<Point> {
        let t = self.trajectory;
        if t.velocity <= 0.0 {
            return Vec::new();
        }
        let step_x = t.dx / t.velocity;
        let step_y = t.dy / t.velocity;
        (1..=PREDICTIVE_STEPS)
            .map(|i| {
                Point::new(
                    (cursor.x as f32 + step_x * i as f32).round() as i32,
                    (cursor.y as f32 + step_y * i as f32).round() as i32,
                )
            })
            .collect()
    }
}

/// Replay-stable generator seed derived from the gesture's start point.
fn gesture_seed(seed: Point) -> u64 {
    ((seed.x as u32 as u64) << 32) | seed.y as u32 as u64
}

/// Rasterizes the interior of a closed path with an even-odd scanline fill.
///
/// Rows are sampled at pixel centers (y + 0.5) so vertices lying exactly on
/// a row never double-count a crossing; the edge from the last path point
/// back to the first closes the polygon.
fn fill_closed_path(path: &[Point], width: usize, height: usize) -> SelectionMask {
    let mut mask = SelectionMask::new(width, height);
    let n = path.len();

    for y in 0..height {
        let yf = y as f32 + 0.5;
        let mut crossings: Vec<f32> = Vec::new();
        for i in 0..n {
            let a = path[i];
            let b = path[(i + 1) % n];
            let (ya, yb) = (a.y as f32, b.y as f32);
            if (ya < yf && yb >= yf) || (yb < yf && ya >= yf) {
                let t = (yf - ya) / (yb - ya);
                crossings.push(a.x as f32 + t * (b.x as f32 - a.x as f32));
            }
        }
        crossings.sort_by(|a, b| a.total_cmp(b));

        for pair in crossings.chunks_exact(2) {
            let x0 = (pair[0].ceil() as i32).max(0);
            let x1 = (pair[1].floor() as i32).min(width as i32 - 1);
            for x in x0..=x1 {
                mask.set(x as usize, y);
            }
        }
    }

    mask
}

// ============================================================================
// Tests
// ============================================================================
