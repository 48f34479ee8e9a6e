//! Tool settings with construction-time validation.
//!
//! Every field is checked once, when settings are built or handed to an
//! engine entry point, so the per-pixel loops can assume values are in
//! range. All types serialize with serde for host persistence; field names
//! follow the camelCase convention of browser hosts.

use serde::{Deserialize, Serialize};

use crate::color::ColorSpace;
use crate::error::SelectionError;

// ============================================================================
// Magic wand
// ============================================================================

/// Pixel adjacency used by the flood fill.
///
/// Serializes as the number of neighbors (4 or 8).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Connectivity {
    #[default]
    Four,
    Eight,
}

impl Connectivity {
    /// Neighbor offsets, cardinal directions first.
    pub(crate) fn offsets(&self) -> &'static [(i32, i32)] {
        match self {
            Connectivity::Four => &[(1, 0), (-1, 0), (0, 1), (0, -1)],
            Connectivity::Eight => &[
                (1, 0),
                (-1, 0),
                (0, 1),
                (0, -1),
                (1, 1),
                (1, -1),
                (-1, 1),
                (-1, -1),
            ],
        }
    }
}

impl TryFrom<u8> for Connectivity {
    type Error = SelectionError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            4 => Ok(Connectivity::Four),
            8 => Ok(Connectivity::Eight),
            _ => Err(SelectionError::invalid("connectivity", "must be 4 or 8")),
        }
    }
}

impl From<Connectivity> for u8 {
    fn from(value: Connectivity) -> u8 {
        match value {
            Connectivity::Four => 4,
            Connectivity::Eight => 8,
        }
    }
}

/// Magic wand parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ToleranceSettings {
    /// Color distance threshold; a pixel matching the seed exactly always
    /// passes.
    pub tolerance: f32,
    /// Flood fill from the seed when true, whole-buffer scan when false.
    pub contiguous: bool,
    /// Space the distance is measured in.
    pub color_space: ColorSpace,
    /// Flood-fill adjacency; ignored by the global scan.
    pub connectivity: Connectivity,
}

impl Default for ToleranceSettings {
    fn default() -> Self {
        Self {
            tolerance: 30.0,
            contiguous: true,
            color_space: ColorSpace::Rgb,
            connectivity: Connectivity::Four,
        }
    }
}

impl ToleranceSettings {
    /// Builds validated settings.
    pub fn new(
        tolerance: f32,
        contiguous: bool,
        color_space: ColorSpace,
        connectivity: Connectivity,
    ) -> Result<Self, SelectionError> {
        let settings = Self {
            tolerance,
            contiguous,
            color_space,
            connectivity,
        };
        settings.validate()?;
        Ok(settings)
    }

    /// Checks every field against its accepted range. Deserialized settings
    /// must pass through here before use; the engine entry points call it
    /// once per operation.
    pub fn validate(&self) -> Result<(), SelectionError> {
        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            return Err(SelectionError::invalid(
                "tolerance",
                "must be finite and >= 0",
            ));
        }
        Ok(())
    }
}

// ============================================================================
// Magic lasso
// ============================================================================

/// Path-extension strategy for the lasso.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PathfindingMode {
    /// Greedy Bresenham walk with probabilistic snapping to nearby edge
    /// pixels. Local by design; never a global shortest-path search.
    #[default]
    LocalSnap,
    /// Full-buffer A* between segment endpoints, pricing each move by
    /// grayscale similarity so the path hugs contrast boundaries.
    GlobalSearch,
}

/// Magic lasso parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LassoSettings {
    /// Minimum time between anchor node drops, in milliseconds.
    pub node_drop_time_ms: u64,
    /// Minimum distance in pixels between consecutive anchor nodes.
    pub min_drop_distance: f32,
    /// Peak probability of snapping a path candidate onto an edge pixel.
    pub perp_bias: f32,
    /// Gaussian falloff width, in degrees, of the snap probability as
    /// cursor motion rotates away from perpendicular to the edge gradient.
    pub falloff_sigma_deg: f32,
    /// Half-extent of the edge window and hover preview around the cursor,
    /// in pixels.
    pub hover_radius: f32,
    /// Color tolerance of the hover preview flood fill.
    pub hover_tolerance: f32,
    /// Extrapolate expected cursor positions from the trajectory.
    pub predictive_mode: bool,
    /// Gradient magnitude a pixel must exceed to count as an edge.
    pub edge_threshold: f32,
    /// How the path between cursor samples is traced.
    pub pathfinding: PathfindingMode,
}

impl Default for LassoSettings {
    fn default() -> Self {
        Self {
            node_drop_time_ms: 200,
            min_drop_distance: 20.0,
            perp_bias: 0.5,
            falloff_sigma_deg: 30.0,
            hover_radius: 15.0,
            hover_tolerance: 50.0,
            predictive_mode: false,
            edge_threshold: 20.0,
            pathfinding: PathfindingMode::LocalSnap,
        }
    }
}

impl LassoSettings {
    /// Checks every field against its accepted range. Deserialized settings
    /// must pass through here before use; the engine entry points call it
    /// once per operation.
    pub fn validate(&self) -> Result<(), SelectionError> {
        if !(50..=500).contains(&self.node_drop_time_ms) {
            return Err(SelectionError::invalid(
                "nodeDropTimeMs",
                "must lie in 50..=500",
            ));
        }
        if !self.min_drop_distance.is_finite() || self.min_drop_distance < 0.0 {
            return Err(SelectionError::invalid(
                "minDropDistance",
                "must be finite and >= 0",
            ));
        }
        if !self.perp_bias.is_finite() || !(0.0..=1.0).contains(&self.perp_bias) {
            return Err(SelectionError::invalid("perpBias", "must lie in 0..=1"));
        }
        if !self.falloff_sigma_deg.is_finite() || !(10.0..=50.0).contains(&self.falloff_sigma_deg)
        {
            return Err(SelectionError::invalid(
                "falloffSigmaDeg",
                "must lie in 10..=50",
            ));
        }
        if !self.hover_radius.is_finite() || !(5.0..=50.0).contains(&self.hover_radius) {
            return Err(SelectionError::invalid(
                "hoverRadius",
                "must lie in 5..=50",
            ));
        }
        if !self.hover_tolerance.is_finite() || !(0.0..=100.0).contains(&self.hover_tolerance) {
            return Err(SelectionError::invalid(
                "hoverTolerance",
                "must lie in 0..=100",
            ));
        }
        if !self.edge_threshold.is_finite() || self.edge_threshold < 0.0 {
            return Err(SelectionError::invalid(
                "edgeThreshold",
                "must be finite and >= 0",
            ));
        }
        Ok(())
    }
}

// ============================================================================
// Tool union
// ============================================================================

/// Per-tool settings union, tagged by tool name so hosts can persist a
/// single settings blob.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "tool", rename_all = "camelCase")]
pub enum ToolSettings {
    MagicWand(ToleranceSettings),
    MagicLasso(LassoSettings),
}

impl ToolSettings {
    /// Validates the wrapped settings.
    pub fn validate(&self) -> Result<(), SelectionError> {
        match self {
            ToolSettings::MagicWand(s) => s.validate(),
            ToolSettings::MagicLasso(s) => s.validate(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
