//! Pixelect: interactive pixel-selection tools.
//!
//! Two tools built around a shared selection bitmask:
//! - **Magic wand** ([`selection::region_grow`]): selects pixels whose color
//!   lies within a tolerance of a clicked seed, either as a contiguous
//!   flood-filled region or across the whole buffer.
//! - **Magic lasso** ([`selection::LassoSession`]): traces a boundary that
//!   follows image edges as the cursor moves, then rasterizes the enclosed
//!   region on finish.
//!
//! ## Image Format
//! All entry points take tightly packed 8-bit RGBA, row-major from the top
//! left (`data.len() == width * height * 4`), the layout browser canvases
//! hand out. Alpha is carried but never influences color distance or edge
//! detection.
//!
//! ## Determinism
//! The engine never reads a clock or seeds randomness from the environment.
//! Hosts pass event timestamps into every time-dependent call, and the
//! lasso's snap decisions come from a generator seeded by the gesture's
//! start point, so the same event stream always reproduces the same
//! selection.

pub mod color;
pub mod error;
pub mod raster;
pub mod selection;
pub mod settings;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use color::ColorSpace;
pub use error::SelectionError;
pub use raster::{Point, RasterView};
pub use selection::{
    edge_field, region_grow, Bounds, EdgeCostField, EdgePixel, LassoSession, LassoState, Node,
    Selection, SelectionMask, StepOutcome, Trajectory,
};
pub use settings::{
    Connectivity, LassoSettings, PathfindingMode, ToleranceSettings, ToolSettings,
};
