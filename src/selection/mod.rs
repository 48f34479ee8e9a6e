//! Pixel-selection algorithms.
//!
//! This module provides the two interactive selection tools:
//! - **Magic wand**: flood fill or whole-buffer scan based on color distance
//! - **Magic lasso**: edge-following boundary tracing driven by cursor events
//!
//! Both produce a [`Selection`] whose bitmask hosts composite into their own
//! document model.

pub mod edge_field;
pub mod lasso;
pub mod live_wire;
pub mod magic_wand;
pub mod mask;

pub use edge_field::{edge_field, EdgeCostField, EdgePixel, DEFAULT_EDGE_THRESHOLD};
pub use lasso::{LassoSession, LassoState, Node, StepOutcome, Trajectory};
pub use magic_wand::region_grow;
pub use mask::{Bounds, Selection, SelectionMask};
