//! Error values shared across the selection engine.

use thiserror::Error;

/// Failure modes of selection operations.
///
/// All failures are reported as values. Coordinates and settings are
/// validated up front so the per-pixel loops never panic.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    /// A seed, cursor or window center lies outside the buffer.
    /// Out-of-bounds coordinates are rejected, never clamped.
    #[error("point ({x}, {y}) is outside the {width}x{height} buffer")]
    OutOfBounds {
        x: i32,
        y: i32,
        width: usize,
        height: usize,
    },

    /// The buffer has zero pixels, or its length does not match
    /// `width * height * 4` interleaved RGBA bytes.
    #[error("raster buffer is empty or does not match its dimensions")]
    EmptyBuffer,

    /// A closed lasso path enclosed no area: fewer than three path points,
    /// or an interior that rasterized to nothing. Hosts usually discard the
    /// gesture silently on this variant.
    #[error("lasso path encloses no area")]
    DegenerateSelection,

    /// A settings field is outside its accepted range.
    #[error("invalid setting `{field}`: {reason}")]
    InvalidSettings {
        field: &'static str,
        reason: &'static str,
    },

    /// A lasso session operation was called in the wrong lifecycle state.
    #[error("lasso session is {actual}, expected {expected}")]
    SessionState {
        expected: &'static str,
        actual: &'static str,
    },
}

impl SelectionError {
    pub(crate) fn invalid(field: &'static str, reason: &'static str) -> Self {
        SelectionError::InvalidSettings { field, reason }
    }
}
