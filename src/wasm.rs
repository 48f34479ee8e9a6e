//! WebAssembly exports for the selection tools.
//!
//! These functions are exposed to JavaScript via wasm-bindgen.
//!
//! ## Conventions
//!
//! - Image data crosses the boundary as flat RGBA byte arrays, the layout
//!   of `ImageData.data`.
//! - Settings cross as JSON strings matching the serde shapes of
//!   [`ToleranceSettings`] and [`LassoSettings`]; `"{}"` selects defaults.
//! - Timestamps are `event.timeStamp` values in milliseconds.
//! - Masks return as one byte per pixel, 255 selected and 0 not.

use wasm_bindgen::prelude::*;

use crate::error::SelectionError;
use crate::raster::{Point, RasterView};
use crate::selection::edge_field::EdgeCostField;
use crate::selection::lasso::LassoSession;
use crate::selection::magic_wand::region_grow;
use crate::settings::{LassoSettings, ToleranceSettings};

fn js_err(err: SelectionError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn parse_wand_settings(json: &str) -> Result<ToleranceSettings, JsValue> {
    serde_json::from_str(json).map_err(|e| JsValue::from_str(&format!("bad settings: {e}")))
}

fn parse_lasso_settings(json: &str) -> Result<LassoSettings, JsValue> {
    serde_json::from_str(json).map_err(|e| JsValue::from_str(&format!("bad settings: {e}")))
}

// ============================================================================
// Magic wand
// ============================================================================

/// Run a magic wand selection from a seed pixel.
///
/// # Arguments
/// * `data` - Flat array of RGBA bytes (length = width * height * 4)
/// * `width` - Image width in pixels
/// * `height` - Image height in pixels
/// * `seed_x`, `seed_y` - Clicked pixel
/// * `settings_json` - JSON-encoded wand settings, `"{}"` for defaults
/// * `now_ms` - Event timestamp in milliseconds
///
/// # Returns
/// One byte per pixel, 255 where selected
#[wasm_bindgen]
pub fn region_grow_wasm(
    data: &[u8],
    width: usize,
    height: usize,
    seed_x: i32,
    seed_y: i32,
    settings_json: &str,
    now_ms: f64,
) -> Result<Vec<u8>, JsValue> {
    let settings = parse_wand_settings(settings_json)?;
    let selection = region_grow(
        data,
        width,
        height,
        Point::new(seed_x, seed_y),
        &settings,
        now_ms as u64,
    )
    .map_err(js_err)?;
    Ok(selection.mask.to_bytes())
}

// ============================================================================
// Edge field
// ============================================================================

/// Detect edges in a window around a pixel.
///
/// # Arguments
/// * `data` - Flat array of RGBA bytes (length = width * height * 4)
/// * `width` - Image width in pixels
/// * `height` - Image height in pixels
/// * `center_x`, `center_y` - Window center
/// * `radius` - Window half-extent in pixels
/// * `threshold` - Minimum gradient magnitude to report
///
/// # Returns
/// Flat `[x, y, strength, angle_deg]` quads, one per edge pixel
#[wasm_bindgen]
pub fn edge_field_wasm(
    data: &[u8],
    width: usize,
    height: usize,
    center_x: i32,
    center_y: i32,
    radius: u32,
    threshold: f32,
) -> Result<Vec<f32>, JsValue> {
    let raster = RasterView::new(data, width, height).map_err(js_err)?;
    let field = EdgeCostField::compute(&raster, Point::new(center_x, center_y), radius, threshold)
        .map_err(js_err)?;

    let mut out = Vec::with_capacity(field.len() * 4);
    for edge in field.edges() {
        out.push(edge.point.x as f32);
        out.push(edge.point.y as f32);
        out.push(edge.strength);
        out.push(edge.angle_deg);
    }
    Ok(out)
}

// ============================================================================
// Magic lasso
// ============================================================================

/// A lasso gesture held across pointer events.
///
/// JavaScript owns the lifetime: construct on pointerdown, `step` on each
/// pointermove, then `finish` or `cancel`.
#[wasm_bindgen]
pub struct WasmLassoSession {
    inner: LassoSession,
    settings: LassoSettings,
}

#[wasm_bindgen]
impl WasmLassoSession {
    /// Begin a gesture at the given pixel.
    ///
    /// # Arguments
    /// * `data` - Flat array of RGBA bytes (length = width * height * 4)
    /// * `width` - Image width in pixels
    /// * `height` - Image height in pixels
    /// * `seed_x`, `seed_y` - Pointer-down pixel
    /// * `settings_json` - JSON-encoded lasso settings, `"{}"` for defaults
    /// * `now_ms` - Event timestamp in milliseconds
    #[wasm_bindgen(constructor)]
    pub fn new(
        data: &[u8],
        width: usize,
        height: usize,
        seed_x: i32,
        seed_y: i32,
        settings_json: &str,
        now_ms: f64,
    ) -> Result<WasmLassoSession, JsValue> {
        let settings = parse_lasso_settings(settings_json)?;
        settings.validate().map_err(js_err)?;
        let inner = LassoSession::start(
            data,
            width,
            height,
            Point::new(seed_x, seed_y),
            now_ms as u64,
        )
        .map_err(js_err)?;
        Ok(WasmLassoSession { inner, settings })
    }

    /// Feed one pointer sample. Returns true when an anchor node dropped.
    pub fn step(
        &mut self,
        data: &[u8],
        width: usize,
        height: usize,
        cursor_x: i32,
        cursor_y: i32,
        now_ms: f64,
    ) -> Result<bool, JsValue> {
        let outcome = self
            .inner
            .step(
                data,
                width,
                height,
                Point::new(cursor_x, cursor_y),
                &self.settings,
                now_ms as u64,
            )
            .map_err(js_err)?;
        Ok(outcome.node_dropped)
    }

    /// Traced path so far as flat `[x, y]` pairs.
    pub fn path(&self) -> Vec<i32> {
        let mut out = Vec::with_capacity(self.inner.path().len() * 2);
        for p in self.inner.path() {
            out.push(p.x);
            out.push(p.y);
        }
        out
    }

    /// Hover preview mask, one byte per pixel.
    pub fn hover_mask(&self) -> Vec<u8> {
        self.inner.hover_mask().to_bytes()
    }

    /// Predicted cursor positions as flat `[x, y]` pairs; empty unless
    /// predictive mode is enabled and the cursor is moving.
    pub fn predictive_path(&self) -> Vec<i32> {
        let mut out = Vec::with_capacity(self.inner.predictive_path().len() * 2);
        for p in self.inner.predictive_path() {
            out.push(p.x);
            out.push(p.y);
        }
        out
    }

    /// Close the loop and rasterize the enclosed region.
    ///
    /// # Returns
    /// One byte per pixel, 255 where selected
    pub fn finish(
        &mut self,
        data: &[u8],
        width: usize,
        height: usize,
        now_ms: f64,
    ) -> Result<Vec<u8>, JsValue> {
        let selection = self
            .inner
            .finish(data, width, height, &self.settings, now_ms as u64)
            .map_err(js_err)?;
        Ok(selection.mask.to_bytes())
    }

    /// Abandon the gesture.
    pub fn cancel(&mut self) {
        self.inner.cancel();
    }
}
