//! meshcam: mesh to G-code toolpath engine, usable natively or from
//! WebAssembly.
//!
//! # Swiss Cheese Architecture
//!
//! The pipeline is composed of independent, swappable layers:
//!
//! ```text
//! ┌──────────────┐     ┌──────────────┐     ┌──────────────┐     ┌──────────────┐
//! │  Input        │ ──▶ │  Slicing      │ ──▶ │  Strategy     │ ──▶ │  Output       │
//! │  (SourceMesh  │     │  (segments →  │     │  (Parallel /  │     │  (G-code,     │
//! │   → Mesh)     │     │   chains)     │     │   Spiral)     │     │   preview)    │
//! │  🧀 hole:     │     │  🧀 hole:     │     │  🧀 hole:     │     │  🧀 hole:     │
//! │  other axis   │     │  loop         │     │  contour,     │     │  more post-   │
//! │  conventions  │     │  nesting…     │     │  adaptive…    │     │  processors   │
//! └──────────────┘     └──────────────┘     └──────────────┘     └──────────────┘
//! ```
//!
//! Each layer is a trait / module boundary. [`engine::Engine`] drives them
//! in order and reports progress to a [`engine::GenerationObserver`].

pub mod engine;
pub mod error;
pub mod gcode;
pub mod geometry;
pub mod preview;
pub mod settings;
pub mod slicer;
pub mod tool;
pub mod toolpath;
pub mod units;

pub use engine::{generate_program, Engine, GenerationObserver, LayerReport, NoopObserver};
pub use error::{CamError, Result};
pub use gcode::{PostProcessor, Program};
pub use geometry::{Mesh, Vec3};
pub use settings::{CamSettings, Strategy};
pub use units::SourceMesh;

use tracing::warn;
use wasm_bindgen::prelude::*;

/// Decode the JSON pair handed over by the host: a [`SourceMesh`] in scene
/// units and a [`CamSettings`] record. The mesh is converted to machining
/// coordinates here.
pub fn load_inputs(mesh_json: &str, settings_json: &str) -> Result<(Mesh, CamSettings)> {
    let source: SourceMesh = serde_json::from_str(mesh_json)?;
    let settings: CamSettings = serde_json::from_str(settings_json)?;
    Ok((Mesh::from_source(&source)?, settings))
}

fn to_js(e: CamError) -> JsValue {
    JsValue::from_str(&e.to_string())
}

// ── WASM entry points ────────────────────────────────────────────────

/// Generate a program from a JSON mesh and JSON settings.
#[wasm_bindgen]
pub fn generate_gcode(mesh_json: &str, settings_json: &str) -> std::result::Result<String, JsValue> {
    let (mesh, settings) = load_inputs(mesh_json, settings_json).map_err(to_js)?;
    let program = generate_program(&mesh, &settings, &mut NoopObserver).map_err(to_js)?;
    Ok(program.text())
}

/// Forwards layer progress to a JS function `(index, z, points) => void`.
struct JsLayerCallback<'a> {
    callback: &'a js_sys::Function,
}

impl GenerationObserver for JsLayerCallback<'_> {
    fn on_layer_complete(&mut self, report: &LayerReport) {
        let result = self.callback.call3(
            &JsValue::NULL,
            &JsValue::from_f64(report.index as f64),
            &JsValue::from_f64(report.z),
            &JsValue::from_f64(report.points as f64),
        );
        // Generation carries on; the exception is only logged.
        if let Err(e) = result {
            warn!(layer = report.index, error = ?e, "layer callback threw");
        }
    }
}

/// Like [`generate_gcode`], calling `on_layer(index, z, points)` after
/// every emitted layer.
#[wasm_bindgen]
pub fn generate_gcode_with_progress(
    mesh_json: &str,
    settings_json: &str,
    on_layer: &js_sys::Function,
) -> std::result::Result<String, JsValue> {
    let (mesh, settings) = load_inputs(mesh_json, settings_json).map_err(to_js)?;
    let mut observer = JsLayerCallback { callback: on_layer };
    let program = generate_program(&mesh, &settings, &mut observer).map_err(to_js)?;
    Ok(program.text())
}

/// Parse program text back into cut points, as JSON `[[x, y, z], ...]`.
/// With `scene_units` the points are converted back to the loader's
/// coordinate system.
#[wasm_bindgen]
pub fn preview_gcode(gcode: &str, scene_units: bool) -> std::result::Result<String, JsValue> {
    let points = preview::parse_toolpath(gcode);
    let out: Vec<[f64; 3]> = if scene_units {
        preview::to_scene(&points)
    } else {
        points.into_iter().map(Into::into).collect()
    };
    serde_json::to_string(&out).map_err(|e| to_js(e.into()))
}
