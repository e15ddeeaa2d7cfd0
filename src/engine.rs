/// Generation driver.
///
/// Swiss-cheese layer: **Orchestration**
/// Validates settings once, asks the selected strategy for its layers and
/// feeds them, in height order, to the G-code writer. Progress and
/// validation failures go to an injected observer; nothing here is global.
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{CamError, Result};
use crate::gcode::{GcodeParams, GcodeWriter, Program};
use crate::geometry::Mesh;
use crate::settings::CamSettings;
use crate::toolpath::{strategy_for, LayerKind};

/// One emitted layer, as reported to the observer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LayerReport {
    /// Position among emitted layers, starting at zero.
    pub index: usize,
    pub z: f64,
    pub points: usize,
}

/// Callbacks invoked synchronously during generation.
pub trait GenerationObserver {
    fn on_layer_complete(&mut self, _report: &LayerReport) {}
    fn on_validation_failure(&mut self, _error: &CamError) {}
}

/// Observer that ignores everything.
pub struct NoopObserver;

impl GenerationObserver for NoopObserver {}

// ── Engine ───────────────────────────────────────────────────────────

/// A validated job. Construct one per generation request.
#[derive(Debug, Clone)]
pub struct Engine {
    settings: CamSettings,
}

impl Engine {
    pub fn new(settings: CamSettings) -> Result<Self> {
        settings.validate()?;
        Ok(Self { settings })
    }

    pub fn settings(&self) -> &CamSettings {
        &self.settings
    }

    pub fn generate(&self, mesh: &Mesh, observer: &mut dyn GenerationObserver) -> Program {
        let mut writer = GcodeWriter::new(GcodeParams::from(&self.settings));

        if mesh.is_empty() {
            warn!("mesh has no triangles; emitting header and footer only");
            return writer.finish();
        }

        let strategy = self.settings.strategy;
        let layers = strategy_for(strategy).layers(mesh, &self.settings);

        let mut index = 0;
        for layer in &layers {
            if layer.is_empty() {
                debug!(z = layer.z, "layer has no points; skipped");
                continue;
            }
            let comment = match layer.kind {
                LayerKind::Slice => format!("Layer Z={:.2}", layer.z),
                LayerKind::Spiral => format!("Spiral layer Z={:.2}", layer.z),
            };
            writer.write_layer(&comment, &layer.points, layer.z);
            debug!(z = layer.z, points = layer.points.len(), "layer emitted");

            observer.on_layer_complete(&LayerReport {
                index,
                z: layer.z,
                points: layer.points.len(),
            });
            index += 1;
        }

        let program = writer.finish();
        info!(
            %strategy,
            post = %self.settings.post_processor,
            layers = program.layer_count,
            points = program.cut_points,
            "toolpath generated"
        );
        program
    }
}

/// Validate, then generate. On invalid settings nothing is produced and the
/// observer hears about the failure before the error is returned.
pub fn generate_program(
    mesh: &Mesh,
    settings: &CamSettings,
    observer: &mut dyn GenerationObserver,
) -> Result<Program> {
    let engine = match Engine::new(settings.clone()) {
        Ok(engine) => engine,
        Err(e) => {
            warn!(error = %e, "settings rejected");
            observer.on_validation_failure(&e);
            return Err(e);
        }
    };
    Ok(engine.generate(mesh, observer))
}
