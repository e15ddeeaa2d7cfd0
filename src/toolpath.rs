/// Toolpath generation strategies.
///
/// Swiss-cheese layer: **Strategy selection**
/// Extension point: implement `ToolpathStrategy` to add a pattern. Each
/// strategy turns the mesh into an ordered list of layer paths; the G-code
/// writer takes it from there.
use rayon::prelude::*;
use tracing::warn;

use crate::geometry::{Mesh, Polyline, Vec3};
use crate::settings::{CamSettings, Strategy};
use crate::slicer;

/// Which comment header a layer block gets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerKind {
    Slice,
    Spiral,
}

/// Points to cut at one layer height.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerPath {
    pub kind: LayerKind,
    /// Layer height (mm); the cut depth written to the program.
    pub z: f64,
    /// Flattened cutting sequence for the whole layer.
    pub points: Vec<Vec3>,
}

impl LayerPath {
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

// ── Strategy trait (the "hole") ──────────────────────────────────────

pub trait ToolpathStrategy {
    /// Layers in ascending height order. Layers may be empty.
    fn layers(&self, mesh: &Mesh, settings: &CamSettings) -> Vec<LayerPath>;
}

pub fn strategy_for(kind: Strategy) -> Box<dyn ToolpathStrategy + Send + Sync> {
    match kind {
        Strategy::Parallel => Box::new(ParallelStrategy),
        Strategy::Spiral => Box::new(SpiralStrategy),
        Strategy::Contour => Box::new(ContourStrategy),
    }
}

// ── Parallel (slice every layer) ─────────────────────────────────────

pub struct ParallelStrategy;

impl ToolpathStrategy for ParallelStrategy {
    fn layers(&self, mesh: &Mesh, settings: &CamSettings) -> Vec<LayerPath> {
        let bounds = match mesh.bounds() {
            Some(b) => *b,
            None => return Vec::new(),
        };
        let tool = settings.tool();
        let heights = slicer::layer_heights(bounds.min.z, bounds.max.z, settings.step_down);

        // Layers are independent; collect() keeps them in height order.
        heights
            .par_iter()
            .map(|&z| {
                let mut chains = slicer::slice_at_z(mesh, z);
                if settings.tool_compensation {
                    chains = chains.iter().map(|c| tool.compensate(c)).collect();
                }
                LayerPath {
                    kind: LayerKind::Slice,
                    z,
                    points: flatten(&chains),
                }
            })
            .collect()
    }
}

/// Concatenate chains into one cutting sequence.
pub fn flatten(chains: &[Polyline]) -> Vec<Vec3> {
    chains.iter().flat_map(|c| c.cut_points()).collect()
}

// ── Spiral ───────────────────────────────────────────────────────────

pub struct SpiralStrategy;

impl ToolpathStrategy for SpiralStrategy {
    fn layers(&self, mesh: &Mesh, settings: &CamSettings) -> Vec<LayerPath> {
        let bounds = match mesh.bounds() {
            Some(b) => *b,
            None => return Vec::new(),
        };
        let center = bounds.center();
        let max_radius = bounds.bounding_radius();
        let step = settings.step_over;

        slicer::layer_heights(bounds.min.z, bounds.max.z, settings.step_down)
            .into_iter()
            .enumerate()
            .map(|(i, z)| (z, i as f64 * step))
            .take_while(|&(_, radius)| radius <= max_radius)
            .map(|(z, radius)| LayerPath {
                kind: LayerKind::Spiral,
                z,
                points: spiral_points(center, radius, step),
            })
            .collect()
    }
}

/// Archimedean spiral around `center`, one point per degree.
///
/// The sweep runs while `angle < 360 * radius / step`, with instantaneous
/// radius `radius + angle / 360 * step`. A zero starting radius therefore
/// yields no points at all.
pub fn spiral_points(center: Vec3, radius: f64, step: f64) -> Vec<Vec3> {
    if step <= 0.0 || !radius.is_finite() {
        return Vec::new();
    }
    let limit = 360.0 * (radius / step);
    (0u32..)
        .map(f64::from)
        .take_while(|&angle| angle < limit)
        .map(|angle| {
            let r = radius + angle / 360.0 * step;
            let rad = angle.to_radians();
            Vec3::new(center.x + r * rad.cos(), center.y + r * rad.sin(), center.z)
        })
        .collect()
}

// ── Contour (not implemented) ────────────────────────────────────────

/// Reserved for perimeter tracing with optimised ordering. Produces no
/// layers until that behaviour is specified.
pub struct ContourStrategy;

impl ToolpathStrategy for ContourStrategy {
    fn layers(&self, _mesh: &Mesh, _settings: &CamSettings) -> Vec<LayerPath> {
        warn!("contour strategy is not implemented; no layers generated");
        Vec::new()
    }
}
