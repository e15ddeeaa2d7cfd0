//! Source ↔ machining coordinate conversion.
//!
//! Meshes arrive from the model loader in scene units (metres) with Y as
//! the up axis. Machining space is millimetres with Z up, so conversion
//! scales by [`SOURCE_TO_MM`] and swaps the second and third coordinates.
//! The two functions here are exact inverses up to float rounding.

use serde::{Deserialize, Serialize};

use crate::geometry::Vec3;

/// Scene units to millimetres.
pub const SOURCE_TO_MM: f64 = 1000.0;

/// Mesh exactly as the loader hands it over: scene units, Y up.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceMesh {
    pub vertices: Vec<[f64; 3]>,
    pub triangles: Vec<[usize; 3]>,
}

/// Scene point → machining point.
pub fn to_machine(p: [f64; 3]) -> Vec3 {
    Vec3::new(p[0] * SOURCE_TO_MM, p[2] * SOURCE_TO_MM, p[1] * SOURCE_TO_MM)
}

/// Machining point → scene point.
pub fn to_source(p: Vec3) -> [f64; 3] {
    [p.x / SOURCE_TO_MM, p.z / SOURCE_TO_MM, p.y / SOURCE_TO_MM]
}
