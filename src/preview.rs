//! Recover cut points from program text for the preview renderer.
//!
//! This is a lossy reading, not an interpreter: only linear moves with an
//! explicit X word are kept, missing Y/Z words read as zero, and modal
//! state is ignored. Lines the grammar can't read are skipped.

use tracing::trace;

use crate::geometry::Vec3;
use crate::units;

/// Points of every `G1`/`G01` line carrying an X word, in program order.
pub fn parse_toolpath(gcode: &str) -> Vec<Vec3> {
    let mut points = Vec::new();
    for (n, line) in gcode.lines().enumerate() {
        let block = match parser::parse_line(line) {
            Ok(block) => block,
            Err(e) => {
                trace!(line = n + 1, error = %e, "skipping unreadable line");
                continue;
            }
        };
        if !block.has_command('G', 1) {
            continue;
        }
        let Some(x) = block.get('X') else {
            continue;
        };
        points.push(Vec3::new(
            x,
            block.get('Y').unwrap_or(0.0),
            block.get('Z').unwrap_or(0.0),
        ));
    }
    points
}

/// Machining points back into scene units for display.
pub fn to_scene(points: &[Vec3]) -> Vec<[f64; 3]> {
    points.iter().map(|&p| units::to_source(p)).collect()
}
