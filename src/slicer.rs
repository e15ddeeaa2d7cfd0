/// Mesh slicer: intersects the mesh with horizontal planes and stitches
/// the crossings into continuous chains.
///
/// Swiss-cheese layer: **3-D → layer paths**
/// The vertical axis is machining Z throughout: layer bounds come from the
/// mesh's Z extent and the crossing test compares vertex Z.
use crate::geometry::{Mesh, Polyline, Segment, Vec3};

/// Endpoints closer than this (mm) are treated as the same point.
pub const STITCH_TOLERANCE: f64 = 0.01;

/// Heights from `z_min` up to, but excluding, `z_max`, every `step`.
pub fn layer_heights(z_min: f64, z_max: f64, step: f64) -> Vec<f64> {
    let mut heights = Vec::new();
    if step <= 0.0 || !step.is_finite() || !z_min.is_finite() || !z_max.is_finite() {
        return heights;
    }
    let mut i = 0usize;
    loop {
        let z = z_min + i as f64 * step;
        if z >= z_max {
            break;
        }
        heights.push(z);
        i += 1;
    }
    heights
}

/// Slice the mesh at one height and stitch the result.
pub fn slice_at_z(mesh: &Mesh, z: f64) -> Vec<Polyline> {
    stitch(collect_segments(mesh, z), STITCH_TOLERANCE)
}

/// Every triangle that crosses the plane at `z` contributes one segment.
pub fn collect_segments(mesh: &Mesh, z: f64) -> Vec<Segment> {
    let mut segs = Vec::new();
    for tri in mesh.triangles() {
        let min_z = tri[0].z.min(tri[1].z).min(tri[2].z);
        let max_z = tri[0].z.max(tri[1].z).max(tri[2].z);
        if min_z > z || max_z < z {
            continue;
        }
        if let Some(seg) = intersect_triangle(tri, z) {
            segs.push(seg);
        }
    }
    segs
}

/// Point where the edge `p1 → p2` crosses the plane at `z`.
///
/// A vertex lying exactly on the plane counts as above it, so an edge
/// straddles when exactly one endpoint is strictly below. Edges parallel
/// to the plane never straddle; the zero denominator is still checked so
/// a non-finite point can never escape.
pub fn intersect_edge(p1: Vec3, p2: Vec3, z: f64) -> Option<Vec3> {
    if (p1.z < z) == (p2.z < z) {
        return None;
    }
    let dz = p2.z - p1.z;
    if dz == 0.0 {
        return None;
    }
    let t = (z - p1.z) / dz;
    let mut p = Vec3::lerp(p1, p2, t);
    p.z = z;
    p.is_finite().then_some(p)
}

/// Segment where the plane crosses one triangle, oriented so the solid is
/// on its left when seen from above (for outward-facing winding).
///
/// Only the generic two-edge case yields a segment; zero-length crossings
/// through a single vertex are dropped.
pub fn intersect_triangle(tri: [Vec3; 3], z: f64) -> Option<Segment> {
    let [a, b, c] = tri;
    let mut points = [Vec3::default(); 3];
    let mut count = 0;
    for (p, q) in [(a, b), (b, c), (c, a)] {
        if let Some(x) = intersect_edge(p, q, z) {
            points[count] = x;
            count += 1;
        }
    }
    if count != 2 {
        return None;
    }

    let seg = Segment::new(points[0], points[1]);
    if seg.length() < 1e-12 {
        return None;
    }

    let normal = (b - a).cross(c - a);
    let travel = Vec3::UP.cross(normal);
    if (seg.end - seg.start).dot(travel) < 0.0 {
        Some(seg.reversed())
    } else {
        Some(seg)
    }
}

/// Chain loose segments by matching endpoints within `tolerance`.
///
/// Each chain starts from the first remaining segment and grows forward:
/// the remaining list is rescanned from the top for a segment whose start
/// meets the chain's end, until none does. An open chain then grows
/// backward the same way from its head. A chain whose ends meet is marked
/// closed and its duplicate closing point removed.
pub fn stitch(segments: Vec<Segment>, tolerance: f64) -> Vec<Polyline> {
    let mut remaining = segments;
    let mut chains = Vec::new();

    while !remaining.is_empty() {
        let head = remaining.remove(0);
        let mut chain = vec![head.start, head.end];

        while let Some(i) = remaining
            .iter()
            .position(|s| Vec3::dist(s.start, chain[chain.len() - 1]) < tolerance)
        {
            let seg = remaining.remove(i);
            chain.push(seg.end);
        }

        let mut closed = is_loop(&chain, tolerance);
        if !closed {
            while let Some(i) = remaining
                .iter()
                .position(|s| Vec3::dist(s.end, chain[0]) < tolerance)
            {
                let seg = remaining.remove(i);
                chain.insert(0, seg.start);
            }
            closed = is_loop(&chain, tolerance);
        }

        if closed {
            chain.pop();
        }
        chains.push(Polyline::new(chain, closed));
    }
    chains
}

fn is_loop(chain: &[Vec3], tolerance: f64) -> bool {
    match (chain.first(), chain.last()) {
        (Some(&first), Some(&last)) if chain.len() > 3 => Vec3::dist(first, last) < tolerance,
        _ => false,
    }
}
