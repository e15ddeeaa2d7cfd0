/// Core geometry types for the milling pipeline.
///
/// Swiss-cheese layer: **Geometry representation**
/// Everything in this module lives in machining coordinates: millimetres,
/// Z up. Source-space data only enters through [`Mesh::from_source`].
use std::ops::{Add, Mul, Sub};

use serde::{Deserialize, Serialize};

use crate::error::{CamError, Result};
use crate::units::{self, SourceMesh};

// ── Points ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    /// Machining vertical axis.
    pub const UP: Self = Self {
        x: 0.0,
        y: 0.0,
        z: 1.0,
    };

    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn lerp(a: Self, b: Self, t: f64) -> Self {
        Self {
            x: a.x + (b.x - a.x) * t,
            y: a.y + (b.y - a.y) * t,
            z: a.z + (b.z - a.z) * t,
        }
    }

    pub fn dot(self, other: Self) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn cross(self, other: Self) -> Self {
        Self {
            x: self.y * other.z - self.z * other.y,
            y: self.z * other.x - self.x * other.z,
            z: self.x * other.y - self.y * other.x,
        }
    }

    pub fn length(self) -> f64 {
        self.dot(self).sqrt()
    }

    pub fn dist(a: Self, b: Self) -> f64 {
        (a - b).length()
    }

    /// Unit vector in the same direction, or `None` when the length is
    /// zero (or not finite) and no direction exists.
    pub fn normalized(self) -> Option<Self> {
        let len = self.length();
        if len < 1e-12 || !len.is_finite() {
            return None;
        }
        Some(self * (1.0 / len))
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl Add for Vec3 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Vec3 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f64> for Vec3 {
    type Output = Self;
    fn mul(self, rhs: f64) -> Self {
        Self::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl From<[f64; 3]> for Vec3 {
    fn from(p: [f64; 3]) -> Self {
        Self::new(p[0], p[1], p[2])
    }
}

impl From<Vec3> for [f64; 3] {
    fn from(v: Vec3) -> Self {
        [v.x, v.y, v.z]
    }
}

// ── Bounds ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min: Vec3,
    pub max: Vec3,
}

impl BoundingBox {
    pub fn from_points(points: &[Vec3]) -> Option<Self> {
        if points.is_empty() {
            return None;
        }
        let mut min = Vec3::new(f64::MAX, f64::MAX, f64::MAX);
        let mut max = Vec3::new(f64::MIN, f64::MIN, f64::MIN);
        for p in points {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            min.z = min.z.min(p.z);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
            max.z = max.z.max(p.z);
        }
        Some(Self { min, max })
    }

    pub fn center(&self) -> Vec3 {
        Vec3::lerp(self.min, self.max, 0.5)
    }

    /// Half the size along each axis.
    pub fn extents(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }

    /// Radius of the sphere through the box corners.
    pub fn bounding_radius(&self) -> f64 {
        self.extents().length()
    }
}

// ── Mesh ─────────────────────────────────────────────────────────────

/// Immutable triangle mesh in machining coordinates.
#[derive(Debug, Clone, Serialize)]
pub struct Mesh {
    vertices: Vec<Vec3>,
    triangles: Vec<[usize; 3]>,
    bounds: Option<BoundingBox>,
}

impl Mesh {
    /// Build a mesh from vertices already in machining coordinates.
    ///
    /// Fails when a triangle references a vertex that does not exist or a
    /// vertex is not finite. Degenerate triangles are accepted.
    pub fn new(vertices: Vec<Vec3>, triangles: Vec<[usize; 3]>) -> Result<Self> {
        if let Some(i) = vertices.iter().position(|v| !v.is_finite()) {
            return Err(CamError::InvalidMesh(format!(
                "vertex {i} has a non-finite coordinate"
            )));
        }
        for (t, tri) in triangles.iter().enumerate() {
            if let Some(&idx) = tri.iter().find(|&&idx| idx >= vertices.len()) {
                return Err(CamError::InvalidMesh(format!(
                    "triangle {t} references vertex {idx}, but only {} vertices exist",
                    vertices.len()
                )));
            }
        }
        let bounds = BoundingBox::from_points(&vertices);
        Ok(Self {
            vertices,
            triangles,
            bounds,
        })
    }

    /// Convert a mesh from the loader's coordinate system and build it.
    /// This is the only place the unit scale and axis swap are applied.
    ///
    /// The Y/Z swap mirrors the mesh, so every triangle's winding is
    /// reversed to keep outward-facing normals outward.
    pub fn from_source(source: &SourceMesh) -> Result<Self> {
        let vertices = source
            .vertices
            .iter()
            .map(|&p| units::to_machine(p))
            .collect();
        let triangles = source.triangles.iter().map(|&[a, b, c]| [a, c, b]).collect();
        Self::new(vertices, triangles)
    }

    pub fn vertices(&self) -> &[Vec3] {
        &self.vertices
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    pub fn bounds(&self) -> Option<&BoundingBox> {
        self.bounds.as_ref()
    }

    /// True when there is nothing to slice.
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Resolved vertex positions of every triangle.
    pub fn triangles(&self) -> impl Iterator<Item = [Vec3; 3]> + '_ {
        self.triangles
            .iter()
            .map(|&[a, b, c]| [self.vertices[a], self.vertices[b], self.vertices[c]])
    }
}

// ── Segment (used by slicer) ─────────────────────────────────────────

/// Ordered crossing of one triangle by a slicing plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub start: Vec3,
    pub end: Vec3,
}

impl Segment {
    pub fn new(start: Vec3, end: Vec3) -> Self {
        Self { start, end }
    }

    pub fn reversed(self) -> Self {
        Self {
            start: self.end,
            end: self.start,
        }
    }

    pub fn length(&self) -> f64 {
        Vec3::dist(self.start, self.end)
    }
}

// ── Polyline (stitched path) ─────────────────────────────────────────

/// A continuous chain of points at one layer height. A closed chain does
/// not repeat its first point at the end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polyline {
    pub points: Vec<Vec3>,
    pub closed: bool,
}

impl Polyline {
    pub fn new(points: Vec<Vec3>, closed: bool) -> Self {
        Self { points, closed }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Points in cutting order; closed chains return to their start.
    pub fn cut_points(&self) -> impl Iterator<Item = Vec3> + '_ {
        let closing = if self.closed {
            self.points.first().copied()
        } else {
            None
        };
        self.points.iter().copied().chain(closing)
    }
}
