/// Cutter definition and radius compensation.
///
/// Swiss-cheese layer: **Tool geometry**
/// Compensation moves each point of a layer path sideways by the tool
/// radius so the cutter's edge, not its centre, runs along the contour.
use serde::{Deserialize, Serialize};

use crate::geometry::{Polyline, Vec3};

/// Flat end mill.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tool {
    /// Tool diameter in mm.
    pub diameter: f64,
}

impl Default for Tool {
    fn default() -> Self {
        Self {
            diameter: 3.175, // 1/8" end mill
        }
    }
}

impl Tool {
    pub fn new(diameter: f64) -> Self {
        Self { diameter }
    }

    pub fn radius(&self) -> f64 {
        self.diameter / 2.0
    }

    /// Offset a stitched chain by this tool's radius.
    pub fn compensate(&self, path: &Polyline) -> Polyline {
        Polyline::new(
            offset_points(&path.points, self.radius(), path.closed),
            path.closed,
        )
    }
}

/// Offset every point by `radius` along the horizontal bisector normal.
///
/// For point `i` the incoming and outgoing unit directions are summed and
/// crossed with the vertical axis. On a counter-clockwise loop that points
/// outward. Closed paths wrap around; open paths use only the one existing
/// neighbour at each end. Points without a defined direction (coincident
/// neighbours, or a full reversal) are kept where they are.
pub fn offset_points(points: &[Vec3], radius: f64, closed: bool) -> Vec<Vec3> {
    let n = points.len();
    if n < 2 {
        return points.to_vec();
    }

    let mut result = Vec::with_capacity(n);
    for i in 0..n {
        let current = points[i];
        let (prev, next) = if closed {
            (points[(i + n - 1) % n], points[(i + 1) % n])
        } else {
            (points[i.saturating_sub(1)], points[(i + 1).min(n - 1)])
        };

        let dir_in = (current - prev).normalized().unwrap_or_default();
        let dir_out = (next - current).normalized().unwrap_or_default();

        match (dir_in + dir_out).cross(Vec3::UP).normalized() {
            Some(normal) => result.push(current + normal * radius),
            None => result.push(current),
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_tool_default() {
        let tool = Tool::default();
        assert!((tool.diameter - 3.175).abs() < 0.001);
        assert!((tool.radius() - 1.5875).abs() < 0.001);
    }

    #[test]
    fn test_offset_distance_equals_radius() {
        let path = vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(10.0, 0.0, 0.0),
            Vec3::new(10.0, 10.0, 0.0),
        ];
        let result = offset_points(&path, 1.0, true);
        assert_eq!(result.len(), 3);
        for (p, q) in path.iter().zip(&result) {
            assert_abs_diff_eq!(Vec3::dist(*p, *q), 1.0, epsilon = 0.1);
        }
    }

    #[test]
    fn test_ccw_square_grows_outward() {
        let square = Polyline::new(
            vec![
                Vec3::new(0.0, 0.0, 2.0),
                Vec3::new(10.0, 0.0, 2.0),
                Vec3::new(10.0, 10.0, 2.0),
                Vec3::new(0.0, 10.0, 2.0),
            ],
            true,
        );
        let out = Tool::new(2.0).compensate(&square);
        assert!(out.closed);
        let d = std::f64::consts::FRAC_1_SQRT_2;
        assert_abs_diff_eq!(out.points[0].x, -d, epsilon = 1e-9);
        assert_abs_diff_eq!(out.points[0].y, -d, epsilon = 1e-9);
        assert_abs_diff_eq!(out.points[2].x, 10.0 + d, epsilon = 1e-9);
        assert_abs_diff_eq!(out.points[2].y, 10.0 + d, epsilon = 1e-9);
        // layer height is untouched
        assert!(out.points.iter().all(|p| p.z == 2.0));
    }

    #[test]
    fn test_open_path_ends_use_single_neighbour() {
        let path = vec![Vec3::new(0.0, 0.0, 0.0), Vec3::new(5.0, 0.0, 0.0)];
        let out = offset_points(&path, 0.5, false);
        assert_abs_diff_eq!(out[0].y, -0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(out[1].y, -0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_reversal_keeps_point() {
        // two-point ring: every point's neighbours coincide
        let path = vec![Vec3::new(0.0, 0.0, 0.0), Vec3::new(5.0, 0.0, 0.0)];
        let out = offset_points(&path, 0.5, true);
        assert_eq!(out, path);
        assert!(out.iter().all(|p| p.is_finite()));
    }

    #[test]
    fn test_duplicate_points_do_not_produce_nan() {
        let p = Vec3::new(1.0, 1.0, 0.0);
        let out = offset_points(&[p, p, p], 1.0, true);
        assert_eq!(out, vec![p, p, p]);
    }
}
