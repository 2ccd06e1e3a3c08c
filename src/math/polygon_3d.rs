use super::{Point3, Vector3, TOLERANCE};
use crate::error::{GeometryError, Result};

/// Tolerance for collinearity simplification.
const COLLINEAR_TOL: f64 = 1e-8;

/// Area vector of a closed 3D polygon (Newell's method).
///
/// The direction follows the right-hand rule over the vertex order and the
/// magnitude equals the enclosed area.
#[must_use]
pub fn area_vector(points: &[Point3]) -> Vector3 {
    let n = points.len();
    let mut acc = Vector3::zeros();
    if n < 3 {
        return acc;
    }
    for i in 0..n {
        let curr = &points[i];
        let next = &points[(i + 1) % n];
        acc.x += (curr.y - next.y) * (curr.z + next.z);
        acc.y += (curr.z - next.z) * (curr.x + next.x);
        acc.z += (curr.x - next.x) * (curr.y + next.y);
    }
    acc * 0.5
}

/// Computes the unit normal of a polygon using Newell's method.
///
/// # Errors
///
/// Returns `GeometryError::Degenerate` if the polygon has no area.
pub fn newell_normal(points: &[Point3]) -> Result<Vector3> {
    let normal = area_vector(points);
    let len = normal.norm();
    if len < TOLERANCE {
        return Err(
            GeometryError::Degenerate("polygon has no area: cannot compute normal".into()).into(),
        );
    }
    Ok(normal / len)
}

/// Signed area of a planar polygon measured along `normal`.
#[must_use]
pub fn polygon_area_3d(points: &[Point3], normal: &Vector3) -> f64 {
    area_vector(points).dot(normal)
}

/// Removes collinear mid-vertices from a closed polygon loop.
///
/// Loops that would collapse below three vertices are returned unchanged.
#[must_use]
pub fn simplify_collinear(points: &[Point3]) -> Vec<Point3> {
    let n = points.len();
    if n < 3 {
        return points.to_vec();
    }

    let mut result: Vec<Point3> = Vec::with_capacity(n);
    for i in 0..n {
        let prev = result.last().copied().unwrap_or(points[(i + n - 1) % n]);
        let curr = points[i];
        let next = points[(i + 1) % n];
        if !is_collinear(&prev, &curr, &next) {
            result.push(curr);
        }
    }

    // The first vertex was tested against the original predecessor; recheck it.
    while result.len() >= 3 {
        let m = result.len();
        if is_collinear(&result[m - 1], &result[0], &result[1]) {
            result.remove(0);
        } else {
            break;
        }
    }

    if result.len() < 3 {
        return points.to_vec();
    }
    result
}

/// Checks if three points are collinear.
#[must_use]
pub fn is_collinear(a: &Point3, b: &Point3, c: &Point3) -> bool {
    let ab = b - a;
    let ac = c - a;
    ab.cross(&ac).norm_squared() < COLLINEAR_TOL * COLLINEAR_TOL
}

/// Returns `true` if the planar polygon is convex (collinear runs allowed).
#[must_use]
pub fn is_convex(points: &[Point3], normal: &Vector3) -> bool {
    let n = points.len();
    if n < 3 {
        return false;
    }
    for i in 0..n {
        let a = points[i];
        let b = points[(i + 1) % n];
        let c = points[(i + 2) % n];
        if (b - a).cross(&(c - b)).dot(normal) < -COLLINEAR_TOL {
            return false;
        }
    }
    true
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    #[test]
    fn area_vector_of_unit_square_is_unit_z() {
        let sq = vec![p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(1.0, 1.0, 0.0), p(0.0, 1.0, 0.0)];
        let a = area_vector(&sq);
        assert!((a.z - 1.0).abs() < TOLERANCE);
        assert!(a.x.abs() < TOLERANCE && a.y.abs() < TOLERANCE);
    }

    #[test]
    fn newell_normal_of_vertical_quad() {
        let quad = vec![p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(1.0, 0.0, 1.0), p(0.0, 0.0, 1.0)];
        let n = newell_normal(&quad).unwrap();
        assert!((n.y + 1.0).abs() < TOLERANCE);
    }

    #[test]
    fn degenerate_polygon_has_no_normal() {
        let line = vec![p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(2.0, 0.0, 0.0)];
        assert!(newell_normal(&line).is_err());
    }

    #[test]
    fn simplify_collinear_removes_mid_vertex() {
        let points = vec![
            p(0.0, 0.0, 0.0),
            p(2.0, 0.0, 0.0),
            p(4.0, 0.0, 0.0),
            p(4.0, 4.0, 0.0),
            p(0.0, 4.0, 0.0),
        ];
        let simplified = simplify_collinear(&points);
        assert_eq!(simplified.len(), 4);
        assert!(!simplified.iter().any(|q| (q.x - 2.0).abs() < TOLERANCE && q.y.abs() < TOLERANCE));
    }

    #[test]
    fn simplify_collinear_handles_run_through_first_vertex() {
        let points = vec![
            p(2.0, 0.0, 0.0),
            p(4.0, 0.0, 0.0),
            p(4.0, 4.0, 0.0),
            p(0.0, 4.0, 0.0),
            p(0.0, 0.0, 0.0),
            p(1.0, 0.0, 0.0),
        ];
        assert_eq!(simplify_collinear(&points).len(), 4);
    }

    #[test]
    fn convexity() {
        let z = Vector3::z();
        let sq = vec![p(0.0, 0.0, 0.0), p(2.0, 0.0, 0.0), p(2.0, 2.0, 0.0), p(0.0, 2.0, 0.0)];
        assert!(is_convex(&sq, &z));
        let l = vec![
            p(0.0, 0.0, 0.0), p(4.0, 0.0, 0.0), p(4.0, 2.0, 0.0),
            p(2.0, 2.0, 0.0), p(2.0, 4.0, 0.0), p(0.0, 4.0, 0.0),
        ];
        assert!(!is_convex(&l, &z));
    }
}
