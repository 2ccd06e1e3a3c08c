use super::{Point3, Vector3, TOLERANCE};
use crate::error::{OperationError, Result};

/// Computes the signed area of a polygon in the XY plane (shoelace formula).
///
/// Positive for counter-clockwise, negative for clockwise.
#[must_use]
pub fn signed_area_2d(points: &[Point3]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        sum += points[i].x * points[j].y - points[j].x * points[i].y;
    }
    sum * 0.5
}

/// Computes the normalized direction from point `a` to point `b`.
///
/// # Errors
///
/// Returns `OperationError::InvalidInput` if the segment has zero length.
pub fn segment_direction(a: &Point3, b: &Point3) -> Result<Vector3> {
    let d = b - a;
    let len = (d.x * d.x + d.y * d.y).sqrt();
    if len < TOLERANCE {
        return Err(OperationError::InvalidInput(format!(
            "zero-length segment between ({}, {}) and ({}, {})",
            a.x, a.y, b.x, b.y
        ))
        .into());
    }
    Ok(Vector3::new(d.x / len, d.y / len, 0.0))
}

/// Returns the left-pointing normal of a direction vector in the XY plane.
#[must_use]
pub fn left_normal(dir: Vector3) -> Vector3 {
    Vector3::new(-dir.y, dir.x, 0.0)
}

/// Winding number of `point` with respect to a closed polygon in the XY plane.
///
/// Non-zero means inside.
#[must_use]
pub fn winding_number_2d(point: &Point3, polygon: &[Point3]) -> i32 {
    let n = polygon.len();
    let mut winding = 0i32;
    for i in 0..n {
        let a = polygon[i];
        let b = polygon[(i + 1) % n];
        let side = (b.x - a.x) * (point.y - a.y) - (b.y - a.y) * (point.x - a.x);
        if a.y <= point.y {
            if b.y > point.y && side > 0.0 {
                winding += 1;
            }
        } else if b.y <= point.y && side < 0.0 {
            winding -= 1;
        }
    }
    winding
}

/// Returns `true` if `point` lies inside the polygon (XY plane).
#[must_use]
pub fn point_in_polygon_2d(point: &Point3, polygon: &[Point3]) -> bool {
    polygon.len() >= 3 && winding_number_2d(point, polygon) != 0
}

/// Distance from `point` to the segment `a`-`b` in the XY plane.
#[must_use]
pub fn point_segment_distance_2d(point: &Point3, a: &Point3, b: &Point3) -> f64 {
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    let len2 = dx * dx + dy * dy;
    let t = if len2 < TOLERANCE * TOLERANCE {
        0.0
    } else {
        (((point.x - a.x) * dx + (point.y - a.y) * dy) / len2).clamp(0.0, 1.0)
    };
    let (cx, cy) = (a.x + dx * t, a.y + dy * t);
    ((point.x - cx).powi(2) + (point.y - cy).powi(2)).sqrt()
}

/// Distance from `point` to the boundary of a closed polygon (XY plane).
#[must_use]
pub fn point_loop_distance_2d(point: &Point3, polygon: &[Point3]) -> f64 {
    let n = polygon.len();
    (0..n)
        .map(|i| point_segment_distance_2d(point, &polygon[i], &polygon[(i + 1) % n]))
        .fold(f64::INFINITY, f64::min)
}

/// Returns a point strictly inside a simple polygon, near its first edge.
///
/// Used to test loop containment without hitting shared boundary vertices.
#[must_use]
pub fn interior_sample_2d(points: &[Point3]) -> Point3 {
    let n = points.len();
    if n < 3 {
        return points.first().copied().unwrap_or_else(Point3::origin);
    }
    let a = points[0];
    let b = points[1];
    let mid = Point3::new((a.x + b.x) * 0.5, (a.y + b.y) * 0.5, 0.0);
    let len = ((b.x - a.x).powi(2) + (b.y - a.y).powi(2)).sqrt();
    if len < TOLERANCE {
        return mid;
    }
    // Interior lies left of each edge for CCW loops, right for CW loops.
    let sign = if signed_area_2d(points) >= 0.0 { 1.0 } else { -1.0 };
    let step = (len * 1e-3).max(1e-7) * sign;
    Point3::new(
        mid.x - (b.y - a.y) / len * step,
        mid.y + (b.x - a.x) / len * step,
        0.0,
    )
}
