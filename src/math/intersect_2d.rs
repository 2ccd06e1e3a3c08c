use super::{Point3, Vector3, TOLERANCE};

/// Intersection of two infinite lines in the XY plane.
///
/// Lines are `p1 + t * d1` and `p2 + u * d2`. Returns `(t, u)`, or `None`
/// when the lines are parallel.
#[must_use]
pub fn line_line_intersect_2d(
    p1: &Point3,
    d1: &Vector3,
    p2: &Point3,
    d2: &Vector3,
) -> Option<(f64, f64)> {
    let cross = d1.x * d2.y - d1.y * d2.x;
    if cross.abs() < TOLERANCE {
        return None;
    }
    let dx = p2.x - p1.x;
    let dy = p2.y - p1.y;
    let t = (dx * d2.y - dy * d2.x) / cross;
    let u = (dx * d1.y - dy * d1.x) / cross;
    Some((t, u))
}

/// Bounded segment-segment intersection in the XY plane.
///
/// Returns `(point, t, u)` with `t` on `a0→a1` and `u` on `b0→b1`, both
/// clamped to `[0, 1]`. Parallel segments never intersect.
#[must_use]
pub fn segment_segment_intersect_2d(
    a0: &Point3,
    a1: &Point3,
    b0: &Point3,
    b1: &Point3,
) -> Option<(Point3, f64, f64)> {
    let da = Vector3::new(a1.x - a0.x, a1.y - a0.y, 0.0);
    let db = Vector3::new(b1.x - b0.x, b1.y - b0.y, 0.0);
    let (t, u) = line_line_intersect_2d(a0, &da, b0, &db)?;

    let eps = TOLERANCE;
    if t >= -eps && t <= 1.0 + eps && u >= -eps && u <= 1.0 + eps {
        let t = t.clamp(0.0, 1.0);
        let pt = Point3::new(a0.x + da.x * t, a0.y + da.y * t, a0.z);
        Some((pt, t, u.clamp(0.0, 1.0)))
    } else {
        None
    }
}
