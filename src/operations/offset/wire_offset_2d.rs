use crate::error::{OperationError, Result};
use crate::geometry::Pline;
use crate::math::intersect_2d::line_line_intersect_2d;
use crate::math::polygon_2d::{left_normal, segment_direction};
use crate::math::{Point3, Vector3, TOLERANCE};

/// When `cos(angle between consecutive segments) < this`, use a flat cap
/// instead of a miter join. Only for near-180° reversals (> ~169°).
const FLAT_CAP_COS: f64 = -0.98;

/// Maximum miter distance as a multiple of `|distance|`. When the miter
/// extends further than this, a bevel (two points) is used instead.
const MITER_LIMIT: f64 = 4.0;

/// Default chord tolerance used when flattening arc segments.
const DEFAULT_ARC_TOLERANCE: f64 = 0.01;

/// Offsets a planar polyline sideways by a signed distance.
///
/// The polyline lives in local 2D coordinates (Z ignored). Each segment is
/// shifted along its left normal and neighbouring segments are joined at
/// the intersection of their offset lines. Arc segments are flattened
/// first. Open polylines stay open and closed ones stay closed; no caps are
/// added and no self-intersections are removed.
///
/// # Sign Convention
///
/// - Positive distance: left offset (relative to walking direction)
/// - Negative distance: right offset
#[derive(Debug)]
pub struct WireOffset2D {
    pline: Pline,
    distance: f64,
    arc_tolerance: f64,
}

impl WireOffset2D {
    /// Creates a new `WireOffset2D` operation.
    #[must_use]
    pub fn new(pline: Pline, distance: f64) -> Self {
        Self {
            pline,
            distance,
            arc_tolerance: DEFAULT_ARC_TOLERANCE,
        }
    }

    /// Sets the chord tolerance used to flatten arcs.
    #[must_use]
    pub fn with_arc_tolerance(mut self, tolerance: f64) -> Self {
        self.arc_tolerance = tolerance;
        self
    }

    /// Executes the offset, returning a line-only polyline.
    ///
    /// # Errors
    ///
    /// Returns `OperationError::InvalidInput` if fewer than two distinct
    /// points remain (three for closed polylines).
    pub fn execute(&self) -> Result<Pline> {
        let points = dedup_points(&self.pline.to_points(self.arc_tolerance), self.pline.closed);
        let closed = self.pline.closed;
        let min = if closed { 3 } else { 2 };
        if points.len() < min {
            return Err(OperationError::InvalidInput(format!(
                "at least {min} distinct points are required for wire offset"
            ))
            .into());
        }

        if self.distance.abs() < TOLERANCE {
            return Ok(Pline::from_points(&points, closed));
        }

        let raw = build_offset(&points, self.distance, closed)?;
        Ok(Pline::from_points(&raw, closed))
    }
}

/// Drops consecutive duplicates (and the closing duplicate of closed loops).
fn dedup_points(points: &[Point3], closed: bool) -> Vec<Point3> {
    let mut out: Vec<Point3> = Vec::with_capacity(points.len());
    for p in points {
        if out
            .last()
            .map_or(true, |q| (p.x - q.x).hypot(p.y - q.y) > TOLERANCE)
        {
            out.push(*p);
        }
    }
    if closed && out.len() > 1 {
        let (first, last) = (out[0], out[out.len() - 1]);
        if (first.x - last.x).hypot(first.y - last.y) <= TOLERANCE {
            out.pop();
        }
    }
    out
}

/// Offsets every segment and joins consecutive ones.
fn build_offset(points: &[Point3], distance: f64, closed: bool) -> Result<Vec<Point3>> {
    let n = points.len();
    let segment_count = if closed { n } else { n - 1 };

    let mut offset_segments: Vec<(Point3, Point3)> = Vec::with_capacity(segment_count);
    let mut directions: Vec<Vector3> = Vec::with_capacity(segment_count);
    for i in 0..segment_count {
        let j = (i + 1) % n;
        let dir = segment_direction(&points[i], &points[j])?;
        let offset = left_normal(dir) * distance;
        offset_segments.push((points[i] + offset, points[j] + offset));
        directions.push(dir);
    }

    let mut raw = Vec::with_capacity(n * 2);
    if closed {
        for i in 0..segment_count {
            let prev = if i == 0 { segment_count - 1 } else { i - 1 };
            push_corner(
                &mut raw,
                &offset_segments[prev],
                &offset_segments[i],
                &directions[prev],
                &directions[i],
                &points[i],
                distance,
            );
        }
    } else {
        raw.push(offset_segments[0].0);
        for i in 1..n - 1 {
            push_corner(
                &mut raw,
                &offset_segments[i - 1],
                &offset_segments[i],
                &directions[i - 1],
                &directions[i],
                &points[i],
                distance,
            );
        }
        raw.push(offset_segments[segment_count - 1].1);
    }
    Ok(raw)
}

/// Pushes corner point(s) into `raw`.
///
/// - Near-antiparallel segments: flat cap (two points).
/// - Miter exceeding `MITER_LIMIT`: bevel (two points).
/// - Normal corners: single miter intersection point.
fn push_corner(
    raw: &mut Vec<Point3>,
    seg_prev: &(Point3, Point3),
    seg_next: &(Point3, Point3),
    dir_prev: &Vector3,
    dir_next: &Vector3,
    original_corner: &Point3,
    distance: f64,
) {
    let cos_angle = dir_prev.x * dir_next.x + dir_prev.y * dir_next.y;
    if cos_angle < FLAT_CAP_COS {
        raw.push(seg_prev.1);
        raw.push(seg_next.0);
        return;
    }

    let corner = intersect_offset_lines(seg_prev, seg_next, dir_prev, dir_next);
    let dx = corner.x - original_corner.x;
    let dy = corner.y - original_corner.y;
    let limit = MITER_LIMIT * distance.abs();
    if dx * dx + dy * dy > limit * limit {
        raw.push(seg_prev.1);
        raw.push(seg_next.0);
    } else {
        raw.push(corner);
    }
}

/// Intersects two offset lines; collinear neighbours meet at the shared
/// offset point.
fn intersect_offset_lines(
    seg_prev: &(Point3, Point3),
    seg_next: &(Point3, Point3),
    dir_prev: &Vector3,
    dir_next: &Vector3,
) -> Point3 {
    match line_line_intersect_2d(&seg_prev.1, dir_prev, &seg_next.0, dir_next) {
        Some((t, _)) => seg_prev.1 + dir_prev * t,
        None => seg_prev.1,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::geometry::PlineVertex;
    use approx::assert_abs_diff_eq;

    fn p(x: f64, y: f64) -> Point3 {
        Point3::new(x, y, 0.0)
    }

    #[test]
    fn straight_line_left_and_right() {
        let line = Pline::from_points(&[p(0.0, 0.0), p(10.0, 0.0)], false);
        let left = WireOffset2D::new(line.clone(), 1.0).execute().unwrap();
        let right = WireOffset2D::new(line, -1.0).execute().unwrap();
        assert_abs_diff_eq!(left.vertices[0].y, 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(right.vertices[1].y, -1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(right.vertices[1].x, 10.0, epsilon = 1e-12);
    }

    #[test]
    fn l_corner_is_mitered() {
        let path = Pline::from_points(&[p(0.0, 0.0), p(10.0, 0.0), p(10.0, 10.0)], false);
        let out = WireOffset2D::new(path, -1.0).execute().unwrap();
        assert_eq!(out.vertices.len(), 3);
        assert_abs_diff_eq!(out.vertices[1].x, 11.0, epsilon = 1e-12);
        assert_abs_diff_eq!(out.vertices[1].y, -1.0, epsilon = 1e-12);
    }

    #[test]
    fn sharp_turn_is_beveled() {
        let path = Pline::from_points(&[p(0.0, 0.0), p(10.0, 0.0), p(0.0, 1.0)], false);
        let out = WireOffset2D::new(path, 1.0).execute().unwrap();
        assert_eq!(out.vertices.len(), 4);
    }

    #[test]
    fn closed_square_grows_outward_to_the_right() {
        let square = Pline::from_points(
            &[p(0.0, 0.0), p(10.0, 0.0), p(10.0, 10.0), p(0.0, 10.0)],
            true,
        );
        let out = WireOffset2D::new(square, -1.0).execute().unwrap();
        assert!(out.closed);
        assert_eq!(out.vertices.len(), 4);
        assert_abs_diff_eq!(out.vertices[0].x, -1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(out.vertices[0].y, -1.0, epsilon = 1e-12);
    }

    #[test]
    fn zero_distance_copies_the_path() {
        let path = Pline::from_points(&[p(0.0, 0.0), p(0.0, 0.0), p(5.0, 0.0)], false);
        let out = WireOffset2D::new(path, 0.0).execute().unwrap();
        assert_eq!(out.vertices.len(), 2);
    }

    #[test]
    fn arcs_are_flattened_before_offsetting() {
        let arc = Pline {
            vertices: vec![PlineVertex::new(0.0, 0.0, 1.0), PlineVertex::line(2.0, 0.0)],
            closed: false,
        };
        let out = WireOffset2D::new(arc, 0.5).execute().unwrap();
        assert!(!out.has_arcs());
        assert!(out.vertices.len() > 2);
    }

    #[test]
    fn single_point_is_rejected() {
        let path = Pline::from_points(&[p(1.0, 1.0), p(1.0, 1.0)], false);
        assert!(WireOffset2D::new(path, 1.0).execute().is_err());
    }
}
