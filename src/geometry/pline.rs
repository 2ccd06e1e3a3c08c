use crate::math::arc_2d::{arc_from_bulge, arc_subdivision_count};
use crate::math::Point3;

/// Bulge-encoded polyline vertex for mixed line/arc segments.
///
/// `bulge = tan(sweep_angle / 4)`:
/// - `0` = straight line to next vertex
/// - `> 0` = counter-clockwise arc to next vertex
/// - `< 0` = clockwise arc to next vertex
/// - `|bulge| = 1` = semicircle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlineVertex {
    pub x: f64,
    pub y: f64,
    pub bulge: f64,
}

impl PlineVertex {
    /// Creates a new vertex with the given coordinates and bulge.
    #[must_use]
    pub fn new(x: f64, y: f64, bulge: f64) -> Self {
        Self { x, y, bulge }
    }

    /// Creates a line vertex (bulge = 0).
    #[must_use]
    pub fn line(x: f64, y: f64) -> Self {
        Self { x, y, bulge: 0.0 }
    }

    /// Position of this vertex in the XY plane.
    #[must_use]
    pub fn point(&self) -> Point3 {
        Point3::new(self.x, self.y, 0.0)
    }
}

/// A 2D polyline with mixed straight-line and circular-arc segments.
///
/// This is the sketch representation of a wall trace before it is placed on
/// a plane. For closed polylines the last vertex connects back to the first.
#[derive(Debug, Clone, PartialEq)]
pub struct Pline {
    pub vertices: Vec<PlineVertex>,
    pub closed: bool,
}

impl Pline {
    /// Creates a `Pline` from points (z ignored) with all-zero bulges.
    #[must_use]
    pub fn from_points(points: &[Point3], closed: bool) -> Self {
        let vertices = points
            .iter()
            .map(|p| PlineVertex::line(p.x, p.y))
            .collect();
        Self { vertices, closed }
    }

    /// Returns `true` if any segment is an arc.
    #[must_use]
    pub fn has_arcs(&self) -> bool {
        self.vertices
            .iter()
            .take(self.segment_count())
            .any(|v| v.bulge.abs() >= 1e-12)
    }

    /// Flattens the polyline into points, replacing arcs by chords that
    /// deviate at most `tolerance` from the true arc.
    ///
    /// Closed polylines do not repeat the first point at the end.
    #[must_use]
    pub fn to_points(&self, tolerance: f64) -> Vec<Point3> {
        let n = self.vertices.len();
        if n == 0 {
            return Vec::new();
        }

        let seg_count = self.segment_count();
        let mut points = Vec::with_capacity(n * 2);
        points.push(self.vertices[0].point());

        for i in 0..seg_count {
            let v0 = &self.vertices[i];
            let v1 = &self.vertices[(i + 1) % n];
            let is_closing = self.closed && i + 1 == n;

            if v0.bulge.abs() >= 1e-12 {
                let arc = arc_from_bulge(v0.x, v0.y, v1.x, v1.y, v0.bulge);
                if arc.radius >= 1e-12 {
                    let n_sub = arc_subdivision_count(arc.radius, arc.sweep.abs(), tolerance);
                    for j in 1..n_sub {
                        let (px, py) = arc.point_at(f64::from(j) / f64::from(n_sub));
                        points.push(Point3::new(px, py, 0.0));
                    }
                }
            }

            if !is_closing {
                points.push(v1.point());
            }
        }

        points
    }

    /// Returns a new polyline with vertices in reverse order and negated bulges.
    #[must_use]
    pub fn reversed(&self) -> Self {
        let m = self.vertices.len();
        if m == 0 {
            return self.clone();
        }
        let mut vertices = Vec::with_capacity(m);
        for j in 0..m {
            let src = &self.vertices[m - 1 - j];
            // Segment j of the reversed pline is original segment m-2-j run backwards;
            // for closed plines the wrap segment keeps its index modulo m.
            let bulge = if self.closed {
                -self.vertices[(2 * m - 2 - j) % m].bulge
            } else if j < m - 1 {
                -self.vertices[m - 2 - j].bulge
            } else {
                0.0
            };
            vertices.push(PlineVertex::new(src.x, src.y, bulge));
        }
        Self {
            vertices,
            closed: self.closed,
        }
    }

    /// Returns the number of segments in this polyline.
    #[must_use]
    pub fn segment_count(&self) -> usize {
        let n = self.vertices.len();
        if n < 2 {
            return 0;
        }
        if self.closed {
            n
        } else {
            n - 1
        }
    }
}
