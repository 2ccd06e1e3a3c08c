use crate::error::{Result, WallError};
use crate::geometry::{Plane, Pline};
use crate::math::{Point3, Vector3, TOLERANCE};
use crate::topology::{EdgeId, TopologyStore, WireId};

use super::classify::{classify, BaseShape, ShapeClass};

/// Endpoints closer than this are treated as the same vertex.
pub(crate) const JOIN_TOLERANCE: f64 = 1e-7;

/// The directed trace a wall is built along.
///
/// Closed curves do not repeat their first point.
#[derive(Debug, Clone, PartialEq)]
pub struct BaseCurve {
    pub points: Vec<Point3>,
    pub closed: bool,
}

impl BaseCurve {
    /// Creates a curve, dropping repeated consecutive points.
    #[must_use]
    pub fn new(points: Vec<Point3>, closed: bool) -> Self {
        let mut out: Vec<Point3> = Vec::with_capacity(points.len());
        for p in points {
            if out.last().map_or(true, |q| !same_point(q, &p)) {
                out.push(p);
            }
        }
        if closed {
            while out.len() > 1 && same_point(&out[0], &out[out.len() - 1]) {
                out.pop();
            }
        }
        Self {
            points: out,
            closed,
        }
    }

    /// Reads the vertices of a wire.
    ///
    /// # Errors
    ///
    /// Returns an error if the wire or one of its entities is missing.
    pub fn from_wire(store: &TopologyStore, wire: WireId) -> Result<Self> {
        let closed = store.wire(wire)?.is_closed;
        Ok(Self::new(store.wire_points(wire)?, closed))
    }

    /// Chains loose edges into one curve by matching endpoints.
    ///
    /// Edge directions are ignored; the curve starts at a free end when it
    /// is open, at the first edge otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`WallError::InvalidBaseShape`] unless the edges form exactly
    /// one connected, unbranched wire.
    pub fn from_edges(store: &TopologyStore, edges: &[EdgeId]) -> Result<Self> {
        let mut segments = Vec::with_capacity(edges.len());
        for &edge in edges {
            let (a, b) = store.edge_points(edge)?;
            if !same_point(&a, &b) {
                segments.push((a, b));
            }
        }
        if segments.is_empty() {
            return Err(WallError::InvalidBaseShape("edges have no length".into()).into());
        }

        let degree = |p: &Point3| {
            segments
                .iter()
                .filter(|(a, b)| same_point(a, p) || same_point(b, p))
                .count()
        };
        let mut free_ends = Vec::new();
        for (a, b) in &segments {
            for p in [a, b] {
                match degree(p) {
                    1 => free_ends.push(*p),
                    2 => {}
                    _ => {
                        return Err(WallError::InvalidBaseShape(
                            "edges branch at a shared vertex".into(),
                        )
                        .into())
                    }
                }
            }
        }
        let closed = match free_ends.len() {
            0 => true,
            2 => false,
            n => {
                return Err(WallError::InvalidBaseShape(format!(
                    "edges form {} separate wires",
                    n / 2
                ))
                .into())
            }
        };

        let start = free_ends.first().copied().unwrap_or(segments[0].0);
        let mut used = vec![false; segments.len()];
        let mut points = vec![start];
        let mut current = start;
        while let Some(i) = (0..segments.len()).find(|&i| {
            !used[i] && (same_point(&segments[i].0, &current) || same_point(&segments[i].1, &current))
        }) {
            used[i] = true;
            let (a, b) = segments[i];
            current = if same_point(&a, &current) { b } else { a };
            points.push(current);
        }

        if used.iter().any(|u| !u) {
            return Err(WallError::InvalidBaseShape("edges are not connected".into()).into());
        }
        Ok(Self::new(points, closed))
    }

    /// Reads the trace of a base shape that is a wire or loose edges.
    ///
    /// # Errors
    ///
    /// Returns [`WallError::InvalidBaseShape`] for solids, single faces and
    /// invalid bases.
    pub fn from_base(store: &TopologyStore, base: &BaseShape, force_wire: bool) -> Result<Self> {
        match classify(store, base, force_wire) {
            ShapeClass::SingleWire(wire) => Self::from_wire(store, wire),
            ShapeClass::RawEdges(edges) => Self::from_edges(store, &edges),
            ShapeClass::Solid(_) | ShapeClass::SingleFace(_) => Err(WallError::InvalidBaseShape(
                "base is not a curve".into(),
            )
            .into()),
            ShapeClass::Invalid(reason) => Err(WallError::InvalidBaseShape(reason).into()),
        }
    }

    /// Number of distinct vertices.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.points.len()
    }

    #[must_use]
    pub fn start(&self) -> Option<&Point3> {
        self.points.first()
    }

    #[must_use]
    pub fn end(&self) -> Option<&Point3> {
        self.points.last()
    }

    /// Unit direction of the first segment.
    ///
    /// # Errors
    ///
    /// Returns [`WallError::InvalidBaseShape`] if the curve has fewer than
    /// two points.
    pub fn first_direction(&self) -> Result<Vector3> {
        match self.points.as_slice() {
            [a, b, ..] => (b - a)
                .try_normalize(TOLERANCE)
                .ok_or_else(|| WallError::InvalidBaseShape("first segment has no length".into()).into()),
            _ => Err(WallError::InvalidBaseShape("curve needs at least two points".into()).into()),
        }
    }

    /// Projects the curve onto the plane through its first point with the
    /// given normal.
    ///
    /// # Errors
    ///
    /// Returns [`WallError::InvalidBaseShape`] if the curve is empty or a
    /// point lies farther than `planar_tolerance` from that plane.
    pub fn project(&self, normal: &Vector3, planar_tolerance: f64) -> Result<(Plane, Pline)> {
        let origin = *self
            .start()
            .ok_or_else(|| WallError::InvalidBaseShape("curve is empty".into()))?;
        let plane = Plane::from_normal(origin, *normal)?;
        if let Some(off) = self
            .points
            .iter()
            .map(|p| plane.signed_distance(p))
            .find(|d| d.abs() > planar_tolerance)
        {
            return Err(WallError::InvalidBaseShape(format!(
                "curve is not planar (off by {off:e})"
            ))
            .into());
        }
        let local: Vec<Point3> = self.points.iter().map(|p| plane.to_local(p)).collect();
        Ok((plane, Pline::from_points(&local, self.closed)))
    }
}

pub(crate) fn same_point(a: &Point3, b: &Point3) -> bool {
    (a - b).norm() <= JOIN_TOLERANCE
}
